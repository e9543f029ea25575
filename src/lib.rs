//! Concurrent breakfast cooking simulation.
//!
//! Food items share capacity-limited appliances and progress through a
//! doneness state machine until they are plated or thrown away. The
//! [`kitchen::Kitchen`] owns the scheduling loop, [`cooker::Cooker`] models
//! one appliance, [`food::Cookable`] is the per-item state machine, and every
//! observable step flows to an injected [`events::EventSink`].

pub mod cooker;
pub mod events;
pub mod food;
pub mod kitchen;

pub use cooker::{CapacityExceeded, CookEvent, Cooker, EnergySource, LoadSim};
pub use events::{EventSink, KitchenEvent, Level, NullSink, RecordingSink, TracingSink};
pub use food::{CookState, Cookable, FoodKind, Notice, Status};
pub use kitchen::{BreakfastReport, Kitchen, KitchenError, Menu};
