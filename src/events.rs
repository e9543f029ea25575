//! Structured run events and the sink they are reported through.
//!
//! The core never talks to a logger directly. Everything observable — an
//! admission, a removal, a status change, per-tick progress — is emitted as a
//! [`KitchenEvent`] to an injected [`EventSink`], and the sink decides
//! formatting and filtering.

use std::fmt::{self, Display};
use std::sync::Mutex;

use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::food::{Cookable, FoodKind, Status};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Level {
    Info,
    Verbose,
    Trace,
}

/// Snapshot of one item, taken when the event was emitted.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ItemRef {
    pub id: Uuid,
    pub kind: FoodKind,
    pub status: Status,
}

impl ItemRef {
    pub fn of(item: &Cookable) -> Self {
        Self {
            id: item.id(),
            kind: item.kind(),
            status: item.status(),
        }
    }
}

impl Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.status, self.kind, self.id)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CookerRef {
    pub id: Uuid,
    pub name: &'static str,
}

impl Display for CookerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.id)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum KitchenEvent {
    Admitted {
        cooker: CookerRef,
        item: ItemRef,
    },
    Removed {
        cooker: CookerRef,
        item: ItemRef,
    },
    Plated {
        item: ItemRef,
    },
    Trashed {
        item: ItemRef,
    },
    StatusChanged {
        item: ItemRef,
        old: Status,
        new: Status,
    },
    Progress {
        item: ItemRef,
        delta_pct: f32,
        total_pct: f32,
    },
    EnergyDrawn {
        cooker: CookerRef,
        energy: f32,
    },
    CookerBusy {
        cooker: CookerRef,
        count: usize,
    },
    AwaitingSpace {
        cooker: CookerRef,
        kind: FoodKind,
        queued: usize,
        used: usize,
        capacity: usize,
    },
    SpaceAvailable {
        cooker: CookerRef,
        space: usize,
        count: usize,
    },
    LoadDelay {
        millis: u64,
    },
    CookerIdle {
        cooker: CookerRef,
    },
    TickSnapshot {
        planned: usize,
        cooking: usize,
        plated: usize,
        trashed: usize,
    },
}

impl KitchenEvent {
    pub fn level(&self) -> Level {
        match self {
            Self::Admitted { .. }
            | Self::Removed { .. }
            | Self::Plated { .. }
            | Self::Trashed { .. } => Level::Info,
            Self::StatusChanged { .. }
            | Self::Progress { .. }
            | Self::EnergyDrawn { .. }
            | Self::CookerBusy { .. }
            | Self::AwaitingSpace { .. }
            | Self::LoadDelay { .. } => Level::Verbose,
            Self::SpaceAvailable { .. } | Self::CookerIdle { .. } | Self::TickSnapshot { .. } => {
                Level::Trace
            }
        }
    }
}

impl Display for KitchenEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admitted { cooker, item } => {
                write!(f, "Added {item} to the {cooker}...")
            }
            Self::Removed { cooker, item } => {
                write!(f, "Removed {item} from the {cooker}...")
            }
            Self::Plated { item } => write!(f, "Moving {item} to the plate..."),
            Self::Trashed { item } => write!(f, "Trashing {item}..."),
            Self::StatusChanged { item, old, new } => {
                write!(
                    f,
                    "Status changed on the {} {} from {old} to {new}.",
                    item.kind, item.id
                )
            }
            Self::Progress {
                item,
                delta_pct,
                total_pct,
            } => {
                write!(
                    f,
                    "The {item} sizzles... Progressed {delta_pct:.1}%, now at {total_pct:.1}%..."
                )
            }
            Self::EnergyDrawn { cooker, energy } => {
                write!(f, "The {cooker} cooks with {energy} energy per frame...")
            }
            Self::CookerBusy { cooker, count } => {
                write!(f, "The {cooker} is cooking {count} items...")
            }
            Self::AwaitingSpace {
                cooker,
                kind,
                queued,
                used,
                capacity,
            } => {
                write!(
                    f,
                    "The {} has {used} of {capacity} slots taken; not enough space for {queued} {kind}.",
                    cooker.name
                )
            }
            Self::SpaceAvailable {
                cooker,
                space,
                count,
            } => {
                write!(
                    f,
                    "There is space for {count} items in the {} ({space} free).",
                    cooker.name
                )
            }
            Self::LoadDelay { millis } => {
                write!(f, "Simulating load with a {millis} ms pause.")
            }
            Self::CookerIdle { cooker } => {
                write!(f, "The {cooker} is empty. Nothing to cook.")
            }
            Self::TickSnapshot {
                planned,
                cooking,
                plated,
                trashed,
            } => {
                write!(
                    f,
                    "planned:{planned} cooking:{cooking} plated:{plated} trashed:{trashed}"
                )
            }
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &KitchenEvent);
}

/// Forwards every event to the `tracing` macros at its mapped level.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &KitchenEvent) {
        match event.level() {
            Level::Info => info!("{event}"),
            Level::Verbose => debug!("{event}"),
            Level::Trace => trace!("{event}"),
        }
    }
}

/// Swallows everything.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _: &KitchenEvent) {}
}

/// Buffers every event for later inspection. Meant for tests.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<KitchenEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<KitchenEvent> {
        self.events.lock().expect("event buffer poisoned").clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &KitchenEvent) {
        self.events
            .lock()
            .expect("event buffer poisoned")
            .push(event.clone());
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::food::CookState;

    fn toast() -> ItemRef {
        ItemRef::of(&Cookable::precooked(FoodKind::Bread))
    }

    #[test]
    fn levels_follow_the_event_weight() {
        let item = toast();
        assert_eq!(KitchenEvent::Plated { item }.level(), Level::Info);
        assert_eq!(
            KitchenEvent::Progress {
                item,
                delta_pct: 8.2,
                total_pct: 58.1
            }
            .level(),
            Level::Verbose
        );
        assert_eq!(
            KitchenEvent::TickSnapshot {
                planned: 0,
                cooking: 0,
                plated: 0,
                trashed: 0
            }
            .level(),
            Level::Trace
        );
    }

    #[test]
    fn item_refs_render_status_kind_and_id() {
        let item = toast();
        assert!(item.to_string().starts_with("cooked bread "));
        assert_eq!(item.status.primary, CookState::Cooked);
    }

    #[test]
    fn recording_sink_keeps_emission_order() {
        let sink = RecordingSink::new();
        let item = toast();
        sink.emit(&KitchenEvent::Plated { item });
        sink.emit(&KitchenEvent::Trashed { item });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], KitchenEvent::Plated { .. }));
        assert!(matches!(events[1], KitchenEvent::Trashed { .. }));
    }
}
