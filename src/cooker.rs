//! Capacity-bounded appliances that advance their contents one tick at a time.

use std::mem;
use std::sync::Arc;
use std::time::Duration;

use async_std::task;
use rand::Rng;
use smol::Timer;
use thiserror::Error;
use uuid::Uuid;

use crate::events::{CookerRef, EventSink, ItemRef, KitchenEvent};
use crate::food::{Cookable, Notice, StatusChange};

/// Energy added to a contained item on each frame of a tick, one draw per
/// item.
#[derive(Clone, Copy, Debug)]
pub enum EnergySource {
    Fixed(f32),
    Uniform { max: f32 },
}

impl EnergySource {
    pub fn draw(&self) -> f32 {
        match self {
            Self::Fixed(energy) => *energy,
            Self::Uniform { max } => rand::thread_rng().gen_range(0.0..*max),
        }
    }

    /// A source that can never add doneness can never drain a kitchen.
    pub fn usable(&self) -> bool {
        match self {
            Self::Fixed(energy) => *energy > 0.0,
            Self::Uniform { max } => *max > 0.0,
        }
    }
}

/// Cosmetic load simulation awaited around each item's advance.
#[derive(Clone, Copy, Debug)]
pub enum LoadSim {
    Off,
    Uniform { max_millis: u64 },
}

impl LoadSim {
    async fn pause(&self, sink: &dyn EventSink) {
        if let Self::Uniform { max_millis } = self {
            if *max_millis == 0 {
                return;
            }
            let millis = rand::thread_rng().gen_range(0..*max_millis);
            sink.emit(&KitchenEvent::LoadDelay { millis });
            Timer::after(Duration::from_millis(millis)).await;
        }
    }
}

/// Rejected admission. Carries the batch back so the caller can defer it.
#[derive(Debug, Error)]
#[error("cannot add {} items to the {name}: {used} of {capacity} slots are already taken", batch.len())]
pub struct CapacityExceeded {
    pub name: &'static str,
    pub capacity: usize,
    pub used: usize,
    pub batch: Vec<Cookable>,
}

/// A transition observed while ticking, handed back for bookkeeping.
#[derive(Clone, Copy, Debug)]
pub struct CookEvent {
    pub item: ItemRef,
    pub notice: Notice,
}

/// One appliance. Holds at most `capacity` items; the only growth path is
/// [`admit`](Cooker::admit), which is all-or-nothing.
pub struct Cooker {
    id: Uuid,
    name: &'static str,
    capacity: usize,
    contents: Vec<Cookable>,
    energy: EnergySource,
    load: LoadSim,
    sink: Arc<dyn EventSink>,
}

impl Cooker {
    pub fn new(
        name: &'static str,
        capacity: usize,
        energy: EnergySource,
        load: LoadSim,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            capacity,
            contents: Vec::with_capacity(capacity),
            energy,
            load,
            sink,
        }
    }

    pub fn frying_pan(
        capacity: usize,
        energy: EnergySource,
        load: LoadSim,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self::new("frying pan", capacity, energy, load, sink)
    }

    pub fn toaster(
        capacity: usize,
        energy: EnergySource,
        load: LoadSim,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self::new("toaster", capacity, energy, load, sink)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn space(&self) -> usize {
        self.capacity - self.contents.len()
    }

    pub fn contents(&self) -> &[Cookable] {
        &self.contents
    }

    pub fn energy(&self) -> EnergySource {
        self.energy
    }

    pub fn summary(&self) -> CookerRef {
        CookerRef {
            id: self.id,
            name: self.name,
        }
    }

    /// Admit a whole batch, or nothing. On rejection no item enters the
    /// cooker and no event fires; the batch rides back in the error.
    pub fn admit(&mut self, batch: Vec<Cookable>) -> Result<(), CapacityExceeded> {
        if self.space() < batch.len() {
            return Err(CapacityExceeded {
                name: self.name,
                capacity: self.capacity,
                used: self.contents.len(),
                batch,
            });
        }
        for item in batch {
            self.sink.emit(&KitchenEvent::Admitted {
                cooker: self.summary(),
                item: ItemRef::of(&item),
            });
            self.contents.push(item);
        }
        Ok(())
    }

    /// Remove and return the item when present; absent is a no-op, not an
    /// error.
    pub fn evict(&mut self, id: Uuid) -> Option<Cookable> {
        let index = self.contents.iter().position(|item| item.id() == id)?;
        let item = self.contents.remove(index);
        self.sink.emit(&KitchenEvent::Removed {
            cooker: self.summary(),
            item: ItemRef::of(&item),
        });
        Some(item)
    }

    /// Forced removal outside the usual transition flow. Silent, idempotent.
    pub fn purge(&mut self, id: Uuid) -> bool {
        let before = self.contents.len();
        self.contents.retain(|item| item.id() != id);
        self.contents.len() != before
    }

    /// Advance every contained item by `frames` worth of energy, all items
    /// concurrently. The snapshot is taken at tick start; the contents are
    /// never mutated mid-tick, so transitions take effect through the
    /// returned [`CookEvent`]s only.
    pub async fn tick(&mut self, frames: u32) -> Vec<CookEvent> {
        let batch = mem::take(&mut self.contents);
        self.sink.emit(&KitchenEvent::CookerBusy {
            cooker: self.summary(),
            count: batch.len(),
        });

        let mut handles = Vec::with_capacity(batch.len());
        for item in batch {
            let energy = self.energy.draw();
            self.sink.emit(&KitchenEvent::EnergyDrawn {
                cooker: self.summary(),
                energy,
            });
            let load = self.load;
            let sink = Arc::clone(&self.sink);
            handles.push(task::spawn(cook_one(item, frames, energy, load, sink)));
        }

        let mut events = Vec::new();
        for handle in handles {
            let (item, fired) = handle.await;
            events.extend(fired);
            self.contents.push(item);
        }
        events
    }
}

/// Advance a single item, reporting progress and any transitions it fired.
async fn cook_one(
    mut item: Cookable,
    frames: u32,
    energy: f32,
    load: LoadSim,
    sink: Arc<dyn EventSink>,
) -> (Cookable, Vec<CookEvent>) {
    let before = ItemRef::of(&item);
    load.pause(sink.as_ref()).await;

    let advance = item.advance(frames as f32 * energy);
    sink.emit(&KitchenEvent::Progress {
        item: before,
        delta_pct: advance.delta_pct,
        total_pct: advance.total_pct,
    });
    load.pause(sink.as_ref()).await;

    if let Some(StatusChange { old, new }) = advance.change {
        sink.emit(&KitchenEvent::StatusChanged {
            item: ItemRef::of(&item),
            old,
            new,
        });
    }
    let events = advance
        .fired
        .iter()
        .map(|&notice| CookEvent {
            item: ItemRef::of(&item),
            notice,
        })
        .collect();
    (item, events)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::events::RecordingSink;
    use crate::food::FoodKind;

    fn pan(capacity: usize, energy: EnergySource) -> (Cooker, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let cooker = Cooker::frying_pan(capacity, energy, LoadSim::Off, sink.clone());
        (cooker, sink)
    }

    fn eggs(count: usize) -> Vec<Cookable> {
        (0..count).map(|_| Cookable::raw(FoodKind::Egg)).collect()
    }

    #[test]
    fn admit_is_all_or_nothing() {
        let (mut pan, sink) = pan(2, EnergySource::Fixed(0.1));

        let rejected = pan.admit(eggs(3)).unwrap_err();
        assert_eq!(rejected.batch.len(), 3);
        assert!(pan.is_empty());
        assert!(sink.events().is_empty());

        pan.admit(eggs(2)).unwrap();
        assert_eq!(pan.len(), 2);
        assert_eq!(
            sink.events()
                .iter()
                .filter(|event| matches!(event, KitchenEvent::Admitted { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn capacity_holds_across_operations() {
        let (mut pan, _sink) = pan(2, EnergySource::Fixed(0.1));

        pan.admit(eggs(2)).unwrap();
        assert!(pan.admit(eggs(1)).is_err());
        assert!(pan.len() <= pan.capacity());

        task::block_on(pan.tick(1));
        assert!(pan.len() <= pan.capacity());

        let id = pan.contents()[0].id();
        pan.evict(id).unwrap();
        pan.admit(eggs(1)).unwrap();
        assert!(pan.len() <= pan.capacity());
    }

    #[test]
    fn evicting_an_absent_item_is_a_noop() {
        let (mut pan, sink) = pan(2, EnergySource::Fixed(0.1));

        assert!(pan.evict(Uuid::new_v4()).is_none());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn purge_is_silent_and_idempotent() {
        let (mut pan, sink) = pan(2, EnergySource::Fixed(0.1));
        pan.admit(eggs(1)).unwrap();
        let id = pan.contents()[0].id();
        let admissions = sink.events().len();

        assert!(pan.purge(id));
        assert!(!pan.purge(id));
        assert!(pan.is_empty());
        assert_eq!(sink.events().len(), admissions);
    }

    #[test]
    fn tick_advances_every_item_once() {
        let (mut pan, sink) = pan(3, EnergySource::Fixed(0.1));
        pan.admit(eggs(3)).unwrap();

        let events = task::block_on(pan.tick(1));

        for item in pan.contents() {
            assert!((item.doneness() - 0.1).abs() < f32::EPSILON);
        }
        assert_eq!(
            events
                .iter()
                .filter(|event| event.notice == Notice::Cooking)
                .count(),
            3
        );
        assert_eq!(
            sink.events()
                .iter()
                .filter(|event| matches!(event, KitchenEvent::Progress { .. }))
                .count(),
            3
        );
    }

    #[test]
    fn tick_leaves_eviction_to_the_caller() {
        let (mut pan, _sink) = pan(1, EnergySource::Fixed(2.0));
        pan.admit(eggs(1)).unwrap();

        let events = task::block_on(pan.tick(1));

        // The burned item stays put until the bookkeeping phase acts on the
        // returned events.
        assert_eq!(pan.len(), 1);
        assert!(events.iter().any(|event| event.notice == Notice::Burned));
        assert!(events.iter().any(|event| event.notice == Notice::Done));
    }
}
