//! The scheduler: admits batches, ticks the cookers, and keeps the books.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::mem;
use std::sync::Arc;

use async_std::task;
use futures::future::join_all;
use thiserror::Error;
use uuid::Uuid;

use crate::cooker::{CookEvent, Cooker, EnergySource, LoadSim};
use crate::events::{EventSink, ItemRef, KitchenEvent};
use crate::food::{Cookable, FoodKind, Notice};

/// Run configuration: what to cook, and on what.
#[derive(Clone, Copy, Debug)]
pub struct Menu {
    pub eggs: usize,
    pub bacon: usize,
    pub bread: usize,
    pub pan_capacity: usize,
    pub toaster_capacity: usize,
    pub energy: EnergySource,
    pub load: LoadSim,
}

impl Default for Menu {
    fn default() -> Self {
        Self {
            eggs: 3,
            bacon: 3,
            bread: 2,
            pan_capacity: 3,
            toaster_capacity: 2,
            energy: EnergySource::Uniform { max: 0.25 },
            load: LoadSim::Uniform { max_millis: 250 },
        }
    }
}

/// Configurations that could never drain are rejected before the loop starts.
#[derive(Debug, Error)]
pub enum KitchenError {
    #[error("{count} {kind} can never fit into the {cooker} (capacity {capacity})")]
    BatchExceedsCapacity {
        kind: FoodKind,
        count: usize,
        cooker: &'static str,
        capacity: usize,
    },
    #[error("the {cooker} has no usable heat; items in it would never finish")]
    NoUsableHeat { cooker: &'static str },
}

/// One food category's tracking state. An item sits in exactly one of
/// `planned`, the cooker (tracked through `in_progress`), or `plated` —
/// unless it burned its way into the kitchen-wide garbage instead.
#[derive(Debug)]
struct Category {
    kind: FoodKind,
    cooker: usize,
    planned: Vec<Cookable>,
    in_progress: Vec<Uuid>,
    plated: Vec<Cookable>,
}

impl Category {
    fn new(kind: FoodKind, cooker: usize, planned: Vec<Cookable>) -> Self {
        Self {
            kind,
            cooker,
            planned,
            in_progress: Vec::new(),
            plated: Vec::new(),
        }
    }

    fn is_active(&self) -> bool {
        !self.planned.is_empty() || !self.in_progress.is_empty()
    }
}

pub struct Kitchen {
    cookers: Vec<Cooker>,
    categories: Vec<Category>,
    actives: Vec<usize>,
    garbage: Vec<Cookable>,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for Kitchen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kitchen")
            .field("categories", &self.categories)
            .field("actives", &self.actives)
            .field("garbage", &self.garbage)
            .finish_non_exhaustive()
    }
}

const PAN: usize = 0;
const TOASTER: usize = 1;

impl Kitchen {
    pub fn new(menu: Menu, sink: Arc<dyn EventSink>) -> Result<Self, KitchenError> {
        let cookers = vec![
            Cooker::frying_pan(
                menu.pan_capacity,
                menu.energy,
                menu.load,
                Arc::clone(&sink),
            ),
            Cooker::toaster(
                menu.toaster_capacity,
                menu.energy,
                menu.load,
                Arc::clone(&sink),
            ),
        ];

        let categories = vec![
            Category::new(
                FoodKind::Egg,
                PAN,
                (0..menu.eggs).map(|_| Cookable::raw(FoodKind::Egg)).collect(),
            ),
            Category::new(
                FoodKind::Bacon,
                PAN,
                (0..menu.bacon)
                    .map(|_| Cookable::raw(FoodKind::Bacon))
                    .collect(),
            ),
            Category::new(
                FoodKind::Bread,
                TOASTER,
                (0..menu.bread)
                    .map(|_| Cookable::precooked(FoodKind::Bread))
                    .collect(),
            ),
        ];

        for category in &categories {
            let cooker = &cookers[category.cooker];
            if category.planned.len() > cooker.capacity() {
                return Err(KitchenError::BatchExceedsCapacity {
                    kind: category.kind,
                    count: category.planned.len(),
                    cooker: cooker.name(),
                    capacity: cooker.capacity(),
                });
            }
            if !category.planned.is_empty() && !cooker.energy().usable() {
                return Err(KitchenError::NoUsableHeat {
                    cooker: cooker.name(),
                });
            }
        }

        let actives = categories
            .iter()
            .enumerate()
            .filter(|(_, category)| category.is_active())
            .map(|(index, _)| index)
            .collect();

        Ok(Self {
            cookers,
            categories,
            actives,
            garbage: Vec::new(),
            sink,
        })
    }

    /// Drive the loop to completion and report what ended up where.
    pub fn run(mut self) -> BreakfastReport {
        task::block_on(self.cook());
        self.report()
    }

    async fn cook(&mut self) {
        while !self.actives.is_empty() {
            self.sink.emit(&KitchenEvent::TickSnapshot {
                planned: self.categories.iter().map(|c| c.planned.len()).sum(),
                cooking: self.categories.iter().map(|c| c.in_progress.len()).sum(),
                plated: self.categories.iter().map(|c| c.plated.len()).sum(),
                trashed: self.garbage.len(),
            });

            self.admission_phase();

            let events = self.cook_phase().await;
            for event in events {
                self.apply(event);
            }

            self.purge_garbage();

            let categories = &self.categories;
            self.actives.retain(|&index| categories[index].is_active());
        }
    }

    /// Move every planned batch that fits into its designated cooker, whole
    /// batches only. A batch that does not fit waits untouched.
    fn admission_phase(&mut self) {
        let actives = self.actives.clone();
        for index in actives {
            let category = &mut self.categories[index];
            if category.planned.is_empty() {
                continue;
            }
            let cooker = &mut self.cookers[category.cooker];
            if category.planned.len() > cooker.space() {
                self.sink.emit(&KitchenEvent::AwaitingSpace {
                    cooker: cooker.summary(),
                    kind: category.kind,
                    queued: category.planned.len(),
                    used: cooker.len(),
                    capacity: cooker.capacity(),
                });
                continue;
            }
            self.sink.emit(&KitchenEvent::SpaceAvailable {
                cooker: cooker.summary(),
                space: cooker.space(),
                count: category.planned.len(),
            });
            let batch = mem::take(&mut category.planned);
            let ids: Vec<Uuid> = batch.iter().map(Cookable::id).collect();
            match cooker.admit(batch) {
                Ok(()) => category.in_progress.extend(ids),
                // Absorbed here: the batch simply waits for a later turn.
                Err(rejected) => category.planned = rejected.batch,
            }
        }
    }

    /// Tick every non-empty cooker once, concurrently across cookers.
    async fn cook_phase(&mut self) -> Vec<CookEvent> {
        for cooker in &self.cookers {
            if cooker.is_empty() {
                self.sink.emit(&KitchenEvent::CookerIdle {
                    cooker: cooker.summary(),
                });
            }
        }
        let ticks = self
            .cookers
            .iter_mut()
            .filter(|cooker| !cooker.is_empty())
            .map(|cooker| cooker.tick(1));
        join_all(ticks).await.into_iter().flatten().collect()
    }

    /// Single-threaded bookkeeping for one transition.
    fn apply(&mut self, event: CookEvent) {
        match event.notice {
            Notice::Cooked => self.move_to_plate(event.item),
            Notice::Burned => match event.item.kind {
                // Burning is how bread becomes toast.
                FoodKind::Bread => self.move_to_plate(event.item),
                FoodKind::Egg | FoodKind::Bacon => self.trash(event.item),
            },
            Notice::Done => self.finish_cooking(event.item),
            Notice::Cooking | Notice::Frozen => {}
        }
    }

    /// Pull the item out of its cooker and its in-progress set, wherever it
    /// still is.
    fn take_out(&mut self, item: ItemRef) -> Option<Cookable> {
        let index = self
            .categories
            .iter()
            .position(|category| category.kind == item.kind)
            .expect("every food kind has a category");
        let cooker = self.categories[index].cooker;
        let taken = self.cookers[cooker].evict(item.id);
        self.categories[index]
            .in_progress
            .retain(|&id| id != item.id);
        taken
    }

    fn move_to_plate(&mut self, item: ItemRef) {
        if let Some(cooked) = self.take_out(item) {
            self.sink.emit(&KitchenEvent::Plated {
                item: ItemRef::of(&cooked),
            });
            let category = self
                .categories
                .iter_mut()
                .find(|category| category.kind == item.kind)
                .expect("every food kind has a category");
            category.plated.push(cooked);
        }
    }

    fn trash(&mut self, item: ItemRef) {
        if let Some(burned) = self.take_out(item) {
            self.sink.emit(&KitchenEvent::Trashed {
                item: ItemRef::of(&burned),
            });
            self.garbage.push(burned);
        }
        self.purge_garbage();
    }

    /// Generic completion: the item leaves its cooker and queue no matter
    /// which transition got it there. A no-op when bookkeeping already ran.
    fn finish_cooking(&mut self, item: ItemRef) {
        let _ = self.take_out(item);
    }

    /// Sweep every discarded item out of the cookers and queues. Removals of
    /// already-absent items are no-ops.
    fn purge_garbage(&mut self) {
        let ids: Vec<Uuid> = self.garbage.iter().map(Cookable::id).collect();
        for id in ids {
            for cooker in &mut self.cookers {
                cooker.purge(id);
            }
            for category in &mut self.categories {
                category.in_progress.retain(|&tracked| tracked != id);
                category.planned.retain(|item| item.id() != id);
            }
        }
    }

    fn report(self) -> BreakfastReport {
        let mut plated = BTreeMap::new();
        for category in &self.categories {
            plated.insert(category.kind, category.plated.len());
        }
        BreakfastReport {
            plated,
            wasted: self.garbage.iter().map(ItemRef::of).collect(),
        }
    }
}

/// What made it to the table, and what did not.
#[derive(Clone, Debug)]
pub struct BreakfastReport {
    plated: BTreeMap<FoodKind, usize>,
    wasted: Vec<ItemRef>,
}

impl BreakfastReport {
    pub fn plated(&self, kind: FoodKind) -> usize {
        self.plated.get(&kind).copied().unwrap_or(0)
    }

    pub fn plated_total(&self) -> usize {
        self.plated.values().sum()
    }

    /// Discarded items in the order they were thrown away.
    pub fn wasted(&self) -> &[ItemRef] {
        &self.wasted
    }
}

impl Display for BreakfastReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Breakfast is ready! Breakfast consists of {} slices of toast, {} eggs, and {} slices of bacon.",
            self.plated(FoodKind::Bread),
            self.plated(FoodKind::Egg),
            self.plated(FoodKind::Bacon),
        )?;
        write!(f, "We wasted {} items:", self.wasted.len())?;
        for item in &self.wasted {
            write!(f, "\n   - {} {} {}", item.kind, item.id, item.status)?;
        }
        Ok(())
    }
}
