//! Doneness state machine for the things we cook.

use std::fmt::{self, Display};

use uuid::Uuid;

/// Overshoot factor past the target doneness at which an item burns.
const BURN_OVERSHOOT: f32 = 1.15;
/// Fraction of the target doneness past which an item counts as partially cooked.
const PARTIAL_FRACTION: f32 = 0.25;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum FoodKind {
    Egg,
    Bacon,
    Bread,
}

impl Display for FoodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                FoodKind::Egg => "egg",
                FoodKind::Bacon => "bacon",
                FoodKind::Bread => "bread",
            }
        )
    }
}

/// Primary cooking state. The partial-cook overlay lives next to it in
/// [`Status`] so that illegal flag combinations cannot be built.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CookState {
    Frozen,
    Raw,
    Cooking,
    Cooked,
    Burned,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Status {
    pub primary: CookState,
    pub partially_cooked: bool,
}

impl Status {
    pub fn of(primary: CookState) -> Self {
        Self {
            primary,
            partially_cooked: false,
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self.primary {
                CookState::Frozen => "frozen",
                CookState::Raw => "raw",
                CookState::Cooking => "cooking",
                CookState::Cooked => "cooked",
                CookState::Burned => "burned",
            }
        )?;
        if self.partially_cooked {
            write!(f, ", partially cooked")?;
        }
        Ok(())
    }
}

/// Transition notifications, returned from [`Cookable::advance`] in firing
/// order. `Done` never fires on its own: it chains after `Cooked` or `Burned`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Notice {
    Cooking,
    Frozen,
    Cooked,
    Burned,
    Done,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct StatusChange {
    pub old: Status,
    pub new: Status,
}

/// Outcome of one advance: how far the item moved and what it fired.
#[derive(Clone, Debug)]
pub struct Advance {
    pub applied: f32,
    pub delta_pct: f32,
    pub total_pct: f32,
    pub change: Option<StatusChange>,
    pub fired: Vec<Notice>,
}

/// One food item. Mutated only by its own [`advance`](Cookable::advance);
/// everything else just relocates it between collections.
#[derive(Clone, Debug)]
pub struct Cookable {
    id: Uuid,
    kind: FoodKind,
    doneness: f32,
    target_doneness: f32,
    status: Status,
}

impl Cookable {
    pub fn new(kind: FoodKind, status: Status, doneness: f32, target_doneness: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            doneness,
            target_doneness,
            status,
        }
    }

    /// A raw item with all of its cooking still ahead of it.
    pub fn raw(kind: FoodKind) -> Self {
        Self::new(kind, Status::of(CookState::Raw), 0.0, 1.0)
    }

    /// An item that arrives already at its target, like a slice of bread.
    pub fn precooked(kind: FoodKind) -> Self {
        Self::new(kind, Status::of(CookState::Cooked), 1.0, 1.0)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> FoodKind {
        self.kind
    }

    pub fn doneness(&self) -> f32 {
        self.doneness
    }

    pub fn target_doneness(&self) -> f32 {
        self.target_doneness
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Add `energy` to the doneness and recompute the status.
    ///
    /// The base state is picked top to bottom, first match wins; the
    /// partial-cook overlay is applied afterwards. Notices fire only when the
    /// recomputed status differs from the previous one, and a status that
    /// newly carries the overlay fires no primary notice at all.
    pub fn advance(&mut self, energy: f32) -> Advance {
        self.doneness += energy;

        let old = self.status;
        let mut status = self.status;

        if self.doneness < 0.0 {
            status = Status::of(CookState::Frozen);
        } else if old.primary != CookState::Cooking
            && 0.0 < self.doneness
            && self.doneness < self.target_doneness
        {
            status = Status::of(CookState::Cooking);
        } else if self.doneness >= self.target_doneness {
            status = Status::of(if self.doneness < BURN_OVERSHOOT * self.target_doneness {
                CookState::Cooked
            } else {
                CookState::Burned
            });
        }

        if PARTIAL_FRACTION * self.target_doneness < self.doneness
            && self.doneness < self.target_doneness
        {
            status.partially_cooked = true;
        }

        self.status = status;

        let mut fired = Vec::new();
        if status != old && !status.partially_cooked {
            match status.primary {
                CookState::Burned => fired.extend([Notice::Burned, Notice::Done]),
                CookState::Cooked => fired.extend([Notice::Cooked, Notice::Done]),
                CookState::Cooking => fired.push(Notice::Cooking),
                CookState::Frozen => fired.push(Notice::Frozen),
                CookState::Raw => {}
            }
        }

        Advance {
            applied: energy,
            delta_pct: energy / self.target_doneness * 100.0,
            total_pct: self.doneness / self.target_doneness * 100.0,
            change: (status != old).then_some(StatusChange { old, new: status }),
            fired,
        }
    }
}
