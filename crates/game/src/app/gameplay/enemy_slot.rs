use rand::Rng;
use shmup_engine::{LogicalRegion, Vec2};
use tracing::debug;

pub(crate) const SLOT_COUNT: usize = 3;
const DEFAULT_SPAWN_CHANCE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotState {
    Absent,
    Approaching,
    /// Holds the enemy pool index occupying the slot.
    Active(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EnemySlot {
    pub(crate) position: Vec2,
    pub(crate) state: SlotState,
}

/// Set of slot indices, small enough to pass around by value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SlotMask(u8);

impl SlotMask {
    pub(crate) fn insert(&mut self, slot: usize) {
        self.0 |= 1 << slot;
    }

    pub(crate) fn contains(self, slot: usize) -> bool {
        self.0 & (1 << slot) != 0
    }

    #[cfg(test)]
    pub(crate) fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[cfg(test)]
    pub(crate) fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub(crate) fn iter(self) -> impl Iterator<Item = usize> {
        (0..SLOT_COUNT).filter(move |slot| self.contains(*slot))
    }
}

/// Three fixed encounter positions, each cycling
/// absent -> approaching -> active -> absent.
#[derive(Debug, Clone)]
pub(crate) struct EncounterController {
    slots: [EnemySlot; SLOT_COUNT],
    spawn_chance: f64,
}

impl EncounterController {
    pub(crate) fn new(region: LogicalRegion) -> Self {
        let at = |x: f32, y: f32| EnemySlot {
            position: Vec2::new(x * region.width, y * region.height),
            state: SlotState::Absent,
        };
        Self {
            slots: [at(0.25, 0.25), at(0.5, 0.15), at(0.75, 0.25)],
            spawn_chance: DEFAULT_SPAWN_CHANCE,
        }
    }

    /// Per-frame chance that an absent slot starts approaching.
    #[cfg(test)]
    pub(crate) fn with_spawn_chance(mut self, spawn_chance: f64) -> Self {
        self.spawn_chance = spawn_chance.clamp(0.0, 1.0);
        self
    }

    #[cfg(test)]
    pub(crate) fn slots(&self) -> &[EnemySlot] {
        &self.slots
    }

    pub(crate) fn slot(&self, slot: usize) -> EnemySlot {
        self.slots[slot]
    }

    /// Every slot starts approaching; the caller schedules each appearance.
    pub(crate) fn reset(&mut self) -> SlotMask {
        let mut approaching = SlotMask::default();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            slot.state = SlotState::Approaching;
            approaching.insert(index);
        }
        approaching
    }

    /// Frees active slots whose enemy is gone. Must run before any pending
    /// appearance claims an enemy index in the same frame, otherwise a
    /// recycled index would keep the old slot bound. Returns the freed slots.
    pub(crate) fn release_vacated(&mut self, enemy_is_active: impl Fn(usize) -> bool) -> SlotMask {
        let mut freed = SlotMask::default();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let SlotState::Active(enemy) = slot.state {
                if !enemy_is_active(enemy) {
                    debug!(slot = index, enemy, "enemy_slot_freed");
                    slot.state = SlotState::Absent;
                    freed.insert(index);
                }
            }
        }
        freed
    }

    /// Rolls every absent slot except those freed this frame, which wait one
    /// frame before rolling. Returns the slots that began approaching.
    pub(crate) fn roll_absent(&mut self, freed: SlotMask, rng: &mut impl Rng) -> SlotMask {
        let mut approaching = SlotMask::default();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.state != SlotState::Absent || freed.contains(index) {
                continue;
            }
            if rng.gen_bool(self.spawn_chance) {
                slot.state = SlotState::Approaching;
                approaching.insert(index);
            }
        }
        approaching
    }

    /// Ends an approach. With no enemy the slot goes back to absent so it can
    /// roll again.
    pub(crate) fn complete_approach(&mut self, slot: usize, enemy: Option<usize>) {
        let state = &mut self.slots[slot].state;
        if *state != SlotState::Approaching {
            return;
        }
        *state = match enemy {
            Some(enemy) => SlotState::Active(enemy),
            None => SlotState::Absent,
        };
    }
}
