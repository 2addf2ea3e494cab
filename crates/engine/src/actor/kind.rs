use std::fmt;

use crate::app::Look;

use super::ActorGroup;

/// Per-frame behavior of one actor. Receives the whole group so a behavior can
/// rewrite its own columns or kill itself, plus the caller's frame context.
pub type RunFn<C> = fn(&mut ActorGroup<C>, usize, &mut C);

/// Behavior used for slots that have never been assigned or were reset.
pub fn idle<C>(_group: &mut ActorGroup<C>, _index: usize, _context: &mut C) {}

/// Immutable template copied into a slot at activation time.
pub struct ActorType<C> {
    pub look: Look,
    /// Shown on alternating frame pairs while the damaged window is open.
    pub damaged_look: Option<Look>,
    pub run: RunFn<C>,
    /// Half-width of the square collision proxy.
    pub collision_distance: f32,
    /// Starting life. Zero means damage is never tracked for this type.
    pub max_life: i32,
}

impl<C> ActorType<C> {
    pub fn new(look: Look, collision_distance: f32, max_life: i32) -> Self {
        Self {
            look,
            damaged_look: None,
            run: idle::<C>,
            collision_distance,
            max_life,
        }
    }

    pub fn with_run(mut self, run: RunFn<C>) -> Self {
        self.run = run;
        self
    }

    pub fn with_damaged_look(mut self, damaged_look: Look) -> Self {
        self.damaged_look = Some(damaged_look);
        self
    }
}

impl<C> Clone for ActorType<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for ActorType<C> {}

impl<C> fmt::Debug for ActorType<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorType")
            .field("look", &self.look)
            .field("damaged_look", &self.damaged_look)
            .field("collision_distance", &self.collision_distance)
            .field("max_life", &self.max_life)
            .finish_non_exhaustive()
    }
}
