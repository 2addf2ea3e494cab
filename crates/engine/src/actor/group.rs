use std::ops::Range;

use crate::app::{Canvas, LogicalRegion, Vec2};

use super::kind::{ActorType, RunFn};
use super::pool::ActorPool;

/// Actors further than this outside the logical screen are culled.
pub const CULL_MARGIN: f32 = 100.0;

const EMPTY_START: usize = usize::MAX;

/// A fixed-capacity actor pool plus the `[start_index, end_index)` bound that
/// every active slot lies within. The bound is loose: inactive slots may sit
/// inside it, and it is only tightened when a boundary slot is killed.
pub struct ActorGroup<C> {
    pool: ActorPool<C>,
    start_index: usize,
    end_index: usize,
}

impl<C> ActorGroup<C> {
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: ActorPool::new(capacity),
            start_index: EMPTY_START,
            end_index: 0,
        }
    }

    pub fn pool(&self) -> &ActorPool<C> {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ActorPool<C> {
        &mut self.pool
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.pool.is_active(index)
    }

    /// Raw lower bound. `usize::MAX` while the group is empty.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn end_index(&self) -> usize {
        self.end_index
    }

    pub fn active_range(&self) -> Range<usize> {
        if self.start_index >= self.end_index {
            0..0
        } else {
            self.start_index..self.end_index
        }
    }

    pub fn active_count(&self) -> usize {
        self.active_range()
            .filter(|index| self.pool.is_active(*index))
            .count()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = usize> + '_ {
        self.active_range()
            .filter(move |index| self.pool.is_active(*index))
    }

    /// Claims the first inactive slot. `None` when the pool is saturated; the
    /// caller is expected to drop the spawn.
    pub fn activate(
        &mut self,
        x: f32,
        y: f32,
        vx: f32,
        vy: f32,
        angle: f32,
        kind: &ActorType<C>,
    ) -> Option<usize> {
        let index = self.pool.active().iter().position(|active| !active)?;

        self.pool
            .assign(index, Vec2 { x, y }, Vec2 { x: vx, y: vy }, angle, kind);

        if index < self.start_index {
            self.start_index = index;
        }
        if index >= self.end_index {
            self.end_index = index + 1;
        }

        Some(index)
    }

    /// Polar form of [`activate`](Self::activate); the actor faces its heading.
    pub fn fire(
        &mut self,
        x: f32,
        y: f32,
        speed: f32,
        angle: f32,
        kind: &ActorType<C>,
    ) -> Option<usize> {
        self.activate(
            x,
            y,
            speed * angle.cos(),
            speed * angle.sin(),
            angle,
            kind,
        )
    }

    /// Kills `index`. Returns `false` when it was already inactive.
    pub fn deactivate(&mut self, index: usize) -> bool {
        if !self.pool.is_active(index) {
            return false;
        }

        self.pool.set_active(index, false);

        if index == self.start_index {
            self.start_index = self
                .first_active_in(index + 1..self.end_index)
                .unwrap_or(EMPTY_START);
        }

        if index + 1 == self.end_index {
            self.end_index = self
                .last_active_in(self.start_index..index)
                .map_or(0, |last| last + 1);
        }

        true
    }

    /// Replaces the behavior of a live slot, e.g. for scripted particles.
    pub fn override_run(&mut self, index: usize, run: RunFn<C>) {
        self.pool.run[index] = run;
    }

    /// Sets the point and angle a scripted behavior works relative to.
    /// Activation defaults the anchor to the spawn position and angle.
    pub fn set_anchor(&mut self, index: usize, x: f32, y: f32, angle: f32) {
        self.pool.anchor_x[index] = x;
        self.pool.anchor_y[index] = y;
        self.pool.anchor_angle[index] = angle;
    }

    /// One frame for every live actor, in index order: run, move, cull, draw,
    /// then decay the damaged window and count the frame.
    pub fn step_all(&mut self, context: &mut C, region: &LogicalRegion, canvas: &mut dyn Canvas) {
        let start_index = self.start_index;
        let end_index = self.end_index;
        if start_index >= self.pool.capacity() {
            return;
        }

        for index in start_index..end_index {
            if !self.pool.is_active(index) {
                continue;
            }

            let run = self.pool.run[index];
            run(self, index, context);

            let pool = &mut self.pool;
            pool.x[index] += pool.vx[index];
            pool.y[index] += pool.vy[index];

            if !region.contains_with_margin(pool.position(index), CULL_MARGIN) {
                self.deactivate(index);
                continue;
            }

            let damaged = pool.damaged_remaining_count[index] > 0;
            let scale_factor = pool.scale_factor[index];
            if scale_factor > 0.0 {
                let look = match pool.damaged_look[index] {
                    Some(damaged_look) if damaged && pool.frame_count[index] % 4 < 2 => {
                        damaged_look
                    }
                    _ => pool.look[index],
                };
                canvas.draw_at(
                    look,
                    pool.x[index],
                    pool.y[index],
                    pool.rotation_angle[index],
                    scale_factor,
                );
            }

            if damaged {
                pool.damaged_remaining_count[index] -= 1;
            }
            pool.frame_count[index] += 1;
        }
    }

    pub fn reset(&mut self) {
        for index in 0..self.pool.capacity() {
            self.pool.clear_slot(index);
        }
        self.start_index = EMPTY_START;
        self.end_index = 0;
    }

    fn first_active_in(&self, range: Range<usize>) -> Option<usize> {
        range.into_iter().find(|index| self.pool.is_active(*index))
    }

    fn last_active_in(&self, range: Range<usize>) -> Option<usize> {
        range.into_iter().rev().find(|index| self.pool.is_active(*index))
    }
}

/// Square-proxy overlap: both axis distances within the summed half-widths.
pub fn proxies_overlap(a: Vec2, a_distance: f32, b: Vec2, b_distance: f32) -> bool {
    let threshold = a_distance + b_distance;
    (a.x - b.x).abs() <= threshold && (a.y - b.y).abs() <= threshold
}

/// Reports every overlapping pair of live actors between two groups.
///
/// Liveness of `group` entries is sampled once per outer iteration, so an
/// actor killed by an earlier callback keeps being tested against the rest of
/// `other` in the same scan. Callbacks must tolerate that.
pub fn scan_collisions<A, B, F>(group: &mut ActorGroup<A>, other: &mut ActorGroup<B>, mut on_collide: F)
where
    F: FnMut(&mut ActorGroup<A>, usize, &mut ActorGroup<B>, usize),
{
    for index in group.start_index..group.end_index {
        if !group.pool.is_active(index) {
            continue;
        }
        let position = group.pool.position(index);
        let distance = group.pool.collision_distance[index];

        for other_index in other.start_index..other.end_index {
            if !other.pool.is_active(other_index) {
                continue;
            }
            let other_position = other.pool.position(other_index);
            let other_distance = other.pool.collision_distance[other_index];
            if !proxies_overlap(position, distance, other_position, other_distance) {
                continue;
            }

            on_collide(group, index, other, other_index);
        }
    }
}
