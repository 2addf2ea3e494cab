use crate::app::{Look, Vec2};

use super::kind::{idle, ActorType, RunFn};

/// Columnar storage for one actor group. Every column has the same fixed
/// length; boxed slices keep the capacity from ever growing after creation.
///
/// Only `active` is guarded: toggling it must go through the owning
/// [`ActorGroup`](super::ActorGroup) so the active range stays sound. The
/// remaining columns are plain data that behaviors read and write by index.
/// Their values are stale once a slot is inactive and get overwritten on the
/// next activation.
pub struct ActorPool<C> {
    active: Box<[bool]>,
    pub frame_count: Box<[u32]>,
    pub x: Box<[f32]>,
    pub y: Box<[f32]>,
    pub vx: Box<[f32]>,
    pub vy: Box<[f32]>,
    pub rotation_angle: Box<[f32]>,
    pub scale_factor: Box<[f32]>,
    pub look: Box<[Look]>,
    pub damaged_look: Box<[Option<Look>]>,
    pub run: Box<[RunFn<C>]>,
    pub collision_distance: Box<[f32]>,
    pub life: Box<[i32]>,
    pub damaged_remaining_count: Box<[u32]>,
    pub anchor_x: Box<[f32]>,
    pub anchor_y: Box<[f32]>,
    pub anchor_angle: Box<[f32]>,
}

impl<C> ActorPool<C> {
    pub fn new(capacity: usize) -> Self {
        Self {
            active: vec![false; capacity].into_boxed_slice(),
            frame_count: vec![0; capacity].into_boxed_slice(),
            x: vec![0.0; capacity].into_boxed_slice(),
            y: vec![0.0; capacity].into_boxed_slice(),
            vx: vec![0.0; capacity].into_boxed_slice(),
            vy: vec![0.0; capacity].into_boxed_slice(),
            rotation_angle: vec![0.0; capacity].into_boxed_slice(),
            scale_factor: vec![1.0; capacity].into_boxed_slice(),
            look: vec![Look::Blank; capacity].into_boxed_slice(),
            damaged_look: vec![None; capacity].into_boxed_slice(),
            run: vec![idle::<C> as RunFn<C>; capacity].into_boxed_slice(),
            collision_distance: vec![0.0; capacity].into_boxed_slice(),
            life: vec![0; capacity].into_boxed_slice(),
            damaged_remaining_count: vec![0; capacity].into_boxed_slice(),
            anchor_x: vec![0.0; capacity].into_boxed_slice(),
            anchor_y: vec![0.0; capacity].into_boxed_slice(),
            anchor_angle: vec![0.0; capacity].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active[index]
    }

    pub fn active(&self) -> &[bool] {
        &self.active
    }

    pub fn position(&self, index: usize) -> Vec2 {
        Vec2 {
            x: self.x[index],
            y: self.y[index],
        }
    }

    pub(crate) fn set_active(&mut self, index: usize, active: bool) {
        self.active[index] = active;
    }

    /// Overwrites every field of `index` from `kind` and the spawn kinematics.
    pub(crate) fn assign(
        &mut self,
        index: usize,
        position: Vec2,
        velocity: Vec2,
        angle: f32,
        kind: &ActorType<C>,
    ) {
        self.active[index] = true;
        self.x[index] = position.x;
        self.y[index] = position.y;
        self.vx[index] = velocity.x;
        self.vy[index] = velocity.y;
        self.rotation_angle[index] = angle;
        self.scale_factor[index] = 1.0;
        self.run[index] = kind.run;
        self.look[index] = kind.look;
        self.damaged_look[index] = kind.damaged_look;
        self.collision_distance[index] = kind.collision_distance;
        self.life[index] = kind.max_life;
        self.frame_count[index] = 0;
        self.damaged_remaining_count[index] = 0;
        self.anchor_x[index] = position.x;
        self.anchor_y[index] = position.y;
        self.anchor_angle[index] = angle;
    }

    pub(crate) fn clear_slot(&mut self, index: usize) {
        self.active[index] = false;
        self.run[index] = idle::<C>;
        self.look[index] = Look::Blank;
    }
}
