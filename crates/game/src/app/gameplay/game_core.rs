use std::f32::consts::{FRAC_PI_2, TAU};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use shmup_engine::{scan_collisions, ActorGroup, ActorType, Canvas, LogicalRegion, RunFn, Vec2};
use tracing::trace;

use super::actor_types::ActorKinds;
use super::sound::SoundBoard;

pub(crate) type Group = ActorGroup<ActorContext>;
pub(crate) type Kind = ActorType<ActorContext>;

pub(crate) const PLAYER_CAPACITY: usize = 1;
pub(crate) const PLAYER_BULLET_CAPACITY: usize = 128;
pub(crate) const ENEMY_CAPACITY: usize = 32;
pub(crate) const ENEMY_BULLET_CAPACITY: usize = 1024;
pub(crate) const PARTICLE_CAPACITY: usize = 256;

const PLAYER_SPAWN_OFFSET_Y: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupId {
    Player,
    PlayerBullets,
    Enemies,
    EnemyBullets,
    Particles,
}

/// Particles first, so effects spawned by last frame's collisions get a full
/// frame of life before the shooters move.
const STEP_ORDER: [GroupId; 5] = [
    GroupId::Particles,
    GroupId::Player,
    GroupId::Enemies,
    GroupId::PlayerBullets,
    GroupId::EnemyBullets,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FireTarget {
    PlayerBullet,
    EnemyBullet,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FireIntent {
    pub(crate) target: FireTarget,
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) speed: f32,
    pub(crate) angle: f32,
}

/// Player controls sampled for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Controls {
    pub(crate) move_direction: Vec2,
    pub(crate) shoot_held: bool,
}

/// Everything a behavior may touch besides its own group. Shots are queued
/// and flushed into the bullet groups right after the shooting group steps,
/// which is before either bullet group runs in the same frame.
pub(crate) struct ActorContext {
    pub(crate) region: LogicalRegion,
    /// Synced from player slot 0 before every group step. Keeps the last
    /// position after the player dies.
    pub(crate) player_position: Vec2,
    pub(crate) controls: Controls,
    pub(crate) rng: StdRng,
    pub(crate) sound: SoundBoard,
    fire_queue: Vec<FireIntent>,
}

impl ActorContext {
    pub(crate) fn new(region: LogicalRegion, rng: StdRng, sound: SoundBoard) -> Self {
        Self {
            region,
            player_position: Vec2::ZERO,
            controls: Controls::default(),
            rng,
            sound,
            fire_queue: Vec::with_capacity(64),
        }
    }

    pub(crate) fn direction_to_player(&self, x: f32, y: f32) -> f32 {
        direction_between(Vec2::new(x, y), self.player_position)
    }

    pub(crate) fn fire_player_bullet(&mut self, x: f32, y: f32, speed: f32, angle: f32) {
        self.queue_fire(FireTarget::PlayerBullet, x, y, speed, angle);
    }

    pub(crate) fn fire_enemy_bullet(&mut self, x: f32, y: f32, speed: f32, angle: f32) {
        self.queue_fire(FireTarget::EnemyBullet, x, y, speed, angle);
    }

    #[cfg(test)]
    pub(crate) fn pending_fire(&self) -> &[FireIntent] {
        &self.fire_queue
    }

    fn queue_fire(&mut self, target: FireTarget, x: f32, y: f32, speed: f32, angle: f32) {
        self.fire_queue.push(FireIntent {
            target,
            x,
            y,
            speed,
            angle,
        });
    }
}

/// Heading from `from` toward `to`. A coincident query answers 0, which is
/// also what `atan2(0, 0)` gives; the branch keeps that explicit.
pub(crate) fn direction_between(from: Vec2, to: Vec2) -> f32 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    dy.atan2(dx)
}

/// One overlapping pair reported by a collision pass, with the particle group
/// and frame context borrowed alongside so handlers can spawn effects.
pub(crate) struct Impact<'a> {
    pub(crate) hitter: &'a mut Group,
    pub(crate) hitter_index: usize,
    pub(crate) target: &'a mut Group,
    pub(crate) target_index: usize,
    pub(crate) particles: &'a mut Group,
    pub(crate) particle_kinds: &'a [Kind],
    pub(crate) context: &'a mut ActorContext,
}

/// Random burst of `count` particles around (`x`, `y`). Spawns past the
/// particle capacity are dropped.
#[allow(clippy::too_many_arguments)]
pub(crate) fn fire_particles(
    particles: &mut Group,
    kinds: &[Kind],
    rng: &mut StdRng,
    x: f32,
    y: f32,
    count: usize,
    max_position_offset: f32,
    max_speed: f32,
) {
    for _ in 0..count {
        let Some(kind) = kinds.choose(rng) else {
            return;
        };
        let px = x + rng.gen_range(-max_position_offset..=max_position_offset);
        let py = y + rng.gen_range(-max_position_offset..=max_position_offset);
        let speed = rng.gen_range(5.0..=max_speed.max(5.0));
        let angle = rng.gen_range(0.0..TAU);
        if particles.fire(px, py, speed, angle, kind).is_none() {
            trace!(count, "particle_pool_saturated");
            return;
        }
    }
}

pub(crate) fn kill_player_slot(player: &mut Group, index: usize, context: &mut ActorContext) {
    player.deactivate(index);
    context.sound.stop_gun();
}

/// The five actor groups of one game instance and the frame context their
/// behaviors share.
pub(crate) struct GameCore {
    region: LogicalRegion,
    kinds: ActorKinds,
    player: Group,
    player_bullets: Group,
    enemies: Group,
    enemy_bullets: Group,
    particles: Group,
    context: ActorContext,
    frame_count: u64,
}

impl GameCore {
    pub(crate) fn new(
        region: LogicalRegion,
        kinds: ActorKinds,
        rng: StdRng,
        sound: SoundBoard,
    ) -> Self {
        Self {
            region,
            kinds,
            player: Group::new(PLAYER_CAPACITY),
            player_bullets: Group::new(PLAYER_BULLET_CAPACITY),
            enemies: Group::new(ENEMY_CAPACITY),
            enemy_bullets: Group::new(ENEMY_BULLET_CAPACITY),
            particles: Group::new(PARTICLE_CAPACITY),
            context: ActorContext::new(region, rng, sound),
            frame_count: 0,
        }
    }

    pub(crate) fn region(&self) -> LogicalRegion {
        self.region
    }

    pub(crate) fn kinds(&self) -> &ActorKinds {
        &self.kinds
    }

    #[cfg(test)]
    pub(crate) fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[cfg(test)]
    pub(crate) fn context(&self) -> &ActorContext {
        &self.context
    }

    pub(crate) fn context_mut(&mut self) -> &mut ActorContext {
        &mut self.context
    }

    pub(crate) fn set_controls(&mut self, controls: Controls) {
        self.context.controls = controls;
    }

    #[cfg(test)]
    pub(crate) fn player(&self) -> &Group {
        &self.player
    }

    #[cfg(test)]
    pub(crate) fn player_mut(&mut self) -> &mut Group {
        &mut self.player
    }

    #[cfg(test)]
    pub(crate) fn player_bullets(&self) -> &Group {
        &self.player_bullets
    }

    #[cfg(test)]
    pub(crate) fn enemies(&self) -> &Group {
        &self.enemies
    }

    #[cfg(test)]
    pub(crate) fn enemies_mut(&mut self) -> &mut Group {
        &mut self.enemies
    }

    #[cfg(test)]
    pub(crate) fn enemy_bullets(&self) -> &Group {
        &self.enemy_bullets
    }

    #[cfg(test)]
    pub(crate) fn particles(&self) -> &Group {
        &self.particles
    }

    pub(crate) fn random_enemy_kind(&mut self) -> Option<Kind> {
        self.kinds.random_enemy(&mut self.context.rng)
    }

    pub(crate) fn random_particle_kind(&mut self) -> Option<Kind> {
        self.kinds.random_particle(&mut self.context.rng)
    }

    pub(crate) fn active_actor_count(&self) -> usize {
        [
            &self.player,
            &self.player_bullets,
            &self.enemies,
            &self.enemy_bullets,
            &self.particles,
        ]
        .iter()
        .map(|group| group.active_count())
        .sum()
    }

    pub(crate) fn create_player(&mut self) -> Option<usize> {
        let player = self.kinds.player;
        self.player.activate(
            0.5 * self.region.width,
            self.region.height - PLAYER_SPAWN_OFFSET_Y,
            0.0,
            0.0,
            -FRAC_PI_2,
            &player,
        )
    }

    pub(crate) fn kill_player(&mut self) {
        kill_player_slot(&mut self.player, 0, &mut self.context);
    }

    pub(crate) fn player_is_active(&self) -> bool {
        self.player.is_active(0)
    }

    pub(crate) fn player_life(&self) -> i32 {
        if self.player_is_active() {
            self.player.pool().life[0]
        } else {
            0
        }
    }

    #[cfg(test)]
    pub(crate) fn direction_to_player(&self, x: f32, y: f32) -> f32 {
        direction_between(Vec2::new(x, y), self.player.pool().position(0))
    }

    pub(crate) fn fire_player_bullet(
        &mut self,
        x: f32,
        y: f32,
        speed: f32,
        angle: f32,
        kind: &Kind,
    ) -> Option<usize> {
        self.player_bullets.fire(x, y, speed, angle, kind)
    }

    pub(crate) fn fire_enemy_bullet(
        &mut self,
        x: f32,
        y: f32,
        speed: f32,
        angle: f32,
        kind: &Kind,
    ) -> Option<usize> {
        self.enemy_bullets.fire(x, y, speed, angle, kind)
    }

    /// Places an enemy facing down the screen.
    pub(crate) fn use_enemy(&mut self, x: f32, y: f32, kind: &Kind) -> Option<usize> {
        self.enemies.activate(x, y, 0.0, 0.0, FRAC_PI_2, kind)
    }

    #[cfg(test)]
    pub(crate) fn kill_enemy(&mut self, index: usize) -> bool {
        self.enemies.deactivate(index)
    }

    pub(crate) fn enemy_is_active(&self, index: usize) -> bool {
        self.enemies.is_active(index)
    }

    pub(crate) fn enemy_count(&self) -> usize {
        self.enemies.active_count()
    }

    pub(crate) fn use_particle(&mut self, x: f32, y: f32, kind: &Kind) -> Option<usize> {
        self.particles.activate(x, y, 0.0, 0.0, 0.0, kind)
    }

    #[cfg(test)]
    pub(crate) fn fire_particle(
        &mut self,
        x: f32,
        y: f32,
        speed: f32,
        angle: f32,
        kind: &Kind,
    ) -> Option<usize> {
        self.particles.fire(x, y, speed, angle, kind)
    }

    #[cfg(test)]
    pub(crate) fn kill_particle(&mut self, index: usize) -> bool {
        self.particles.deactivate(index)
    }

    pub(crate) fn override_particle_behavior(&mut self, index: usize, run: RunFn<ActorContext>) {
        self.particles.override_run(index, run);
    }

    pub(crate) fn set_particle_anchor(&mut self, index: usize, x: f32, y: f32, angle: f32) {
        self.particles.set_anchor(index, x, y, angle);
    }

    /// Random particle burst drawing from the registry's particle kinds.
    pub(crate) fn fire_particles(
        &mut self,
        x: f32,
        y: f32,
        count: usize,
        max_position_offset: f32,
        max_speed: f32,
    ) {
        fire_particles(
            &mut self.particles,
            &self.kinds.particles,
            &mut self.context.rng,
            x,
            y,
            count,
            max_position_offset,
            max_speed,
        );
    }

    /// Steps every group in the fixed order, then advances the frame counter.
    pub(crate) fn run_and_draw_all(&mut self, canvas: &mut dyn Canvas) {
        for id in STEP_ORDER {
            self.step_group(id, canvas);
        }
        self.frame_count += 1;
    }

    /// Player bullets against enemies, every frame.
    pub(crate) fn check_player_bullet_collision<F>(&mut self, mut on_hit_enemy: F)
    where
        F: FnMut(Impact<'_>),
    {
        let Self {
            kinds,
            player_bullets,
            enemies,
            particles,
            context,
            ..
        } = self;
        scan_collisions(
            player_bullets,
            enemies,
            |hitter, hitter_index, target, target_index| {
                on_hit_enemy(Impact {
                    hitter,
                    hitter_index,
                    target,
                    target_index,
                    particles: &mut *particles,
                    particle_kinds: &kinds.particles,
                    context: &mut *context,
                });
            },
        );
    }

    /// Enemy bullets against the player. Runs only on odd frames and only
    /// while the player's damaged window is closed; returns whether the scan
    /// ran at all.
    pub(crate) fn check_enemy_bullet_collision<F>(&mut self, mut on_hit_player: F) -> bool
    where
        F: FnMut(Impact<'_>),
    {
        if self.frame_count % 2 == 0 {
            return false;
        }
        if self.player.pool().damaged_remaining_count[0] > 0 {
            return false;
        }

        let Self {
            kinds,
            player,
            enemy_bullets,
            particles,
            context,
            ..
        } = self;
        scan_collisions(
            enemy_bullets,
            player,
            |hitter, hitter_index, target, target_index| {
                on_hit_player(Impact {
                    hitter,
                    hitter_index,
                    target,
                    target_index,
                    particles: &mut *particles,
                    particle_kinds: &kinds.particles,
                    context: &mut *context,
                });
            },
        );
        true
    }

    pub(crate) fn reset_all(&mut self) {
        self.frame_count = 0;
        self.context.fire_queue.clear();
        for id in STEP_ORDER {
            self.group_mut(id).reset();
        }
    }

    fn group_mut(&mut self, id: GroupId) -> &mut Group {
        match id {
            GroupId::Player => &mut self.player,
            GroupId::PlayerBullets => &mut self.player_bullets,
            GroupId::Enemies => &mut self.enemies,
            GroupId::EnemyBullets => &mut self.enemy_bullets,
            GroupId::Particles => &mut self.particles,
        }
    }

    fn step_group(&mut self, id: GroupId, canvas: &mut dyn Canvas) {
        self.context.player_position = self.player.pool().position(0);
        let region = self.region;
        let context = &mut self.context;
        match id {
            GroupId::Player => self.player.step_all(context, &region, canvas),
            GroupId::PlayerBullets => self.player_bullets.step_all(context, &region, canvas),
            GroupId::Enemies => self.enemies.step_all(context, &region, canvas),
            GroupId::EnemyBullets => self.enemy_bullets.step_all(context, &region, canvas),
            GroupId::Particles => self.particles.step_all(context, &region, canvas),
        }
        self.flush_fire_queue();
    }

    fn flush_fire_queue(&mut self) {
        let mut queue = std::mem::take(&mut self.context.fire_queue);
        let mut dropped = 0usize;
        for intent in queue.drain(..) {
            let FireIntent {
                target,
                x,
                y,
                speed,
                angle,
            } = intent;
            let fired = match target {
                FireTarget::PlayerBullet => {
                    let kind = self.kinds.player_bullet;
                    self.fire_player_bullet(x, y, speed, angle, &kind)
                }
                FireTarget::EnemyBullet => {
                    let kind = self.kinds.enemy_bullet;
                    self.fire_enemy_bullet(x, y, speed, angle, &kind)
                }
            };
            if fired.is_none() {
                dropped += 1;
            }
        }
        self.context.fire_queue = queue;
        if dropped > 0 {
            trace!(dropped, "bullet_pool_saturated");
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use shmup_engine::{Look, RecordingCanvas};

    use super::*;

    fn test_core() -> GameCore {
        GameCore::new(
            LogicalRegion::new(800.0, 800.0),
            ActorKinds::build(|_, _, _| Look::Blank),
            StdRng::seed_from_u64(11),
            SoundBoard::new(false),
        )
    }

    #[test]
    fn groups_have_fixed_capacities() {
        let core = test_core();
        assert_eq!(core.player().capacity(), PLAYER_CAPACITY);
        assert_eq!(core.player_bullets().capacity(), PLAYER_BULLET_CAPACITY);
        assert_eq!(core.enemies().capacity(), ENEMY_CAPACITY);
        assert_eq!(core.enemy_bullets().capacity(), ENEMY_BULLET_CAPACITY);
        assert_eq!(core.particles().capacity(), PARTICLE_CAPACITY);
    }

    #[test]
    fn player_spawns_bottom_center_facing_up() {
        let mut core = test_core();
        assert_eq!(core.create_player(), Some(0));

        let pool = core.player().pool();
        assert_eq!(pool.position(0), Vec2::new(400.0, 700.0));
        assert!((pool.rotation_angle[0] + FRAC_PI_2).abs() < 1e-6);
        assert_eq!(core.player_life(), 3);

        core.kill_player();
        assert_eq!(core.player_life(), 0);
        assert!(!core.player_is_active());
    }

    #[test]
    fn direction_to_player_guards_the_coincident_point() {
        let mut core = test_core();
        core.create_player();

        assert_eq!(core.direction_to_player(400.0, 700.0), 0.0);
        assert!((core.direction_to_player(400.0, 600.0) - FRAC_PI_2).abs() < 1e-6);
        assert!((core.direction_to_player(500.0, 700.0) - std::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn fire_converts_polar_velocity() {
        let mut core = test_core();
        let kind = core.kinds().enemy_bullet;
        let index = core
            .fire_enemy_bullet(100.0, 100.0, 2.0, FRAC_PI_2, &kind)
            .expect("slot");

        let pool = core.enemy_bullets().pool();
        assert!(pool.vx[index].abs() < 1e-6);
        assert!((pool.vy[index] - 2.0).abs() < 1e-6);
        assert!((pool.rotation_angle[index] - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn queued_shots_land_in_the_bullet_group_during_the_same_frame() {
        let mut core = test_core();
        core.create_player();
        core.set_controls(Controls {
            move_direction: Vec2::ZERO,
            shoot_held: true,
        });
        let mut canvas = RecordingCanvas::default();

        // frame 0 never fires, frame 2 fires six shots
        core.run_and_draw_all(&mut canvas);
        core.run_and_draw_all(&mut canvas);
        assert_eq!(core.player_bullets().active_count(), 0);
        core.run_and_draw_all(&mut canvas);

        assert_eq!(core.player_bullets().active_count(), 6);
        assert!(core.context().pending_fire().is_empty());
        assert_eq!(core.frame_count(), 3);
    }

    #[test]
    fn enemy_bullet_scan_only_runs_on_odd_frames() {
        let mut core = test_core();
        core.create_player();
        let mut calls = 0;

        assert!(!core.check_enemy_bullet_collision(|_| calls += 1));
        core.run_and_draw_all(&mut RecordingCanvas::default());
        assert!(core.check_enemy_bullet_collision(|_| calls += 1));
        assert_eq!(calls, 0);
    }

    #[test]
    fn reset_all_empties_every_group() {
        let mut core = test_core();
        core.create_player();
        let enemy = core.kinds().enemies[0];
        core.use_enemy(200.0, 200.0, &enemy);
        core.fire_particles(100.0, 100.0, 10, 5.0, 10.0);
        core.run_and_draw_all(&mut RecordingCanvas::default());

        core.reset_all();

        assert_eq!(core.active_actor_count(), 0);
        assert_eq!(core.frame_count(), 0);
        assert_eq!(core.enemies().active_range(), 0..0);
    }

    #[test]
    fn particles_can_be_fired_and_killed_directly() {
        let mut core = test_core();
        let kind = core.kinds().particles[0];
        let index = core
            .fire_particle(100.0, 100.0, 3.0, 0.0, &kind)
            .expect("slot");

        assert!(core.kill_particle(index));
        assert!(!core.kill_particle(index));
        assert_eq!(core.particles().active_count(), 0);
    }

    #[test]
    fn particle_bursts_stop_at_capacity() {
        let mut core = test_core();
        core.fire_particles(400.0, 400.0, PARTICLE_CAPACITY + 40, 30.0, 30.0);
        assert_eq!(core.particles().active_count(), PARTICLE_CAPACITY);
    }
}
