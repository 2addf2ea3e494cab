use std::f32::consts::{FRAC_PI_2, TAU};

use rand::seq::SliceRandom;
use rand::Rng;
use shmup_engine::{GlyphShape, Look, RunFn, Sprite, SpriteAtlas};

use super::game_core::{ActorContext, Group, Kind};

const PLAYER_GLYPH: (char, u8, bool) = ('参', 0, false);
const BULLET_GLYPH: (char, u8, bool) = ('多', 3, false);

/// Enemy glyphs with their quarter turns and mirror flag. Particles reuse the
/// same shapes.
const ENEMY_GLYPHS: [(char, u8, bool); 39] = [
    ('欠', 0, false),
    ('洞', 0, true),
    ('鯵', 3, false),
    ('娃', 0, true),
    ('辣', 1, true),
    ('酔', 0, false),
    ('彫', 3, false),
    ('委', 2, true),
    ('綾', 3, false),
    ('儒', 0, true),
    ('俺', 0, true),
    ('喪', 0, true),
    ('沈', 0, true),
    ('演', 1, false),
    ('晩', 2, false),
    ('携', 3, false),
    ('詠', 0, true),
    ('筆', 0, true),
    ('筑', 0, true),
    ('苑', 2, true),
    ('摘', 1, false),
    ('描', 2, true),
    ('算', 2, true),
    ('輝', 1, false),
    ('郷', 1, false),
    ('解', 2, true),
    ('鑓', 2, true),
    ('簸', 3, true),
    ('讐', 2, true),
    ('濯', 0, true),
    ('鋳', 0, true),
    ('突', 2, true),
    ('探', 2, true),
    ('邪', 3, false),
    ('淑', 1, true),
    ('擁', 1, false),
    ('桟', 3, true),
    ('呑', 0, true),
    ('桑', 0, true),
];

const PLAYER_SIZE: u32 = 100;
const PLAYER_COLOR: [u8; 4] = [0, 64, 0, 255];
const PLAYER_COLLISION_DISTANCE: f32 = 20.0;
pub(crate) const PLAYER_MAX_LIFE: i32 = 3;
const PLAYER_SPEED: f32 = 10.0;
const PLAYER_SCREEN_MARGIN: f32 = 30.0;
const PLAYER_GUN_OFFSETS: [(f32, f32); 6] = [
    (-45.0, 0.0),
    (0.0, -20.0),
    (45.0, 0.0),
    (-45.0, -30.0),
    (0.0, -50.0),
    (45.0, -30.0),
];
const PLAYER_BULLET_SPEED: f32 = 70.0;

const BULLET_SIZE: u32 = 40;
const PLAYER_BULLET_COLOR: [u8; 4] = [128, 144, 128, 255];
const PLAYER_BULLET_COLLISION_DISTANCE: f32 = 15.0;
const ENEMY_BULLET_COLOR: [u8; 4] = [0, 0, 0, 255];
const ENEMY_BULLET_COLLISION_DISTANCE: f32 = 5.0;

const ENEMY_SIZE: u32 = 160;
const ENEMY_COLOR: [u8; 4] = [32, 0, 0, 255];
const ENEMY_DAMAGED_COLOR: [u8; 4] = [192, 0, 0, 255];
const ENEMY_COLLISION_DISTANCE: f32 = 70.0;
pub(crate) const ENEMY_MAX_LIFE: i32 = 200;

const PARTICLE_SIZE: u32 = 32;
const PARTICLE_COLOR: [u8; 4] = [160, 156, 152, 255];
const PARTICLE_LIFETIME: u32 = 45;
pub(crate) const APPEARANCE_DURATION: u32 = 60;
const APPEARANCE_RADIUS: f32 = 100.0;

const ENEMY_BEHAVIORS: [RunFn<ActorContext>; 6] = [
    run_sniper,
    run_sweeper,
    run_spinner,
    run_ring_burster,
    run_scatterer,
    run_twin_streamer,
];

/// Every actor type the game uses. Built once per scene load; looks come from
/// whatever `make_look` returns so tests can skip rasterizing glyphs.
#[derive(Debug, Clone)]
pub(crate) struct ActorKinds {
    pub(crate) player: Kind,
    pub(crate) player_bullet: Kind,
    pub(crate) enemy_bullet: Kind,
    pub(crate) enemies: Vec<Kind>,
    pub(crate) particles: Vec<Kind>,
    /// Used by the HUD for the remaining lives row.
    pub(crate) player_look: Look,
}

impl ActorKinds {
    pub(crate) fn build(mut make_look: impl FnMut(GlyphShape, u32, [u8; 4]) -> Look) -> Self {
        let player_look = make_look(glyph_shape(PLAYER_GLYPH), PLAYER_SIZE, PLAYER_COLOR);
        let player = Kind::new(player_look, PLAYER_COLLISION_DISTANCE, PLAYER_MAX_LIFE)
            .with_run(run_player)
            .with_damaged_look(Look::Blank);

        let player_bullet = Kind::new(
            make_look(glyph_shape(BULLET_GLYPH), BULLET_SIZE, PLAYER_BULLET_COLOR),
            PLAYER_BULLET_COLLISION_DISTANCE,
            1,
        );
        let enemy_bullet = Kind::new(
            make_look(glyph_shape(BULLET_GLYPH), BULLET_SIZE, ENEMY_BULLET_COLOR),
            ENEMY_BULLET_COLLISION_DISTANCE,
            1,
        );

        let enemies = ENEMY_GLYPHS
            .iter()
            .enumerate()
            .map(|(index, glyph)| {
                let shape = glyph_shape(*glyph);
                Kind::new(
                    make_look(shape, ENEMY_SIZE, ENEMY_COLOR),
                    ENEMY_COLLISION_DISTANCE,
                    ENEMY_MAX_LIFE,
                )
                .with_damaged_look(make_look(shape, ENEMY_SIZE, ENEMY_DAMAGED_COLOR))
                .with_run(ENEMY_BEHAVIORS[index % ENEMY_BEHAVIORS.len()])
            })
            .collect();

        let particles = ENEMY_GLYPHS
            .iter()
            .map(|glyph| {
                Kind::new(
                    make_look(glyph_shape(*glyph), PARTICLE_SIZE, PARTICLE_COLOR),
                    0.0,
                    0,
                )
                .with_run(run_particle)
            })
            .collect();

        Self {
            player,
            player_bullet,
            enemy_bullet,
            enemies,
            particles,
            player_look,
        }
    }

    /// Rasterizes every glyph into `atlas`.
    pub(crate) fn with_atlas(atlas: &mut SpriteAtlas) -> Self {
        Self::build(|shape, size, color| Look::Sprite(atlas.add(Sprite::glyph(shape, size, color))))
    }

    pub(crate) fn random_enemy(&self, rng: &mut impl Rng) -> Option<Kind> {
        self.enemies.choose(rng).copied()
    }

    pub(crate) fn random_particle(&self, rng: &mut impl Rng) -> Option<Kind> {
        self.particles.choose(rng).copied()
    }
}

fn glyph_shape((character, quarter_turns, flip): (char, u8, bool)) -> GlyphShape {
    GlyphShape {
        code_point: u32::from(character),
        quarter_turns,
        flip,
    }
}

fn ease_in_quad(t: f32) -> f32 {
    t * t
}

fn run_player(group: &mut Group, index: usize, context: &mut ActorContext) {
    let pool = group.pool_mut();
    let clamped = context
        .region
        .clamp_inside(pool.position(index), PLAYER_SCREEN_MARGIN);
    pool.x[index] = clamped.x;
    pool.y[index] = clamped.y;

    let direction = context.controls.move_direction;
    pool.vx[index] = PLAYER_SPEED * direction.x;
    pool.vy[index] = PLAYER_SPEED * direction.y;

    if !context.controls.shoot_held {
        context.sound.stop_gun();
        return;
    }

    let frame = pool.frame_count[index];
    if frame % 16 == 0 || frame % 2 == 1 {
        return;
    }

    for (dx, dy) in PLAYER_GUN_OFFSETS {
        context.fire_player_bullet(
            clamped.x + dx,
            clamped.y + dy,
            PLAYER_BULLET_SPEED,
            -FRAC_PI_2,
        );
    }
    context.sound.play_gun();
}

fn aim_at_player(group: &mut Group, index: usize, context: &ActorContext) -> f32 {
    let pool = group.pool_mut();
    let direction = context.direction_to_player(pool.x[index], pool.y[index]);
    pool.rotation_angle[index] = direction;
    direction
}

fn turn_toward_player(group: &mut Group, index: usize, context: &ActorContext, rate: f32) {
    let pool = group.pool_mut();
    let direction = context.direction_to_player(pool.x[index], pool.y[index]);
    pool.rotation_angle[index] += rate * (direction - pool.rotation_angle[index]);
}

/// Random single shots at the player.
fn run_sniper(group: &mut Group, index: usize, context: &mut ActorContext) {
    let direction = aim_at_player(group, index, context);
    let pool = group.pool();
    if pool.frame_count[index] % 4 == 0 && context.rng.gen_bool(0.2) {
        let (x, y) = (pool.x[index], pool.y[index]);
        context.fire_enemy_bullet(x, y, 4.0, direction);
    }
}

/// Streams along its facing, then swings back toward the player.
fn run_sweeper(group: &mut Group, index: usize, context: &mut ActorContext) {
    let frame = group.pool().frame_count[index];
    if frame % 120 < 30 {
        if frame % 6 == 0 {
            let pool = group.pool();
            let (x, y, angle) = (pool.x[index], pool.y[index], pool.rotation_angle[index]);
            context.fire_enemy_bullet(x, y, 5.0, angle);
        }
    } else {
        turn_toward_player(group, index, context, 0.2);
    }
}

/// Rotating four-way cross during the second half of each cycle.
fn run_spinner(group: &mut Group, index: usize, context: &mut ActorContext) {
    aim_at_player(group, index, context);
    let pool = group.pool();
    let frame = pool.frame_count[index];
    if frame % 90 >= 45 && frame % 4 == 0 {
        let (x, y) = (pool.x[index], pool.y[index]);
        for arm in 0..4 {
            let angle = 0.008 * frame as f32 + arm as f32 * FRAC_PI_2;
            context.fire_enemy_bullet(x, y, 8.0, angle);
        }
    }
}

/// Ring of 24 slow shots every 90 frames.
fn run_ring_burster(group: &mut Group, index: usize, context: &mut ActorContext) {
    aim_at_player(group, index, context);
    let pool = group.pool();
    let frame = pool.frame_count[index];
    if frame % 90 == 0 {
        let (x, y) = (pool.x[index], pool.y[index]);
        for shot in 0..24 {
            let angle = shot as f32 * TAU / 24.0 + frame as f32;
            context.fire_enemy_bullet(x, y, 3.0, angle);
        }
    }
}

/// Aimed shots from jittered muzzle points.
fn run_scatterer(group: &mut Group, index: usize, context: &mut ActorContext) {
    let frame = group.pool().frame_count[index];
    if frame % 180 < 90 {
        if frame % 4 == 0 {
            let pool = group.pool();
            let x = pool.x[index] + context.rng.gen_range(-50.0..=50.0);
            let y = pool.y[index] + context.rng.gen_range(-50.0..=50.0);
            let direction = context.direction_to_player(x, y);
            context.fire_enemy_bullet(x, y, 4.0, direction);
        }
    } else {
        turn_toward_player(group, index, context, 0.1);
    }
}

/// Twin accelerating streams along its facing.
fn run_twin_streamer(group: &mut Group, index: usize, context: &mut ActorContext) {
    let frame = group.pool().frame_count[index];
    if frame % 180 < 90 {
        if frame % 4 == 0 {
            let pool = group.pool();
            let (x, y, angle) = (pool.x[index], pool.y[index], pool.rotation_angle[index]);
            let speed = 4.0 + 0.2 * (frame % 90) as f32;
            context.fire_enemy_bullet(x - 40.0, y, speed, angle);
            context.fire_enemy_bullet(x + 40.0, y, speed, angle);
        }
    } else {
        turn_toward_player(group, index, context, 0.1);
    }
}

fn run_particle(group: &mut Group, index: usize, _context: &mut ActorContext) {
    let pool = group.pool_mut();
    let frame = pool.frame_count[index];
    pool.scale_factor[index] = 1.0 - ease_in_quad(frame as f32 / PARTICLE_LIFETIME as f32);
    pool.vx[index] *= 0.9;
    pool.vy[index] *= 0.9;
    pool.vy[index] += 0.1;
    if frame > PARTICLE_LIFETIME {
        group.deactivate(index);
    }
}

/// Spirals in toward its anchor while growing, ahead of an enemy appearing
/// there.
pub(crate) fn run_appearance_particle(
    group: &mut Group,
    index: usize,
    _context: &mut ActorContext,
) {
    let pool = group.pool_mut();
    let frame = pool.frame_count[index];
    let progress = frame as f32 / APPEARANCE_DURATION as f32;
    pool.rotation_angle[index] -= 0.3;
    pool.scale_factor[index] = 5.0 * ease_in_quad(progress);

    let distance = (1.0 - progress) * APPEARANCE_RADIUS;
    let bearing = pool.anchor_angle[index] + frame as f32 * 0.1;
    pool.x[index] = pool.anchor_x[index] + distance * bearing.cos();
    pool.y[index] = pool.anchor_y[index] + distance * bearing.sin();

    if frame > APPEARANCE_DURATION {
        group.deactivate(index);
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shmup_engine::{LogicalRegion, RecordingCanvas, SpriteId, Vec2};

    use super::super::game_core::Controls;
    use super::super::sound::SoundBoard;
    use super::*;

    fn context() -> ActorContext {
        ActorContext::new(
            LogicalRegion::new(800.0, 800.0),
            StdRng::seed_from_u64(3),
            SoundBoard::new(false),
        )
    }

    fn kinds() -> ActorKinds {
        ActorKinds::build(|_, _, _| Look::Blank)
    }

    #[test]
    fn registry_matches_the_roster() {
        let kinds = kinds();
        assert_eq!(kinds.enemies.len(), 39);
        assert_eq!(kinds.particles.len(), 39);
        assert_eq!(kinds.player.max_life, 3);
        assert_eq!(kinds.player.damaged_look, Some(Look::Blank));
        assert_eq!(kinds.player_bullet.collision_distance, 15.0);
        assert_eq!(kinds.enemy_bullet.collision_distance, 5.0);
        assert!(kinds
            .enemies
            .iter()
            .all(|kind| kind.max_life == 200 && kind.collision_distance == 70.0));
        assert!(kinds.particles.iter().all(|kind| kind.max_life == 0));
    }

    #[test]
    fn enemy_behaviors_cycle_by_index() {
        let kinds = kinds();
        for (index, kind) in kinds.enemies.iter().enumerate() {
            assert_eq!(kind.run as usize, ENEMY_BEHAVIORS[index % 6] as usize);
        }
    }

    #[test]
    fn atlas_build_gives_each_glyph_and_color_its_own_sprite() {
        let mut atlas = SpriteAtlas::default();
        let kinds = ActorKinds::with_atlas(&mut atlas);

        // player, two bullets, two looks per enemy, one per particle
        assert_eq!(atlas.len(), 3 + 39 * 2 + 39);
        assert_eq!(kinds.player_look, Look::Sprite(SpriteId(0)));
        let Look::Sprite(id) = kinds.enemies[0].look else {
            panic!("enemy look should be a sprite");
        };
        assert_eq!(atlas.get(id).map(|sprite| sprite.width), Some(ENEMY_SIZE));
    }

    #[test]
    fn player_moves_with_controls_and_stays_inside_margin() {
        let mut context = context();
        let mut group = Group::new(1);
        let player = kinds().player;
        group.activate(5.0, 900.0, 0.0, 0.0, -FRAC_PI_2, &player);
        context.controls = Controls {
            move_direction: Vec2::new(1.0, 0.0),
            shoot_held: false,
        };

        run_player(&mut group, 0, &mut context);

        let pool = group.pool();
        assert_eq!(pool.position(0), Vec2::new(30.0, 769.0));
        assert_eq!(pool.vx[0], 10.0);
        assert_eq!(pool.vy[0], 0.0);
        assert!(context.pending_fire().is_empty());
    }

    #[test]
    fn player_fires_six_shots_on_even_frames_off_the_sixteen_beat() {
        let mut context = context();
        let mut group = Group::new(1);
        let player = kinds().player;
        group.activate(400.0, 700.0, 0.0, 0.0, -FRAC_PI_2, &player);
        context.controls.shoot_held = true;

        let mut shots_per_frame = Vec::new();
        for frame in 0..18 {
            group.pool_mut().frame_count[0] = frame;
            let before = context.pending_fire().len();
            run_player(&mut group, 0, &mut context);
            shots_per_frame.push(context.pending_fire().len() - before);
        }

        for (frame, shots) in shots_per_frame.iter().enumerate() {
            let expected = if frame % 16 == 0 || frame % 2 == 1 { 0 } else { 6 };
            assert_eq!(*shots, expected, "frame {frame}");
        }
        assert!(context.sound.is_playing(super::super::sound::Cue::Gun));
    }

    #[test]
    fn ring_burster_fires_twenty_four_shots_on_the_cycle() {
        let mut context = context();
        let mut group = Group::new(1);
        let enemy = kinds().enemies[3];
        group.activate(400.0, 200.0, 0.0, 0.0, FRAC_PI_2, &enemy);

        run_ring_burster(&mut group, 0, &mut context);
        assert_eq!(context.pending_fire().len(), 24);

        group.pool_mut().frame_count[0] = 1;
        run_ring_burster(&mut group, 0, &mut context);
        assert_eq!(context.pending_fire().len(), 24);
    }

    #[test]
    fn sweeper_fires_along_facing_then_turns() {
        let mut context = context();
        context.player_position = Vec2::new(400.0, 700.0);
        let mut group = Group::new(1);
        let enemy = kinds().enemies[1];
        group.activate(400.0, 200.0, 0.0, 0.0, 0.0, &enemy);

        run_sweeper(&mut group, 0, &mut context);
        let shot = context.pending_fire()[0];
        assert_eq!(shot.angle, 0.0);
        assert_eq!(shot.speed, 5.0);

        group.pool_mut().frame_count[0] = 30;
        run_sweeper(&mut group, 0, &mut context);
        let turned = group.pool().rotation_angle[0];
        assert!((turned - 0.2 * FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn twin_streamer_speeds_up_through_the_cycle() {
        let mut context = context();
        let mut group = Group::new(1);
        let enemy = kinds().enemies[5];
        group.activate(400.0, 200.0, 0.0, 0.0, FRAC_PI_2, &enemy);
        group.pool_mut().frame_count[0] = 40;

        run_twin_streamer(&mut group, 0, &mut context);

        let shots = context.pending_fire();
        assert_eq!(shots.len(), 2);
        assert_eq!(shots[0].x, 360.0);
        assert_eq!(shots[1].x, 440.0);
        assert!((shots[0].speed - 12.0).abs() < 1e-5);
    }

    #[test]
    fn particle_shrinks_slows_and_expires() {
        let mut context = context();
        let mut group = Group::new(4);
        let particle = kinds().particles[0];
        let index = group
            .fire(100.0, 100.0, 10.0, 0.0, &particle)
            .expect("slot");
        let region = context.region;
        let mut canvas = RecordingCanvas::default();

        group.step_all(&mut context, &region, &mut canvas);
        let pool = group.pool();
        assert_eq!(pool.scale_factor[index], 1.0);
        assert!((pool.x[index] - 109.0).abs() < 1e-4);
        assert!((pool.vy[index] - 0.1).abs() < 1e-6);

        for _ in 0..46 {
            group.step_all(&mut context, &region, &mut canvas);
        }
        assert!(!group.is_active(index));
    }

    #[test]
    fn appearance_particle_converges_on_its_anchor() {
        let mut context = context();
        let mut group = Group::new(1);
        let particle = kinds().particles[0];
        group.activate(0.0, 0.0, 0.0, 0.0, 0.0, &particle);
        group.override_run(0, run_appearance_particle);
        group.set_anchor(0, 200.0, 160.0, 0.0);

        run_appearance_particle(&mut group, 0, &mut context);
        assert_eq!(group.pool().position(0), Vec2::new(300.0, 160.0));
        assert_eq!(group.pool().scale_factor[0], 0.0);

        group.pool_mut().frame_count[0] = 60;
        run_appearance_particle(&mut group, 0, &mut context);
        let position = group.pool().position(0);
        assert!((position.x - 200.0).abs() < 1e-3);
        assert!((position.y - 160.0).abs() < 1e-3);
        assert!(group.is_active(0));

        group.pool_mut().frame_count[0] = 61;
        run_appearance_particle(&mut group, 0, &mut context);
        assert!(!group.is_active(0));
    }
}
