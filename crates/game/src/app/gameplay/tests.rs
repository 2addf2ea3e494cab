use rand::rngs::StdRng;
use rand::SeedableRng;
use shmup_engine::{
    InputAction, InputSnapshot, LogicalRegion, Look, RecordingCanvas, Scene, SceneAssets,
    SceneCommand, SpriteId, TextAlign, Vec2,
};

use super::actor_types::ActorKinds;
use super::enemy_slot::{EncounterController, SlotState};
use super::game_core::{Controls, GameCore, ENEMY_BULLET_CAPACITY};
use super::round::{Round, RoundState};
use super::sound::{Cue, SoundBoard};
use super::{SceneOptions, ShooterScene};

fn region() -> LogicalRegion {
    LogicalRegion::new(800.0, 800.0)
}

fn round_with(kinds: ActorKinds, seed: u64, spawn_chance: f64) -> Round {
    let core = GameCore::new(
        region(),
        kinds,
        StdRng::seed_from_u64(seed),
        SoundBoard::new(false),
    );
    Round::new(
        core,
        EncounterController::new(region()).with_spawn_chance(spawn_chance),
    )
}

fn blank_round(seed: u64) -> Round {
    round_with(ActorKinds::build(|_, _, _| Look::Blank), seed, 0.0)
}

fn run_frames(round: &mut Round, frames: usize) {
    let mut canvas = RecordingCanvas::default();
    for _ in 0..frames {
        canvas.clear();
        round.run(&mut canvas);
    }
}

#[test]
fn playable_reset_spawns_player_and_schedules_every_slot() {
    let mut round = blank_round(1);
    round.reset(true);

    assert_eq!(round.state(), RoundState::Playing);
    assert_eq!(round.score(), 0);
    assert_eq!(round.core().player_life(), 3);
    assert_eq!(round.pending_appearances(), 3);
    assert_eq!(round.core().particles().active_count(), 24);
    assert!(round
        .encounters()
        .slots()
        .iter()
        .all(|slot| slot.state == SlotState::Approaching));
}

#[test]
fn enemies_arrive_after_the_appearance_delay() {
    let mut round = blank_round(2);
    round.reset(false);
    assert!(!round.core().player_is_active());

    run_frames(&mut round, 59);
    assert_eq!(round.core().enemy_count(), 0);

    run_frames(&mut round, 1);
    assert_eq!(round.core().enemy_count(), 3);
    assert_eq!(round.pending_appearances(), 0);
    for (slot, expected) in round.encounters().slots().iter().zip(0..) {
        assert_eq!(slot.state, SlotState::Active(expected));
        let enemy = round.core().enemies().pool().position(expected);
        assert_eq!(enemy, slot.position);
    }
}

#[test]
fn enemy_survives_199_hits_and_dies_on_the_200th() {
    let mut round = blank_round(3);
    let enemy_kind = round.core().kinds().enemies[0];
    let bullet_kind = round.core().kinds().player_bullet;
    let enemy = round
        .core_mut()
        .use_enemy(400.0, 300.0, &enemy_kind)
        .expect("enemy slot");

    for _ in 0..199 {
        round
            .core_mut()
            .fire_player_bullet(400.0, 300.0, 0.0, 0.0, &bullet_kind);
        run_frames(&mut round, 1);
    }
    assert!(round.core().enemy_is_active(enemy));
    assert_eq!(round.core().enemies().pool().life[enemy], 1);
    assert_eq!(round.score(), 1990);

    round
        .core_mut()
        .fire_player_bullet(400.0, 300.0, 0.0, 0.0, &bullet_kind);
    run_frames(&mut round, 1);

    assert!(!round.core().enemy_is_active(enemy));
    assert_eq!(round.score(), 10_000);
    assert_eq!(round.core().context().sound.trigger_count(Cue::Bomb), 1);
    assert_eq!(round.core().player_bullets().active_count(), 0);
}

#[test]
fn hits_open_the_enemy_damaged_window() {
    let mut round = blank_round(4);
    let enemy_kind = round.core().kinds().enemies[0];
    let bullet_kind = round.core().kinds().player_bullet;
    let enemy = round
        .core_mut()
        .use_enemy(400.0, 300.0, &enemy_kind)
        .expect("enemy slot");

    round
        .core_mut()
        .fire_player_bullet(440.0, 330.0, 0.0, 0.0, &bullet_kind);
    run_frames(&mut round, 1);

    let pool = round.core().enemies().pool();
    assert_eq!(pool.damaged_remaining_count[enemy], 2);
    assert_eq!(pool.life[enemy], 199);
}

#[test]
fn player_is_immune_while_damaged_and_on_even_frames() {
    let mut round = blank_round(5);
    round.core_mut().create_player();
    let bullet_kind = round.core().kinds().enemy_bullet;

    round
        .core_mut()
        .fire_enemy_bullet(400.0, 700.0, 0.0, 0.0, &bullet_kind);
    run_frames(&mut round, 1);
    assert_eq!(round.core().player_life(), 2);
    assert_eq!(round.core().player().pool().damaged_remaining_count[0], 180);
    assert_eq!(round.core().context().sound.trigger_count(Cue::Damage), 1);

    round
        .core_mut()
        .fire_enemy_bullet(400.0, 700.0, 0.0, 0.0, &bullet_kind);
    let mut frames_until_hit = 0;
    while round.core().player_life() == 2 && frames_until_hit < 400 {
        run_frames(&mut round, 1);
        frames_until_hit += 1;
        if frames_until_hit < 180 {
            assert_eq!(round.core().enemy_bullets().active_count(), 1);
        }
    }

    assert_eq!(round.core().player_life(), 1);
    assert!((180..=182).contains(&frames_until_hit));
    assert_eq!(round.core().frame_count() % 2, 1);
}

#[test]
fn last_life_lost_switches_to_result() {
    let mut round = blank_round(6);
    round.core_mut().create_player();
    round.core_mut().player_mut().pool_mut().life[0] = 1;
    let bullet_kind = round.core().kinds().enemy_bullet;
    round
        .core_mut()
        .fire_enemy_bullet(400.0, 700.0, 0.0, 0.0, &bullet_kind);

    let mut canvas = RecordingCanvas::default();
    round.run(&mut canvas);

    assert_eq!(round.state(), RoundState::Result);
    assert!(!round.core().player_is_active());
    assert!(!round.core().context().sound.is_playing(Cue::Gun));
    assert!(round.core().particles().active_count() > 100);
    assert!(canvas.contains_text("RESULT"));
}

#[test]
fn kill_burst_starts_at_the_bullet() {
    let mut round = blank_round(13);
    let enemy_kind = round.core().kinds().enemies[0];
    let bullet_kind = round.core().kinds().player_bullet;
    let enemy = round
        .core_mut()
        .use_enemy(400.0, 300.0, &enemy_kind)
        .expect("enemy slot");
    round.core_mut().enemies_mut().pool_mut().life[enemy] = 1;
    round
        .core_mut()
        .fire_player_bullet(470.0, 300.0, 0.0, 0.0, &bullet_kind);

    run_frames(&mut round, 1);

    assert!(!round.core().enemy_is_active(enemy));
    let particles = round.core().particles();
    assert!(particles.active_count() >= 64);
    for index in particles.iter_active() {
        let position = particles.pool().position(index);
        assert!(position.x >= 415.0, "{position:?}");
    }
}

#[test]
fn damage_burst_starts_at_the_bullet() {
    let mut round = blank_round(14);
    round.core_mut().create_player();
    let bullet_kind = round.core().kinds().enemy_bullet;
    round
        .core_mut()
        .fire_enemy_bullet(424.0, 700.0, 0.0, 0.0, &bullet_kind);

    run_frames(&mut round, 1);

    assert_eq!(round.core().player_life(), 2);
    let particles = round.core().particles();
    assert_eq!(particles.active_count(), 64);
    for index in particles.iter_active() {
        let position = particles.pool().position(index);
        assert!(position.x >= 390.0, "{position:?}");
    }
}

#[test]
fn result_screen_hides_score_corner_and_spare_lives() {
    let mut next_id = 0;
    let kinds = ActorKinds::build(|_, _, _| {
        next_id += 1;
        Look::Sprite(SpriteId(next_id))
    });
    let player_look = kinds.player_look;
    let mut round = round_with(kinds, 15, 0.0);
    round.reset(true);
    round.core_mut().player_mut().pool_mut().life[0] = 1;
    let bullet_kind = round.core().kinds().enemy_bullet;
    round
        .core_mut()
        .fire_enemy_bullet(400.0, 700.0, 0.0, 0.0, &bullet_kind);

    let mut canvas = RecordingCanvas::default();
    round.run(&mut canvas);

    assert_eq!(round.state(), RoundState::Result);
    assert!(canvas.contains_text("RESULT"));
    assert!(canvas
        .texts
        .iter()
        .all(|text| text.align == TextAlign::Center));
    let score_lines = canvas
        .texts
        .iter()
        .filter(|text| text.text.starts_with("SCORE: "))
        .count();
    assert_eq!(score_lines, 1);
    assert!(!canvas
        .draws
        .iter()
        .any(|draw| draw.look == player_look && draw.scale == 0.5));
}

#[test]
fn destroyed_enemy_frees_its_slot() {
    let mut round = blank_round(7);
    round.reset(false);
    run_frames(&mut round, 60);
    let enemy = match round.encounters().slot(0).state {
        SlotState::Active(enemy) => enemy,
        other => panic!("slot 0 should be active, got {other:?}"),
    };

    round.core_mut().kill_enemy(enemy);
    run_frames(&mut round, 1);

    assert_eq!(round.encounters().slot(0).state, SlotState::Absent);
}

#[test]
fn certain_spawn_chance_refills_an_emptied_slot() {
    let mut round = round_with(ActorKinds::build(|_, _, _| Look::Blank), 8, 1.0);
    round.reset(false);
    run_frames(&mut round, 60);
    let SlotState::Active(enemy) = round.encounters().slot(1).state else {
        panic!("slot 1 should be active");
    };

    round.core_mut().kill_enemy(enemy);
    run_frames(&mut round, 1);
    assert_eq!(round.encounters().slot(1).state, SlotState::Absent);

    run_frames(&mut round, 1);
    assert_eq!(round.encounters().slot(1).state, SlotState::Approaching);
    assert_eq!(round.pending_appearances(), 1);

    run_frames(&mut round, 60);
    assert!(matches!(
        round.encounters().slot(1).state,
        SlotState::Active(_)
    ));
    assert_eq!(round.core().enemy_count(), 3);
}

#[test]
fn recycled_enemy_index_binds_only_the_new_slot() {
    let mut round = round_with(ActorKinds::build(|_, _, _| Look::Blank), 16, 1.0);
    round.reset(false);
    run_frames(&mut round, 60);
    assert_eq!(round.encounters().slot(0).state, SlotState::Active(0));
    assert_eq!(round.encounters().slot(2).state, SlotState::Active(2));

    round.core_mut().kill_enemy(2);
    run_frames(&mut round, 2);
    assert_eq!(round.encounters().slot(2).state, SlotState::Approaching);
    run_frames(&mut round, 59);
    assert_eq!(round.pending_appearances(), 1);

    // the appearance for slot 2 lands on the frame index 0 frees up
    round.core_mut().kill_enemy(0);
    run_frames(&mut round, 1);

    assert_eq!(round.encounters().slot(2).state, SlotState::Active(0));
    assert_eq!(round.encounters().slot(0).state, SlotState::Absent);
    assert_eq!(round.core().enemy_count(), 2);
}

#[test]
fn enemy_bullet_spawns_past_capacity_are_dropped() {
    let mut round = blank_round(9);
    for _ in 0..ENEMY_BULLET_CAPACITY + 100 {
        round
            .core_mut()
            .context_mut()
            .fire_enemy_bullet(400.0, 400.0, 1.0, 0.0);
    }

    run_frames(&mut round, 1);

    assert_eq!(
        round.core().enemy_bullets().active_count(),
        ENEMY_BULLET_CAPACITY
    );
    assert!(round.core().context().pending_fire().is_empty());
}

#[test]
fn same_seed_plays_out_identically() {
    let play = |seed: u64| {
        let mut round = blank_round(seed);
        round.reset(true);
        let mut canvas = RecordingCanvas::default();
        for frame in 0..400 {
            let direction = if frame % 120 < 60 { -1.0 } else { 1.0 };
            round.set_controls(Controls {
                move_direction: Vec2::new(direction, 0.0),
                shoot_held: frame % 200 < 150,
            });
            canvas.clear();
            round.run(&mut canvas);
        }
        let bullets: Vec<Vec2> = round
            .core()
            .enemy_bullets()
            .iter_active()
            .map(|index| round.core().enemy_bullets().pool().position(index))
            .collect();
        (
            round.score(),
            round.core().active_actor_count(),
            round.core().player_life(),
            bullets,
        )
    };

    assert_eq!(play(42), play(42));
}

#[test]
fn hud_shows_score_and_spare_lives() {
    let mut next_id = 0;
    let kinds = ActorKinds::build(|_, _, _| {
        next_id += 1;
        Look::Sprite(SpriteId(next_id))
    });
    let player_look = kinds.player_look;
    let mut round = round_with(kinds, 10, 0.0);
    round.reset(true);

    let mut canvas = RecordingCanvas::default();
    round.run(&mut canvas);

    let spare_lives = canvas
        .draws
        .iter()
        .filter(|draw| draw.look == player_look && draw.scale == 0.5)
        .count();
    assert_eq!(spare_lives, 2);
    assert!(canvas.contains_text("SCORE: 0"));
    assert!(!canvas.contains_text("RESULT"));
}

fn test_scene() -> (ShooterScene, SceneAssets) {
    let mut scene = ShooterScene::new(SceneOptions {
        rng_seed: 12,
        enable_music: false,
        volume: 0.0,
    });
    let mut assets = SceneAssets::default();
    scene.load(&mut assets, LogicalRegion::new(320.0, 320.0));
    (scene, assets)
}

#[test]
fn scene_load_fills_atlas_and_background() {
    let (_scene, assets) = test_scene();
    assert_eq!(assets.sprites.len(), 3 + 39 * 3);
    assert_eq!(
        assets.background.as_ref().map(|sprite| sprite.width),
        Some(320)
    );
}

#[test]
fn scene_waits_in_attract_mode_until_start() {
    let (mut scene, _assets) = test_scene();
    let mut canvas = RecordingCanvas::default();

    let command = scene.update(&InputSnapshot::empty(), &mut canvas);
    assert_eq!(command, SceneCommand::None);
    assert!(canvas.contains_text("PRESS SPACE KEY TO START"));
    assert!(canvas.contains_text("VOL"));
    assert!(scene.debug_title().is_some_and(|title| title.contains("life 0")));

    canvas.clear();
    let start = InputSnapshot::empty().with_start_pressed(true);
    scene.update(&start, &mut canvas);
    assert!(!canvas.contains_text("PRESS SPACE KEY TO START"));
    assert!(scene.debug_title().is_some_and(|title| title.contains("life 3")));
}

#[test]
fn scene_forwards_shoot_to_the_player() {
    let (mut scene, _assets) = test_scene();
    let mut canvas = RecordingCanvas::default();
    scene.update(
        &InputSnapshot::empty().with_start_pressed(true),
        &mut canvas,
    );
    let before = scene.active_actor_count();

    let shooting = InputSnapshot::empty().with_action_down(InputAction::Shoot, true);
    // the reset frame counted as frame 0, so the next two frames include a firing one
    scene.update(&shooting, &mut canvas);
    scene.update(&shooting, &mut canvas);

    assert!(scene.active_actor_count() >= before + 6);
}
