use std::f32::consts::{FRAC_PI_2, TAU};

use rand::Rng;
use shmup_engine::{Canvas, TextAlign, TimerSet};
use tracing::{debug, info, warn};

use super::actor_types::{run_appearance_particle, APPEARANCE_DURATION};
use super::game_core::{fire_particles, kill_player_slot, Controls, GameCore, Impact};
use super::enemy_slot::EncounterController;
use super::sound::Cue;

const APPEARANCE_TIMER_CAPACITY: usize = 64;
const APPEARANCE_PARTICLE_COUNT: usize = 8;

const HIT_SCORE: u64 = 10;
const DESTROY_SCORE: u64 = 8000;
const ENEMY_DAMAGED_FRAMES: u32 = 2;
const PLAYER_DAMAGED_FRAMES: u32 = 180;

const SCORE_TEXT_SCALE: u32 = 4;
const SCORE_MARGIN: f32 = 20.0;
const LIVES_ORIGIN: (f32, f32) = (30.0, 30.0);
const LIVES_SPACING: f32 = 60.0;
const LIVES_SCALE: f32 = 0.5;
const RESULT_TITLE_SCALE: u32 = 8;
const RESULT_SCORE_SCALE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RoundState {
    Playing,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Appearance {
    slot: usize,
}

/// Scoring, hit handling and delayed enemy appearances layered over the core.
pub(crate) struct Round {
    core: GameCore,
    encounters: EncounterController,
    appearances: TimerSet<Appearance>,
    fired: Vec<Appearance>,
    score: u64,
    state: RoundState,
}

impl Round {
    pub(crate) fn new(core: GameCore, encounters: EncounterController) -> Self {
        Self {
            core,
            encounters,
            appearances: TimerSet::with_capacity(APPEARANCE_TIMER_CAPACITY),
            fired: Vec::with_capacity(APPEARANCE_TIMER_CAPACITY),
            score: 0,
            state: RoundState::Playing,
        }
    }

    pub(crate) fn score(&self) -> u64 {
        self.score
    }

    pub(crate) fn state(&self) -> RoundState {
        self.state
    }

    pub(crate) fn core(&self) -> &GameCore {
        &self.core
    }

    pub(crate) fn core_mut(&mut self) -> &mut GameCore {
        &mut self.core
    }

    #[cfg(test)]
    pub(crate) fn encounters(&self) -> &EncounterController {
        &self.encounters
    }

    #[cfg(test)]
    pub(crate) fn pending_appearances(&self) -> usize {
        self.appearances.len()
    }

    pub(crate) fn set_controls(&mut self, controls: Controls) {
        self.core.set_controls(controls);
    }

    /// Starts a fresh round. A non-playable round is the attract mode: same
    /// enemies, no player.
    pub(crate) fn reset(&mut self, playable: bool) {
        self.score = 0;
        self.state = RoundState::Playing;
        self.appearances.clear();
        self.fired.clear();

        self.core.reset_all();
        self.core.create_player();
        if !playable {
            self.core.kill_player();
        }

        let approaching = self.encounters.reset();
        for slot in approaching.iter() {
            self.add_enemy(slot);
        }
        info!(playable, "round_reset");
    }

    /// One frame: actors, both collision passes, slot release, appearances,
    /// encounter rolls, then the HUD on top.
    pub(crate) fn run(&mut self, canvas: &mut dyn Canvas) {
        self.core.run_and_draw_all(canvas);

        let score = &mut self.score;
        self.core
            .check_player_bullet_collision(|impact| on_hit_enemy(impact, score));
        let state = &mut self.state;
        self.core
            .check_enemy_bullet_collision(|impact| on_hit_player(impact, state));

        // Vacated slots are released before appearances bind, so an index
        // recycled this frame never stays claimed by its old slot.
        let core = &self.core;
        let freed = self
            .encounters
            .release_vacated(|index| core.enemy_is_active(index));

        let mut fired = std::mem::take(&mut self.fired);
        self.appearances.step(&mut fired);
        for appearance in fired.drain(..) {
            self.complete_appearance(appearance.slot);
        }
        self.fired = fired;

        let approaching = self
            .encounters
            .roll_absent(freed, &mut self.core.context_mut().rng);
        for slot in approaching.iter() {
            self.add_enemy(slot);
        }

        self.draw_hud(canvas);
    }

    /// Spiral of particles converging on the slot, with the enemy itself
    /// arriving once they close in.
    fn add_enemy(&mut self, slot: usize) {
        let position = self.encounters.slot(slot).position;
        for index in 0..APPEARANCE_PARTICLE_COUNT {
            let Some(kind) = self.core.random_particle_kind() else {
                break;
            };
            let Some(particle) = self.core.use_particle(position.x, position.y, &kind) else {
                break;
            };
            let bearing = index as f32 / APPEARANCE_PARTICLE_COUNT as f32 * TAU;
            self.core
                .override_particle_behavior(particle, run_appearance_particle);
            self.core
                .set_particle_anchor(particle, position.x, position.y, bearing);
        }

        if !self
            .appearances
            .after(APPEARANCE_DURATION, Appearance { slot })
        {
            warn!(slot, "enemy_appearance_dropped");
            self.encounters.complete_approach(slot, None);
            return;
        }
        self.core.context_mut().sound.play_restart(Cue::PreAppearance);
        debug!(slot, "enemy_approaching");
    }

    fn complete_appearance(&mut self, slot: usize) {
        let position = self.encounters.slot(slot).position;
        let kind = self.core.random_enemy_kind();
        let enemy = kind.and_then(|kind| self.core.use_enemy(position.x, position.y, &kind));
        self.encounters.complete_approach(slot, enemy);

        let Some(enemy) = enemy else {
            debug!(slot, "enemy_pool_saturated");
            return;
        };
        self.core.fire_particles(position.x, position.y, 32, 30.0, 30.0);
        self.core.context_mut().sound.play_restart(Cue::Appearance);
        info!(slot, enemy, "enemy_appeared");
    }

    fn draw_hud(&self, canvas: &mut dyn Canvas) {
        let region = self.core.region();
        let score = format!("SCORE: {}", format_thousands(self.score));
        match self.state {
            RoundState::Playing => {
                canvas.draw_text(
                    &score,
                    region.width - SCORE_MARGIN,
                    SCORE_MARGIN,
                    SCORE_TEXT_SCALE,
                    TextAlign::Right,
                );

                let extra_lives = (self.core.player_life() - 1).max(0);
                let player_look = self.core.kinds().player_look;
                for life in 0..extra_lives {
                    canvas.draw_at(
                        player_look,
                        LIVES_ORIGIN.0 + LIVES_SPACING * life as f32,
                        LIVES_ORIGIN.1,
                        -FRAC_PI_2,
                        LIVES_SCALE,
                    );
                }
            }
            RoundState::Result => {
                let center = region.center();
                canvas.draw_text(
                    "RESULT",
                    center.x,
                    center.y - 80.0,
                    RESULT_TITLE_SCALE,
                    TextAlign::Center,
                );
                canvas.draw_text(
                    &score,
                    center.x,
                    center.y + 48.0,
                    RESULT_SCORE_SCALE,
                    TextAlign::Center,
                );
            }
        }
    }
}

fn on_hit_enemy(impact: Impact<'_>, score: &mut u64) {
    let Impact {
        hitter,
        hitter_index,
        target,
        target_index,
        particles,
        particle_kinds,
        context,
    } = impact;

    let hit = hitter.pool().position(hitter_index);
    hitter.deactivate(hitter_index);
    if context.rng.gen_bool(0.2) {
        fire_particles(particles, particle_kinds, &mut context.rng, hit.x, hit.y, 1, 5.0, 15.0);
    }

    let pool = target.pool_mut();
    pool.life[target_index] -= 1;
    pool.damaged_remaining_count[target_index] = ENEMY_DAMAGED_FRAMES;
    let life = pool.life[target_index];
    *score += HIT_SCORE;

    if life <= 0 {
        target.deactivate(target_index);
        fire_particles(
            particles,
            particle_kinds,
            &mut context.rng,
            hit.x,
            hit.y,
            64,
            50.0,
            35.0,
        );
        *score += DESTROY_SCORE;
        context.sound.play_restart(Cue::Bomb);
        info!(enemy = target_index, score = *score, "enemy_destroyed");
    }
}

fn on_hit_player(impact: Impact<'_>, state: &mut RoundState) {
    let Impact {
        hitter,
        hitter_index,
        target,
        target_index,
        particles,
        particle_kinds,
        context,
    } = impact;

    let hit = hitter.pool().position(hitter_index);
    hitter.deactivate(hitter_index);

    let pool = target.pool_mut();
    pool.life[target_index] -= 1;
    pool.damaged_remaining_count[target_index] = PLAYER_DAMAGED_FRAMES;
    let life = pool.life[target_index];

    if life > 0 {
        fire_particles(
            particles,
            particle_kinds,
            &mut context.rng,
            hit.x,
            hit.y,
            64,
            30.0,
            30.0,
        );
        info!(life, "player_damaged");
    } else {
        kill_player_slot(target, target_index, context);
        fire_particles(
            particles,
            particle_kinds,
            &mut context.rng,
            hit.x,
            hit.y,
            128,
            50.0,
            30.0,
        );
        *state = RoundState::Result;
        info!("player_destroyed");
    }
    context.sound.play_restart(Cue::Damage);
}

pub(crate) fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted
}
