mod actor_types;
mod backdrop;
mod enemy_slot;
mod game_core;
mod round;
mod sound;

use rand::rngs::StdRng;
use rand::SeedableRng;
use shmup_engine::{
    Canvas, InputAction, InputSnapshot, LogicalRegion, Scene, SceneAssets, SceneCommand,
    TextAlign,
};
use tracing::info;

use self::actor_types::ActorKinds;
use self::backdrop::paper_background;
use self::enemy_slot::EncounterController;
use self::game_core::{Controls, GameCore};
use self::round::{Round, RoundState};
use self::sound::SoundBoard;

const INSTRUCTION_SCALE: u32 = 3;
const INSTRUCTION_LINES: [(&str, f32, f32); 5] = [
    ("ARROW / WASD :", 160.0, 485.0),
    ("MOVE", 460.0, 485.0),
    ("Z / J / SPACE / ENTER :", 160.0, 525.0),
    ("SHOOT", 460.0, 525.0),
    ("PRESS SPACE KEY TO START", 160.0, 585.0),
];
const VOLUME_LABEL_SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SceneOptions {
    pub(crate) rng_seed: u64,
    pub(crate) enable_music: bool,
    pub(crate) volume: f32,
}

/// The whole game as one scene: attract mode until Space, then rounds that
/// restart on any key from the result screen.
pub(crate) struct ShooterScene {
    options: SceneOptions,
    round: Option<Round>,
    is_started: bool,
}

impl ShooterScene {
    pub(crate) fn new(options: SceneOptions) -> Self {
        Self {
            options,
            round: None,
            is_started: false,
        }
    }

    fn region(&self) -> Option<LogicalRegion> {
        self.round.as_ref().map(|round| round.core().region())
    }
}

impl Scene for ShooterScene {
    fn load(&mut self, assets: &mut SceneAssets, region: LogicalRegion) {
        let mut rng = StdRng::seed_from_u64(self.options.rng_seed);
        assets.background = Some(paper_background(
            region.width as u32,
            region.height as u32,
            &mut rng,
        ));
        let kinds = ActorKinds::with_atlas(&mut assets.sprites);

        let mut sound = SoundBoard::new(self.options.enable_music);
        sound.set_volume(self.options.volume);

        let core = GameCore::new(region, kinds, rng, sound);
        let mut round = Round::new(core, EncounterController::new(region));
        round.reset(false);
        self.round = Some(round);
        self.is_started = false;
        info!(seed = self.options.rng_seed, "shooter_scene_loaded");
    }

    fn update(&mut self, input: &InputSnapshot, canvas: &mut dyn Canvas) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }
        let Some(round) = self.round.as_mut() else {
            return SceneCommand::None;
        };

        if !self.is_started && input.start_pressed() {
            round.reset(true);
            self.is_started = true;
            info!("game_started");
        } else if round.state() == RoundState::Result && input.any_key_pressed() {
            round.reset(true);
        }

        round.set_controls(Controls {
            move_direction: input.move_vector(),
            shoot_held: input.is_down(InputAction::Shoot),
        });
        round.run(canvas);

        if !self.is_started {
            for (text, x, y) in INSTRUCTION_LINES {
                canvas.draw_text(text, x, y, INSTRUCTION_SCALE, TextAlign::Left);
            }
        }
        if let Some(region) = self.region() {
            canvas.draw_text(
                "VOL",
                10.0,
                region.height - 33.0,
                VOLUME_LABEL_SCALE,
                TextAlign::Left,
            );
        }
        SceneCommand::None
    }

    fn unload(&mut self) {
        if let Some(round) = self.round.as_mut() {
            round.core_mut().context_mut().sound.stop_all();
        }
        self.round = None;
    }

    fn active_actor_count(&self) -> usize {
        self.round
            .as_ref()
            .map_or(0, |round| round.core().active_actor_count())
    }

    fn debug_title(&self) -> Option<String> {
        let round = self.round.as_ref()?;
        Some(format!(
            "score {} | enemies {} | life {}",
            round.score(),
            round.core().enemy_count(),
            round.core().player_life()
        ))
    }
}

#[cfg(test)]
mod tests;
