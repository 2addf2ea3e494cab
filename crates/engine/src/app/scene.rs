use tracing::info;

use super::input::{ActionStates, InputAction};
use super::rendering::{Canvas, LogicalRegion, SceneAssets};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// Input sampled once per simulation tick. Held state comes from the action
/// table; `start_pressed` and `any_key_pressed` are edges for this tick only.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    start_pressed: bool,
    any_key_pressed: bool,
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        start_pressed: bool,
        any_key_pressed: bool,
        actions: ActionStates,
    ) -> Self {
        Self {
            quit_requested,
            start_pressed,
            any_key_pressed,
            actions,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn start_pressed(&self) -> bool {
        self.start_pressed
    }

    pub fn any_key_pressed(&self) -> bool {
        self.any_key_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// Unit-length steering direction from the held movement keys, or zero.
    pub fn move_vector(&self) -> Vec2 {
        let mut x = 0.0;
        let mut y = 0.0;
        if self.is_down(InputAction::MoveLeft) {
            x -= 1.0;
        }
        if self.is_down(InputAction::MoveRight) {
            x += 1.0;
        }
        if self.is_down(InputAction::MoveUp) {
            y -= 1.0;
        }
        if self.is_down(InputAction::MoveDown) {
            y += 1.0;
        }
        Vec2 { x, y }.normalized_or_zero()
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_start_pressed(mut self, start_pressed: bool) -> Self {
        self.start_pressed = start_pressed;
        self
    }

    pub fn with_any_key_pressed(mut self, any_key_pressed: bool) -> Self {
        self.any_key_pressed = any_key_pressed;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn normalized_or_zero(self) -> Self {
        let length = self.length();
        if length > 0.0 && length.is_finite() {
            Self {
                x: self.x / length,
                y: self.y / length,
            }
        } else {
            Self::ZERO
        }
    }
}

/// A game plugged into the frame loop. `update` runs once per simulation tick
/// and draws into the canvas it is handed.
pub trait Scene {
    fn load(&mut self, assets: &mut SceneAssets, region: LogicalRegion);
    fn update(&mut self, input: &InputSnapshot, canvas: &mut dyn Canvas) -> SceneCommand;
    fn unload(&mut self) {}
    fn active_actor_count(&self) -> usize {
        0
    }
    fn debug_title(&self) -> Option<String> {
        None
    }
}

pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self, assets: &mut SceneAssets, region: LogicalRegion) {
        if self.is_loaded {
            return;
        }
        self.scene.load(assets, region);
        self.is_loaded = true;
        info!(
            sprites = assets.sprites.len(),
            has_background = assets.background.is_some(),
            "scene_loaded"
        );
    }

    pub(crate) fn update(
        &mut self,
        input: &InputSnapshot,
        canvas: &mut dyn Canvas,
    ) -> SceneCommand {
        if !self.is_loaded {
            return SceneCommand::None;
        }
        self.scene.update(input, canvas)
    }

    pub(crate) fn shutdown(&mut self) {
        if !self.is_loaded {
            return;
        }
        self.scene.unload();
        self.is_loaded = false;
        info!("scene_unloaded");
    }

    pub(crate) fn active_actor_count(&self) -> usize {
        self.scene.active_actor_count()
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }
}
