//! Runtime core for a fixed-timestep 2D shooter: struct-of-arrays actor
//! pools with per-frame behaviors, a frame timer queue, and a pixel-buffer
//! window loop that hosts a single scene.

pub mod actor;
pub mod app;
pub mod timer;

pub use actor::{
    idle, proxies_overlap, scan_collisions, ActorGroup, ActorPool, ActorType, RunFn, CULL_MARGIN,
};
pub use app::{
    run_app, text_width, AppError, Canvas, DrawCall, FrameCanvas, GlyphShape, InputAction,
    InputSnapshot, LogicalRegion, LoopConfig, LoopMetricsSnapshot, Look, RecordingCanvas,
    RenderError, Renderer, Scene, SceneAssets, SceneCommand, Sprite, SpriteAtlas, SpriteId,
    TextAlign, TextCall, Vec2, GLYPH_HEIGHT, GLYPH_WIDTH, SLOW_FRAME_ENV_VAR,
};
pub use timer::TimerSet;
