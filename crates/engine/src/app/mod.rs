mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    text_width, Canvas, DrawCall, FrameCanvas, GlyphShape, LogicalRegion, Look, RecordingCanvas,
    RenderError, Renderer, SceneAssets, Sprite, SpriteAtlas, SpriteId, TextAlign, TextCall,
    GLYPH_HEIGHT, GLYPH_WIDTH,
};
pub use scene::{InputSnapshot, Scene, SceneCommand, Vec2};
