mod canvas;
mod font;
mod region;
mod renderer;
mod sprite;

pub use canvas::{Canvas, DrawCall, RecordingCanvas, TextCall};
pub use font::{text_width, TextAlign, GLYPH_HEIGHT, GLYPH_WIDTH};
pub use region::LogicalRegion;
pub use renderer::{FrameCanvas, RenderError, Renderer};
pub use sprite::{GlyphShape, Look, SceneAssets, Sprite, SpriteAtlas, SpriteId};
