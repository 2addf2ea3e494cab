use super::font::TextAlign;
use super::sprite::{Look, SpriteId};

/// Drawing surface handed to scenes for one frame. Coordinates are logical
/// pixels; sprites are centered on (`x`, `y`).
pub trait Canvas {
    fn draw_sprite(&mut self, sprite: SpriteId, x: f32, y: f32, angle: f32, scale: f32);

    fn draw_text(&mut self, text: &str, x: f32, y: f32, scale: u32, align: TextAlign);

    fn draw_at(&mut self, look: Look, x: f32, y: f32, angle: f32, scale: f32) {
        if let Look::Sprite(sprite) = look {
            self.draw_sprite(sprite, x, y, angle, scale);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub look: Look,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextCall {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub scale: u32,
    pub align: TextAlign,
}

/// Canvas that records calls instead of rasterizing. Used headless and in tests.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub draws: Vec<DrawCall>,
    pub texts: Vec<TextCall>,
}

impl RecordingCanvas {
    pub fn clear(&mut self) {
        self.draws.clear();
        self.texts.clear();
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts.iter().any(|call| call.text.contains(needle))
    }
}

impl Canvas for RecordingCanvas {
    fn draw_sprite(&mut self, sprite: SpriteId, x: f32, y: f32, angle: f32, scale: f32) {
        self.draws.push(DrawCall {
            look: Look::Sprite(sprite),
            x,
            y,
            angle,
            scale,
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, scale: u32, align: TextAlign) {
        self.texts.push(TextCall {
            text: text.to_string(),
            x,
            y,
            scale,
            align,
        });
    }
}
