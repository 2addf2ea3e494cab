use std::sync::Arc;

use pixels::{Pixels, SurfaceTexture};
use thiserror::Error;
use tracing::{debug, warn};
use winit::window::Window;

use super::canvas::Canvas;
use super::font::{aligned_left, for_each_text_pixel, TextAlign};
use super::region::LogicalRegion;
use super::sprite::{SceneAssets, Sprite, SpriteAtlas, SpriteId};

const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];
const TEXT_COLOR: [u8; 4] = [24, 24, 24, 255];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create pixel surface: {0}")]
    Surface(#[from] pixels::Error),
    #[error("failed to resize pixel surface: {0}")]
    Resize(#[from] pixels::TextureError),
}

/// Owns the window's pixel buffer. The buffer always has the logical region's
/// size; `pixels` scales it to whatever the window surface is.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    region: LogicalRegion,
    assets: SceneAssets,
}

impl Renderer {
    pub fn new(window: Arc<Window>, region: LogicalRegion) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        let pixels = Pixels::new(buffer_extent(region.width), buffer_extent(region.height), surface)?;
        Ok(Self {
            window,
            pixels,
            region,
            assets: SceneAssets::default(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)?;
        debug!(width, height, "surface_resized");
        Ok(())
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn region(&self) -> LogicalRegion {
        self.region
    }

    pub fn assets_mut(&mut self) -> &mut SceneAssets {
        &mut self.assets
    }

    /// Clears the buffer to the background and hands out a canvas over it.
    pub fn begin_frame(&mut self) -> FrameCanvas<'_> {
        let width = buffer_extent(self.region.width);
        let height = buffer_extent(self.region.height);
        let frame = self.pixels.frame_mut();
        clear_frame(frame, width, height, self.assets.background.as_ref());
        FrameCanvas::new(frame, width, height, &self.assets.sprites)
    }

    pub fn present(&mut self) -> Result<(), RenderError> {
        self.pixels.render()?;
        Ok(())
    }
}

fn buffer_extent(logical: f32) -> u32 {
    if logical.is_finite() && logical >= 1.0 {
        logical.round() as u32
    } else {
        1
    }
}

fn clear_frame(frame: &mut [u8], width: u32, height: u32, background: Option<&Sprite>) {
    match background {
        Some(sprite)
            if sprite.width == width && sprite.height == height && sprite.rgba.len() == frame.len() =>
        {
            frame.copy_from_slice(&sprite.rgba);
        }
        Some(sprite) => {
            warn!(
                background_width = sprite.width,
                background_height = sprite.height,
                width,
                height,
                "background_size_mismatch"
            );
            fill(frame, CLEAR_COLOR);
        }
        None => fill(frame, CLEAR_COLOR),
    }
}

fn fill(frame: &mut [u8], color: [u8; 4]) {
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color);
    }
}

/// Software rasterizer over one RGBA frame.
pub struct FrameCanvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    atlas: &'a SpriteAtlas,
    missing_sprite_warned: bool,
}

impl<'a> FrameCanvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32, atlas: &'a SpriteAtlas) -> Self {
        Self {
            frame,
            width,
            height,
            atlas,
            missing_sprite_warned: false,
        }
    }
}

impl Canvas for FrameCanvas<'_> {
    fn draw_sprite(&mut self, sprite: SpriteId, x: f32, y: f32, angle: f32, scale: f32) {
        let Some(loaded) = self.atlas.get(sprite) else {
            if !self.missing_sprite_warned {
                warn!(sprite = sprite.0, "sprite_missing_from_atlas");
                self.missing_sprite_warned = true;
            }
            return;
        };
        draw_sprite_rotated_scaled(self.frame, self.width, self.height, x, y, loaded, angle, scale);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, scale: u32, align: TextAlign) {
        let left = aligned_left(text, x.round() as i32, scale, align);
        let width = self.width as usize;
        let height = self.height as i32;
        let frame = &mut *self.frame;
        for_each_text_pixel(text, left, y.round() as i32, scale, |px, py| {
            if py < height && (px as usize) < width {
                write_pixel_rgba_clipped(frame, width, px, py, TEXT_COLOR);
            }
        });
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let Some(byte_offset) = (y as usize)
        .checked_mul(width)
        .and_then(|row| row.checked_add(x as usize))
        .and_then(|pixel| pixel.checked_mul(4))
    else {
        return;
    };
    let Some(target) = frame.get_mut(byte_offset..byte_offset + 4) else {
        return;
    };
    target.copy_from_slice(&color);
}

fn blend_channel(src: u8, dst: u8, alpha: u8) -> u8 {
    let alpha = u16::from(alpha);
    ((u16::from(src) * alpha + u16::from(dst) * (255 - alpha) + 127) / 255) as u8
}

fn normalized_sprite_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// Nearest-neighbour blit of `sprite` centered on (`center_x`, `center_y`),
/// rotated clockwise by `angle` radians in screen space and scaled uniformly.
#[allow(clippy::too_many_arguments)]
fn draw_sprite_rotated_scaled(
    frame: &mut [u8],
    width: u32,
    height: u32,
    center_x: f32,
    center_y: f32,
    sprite: &Sprite,
    angle: f32,
    scale: f32,
) {
    if sprite.width == 0 || sprite.height == 0 || width == 0 || height == 0 {
        return;
    }
    if sprite.rgba.len() < sprite.width as usize * sprite.height as usize * 4 {
        return;
    }
    if !center_x.is_finite() || !center_y.is_finite() {
        return;
    }

    let scale = normalized_sprite_scale(scale);
    let inv_scale = scale.recip();
    let (sin, cos) = if angle.is_finite() {
        angle.sin_cos()
    } else {
        (0.0, 1.0)
    };
    let half_w = sprite.width as f32 * 0.5;
    let half_h = sprite.height as f32 * 0.5;
    let reach = (half_w * half_w + half_h * half_h).sqrt() * scale;

    let draw_left = ((center_x - reach).floor() as i32).max(0);
    let draw_top = ((center_y - reach).floor() as i32).max(0);
    let draw_right = ((center_x + reach).ceil() as i32).min(width as i32);
    let draw_bottom = ((center_y + reach).ceil() as i32).min(height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let frame_width = width as usize;
    let sprite_width = sprite.width as usize;

    for out_y in draw_top..draw_bottom {
        let dy = out_y as f32 + 0.5 - center_y;
        for out_x in draw_left..draw_right {
            let dx = out_x as f32 + 0.5 - center_x;
            let local_x = (dx * cos + dy * sin) * inv_scale + half_w;
            let local_y = (-dx * sin + dy * cos) * inv_scale + half_h;
            if local_x < 0.0 || local_y < 0.0 {
                continue;
            }
            let src_x = local_x as usize;
            let src_y = local_y as usize;
            if src_x >= sprite.width as usize || src_y >= sprite.height as usize {
                continue;
            }

            let src_offset = (src_y * sprite_width + src_x) * 4;
            let alpha = sprite.rgba[src_offset + 3];
            if alpha == 0 {
                continue;
            }
            let dst_offset = (out_y as usize * frame_width + out_x as usize) * 4;
            for channel in 0..3 {
                frame[dst_offset + channel] = blend_channel(
                    sprite.rgba[src_offset + channel],
                    frame[dst_offset + channel],
                    alpha,
                );
            }
            frame[dst_offset + 3] = 255;
        }
    }
}
