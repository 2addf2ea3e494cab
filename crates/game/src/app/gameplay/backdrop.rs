use rand::Rng;
use shmup_engine::Sprite;

const PAPER_SHADE: u8 = 248;
const STREAK_COUNT: usize = 2000;
const STREAK_WIDTH: i64 = 20;
const STREAK_COLOR: [u8; 3] = [128, 112, 96];
const STREAK_ALPHA: u16 = 4;

/// Light paper texture: faint vertical brush streaks over an off-white fill.
pub(crate) fn paper_background(width: u32, height: u32, rng: &mut impl Rng) -> Sprite {
    let mut sprite = Sprite::filled(width, height, [PAPER_SHADE, PAPER_SHADE, PAPER_SHADE, 255]);
    if width == 0 || height == 0 {
        return sprite;
    }

    let (w, h) = (width as f32, height as f32);
    for _ in 0..STREAK_COUNT {
        let x = rng.gen_range(0.0..w);
        let top = rng.gen_range(-50.0..h - 50.0);
        let length = rng.gen_range(50.0..200.0);
        paint_streak(&mut sprite, x, top, top + length);
    }
    sprite
}

fn paint_streak(sprite: &mut Sprite, center_x: f32, top: f32, bottom: f32) {
    let left = (center_x as i64 - STREAK_WIDTH / 2).max(0);
    let right = (center_x as i64 + STREAK_WIDTH / 2).min(i64::from(sprite.width));
    let top = (top as i64).max(0);
    let bottom = (bottom as i64).min(i64::from(sprite.height));

    for y in top..bottom {
        for x in left..right {
            let offset = ((y as usize) * sprite.width as usize + x as usize) * 4;
            for (channel, target) in sprite.rgba[offset..offset + 3].iter_mut().zip(STREAK_COLOR) {
                *channel = blend(*channel, target);
            }
        }
    }
}

fn blend(base: u8, over: u8) -> u8 {
    let mixed = (u16::from(over) * STREAK_ALPHA + u16::from(base) * (255 - STREAK_ALPHA) + 127) / 255;
    mixed as u8
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn background_covers_the_region_and_is_opaque() {
        let sprite = paper_background(64, 48, &mut StdRng::seed_from_u64(5));
        assert_eq!((sprite.width, sprite.height), (64, 48));
        assert!(sprite.rgba.chunks_exact(4).all(|pixel| pixel[3] == 255));
    }

    #[test]
    fn streaks_only_darken_the_paper() {
        let sprite = paper_background(120, 120, &mut StdRng::seed_from_u64(5));
        let darkest = sprite.rgba.chunks_exact(4).map(|pixel| pixel[2]).min();
        assert!(darkest.is_some_and(|shade| shade < PAPER_SHADE));
        assert!(sprite
            .rgba
            .chunks_exact(4)
            .all(|pixel| pixel[0] <= PAPER_SHADE && pixel[0] >= STREAK_COLOR[0]));
    }

    #[test]
    fn same_seed_same_texture() {
        let a = paper_background(50, 50, &mut StdRng::seed_from_u64(9));
        let b = paper_background(50, 50, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
