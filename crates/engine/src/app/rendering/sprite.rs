const GLYPH_CELLS: i32 = 7;
const GLYPH_FILL_RATIO: f32 = 0.8;
const GLYPH_CELL_DENSITY_PERCENT: u64 = 46;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId(pub u32);

/// Draw handle stored per actor. `Blank` draws nothing, which is how an actor
/// blinks out during its damaged window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Look {
    Sprite(SpriteId),
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Parameters of a procedurally built glyph sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphShape {
    /// Seeds the cell pattern; distinct code points give distinct shapes.
    pub code_point: u32,
    pub quarter_turns: u8,
    pub flip: bool,
}

impl Sprite {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * 4;
        (rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            rgba,
        }
    }

    /// Builds a square glyph: a seeded cell pattern turned by quarter turns,
    /// optionally flipped, then with its top half mirrored onto the bottom so
    /// the shape is symmetric about its heading.
    pub fn glyph(shape: GlyphShape, size: u32, color: [u8; 4]) -> Self {
        let mut sprite = Self::filled(size, size, [0, 0, 0, 0]);
        if size == 0 {
            return sprite;
        }

        let cells = glyph_cells(shape.code_point);
        let half = size as f32 * 0.5;
        let inset = size as f32 * (1.0 - GLYPH_FILL_RATIO) * 0.5;
        let cell_px = size as f32 * GLYPH_FILL_RATIO / GLYPH_CELLS as f32;

        for py in 0..size {
            let source_y = if py >= size / 2 { size - 1 - py } else { py };
            for px in 0..size {
                let mut u = px as f32 + 0.5 - half;
                let mut v = source_y as f32 + 0.5 - half;
                for _ in 0..shape.quarter_turns % 4 {
                    (u, v) = (v, -u);
                }
                if shape.flip {
                    u = -u;
                }

                let cell_x = ((u + half - inset) / cell_px).floor() as i32;
                let cell_y = ((v + half - inset) / cell_px).floor() as i32;
                if !(0..GLYPH_CELLS).contains(&cell_x) || !(0..GLYPH_CELLS).contains(&cell_y) {
                    continue;
                }
                if cells[cell_y as usize][cell_x as usize] {
                    let offset = (py as usize * size as usize + px as usize) * 4;
                    sprite.rgba[offset..offset + 4].copy_from_slice(&color);
                }
            }
        }

        sprite
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut pixel = [0u8; 4];
        pixel.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(pixel)
    }
}

fn glyph_cells(code_point: u32) -> [[bool; GLYPH_CELLS as usize]; GLYPH_CELLS as usize] {
    let mut cells = [[false; GLYPH_CELLS as usize]; GLYPH_CELLS as usize];
    for (row_index, row) in cells.iter_mut().enumerate() {
        for (col_index, cell) in row.iter_mut().enumerate() {
            let cell_seed = (row_index * GLYPH_CELLS as usize + col_index) as u64;
            let hash = mix64(u64::from(code_point).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ cell_seed);
            *cell = hash % 100 < GLYPH_CELL_DENSITY_PERCENT;
        }
    }
    cells
}

fn mix64(mut value: u64) -> u64 {
    value = (value ^ (value >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    value = (value ^ (value >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    value ^ (value >> 31)
}

#[derive(Debug, Default)]
pub struct SpriteAtlas {
    sprites: Vec<Sprite>,
}

impl SpriteAtlas {
    pub fn add(&mut self, sprite: Sprite) -> SpriteId {
        let id = SpriteId(self.sprites.len() as u32);
        self.sprites.push(sprite);
        id
    }

    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

/// Everything a scene registers with the renderer while loading.
#[derive(Debug, Default)]
pub struct SceneAssets {
    pub sprites: SpriteAtlas,
    pub background: Option<Sprite>,
}
