//! A 3x5 bitmap font covering digits, uppercase letters and the handful of
//! punctuation the HUD needs. Lowercase input is drawn with uppercase rows.

pub const GLYPH_WIDTH: i32 = 3;
pub const GLYPH_HEIGHT: i32 = 5;
const GLYPH_ADVANCE: i32 = GLYPH_WIDTH + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

const PUNCTUATION: [(char, [u8; 5]); 6] = [
    ('!', [0b010, 0b010, 0b010, 0b000, 0b010]),
    (',', [0b000, 0b000, 0b000, 0b010, 0b100]),
    ('-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    ('.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    ('/', [0b001, 0b001, 0b010, 0b100, 0b100]),
    (':', [0b000, 0b010, 0b000, 0b010, 0b000]),
];

const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

const LETTERS: [[u8; 5]; 26] = [
    [0b010, 0b101, 0b111, 0b101, 0b101],
    [0b110, 0b101, 0b110, 0b101, 0b110],
    [0b111, 0b100, 0b100, 0b100, 0b111],
    [0b110, 0b101, 0b101, 0b101, 0b110],
    [0b111, 0b100, 0b110, 0b100, 0b111],
    [0b111, 0b100, 0b110, 0b100, 0b100],
    [0b111, 0b100, 0b101, 0b101, 0b111],
    [0b101, 0b101, 0b111, 0b101, 0b101],
    [0b111, 0b010, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b001, 0b101, 0b111],
    [0b101, 0b101, 0b110, 0b101, 0b101],
    [0b100, 0b100, 0b100, 0b100, 0b111],
    [0b101, 0b111, 0b111, 0b101, 0b101],
    [0b101, 0b111, 0b111, 0b111, 0b101],
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b110, 0b101, 0b110, 0b100, 0b100],
    [0b111, 0b101, 0b101, 0b111, 0b001],
    [0b110, 0b101, 0b110, 0b101, 0b101],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b010, 0b010, 0b010, 0b010],
    [0b101, 0b101, 0b101, 0b101, 0b111],
    [0b101, 0b101, 0b101, 0b101, 0b010],
    [0b101, 0b101, 0b111, 0b111, 0b101],
    [0b101, 0b101, 0b010, 0b101, 0b101],
    [0b101, 0b101, 0b010, 0b010, 0b010],
    [0b111, 0b001, 0b010, 0b100, 0b111],
];

fn glyph_rows(ch: char) -> Option<[u8; 5]> {
    let upper = ch.to_ascii_uppercase();
    match upper {
        '0'..='9' => Some(DIGITS[(upper as u8 - b'0') as usize]),
        'A'..='Z' => Some(LETTERS[(upper as u8 - b'A') as usize]),
        _ => PUNCTUATION
            .iter()
            .find(|(candidate, _)| *candidate == upper)
            .map(|(_, rows)| *rows),
    }
}

/// Width in pixels of `text` at an integer pixel scale. Unknown characters
/// still take up one advance so spacing stays stable.
pub fn text_width(text: &str, scale: u32) -> i32 {
    let count = text.chars().count() as i32;
    if count == 0 {
        return 0;
    }
    (count * GLYPH_ADVANCE - 1) * scale.max(1) as i32
}

pub fn aligned_left(text: &str, x: i32, scale: u32, align: TextAlign) -> i32 {
    let width = text_width(text, scale);
    match align {
        TextAlign::Left => x,
        TextAlign::Center => x - width / 2,
        TextAlign::Right => x - width,
    }
}

/// Visits every lit pixel of `text` with its top-left corner at (`left`, `top`).
pub fn for_each_text_pixel(
    text: &str,
    left: i32,
    top: i32,
    scale: u32,
    mut plot: impl FnMut(i32, i32),
) {
    let scale = scale.max(1) as i32;
    for (index, ch) in text.chars().enumerate() {
        let Some(rows) = glyph_rows(ch) else {
            continue;
        };
        let glyph_left = left + index as i32 * GLYPH_ADVANCE * scale;
        for (row_index, row) in rows.iter().enumerate() {
            for column in 0..GLYPH_WIDTH {
                if row & (0b100 >> column) == 0 {
                    continue;
                }
                let cell_x = glyph_left + column * scale;
                let cell_y = top + row_index as i32 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        plot(cell_x + dx, cell_y + dy);
                    }
                }
            }
        }
    }
}
