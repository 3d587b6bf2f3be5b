//! Built-in 5x7 bitmap font
//!
//! Each glyph is seven rows of five bits (bit 4 is the leftmost column),
//! laid out in a 6x8 cell so consecutive glyphs get one column and one row
//! of spacing. Lower case folds to upper case; characters without a glyph
//! draw as a hollow box.

use super::PixelBuffer;

/// Advance per character, in font pixels
pub const GLYPH_WIDTH: u32 = 6;
/// Line height, in font pixels
pub const GLYPH_HEIGHT: u32 = 8;
/// Rows that can carry ink
pub const GLYPH_ROWS: u32 = 7;

const BOX: [u8; 7] = [
    0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111,
];

/// Row bitmap for `ch`
pub fn get_glyph(ch: char) -> [u8; 7] {
    match ch.to_ascii_uppercase() {
        ' ' => [0; 7],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '"' => [0b01010, 0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000],
        '#' => [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010],
        '%' => [0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011],
        '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
        '\'' => [0b01100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '*' => [0b00000, 0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0b00000],
        '+' => [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        '/' => [0b00000, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b00000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        ';' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b00100, 0b01000],
        '<' => [0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010],
        '=' => [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000],
        '>' => [0b01000, 0b00100, 0b00010, 0b00001, 0b00010, 0b00100, 0b01000],
        '?' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
        '@' => [0b01110, 0b10001, 0b00001, 0b01101, 0b10101, 0b10101, 0b01110],
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
        _ => BOX,
    }
}

/// Ink width of `text` at `scale`, without trailing spacing
pub fn text_width_scaled(text: &str, scale: f32) -> f32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0.0;
    }
    (n * GLYPH_WIDTH - 1) as f32 * scale
}

/// Draw one glyph with its top-left corner at (x, y). Each font pixel
/// becomes a `scale` x `scale` block; fractional scales round block edges so
/// neighbouring blocks tile without gaps.
pub fn draw_char_scaled(
    buffer: &mut PixelBuffer,
    x: f32,
    y: f32,
    ch: char,
    r: u8,
    g: u8,
    b: u8,
    scale: f32,
) {
    let glyph = get_glyph(ch);
    for (row, bits) in glyph.iter().enumerate() {
        if *bits == 0 {
            continue;
        }
        let y0 = (y + row as f32 * scale).round() as i32;
        let y1 = (y + (row + 1) as f32 * scale).round() as i32;
        for col in 0..5u32 {
            if bits & (0b10000 >> col) == 0 {
                continue;
            }
            let x0 = (x + col as f32 * scale).round() as i32;
            let x1 = (x + (col + 1) as f32 * scale).round() as i32;
            if x1 > x0 && y1 > y0 {
                buffer.fill_rect(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32, r, g, b);
            }
        }
    }
}

/// Draw a string left to right starting at (x, y)
pub fn draw_text_scaled(
    buffer: &mut PixelBuffer,
    x: f32,
    y: f32,
    text: &str,
    r: u8,
    g: u8,
    b: u8,
    scale: f32,
) {
    let advance = GLYPH_WIDTH as f32 * scale;
    for (i, ch) in text.chars().enumerate() {
        draw_char_scaled(buffer, x + i as f32 * advance, y, ch, r, g, b, scale);
    }
}

/// Draw a string at 1:1 scale
pub fn draw_text(buffer: &mut PixelBuffer, x: i32, y: i32, text: &str, r: u8, g: u8, b: u8) {
    draw_text_scaled(buffer, x as f32, y as f32, text, r, g, b, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_case_folds() {
        assert_eq!(get_glyph('h'), get_glyph('H'));
    }

    #[test]
    fn test_unknown_glyph_is_box() {
        assert_eq!(get_glyph('\u{2603}'), BOX);
        assert_ne!(get_glyph('A'), BOX);
    }

    #[test]
    fn test_glyphs_fit_five_columns() {
        for ch in (' '..='~').chain(std::iter::once('?')) {
            for row in get_glyph(ch) {
                assert!(row < 0b100000, "glyph {:?} is wider than five columns", ch);
            }
        }
    }

    #[test]
    fn test_text_width_scaled() {
        assert_eq!(text_width_scaled("", 3.0), 0.0);
        assert_eq!(text_width_scaled("A", 1.0), 5.0);
        assert_eq!(text_width_scaled("AB", 2.0), 22.0);
    }

    #[test]
    fn test_draw_char_scaled_fills_blocks() {
        let mut buffer = PixelBuffer::with_size(20, 30);
        draw_char_scaled(&mut buffer, 0.0, 0.0, '1', 255, 0, 0, 3.0);
        // '1' has its top stroke in column 2, font pixel (2, 0) -> (6..9, 0..3)
        assert_eq!(buffer.alpha_at(6, 0), 255);
        assert_eq!(buffer.alpha_at(8, 2), 255);
        assert_eq!(buffer.alpha_at(0, 0), 0);
    }

    #[test]
    fn test_draw_text_advances() {
        let mut buffer = PixelBuffer::with_size(12, 8);
        draw_text(&mut buffer, 0, 0, "II", 255, 255, 255);
        // 'I' top row spans columns 1..=3; the second glyph starts at x = 6
        assert_eq!(buffer.alpha_at(1, 0), 255);
        assert_eq!(buffer.alpha_at(5, 0), 0);
        assert_eq!(buffer.alpha_at(7, 0), 255);
    }
}
