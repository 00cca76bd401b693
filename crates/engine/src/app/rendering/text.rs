//! 3x5 bitmap font for HUD labels and menu prompts.

use super::renderer::write_pixel_rgba_clipped;

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: usize = 5;
const FIRST_GLYPH: u32 = ' ' as u32;

const GLYPH_ADVANCE: i32 = GLYPH_WIDTH + 1;
pub const LINE_HEIGHT: i32 = GLYPH_HEIGHT as i32;

type Glyph = [u8; GLYPH_HEIGHT];

const SPACE_GLYPH: Glyph = [0; GLYPH_HEIGHT];

// Printable ASCII, one row per glyph, most significant bit on the left.
const ASCII_GLYPHS: [Glyph; 95] = [
    [0b000, 0b000, 0b000, 0b000, 0b000], // space
    [0b010, 0b010, 0b010, 0b000, 0b010], // !
    [0b101, 0b101, 0b000, 0b000, 0b000], // "
    [0b101, 0b111, 0b101, 0b111, 0b101], // #
    [0b111, 0b110, 0b111, 0b011, 0b111], // $
    [0b101, 0b001, 0b010, 0b100, 0b101], // %
    [0b010, 0b101, 0b010, 0b101, 0b011], // &
    [0b010, 0b010, 0b000, 0b000, 0b000], // '
    [0b001, 0b010, 0b010, 0b010, 0b001], // (
    [0b100, 0b010, 0b010, 0b010, 0b100], // )
    [0b000, 0b101, 0b010, 0b101, 0b000], // *
    [0b000, 0b010, 0b111, 0b010, 0b000], // +
    [0b000, 0b000, 0b000, 0b010, 0b100], // ,
    [0b000, 0b000, 0b111, 0b000, 0b000], // -
    [0b000, 0b000, 0b000, 0b000, 0b010], // .
    [0b001, 0b001, 0b010, 0b100, 0b100], // /
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b111, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b010, 0b010, 0b010], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
    [0b000, 0b010, 0b000, 0b010, 0b000], // :
    [0b000, 0b010, 0b000, 0b010, 0b100], // ;
    [0b001, 0b010, 0b100, 0b010, 0b001], // <
    [0b000, 0b111, 0b000, 0b111, 0b000], // =
    [0b100, 0b010, 0b001, 0b010, 0b100], // >
    [0b111, 0b001, 0b011, 0b000, 0b010], // ?
    [0b111, 0b101, 0b111, 0b100, 0b111], // @
    [0b010, 0b101, 0b111, 0b101, 0b101], // A
    [0b110, 0b101, 0b110, 0b101, 0b110], // B
    [0b111, 0b100, 0b100, 0b100, 0b111], // C
    [0b110, 0b101, 0b101, 0b101, 0b110], // D
    [0b111, 0b100, 0b110, 0b100, 0b111], // E
    [0b111, 0b100, 0b110, 0b100, 0b100], // F
    [0b111, 0b100, 0b101, 0b101, 0b111], // G
    [0b101, 0b101, 0b111, 0b101, 0b101], // H
    [0b111, 0b010, 0b010, 0b010, 0b111], // I
    [0b111, 0b001, 0b001, 0b101, 0b111], // J
    [0b101, 0b101, 0b110, 0b101, 0b101], // K
    [0b100, 0b100, 0b100, 0b100, 0b111], // L
    [0b101, 0b111, 0b111, 0b101, 0b101], // M
    [0b101, 0b111, 0b111, 0b111, 0b101], // N
    [0b111, 0b101, 0b101, 0b101, 0b111], // O
    [0b110, 0b101, 0b110, 0b100, 0b100], // P
    [0b111, 0b101, 0b101, 0b111, 0b001], // Q
    [0b110, 0b101, 0b110, 0b101, 0b101], // R
    [0b111, 0b100, 0b111, 0b001, 0b111], // S
    [0b111, 0b010, 0b010, 0b010, 0b010], // T
    [0b101, 0b101, 0b101, 0b101, 0b111], // U
    [0b101, 0b101, 0b101, 0b101, 0b010], // V
    [0b101, 0b101, 0b111, 0b111, 0b101], // W
    [0b101, 0b101, 0b010, 0b101, 0b101], // X
    [0b101, 0b101, 0b010, 0b010, 0b010], // Y
    [0b111, 0b001, 0b010, 0b100, 0b111], // Z
    [0b110, 0b100, 0b100, 0b100, 0b110], // [
    [0b100, 0b100, 0b010, 0b001, 0b001], // \
    [0b011, 0b001, 0b001, 0b001, 0b011], // ]
    [0b010, 0b101, 0b000, 0b000, 0b000], // ^
    [0b000, 0b000, 0b000, 0b000, 0b111], // _
    [0b100, 0b010, 0b000, 0b000, 0b000], // `
    [0b000, 0b111, 0b001, 0b111, 0b111], // a
    [0b100, 0b100, 0b110, 0b101, 0b110], // b
    [0b000, 0b111, 0b100, 0b100, 0b111], // c
    [0b001, 0b001, 0b111, 0b101, 0b111], // d
    [0b000, 0b111, 0b110, 0b100, 0b111], // e
    [0b011, 0b100, 0b110, 0b100, 0b100], // f
    [0b000, 0b111, 0b101, 0b111, 0b001], // g
    [0b100, 0b100, 0b110, 0b101, 0b101], // h
    [0b010, 0b000, 0b010, 0b010, 0b010], // i
    [0b001, 0b000, 0b001, 0b101, 0b010], // j
    [0b100, 0b101, 0b110, 0b101, 0b101], // k
    [0b100, 0b100, 0b100, 0b100, 0b111], // l
    [0b000, 0b110, 0b111, 0b101, 0b101], // m
    [0b000, 0b110, 0b101, 0b101, 0b101], // n
    [0b000, 0b111, 0b101, 0b101, 0b111], // o
    [0b000, 0b110, 0b101, 0b110, 0b100], // p
    [0b000, 0b111, 0b101, 0b111, 0b001], // q
    [0b000, 0b110, 0b101, 0b100, 0b100], // r
    [0b000, 0b111, 0b110, 0b001, 0b111], // s
    [0b010, 0b111, 0b010, 0b010, 0b011], // t
    [0b000, 0b101, 0b101, 0b101, 0b111], // u
    [0b000, 0b101, 0b101, 0b101, 0b010], // v
    [0b000, 0b101, 0b101, 0b111, 0b010], // w
    [0b000, 0b101, 0b010, 0b010, 0b101], // x
    [0b000, 0b101, 0b101, 0b111, 0b001], // y
    [0b000, 0b111, 0b001, 0b010, 0b111], // z
    [0b011, 0b010, 0b110, 0b010, 0b011], // {
    [0b010, 0b010, 0b010, 0b010, 0b010], // |
    [0b110, 0b010, 0b011, 0b010, 0b110], // }
    [0b000, 0b011, 0b110, 0b000, 0b000], // ~
];

fn glyph_for(ch: char) -> Option<Glyph> {
    let index = (ch as u32).checked_sub(FIRST_GLYPH)?;
    ASCII_GLYPHS.get(index as usize).copied()
}

/// Width in pixels of `text`, without the gap after the last glyph.
pub fn text_width(text: &str) -> i32 {
    let count = text.chars().count() as i32;
    if count == 0 {
        return 0;
    }
    count * GLYPH_ADVANCE - 1
}

/// Unknown characters draw as blanks. Pixels outside the buffer are skipped.
pub(super) fn draw_text_clipped(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    mut x: i32,
    y: i32,
    text: &str,
    color: [u8; 4],
) {
    if width == 0 || height == 0 {
        return;
    }
    for ch in text.chars() {
        let glyph = glyph_for(ch).unwrap_or(SPACE_GLYPH);
        draw_glyph_clipped(buffer, width, height, x, y, glyph, color);
        x += GLYPH_ADVANCE;
    }
}

fn draw_glyph_clipped(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    glyph: Glyph,
    color: [u8; 4],
) {
    for (row, bits) in glyph.iter().enumerate() {
        let pixel_y = y + row as i32;
        if pixel_y < 0 || pixel_y >= height as i32 {
            continue;
        }
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            write_pixel_rgba_clipped(buffer, width as usize, x + col, pixel_y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn lit_pixels(buffer: &[u8]) -> usize {
        buffer.chunks_exact(4).filter(|px| *px == WHITE).count()
    }

    #[test]
    fn every_printable_ascii_char_has_a_glyph() {
        for code in 32u8..=126u8 {
            let ch = char::from(code);
            assert!(glyph_for(ch).is_some(), "missing glyph for '{ch}'");
        }
        assert!(glyph_for('\u{7f}').is_none());
        assert!(glyph_for('\n').is_none());
    }

    #[test]
    fn digits_and_separator_draw_expected_rows() {
        assert_eq!(glyph_for('1'), Some([0b010, 0b110, 0b010, 0b010, 0b111]));
        assert_eq!(glyph_for('/'), Some([0b001, 0b001, 0b010, 0b100, 0b100]));
        assert_eq!(glyph_for(' '), Some(SPACE_GLYPH));
    }

    #[test]
    fn text_width_counts_advances() {
        assert_eq!(text_width(""), 0);
        assert_eq!(text_width("A"), 3);
        assert_eq!(text_width("10 / 10"), 27);
    }

    #[test]
    fn glyph_pixels_land_at_origin() {
        let mut buffer = vec![0u8; 8 * 8 * 4];
        draw_text_clipped(&mut buffer, 8, 8, 1, 1, "-", WHITE);
        let offset = |x: usize, y: usize| (y * 8 + x) * 4;
        assert_eq!(&buffer[offset(1, 3)..offset(1, 3) + 4], &WHITE);
        assert_eq!(&buffer[offset(3, 3)..offset(3, 3) + 4], &WHITE);
        assert_eq!(lit_pixels(&buffer), 3);
    }

    #[test]
    fn unknown_characters_draw_nothing() {
        let mut buffer = vec![0u8; 16 * 16 * 4];
        draw_text_clipped(&mut buffer, 16, 16, 0, 0, "\u{1f642}", WHITE);
        assert!(buffer.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn text_is_clipped_at_every_edge() {
        let mut buffer = vec![0u8; 4 * 4 * 4];
        draw_text_clipped(&mut buffer, 4, 4, -2, -2, "PAUSED", WHITE);
        draw_text_clipped(&mut buffer, 4, 4, 3, 3, "PAUSED", WHITE);
        draw_text_clipped(&mut buffer, 4, 4, 64, 64, "PAUSED", WHITE);
        assert_eq!(buffer.len(), 4 * 4 * 4);

        let mut tiny = vec![0u8; 4];
        draw_text_clipped(&mut tiny, 1, 1, 0, 0, "8", WHITE);
        assert_eq!(tiny, WHITE.to_vec());
    }
}
