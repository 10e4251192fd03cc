use super::draw::write_pixel_rgba_clipped;

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;

/// Horizontal distance between glyph origins at `scale`.
pub(crate) const fn glyph_advance(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale
}

pub(crate) const fn line_advance(scale: i32) -> i32 {
    (GLYPH_HEIGHT + 2) * scale
}

/// Packs five 3-bit rows, top row in the high bits.
const fn pack(rows: [u16; 5]) -> u16 {
    (rows[0] << 12) | (rows[1] << 9) | (rows[2] << 6) | (rows[3] << 3) | rows[4]
}

/// Glyph bitmap for `ch`. Lowercase shares the uppercase shapes. Characters
/// outside printable ASCII have no glyph.
pub(crate) fn glyph_bits(ch: char) -> Option<u16> {
    let bits = match ch.to_ascii_uppercase() {
        ' ' => 0,
        'A' => pack([0b010, 0b101, 0b111, 0b101, 0b101]),
        'B' => pack([0b110, 0b101, 0b110, 0b101, 0b110]),
        'C' => pack([0b011, 0b100, 0b100, 0b100, 0b011]),
        'D' => pack([0b110, 0b101, 0b101, 0b101, 0b110]),
        'E' => pack([0b111, 0b100, 0b110, 0b100, 0b111]),
        'F' => pack([0b111, 0b100, 0b110, 0b100, 0b100]),
        'G' => pack([0b011, 0b100, 0b101, 0b101, 0b011]),
        'H' => pack([0b101, 0b101, 0b111, 0b101, 0b101]),
        'I' => pack([0b111, 0b010, 0b010, 0b010, 0b111]),
        'J' => pack([0b001, 0b001, 0b001, 0b101, 0b010]),
        'K' => pack([0b101, 0b101, 0b110, 0b101, 0b101]),
        'L' => pack([0b100, 0b100, 0b100, 0b100, 0b111]),
        'M' => pack([0b101, 0b111, 0b111, 0b101, 0b101]),
        'N' => pack([0b110, 0b101, 0b101, 0b101, 0b101]),
        'O' => pack([0b010, 0b101, 0b101, 0b101, 0b010]),
        'P' => pack([0b110, 0b101, 0b110, 0b100, 0b100]),
        'Q' => pack([0b010, 0b101, 0b101, 0b110, 0b011]),
        'R' => pack([0b110, 0b101, 0b110, 0b101, 0b101]),
        'S' => pack([0b011, 0b100, 0b010, 0b001, 0b110]),
        'T' => pack([0b111, 0b010, 0b010, 0b010, 0b010]),
        'U' => pack([0b101, 0b101, 0b101, 0b101, 0b111]),
        'V' => pack([0b101, 0b101, 0b101, 0b101, 0b010]),
        'W' => pack([0b101, 0b101, 0b111, 0b111, 0b101]),
        'X' => pack([0b101, 0b101, 0b010, 0b101, 0b101]),
        'Y' => pack([0b101, 0b101, 0b010, 0b010, 0b010]),
        'Z' => pack([0b111, 0b001, 0b010, 0b100, 0b111]),
        '0' => pack([0b111, 0b101, 0b101, 0b101, 0b111]),
        '1' => pack([0b010, 0b110, 0b010, 0b010, 0b111]),
        '2' => pack([0b110, 0b001, 0b010, 0b100, 0b111]),
        '3' => pack([0b110, 0b001, 0b010, 0b001, 0b110]),
        '4' => pack([0b101, 0b101, 0b111, 0b001, 0b001]),
        '5' => pack([0b111, 0b100, 0b110, 0b001, 0b110]),
        '6' => pack([0b011, 0b100, 0b111, 0b101, 0b111]),
        '7' => pack([0b111, 0b001, 0b010, 0b010, 0b010]),
        '8' => pack([0b111, 0b101, 0b111, 0b101, 0b111]),
        '9' => pack([0b111, 0b101, 0b111, 0b001, 0b110]),
        '.' => pack([0b000, 0b000, 0b000, 0b000, 0b010]),
        ',' => pack([0b000, 0b000, 0b000, 0b010, 0b100]),
        ':' => pack([0b000, 0b010, 0b000, 0b010, 0b000]),
        ';' => pack([0b000, 0b010, 0b000, 0b010, 0b100]),
        '!' => pack([0b010, 0b010, 0b010, 0b000, 0b010]),
        '?' => pack([0b110, 0b001, 0b010, 0b000, 0b010]),
        '-' => pack([0b000, 0b000, 0b111, 0b000, 0b000]),
        '_' => pack([0b000, 0b000, 0b000, 0b000, 0b111]),
        '/' => pack([0b001, 0b001, 0b010, 0b100, 0b100]),
        '\\' => pack([0b100, 0b100, 0b010, 0b001, 0b001]),
        '(' => pack([0b001, 0b010, 0b010, 0b010, 0b001]),
        ')' => pack([0b100, 0b010, 0b010, 0b010, 0b100]),
        '[' => pack([0b110, 0b100, 0b100, 0b100, 0b110]),
        ']' => pack([0b011, 0b001, 0b001, 0b001, 0b011]),
        '\'' => pack([0b010, 0b010, 0b000, 0b000, 0b000]),
        '"' => pack([0b101, 0b101, 0b000, 0b000, 0b000]),
        '+' => pack([0b000, 0b010, 0b111, 0b010, 0b000]),
        '=' => pack([0b000, 0b111, 0b000, 0b111, 0b000]),
        '@' => pack([0b010, 0b101, 0b111, 0b100, 0b011]),
        '#' => pack([0b101, 0b111, 0b101, 0b111, 0b101]),
        '&' => pack([0b010, 0b101, 0b010, 0b101, 0b011]),
        '%' => pack([0b101, 0b001, 0b010, 0b100, 0b101]),
        '*' => pack([0b101, 0b010, 0b101, 0b000, 0b000]),
        '<' => pack([0b001, 0b010, 0b100, 0b010, 0b001]),
        '>' => pack([0b100, 0b010, 0b001, 0b010, 0b100]),
        '|' => pack([0b010, 0b010, 0b010, 0b010, 0b010]),
        other if other.is_ascii_graphic() => pack([0b111, 0b101, 0b101, 0b101, 0b111]),
        _ => return None,
    };
    Some(bits)
}

/// Drops characters the font cannot draw (emoji, accents) and collapses the
/// whitespace left behind.
pub(crate) fn printable_text(text: &str) -> String {
    text.chars()
        .filter(|ch| glyph_bits(*ch).is_some() || ch.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn text_width_px(text: &str, scale: i32) -> i32 {
    let drawable = text.chars().filter(|ch| glyph_bits(*ch).is_some()).count() as i32;
    drawable * glyph_advance(scale)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_text(
    frame: &mut [u8],
    width: u32,
    height: u32,
    mut x: i32,
    y: i32,
    text: &str,
    scale: i32,
    color: [u8; 4],
) {
    if width == 0 || height == 0 || scale <= 0 {
        return;
    }
    for ch in text.chars() {
        let Some(bits) = glyph_bits(ch) else {
            continue;
        };
        draw_glyph(frame, width, x, y, bits, scale, color);
        x += glyph_advance(scale);
    }
}

fn draw_glyph(frame: &mut [u8], width: u32, x: i32, y: i32, bits: u16, scale: i32, color: [u8; 4]) {
    for row in 0..GLYPH_HEIGHT {
        for col in 0..GLYPH_WIDTH {
            let bit = 14 - (row * GLYPH_WIDTH + col);
            if bits & (1 << bit) == 0 {
                continue;
            }
            for sy in 0..scale {
                for sx in 0..scale {
                    write_pixel_rgba_clipped(
                        frame,
                        width as usize,
                        x + col * scale + sx,
                        y + row * scale + sy,
                        color,
                    );
                }
            }
        }
    }
}

/// Greedy word wrap at `max_chars` columns. Words longer than a line are
/// split.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in printable_text(text).split(' ').filter(|word| !word.is_empty()) {
        let mut word = word;
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let (head, tail) = word.split_at(max_chars);
            lines.push(head.to_string());
            word = tail;
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() {
            word.len()
        } else {
            current.len() + 1 + word.len()
        };
        if needed > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_ascii_has_glyphs() {
        for ch in ' '..='~' {
            assert!(glyph_bits(ch).is_some(), "missing glyph for {ch:?}");
        }
        assert_eq!(glyph_bits('a'), glyph_bits('A'));
        assert_eq!(glyph_bits('🚀'), None);
    }

    #[test]
    fn glyph_bits_place_top_row_high() {
        let t = glyph_bits('T').expect("glyph");
        assert_eq!(t >> 12, 0b111);
        assert_eq!(t & 0b111, 0b010);
    }

    #[test]
    fn printable_text_strips_emoji() {
        assert_eq!(printable_text("🚀 Projects"), "Projects");
        assert_eq!(printable_text("Gym  💪 time"), "Gym time");
        assert_eq!(text_width_px("AB", 2), 2 * glyph_advance(2));
    }

    #[test]
    fn wrap_breaks_on_words_and_splits_long_ones() {
        assert_eq!(
            wrap_text("Years of crafting digital solutions", 12),
            vec!["Years of", "crafting", "digital", "solutions"]
        );
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn drawing_is_clipped_at_edges() {
        let mut frame = vec![0u8; 8 * 8 * 4];
        draw_text(&mut frame, 8, 8, -5, -5, "HELLO", 2, [255; 4]);
        draw_text(&mut frame, 8, 8, 6, 6, "HELLO", 2, [255; 4]);
        draw_text(&mut frame, 0, 0, 0, 0, "HELLO", 2, [255; 4]);
        assert!(frame.iter().any(|byte| *byte == 255));
    }
}
