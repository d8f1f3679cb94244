use ratatui::style::Color;

/// Cap colors, assigned to countries by list position
pub const PALETTE: [Color; 16] = [
    Color::Rgb(0xf4, 0x43, 0x36),
    Color::Rgb(0xe9, 0x1e, 0x63),
    Color::Rgb(0x9c, 0x27, 0xb0),
    Color::Rgb(0x67, 0x3a, 0xb7),
    Color::Rgb(0x3f, 0x51, 0xb5),
    Color::Rgb(0x21, 0x96, 0xf3),
    Color::Rgb(0x03, 0xa9, 0xf4),
    Color::Rgb(0x00, 0xbc, 0xd4),
    Color::Rgb(0x00, 0x96, 0x88),
    Color::Rgb(0x4c, 0xaf, 0x50),
    Color::Rgb(0x8b, 0xc3, 0x4a),
    Color::Rgb(0xcd, 0xdc, 0x39),
    Color::Rgb(0xff, 0xeb, 0x3b),
    Color::Rgb(0xff, 0xc1, 0x07),
    Color::Rgb(0xff, 0x98, 0x00),
    Color::Rgb(0xff, 0x57, 0x22),
];

/// Country border color
pub const STROKE: Color = Color::Rgb(0x6b, 0x72, 0x80);

/// Globe rim and graticule
pub const SPHERE: Color = Color::Rgb(0x1e, 0x3a, 0x8a);
pub const GRATICULE: Color = Color::Rgb(0x1f, 0x29, 0x37);

pub const STARS: Color = Color::DarkGray;

/// Palette slot for the country at `position` in the loaded list
#[inline(always)]
pub fn slot(position: usize) -> u8 {
    (position % PALETTE.len()) as u8
}

/// Color of a palette slot, wrapping out-of-range slots
#[inline(always)]
pub fn slot_color(slot: u8) -> Color {
    PALETTE[slot as usize % PALETTE.len()]
}

/// Cap color for the country at `position` in the loaded list
#[inline(always)]
pub fn cap_color(position: usize) -> Color {
    slot_color(slot(position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_slots() {
        assert_eq!(cap_color(0), Color::Rgb(0xf4, 0x43, 0x36));
        assert_eq!(cap_color(15), Color::Rgb(0xff, 0x57, 0x22));
        assert_eq!(cap_color(16), cap_color(0));
    }

    #[test]
    fn test_neighbours_differ() {
        for i in 0..PALETTE.len() {
            assert_ne!(cap_color(i), cap_color(i + 1));
        }
    }

    proptest! {
        #[test]
        fn prop_wraps_at_palette_size(position in 0usize..100_000) {
            prop_assert_eq!(cap_color(position), cap_color(position + PALETTE.len()));
        }

        #[test]
        fn prop_slot_color_matches_cap_color(position in 0usize..100_000) {
            prop_assert_eq!(slot_color(slot(position)), cap_color(position));
        }

        #[test]
        fn prop_slot_in_range(position in any::<usize>()) {
            prop_assert!((slot(position) as usize) < PALETTE.len());
        }
    }
}
