// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resident font metrics for EPL2 printers.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Printer resolution. Only the two resolutions EPL2 printers ship with are
/// modelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dpi {
    #[default]
    Dpi203,
    Dpi300,
}

impl Dpi {
    /// Snap a dots-per-inch value: anything below 300 is a 203 dpi printer.
    pub fn from_dots_per_inch(dpi: u32) -> Self {
        if dpi < 300 { Self::Dpi203 } else { Self::Dpi300 }
    }

    pub fn dots_per_inch(self) -> u32 {
        match self {
            Self::Dpi203 => 203,
            Self::Dpi300 => 300,
        }
    }
}

/// Cell size of fonts 1-5 at 203 dpi.
const CELLS_203: [Size; 5] = [
    Size::new(10, 14),
    Size::new(12, 18),
    Size::new(14, 22),
    Size::new(16, 26),
    Size::new(34, 50),
];

/// Cell size of fonts 1-5 at 300 dpi.
const CELLS_300: [Size; 5] = [
    Size::new(14, 22),
    Size::new(18, 30),
    Size::new(22, 38),
    Size::new(26, 46),
    Size::new(50, 82),
];

/// Numeric-only fonts 6 and 7 share one cell size at both resolutions.
const NUMERIC_CELL: Size = Size::new(16, 21);

/// Size of one unscaled character cell, or 0×0 for an unknown font.
pub fn char_cell(font_size: i32, dpi: Dpi) -> Size {
    match font_size {
        1..=5 => {
            let table = match dpi {
                Dpi::Dpi203 => &CELLS_203,
                Dpi::Dpi300 => &CELLS_300,
            };
            table[(font_size - 1) as usize]
        }
        6 | 7 => NUMERIC_CELL,
        _ => Size::default(),
    }
}

/// Unrotated size of a single line of `text`.
pub fn text_size(text: &str, font_size: i32, h_scale: i32, v_scale: i32, dpi: Dpi) -> Size {
    let cell = char_cell(font_size, dpi);
    let chars = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
    Size::new(
        cell.width.saturating_mul(h_scale).saturating_mul(chars),
        cell.height.saturating_mul(v_scale),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpi_snaps_to_supported_values() {
        assert_eq!(Dpi::from_dots_per_inch(0), Dpi::Dpi203);
        assert_eq!(Dpi::from_dots_per_inch(203), Dpi::Dpi203);
        assert_eq!(Dpi::from_dots_per_inch(299), Dpi::Dpi203);
        assert_eq!(Dpi::from_dots_per_inch(300), Dpi::Dpi300);
        assert_eq!(Dpi::from_dots_per_inch(600), Dpi::Dpi300);
    }

    #[test]
    fn cell_table_matches_firmware() {
        assert_eq!(char_cell(1, Dpi::Dpi203), Size::new(10, 14));
        assert_eq!(char_cell(5, Dpi::Dpi203), Size::new(34, 50));
        assert_eq!(char_cell(1, Dpi::Dpi300), Size::new(14, 22));
        assert_eq!(char_cell(5, Dpi::Dpi300), Size::new(50, 82));
        assert_eq!(char_cell(6, Dpi::Dpi300), Size::new(16, 21));
        assert_eq!(char_cell(7, Dpi::Dpi203), Size::new(16, 21));
        assert_eq!(char_cell(0, Dpi::Dpi203), Size::default());
        assert_eq!(char_cell(8, Dpi::Dpi300), Size::default());
    }

    #[test]
    fn text_size_scales_per_character() {
        let size = text_size("ABCD", 3, 2, 3, Dpi::Dpi203);
        assert_eq!(size, Size::new(14 * 2 * 4, 22 * 3));
    }

    #[test]
    fn height_ignores_content() {
        assert_eq!(
            text_size("", 4, 1, 2, Dpi::Dpi203).height,
            text_size("long line of text", 4, 1, 2, Dpi::Dpi203).height
        );
    }

    #[test]
    fn huge_scales_saturate() {
        let size = text_size("ABCD", 5, i32::MAX, i32::MAX, Dpi::Dpi300);
        assert_eq!(size, Size::new(i32::MAX, i32::MAX));
    }
}
