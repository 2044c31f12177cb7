// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QR code bitmaps for the EPL2 `GW` (direct graphic write) command.
//
// The encoder only needs a square 1-bit bitmap; how it is produced sits
// behind `QrBitmapEncoder`. `QrCodeBitmapEncoder` is the default, backed by
// the `qrcode` crate.

use qrcode::{Color, EcLevel, QrCode};
use thiserror::Error;

/// Data mode requested from the QR encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrMode {
    Numeric,
    Alphanumeric,
    /// 8-bit byte data; what labels use.
    Character,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrErrorCorrection {
    Low,
    Medium,
    Quartile,
    High,
}

impl From<QrErrorCorrection> for EcLevel {
    fn from(level: QrErrorCorrection) -> Self {
        match level {
            QrErrorCorrection::Low => EcLevel::L,
            QrErrorCorrection::Medium => EcLevel::M,
            QrErrorCorrection::Quartile => EcLevel::Q,
            QrErrorCorrection::High => EcLevel::H,
        }
    }
}

#[derive(Debug, Error)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(String),
}

/// Produces the raw `GW` payload for a square QR bitmap.
///
/// The result holds `width` rows of `(width + 7) / 8` bytes, most significant
/// bit first. A `0` bit prints a black dot.
pub trait QrBitmapEncoder: Send + Sync {
    fn generate_epl_binary_data(
        &self,
        data: &str,
        width: u32,
        mode: QrMode,
        error_correction: QrErrorCorrection,
    ) -> Result<Vec<u8>, QrError>;
}

/// Default encoder built on the `qrcode` crate.
///
/// The crate picks segment modes itself, so `mode` only documents intent.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrCodeBitmapEncoder;

impl QrBitmapEncoder for QrCodeBitmapEncoder {
    fn generate_epl_binary_data(
        &self,
        data: &str,
        width: u32,
        _mode: QrMode,
        error_correction: QrErrorCorrection,
    ) -> Result<Vec<u8>, QrError> {
        let code = QrCode::with_error_correction_level(data.as_bytes(), error_correction.into())
            .map_err(|e| QrError::Encode(e.to_string()))?;
        let modules = code.width() as u32;
        let colors = code.to_colors();
        Ok(pack_bitmap(width, modules, |mx, my| {
            colors[(my * modules + mx) as usize] == Color::Dark
        }))
    }
}

/// Scale a `modules`×`modules` matrix onto a `width`×`width` bitmap, centred.
pub(crate) fn pack_bitmap(width: u32, modules: u32, is_dark: impl Fn(u32, u32) -> bool) -> Vec<u8> {
    let row_bytes = width.div_ceil(8) as usize;
    let mut bitmap = vec![0xFFu8; row_bytes * width as usize];
    if modules == 0 {
        return bitmap;
    }

    let scale = (width / modules).max(1);
    let offset = width.saturating_sub(modules * scale) / 2;

    for py in 0..width {
        let Some(my) = module_at(py, offset, scale, modules) else {
            continue;
        };
        for px in 0..width {
            let Some(mx) = module_at(px, offset, scale, modules) else {
                continue;
            };
            if is_dark(mx, my) {
                let byte = py as usize * row_bytes + (px / 8) as usize;
                bitmap[byte] &= !(0x80 >> (px % 8));
            }
        }
    }
    bitmap
}

fn module_at(dot: u32, offset: u32, scale: u32, modules: u32) -> Option<u32> {
    let module = dot.checked_sub(offset)? / scale;
    (module < modules).then_some(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_has_one_row_per_dot() {
        let bitmap = QrCodeBitmapEncoder
            .generate_epl_binary_data("hello", 200, QrMode::Character, QrErrorCorrection::Quartile)
            .unwrap();
        assert_eq!(bitmap.len(), 25 * 200);
    }

    #[test]
    fn bitmap_contains_black_and_white() {
        let bitmap = QrCodeBitmapEncoder
            .generate_epl_binary_data("https://example.com", 96, QrMode::Character, QrErrorCorrection::Quartile)
            .unwrap();
        assert!(bitmap.iter().any(|b| *b != 0xFF));
        assert!(bitmap.iter().any(|b| *b != 0x00));
    }

    #[test]
    fn pack_scales_and_centres() {
        // 2x2 checkerboard on a 8x8 canvas: each module becomes 4x4 dots.
        let bitmap = pack_bitmap(8, 2, |x, y| (x + y) % 2 == 0);
        assert_eq!(bitmap.len(), 8);
        assert_eq!(bitmap[0], 0b0000_1111);
        assert_eq!(bitmap[3], 0b0000_1111);
        assert_eq!(bitmap[4], 0b1111_0000);
        assert_eq!(bitmap[7], 0b1111_0000);
    }

    #[test]
    fn padding_bits_stay_white() {
        let bitmap = pack_bitmap(4, 1, |_, _| true);
        assert_eq!(bitmap, vec![0b0000_1111; 4]);
    }
}
