// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// etikett-label: EPL2 label program encoder.
//
// Accumulates printer commands for one label at a time into a byte buffer.
// Pure and deterministic: no I/O, and no input is ever rejected. Numeric
// arguments are clamped to what the printer firmware accepts.

pub mod barcode;
pub mod encoder;
pub mod font;
pub mod geometry;
pub mod qr;

pub use barcode::BarcodeType;
pub use encoder::{BarcodeOptions, LabelEncoder, LabelSetup, MAX_QR_WIDTH, TextOptions};
pub use font::Dpi;
pub use geometry::{LineType, Quadrant, Rect, Size};
pub use qr::{QrBitmapEncoder, QrCodeBitmapEncoder, QrErrorCorrection, QrMode};
