// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stateful EPL2 label builder.
//
// Each public call appends exactly one complete command line to the label
// buffer. Out-of-range arguments are clamped to the limits of the printer
// firmware instead of being rejected, because callers rely on every call
// succeeding.

use tracing::{debug, warn};

use crate::barcode::BarcodeType;
use crate::font::{self, Dpi};
use crate::geometry::{LineType, Quadrant, Rect, Size};
use crate::qr::{QrBitmapEncoder, QrCodeBitmapEncoder, QrErrorCorrection, QrMode};

/// Page setup emitted by [`LabelEncoder::start_label`]. Dot units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelSetup {
    pub width: u32,
    pub height: u32,
    pub speed: u32,
    pub density: u32,
    pub gap_length: u32,
}

impl Default for LabelSetup {
    fn default() -> Self {
        Self {
            width: 795,
            height: 1250,
            speed: 4,
            density: 10,
            gap_length: 24,
        }
    }
}

/// Optional arguments of [`LabelEncoder::add_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    pub font_size: i32,
    pub h_scale: i32,
    pub v_scale: i32,
    /// Degrees; reduced to a quadrant.
    pub rotation: i32,
    /// White on black.
    pub inverse: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            font_size: 4,
            h_scale: 1,
            v_scale: 1,
            rotation: 0,
            inverse: false,
        }
    }
}

/// Optional arguments of [`LabelEncoder::add_barcode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarcodeOptions {
    pub height: i32,
    /// Print the human readable line under the bars.
    pub print_readable: bool,
    pub narrow_width: i32,
    pub wide_width: i32,
    /// Degrees; reduced to a quadrant.
    pub rotation: i32,
}

impl Default for BarcodeOptions {
    fn default() -> Self {
        Self {
            height: 200,
            print_readable: true,
            narrow_width: 2,
            wide_width: 4,
            rotation: 0,
        }
    }
}

/// Font whose cell height is added under a barcode with a readable line.
const READABLE_FONT: i32 = 4;

/// Widest QR graphic accepted, in dots: eight inches at 300 dpi.
pub const MAX_QR_WIDTH: u32 = 2400;

/// Builds one EPL2 label program at a time.
pub struct LabelEncoder {
    buffer: Vec<u8>,
    dpi: Dpi,
    setup: LabelSetup,
    qr: Box<dyn QrBitmapEncoder>,
}

impl Default for LabelEncoder {
    fn default() -> Self {
        Self::new(203)
    }
}

impl std::fmt::Debug for LabelEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelEncoder")
            .field("dpi", &self.dpi)
            .field("setup", &self.setup)
            .field("buffer_len", &self.buffer.len())
            .finish()
    }
}

impl LabelEncoder {
    /// Create an encoder for a printer with the given resolution.
    /// Values below 300 select 203 dpi metrics.
    pub fn new(dpi: u32) -> Self {
        Self::with_qr_encoder(dpi, Box::new(QrCodeBitmapEncoder))
    }

    pub fn with_qr_encoder(dpi: u32, qr: Box<dyn QrBitmapEncoder>) -> Self {
        Self {
            buffer: Vec::new(),
            dpi: Dpi::from_dots_per_inch(dpi),
            setup: LabelSetup::default(),
            qr,
        }
    }

    pub fn dpi(&self) -> Dpi {
        self.dpi
    }

    /// Clear the buffer and emit the page setup for a new label.
    pub fn start_label(&mut self, setup: LabelSetup) {
        self.buffer.clear();
        self.setup = setup;
        debug!(
            width = setup.width,
            height = setup.height,
            dpi = self.dpi.dots_per_inch(),
            "starting label"
        );
        self.start_page();
    }

    /// Re-emit the page setup preamble, keeping the current dimensions.
    pub fn start_page(&mut self) {
        let s = self.setup;
        self.push_line("I8,A,001");
        self.push_line("OD");
        self.push_line(&format!("q{}", s.width));
        self.push_line(&format!("Q{},{}", s.height, s.gap_length));
        self.push_line(&format!("S{}", s.speed));
        self.push_line(&format!("D{}", s.density));
        self.push_line("JF");
    }

    /// Dimensions passed to the last [`LabelEncoder::start_label`].
    pub fn label_size(&self) -> Size {
        Size::new(
            i32::try_from(self.setup.width).unwrap_or(i32::MAX),
            i32::try_from(self.setup.height).unwrap_or(i32::MAX),
        )
    }

    /// Unrotated size of a single line of text at this encoder's resolution.
    pub fn text_size(&self, text: &str, font_size: i32, h_scale: i32, v_scale: i32) -> Size {
        font::text_size(text, font_size, h_scale, v_scale, self.dpi)
    }

    /// Append an `A` (ASCII text) command and return the area it covers.
    pub fn add_text(&mut self, text: &str, x: i32, y: i32, options: TextOptions) -> Rect {
        let mut font_size = options.font_size.clamp(1, 7);
        // Fonts 6 and 7 only contain digits.
        if font_size > 5 && text.parse::<i64>().is_err() {
            font_size = 5;
        }
        let mut h_scale = options.h_scale.clamp(1, 8);
        if h_scale == 7 {
            h_scale = 6;
        }
        let v_scale = options.v_scale.clamp(1, 9);
        let quadrant = Quadrant::from_degrees(options.rotation);

        self.push_line(&format!(
            "A{},{},{},{},{},{},{},\"{}\"",
            x,
            y,
            quadrant.index(),
            font_size,
            h_scale,
            v_scale,
            if options.inverse { 'R' } else { 'N' },
            escape(text)
        ));

        let size = self.text_size(text, font_size, h_scale, v_scale);
        quadrant.bounding_rect(x, y, size)
    }

    /// Append a `B` (barcode) command.
    ///
    /// The rendered width is only known to the printer, so the returned area
    /// runs to the label edge in the direction the bars extend.
    pub fn add_barcode(
        &mut self,
        data: &str,
        kind: BarcodeType,
        x: i32,
        y: i32,
        options: BarcodeOptions,
    ) -> Rect {
        let quadrant = Quadrant::from_degrees(options.rotation);

        self.push_line(&format!(
            "B{},{},{},{},{},{},{},{},\"{}\"",
            x,
            y,
            quadrant.index(),
            kind.type_code(),
            options.narrow_width,
            options.wide_width,
            options.height,
            if options.print_readable { 'B' } else { 'N' },
            escape(data)
        ));

        let mut height = options.height;
        if options.print_readable {
            height = height.saturating_add(font::char_cell(READABLE_FONT, self.dpi).height);
        }

        let label = self.label_size();
        match quadrant {
            Quadrant::Normal => Rect::new(x, y, label.width.saturating_sub(x), height),
            Quadrant::Rotated90 => Rect::new(
                x.saturating_sub(height),
                y,
                height,
                label.height.saturating_sub(y),
            ),
            Quadrant::Rotated180 => Rect::new(0, y.saturating_sub(height), x, height),
            Quadrant::Rotated270 => Rect::new(x, 0, height, y),
        }
    }

    /// Append a `GW` graphic holding a QR code of roughly `width` dots.
    ///
    /// `width` is capped at [`MAX_QR_WIDTH`]. Returns an empty rect at
    /// `(x, y)` and appends nothing when the data cannot be encoded.
    pub fn add_qr_code(&mut self, data: &str, x: i32, y: i32, width: u32) -> Rect {
        let width = width.min(MAX_QR_WIDTH);
        let width = width + (width + 8) % 8;
        let bitmap = match self.qr.generate_epl_binary_data(
            data,
            width,
            QrMode::Character,
            QrErrorCorrection::Quartile,
        ) {
            Ok(bitmap) => bitmap,
            Err(e) => {
                warn!(error = %e, len = data.len(), "QR code skipped");
                return Rect::new(x, y, 0, 0);
            }
        };

        let width_bytes = width.div_ceil(8);
        let header = format!("GW{x},{y},{width_bytes},{width},");
        self.buffer.extend_from_slice(header.as_bytes());
        self.buffer.extend_from_slice(&bitmap);
        self.buffer.push(b'\n');

        let side = i32::try_from(width).unwrap_or(i32::MAX);
        Rect::new(x, y, side, side)
    }

    /// Append a horizontal or vertical line (`LO`, `LW` or `LE`).
    pub fn add_line(&mut self, x: i32, y: i32, width: i32, height: i32, kind: LineType) -> Rect {
        self.push_line(&format!(
            "L{}{},{},{},{}",
            kind.command_letter(),
            x,
            y,
            width,
            height
        ));
        Rect::new(x, y, width, height)
    }

    /// Append a diagonal line (`LS`) of thickness `width`.
    pub fn add_diagonal_line(&mut self, x: i32, y: i32, end_x: i32, end_y: i32, width: i32) -> Rect {
        self.push_line(&format!("LS{x},{y},{width},{end_x},{end_y}"));
        let span = |a: i32, b: i32| i32::try_from(a.abs_diff(b)).unwrap_or(i32::MAX);
        Rect::new(
            x.min(end_x),
            y.min(end_y),
            span(x, end_x),
            span(y, end_y).saturating_add(width),
        )
    }

    /// Append `P<copies>`: print the buffered label.
    pub fn add_print_command(&mut self, copies: u32) {
        self.push_line(&format!("P{copies}"));
    }

    /// Append `N`: clear the printer's image buffer.
    pub fn add_clear_buffer_command(&mut self) {
        self.push_line("N");
    }

    /// The EPL2 program accumulated since the last `start_label`.
    pub fn label_data(&self) -> &[u8] {
        &self.buffer
    }

    fn push_line(&mut self, command: &str) {
        self.buffer.extend_from_slice(command.as_bytes());
        self.buffer.push(b'\n');
    }
}

/// Escape a value for embedding in a quoted command field.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::QrError;

    fn encoder() -> LabelEncoder {
        let mut encoder = LabelEncoder::new(203);
        encoder.start_label(LabelSetup::default());
        encoder
    }

    /// Lines appended after the seven preamble lines.
    fn commands(encoder: &LabelEncoder) -> Vec<String> {
        String::from_utf8_lossy(encoder.label_data())
            .lines()
            .skip(7)
            .map(str::to_string)
            .collect()
    }

    fn text_command(text: &str, options: TextOptions) -> String {
        let mut enc = encoder();
        enc.add_text(text, 10, 20, options);
        commands(&enc).remove(0)
    }

    #[test]
    fn preamble_with_defaults() {
        let enc = encoder();
        assert_eq!(
            enc.label_data(),
            b"I8,A,001\nOD\nq795\nQ1250,24\nS4\nD10\nJF\n"
        );
        assert_eq!(enc.label_size(), Size::new(795, 1250));
    }

    #[test]
    fn start_label_resets_buffer() {
        let mut enc = encoder();
        enc.add_text("first", 0, 0, TextOptions::default());
        enc.start_label(LabelSetup {
            width: 400,
            height: 300,
            speed: 2,
            density: 8,
            gap_length: 16,
        });
        assert_eq!(enc.label_data(), b"I8,A,001\nOD\nq400\nQ300,16\nS2\nD8\nJF\n");
        assert_eq!(enc.label_size(), Size::new(400, 300));
    }

    #[test]
    fn start_page_repeats_preamble() {
        let mut enc = encoder();
        enc.add_print_command(1);
        enc.start_page();
        let text = String::from_utf8_lossy(enc.label_data()).to_string();
        assert_eq!(text.matches("I8,A,001\n").count(), 2);
        assert!(text.ends_with("P1\nI8,A,001\nOD\nq795\nQ1250,24\nS4\nD10\nJF\n"));
    }

    #[test]
    fn text_command_layout() {
        assert_eq!(
            text_command("Hello", TextOptions::default()),
            "A10,20,0,4,1,1,N,\"Hello\""
        );
        assert_eq!(
            text_command(
                "Hello",
                TextOptions {
                    inverse: true,
                    rotation: 90,
                    ..TextOptions::default()
                }
            ),
            "A10,20,1,4,1,1,R,\"Hello\""
        );
    }

    #[test]
    fn font_size_is_clamped() {
        let low = TextOptions {
            font_size: -3,
            ..TextOptions::default()
        };
        assert_eq!(text_command("123", low), "A10,20,0,1,1,1,N,\"123\"");

        let high = TextOptions {
            font_size: 12,
            ..TextOptions::default()
        };
        assert_eq!(text_command("123", high), "A10,20,0,7,1,1,N,\"123\"");
    }

    #[test]
    fn numeric_fonts_fall_back_for_letters() {
        let options = TextOptions {
            font_size: 6,
            ..TextOptions::default()
        };
        assert_eq!(text_command("12AB", options), "A10,20,0,5,1,1,N,\"12AB\"");
        assert_eq!(text_command("1234", options), "A10,20,0,6,1,1,N,\"1234\"");
    }

    #[test]
    fn h_scale_skips_seven() {
        for (input, expected) in [(0, 1), (6, 6), (7, 6), (8, 8), (20, 8)] {
            let options = TextOptions {
                h_scale: input,
                ..TextOptions::default()
            };
            assert_eq!(
                text_command("x", options),
                format!("A10,20,0,4,{expected},1,N,\"x\"")
            );
        }
    }

    #[test]
    fn numeric_font_never_gets_h_scale_seven() {
        for font_size in [6, 7] {
            for h_scale in -2..12 {
                let mut enc = encoder();
                enc.add_text(
                    "42",
                    0,
                    0,
                    TextOptions {
                        font_size,
                        h_scale,
                        ..TextOptions::default()
                    },
                );
                let line = commands(&enc).remove(0);
                let scale: i32 = line.split(',').nth(4).unwrap().parse().unwrap();
                assert!((1..=8).contains(&scale) && scale != 7, "{line}");
            }
        }
    }

    #[test]
    fn v_scale_is_clamped() {
        let options = TextOptions {
            v_scale: 15,
            ..TextOptions::default()
        };
        assert_eq!(text_command("x", options), "A10,20,0,4,1,9,N,\"x\"");
    }

    #[test]
    fn rotation_is_periodic() {
        for rotation in [0, 90, 180, 270, 45] {
            let a = text_command(
                "abc",
                TextOptions {
                    rotation,
                    ..TextOptions::default()
                },
            );
            let b = text_command(
                "abc",
                TextOptions {
                    rotation: rotation + 360,
                    ..TextOptions::default()
                },
            );
            assert_eq!(a, b);
        }
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(
            text_command("a\"b", TextOptions::default()),
            "A10,20,0,4,1,1,N,\"a\\\"b\""
        );
        assert_eq!(
            text_command("C:\\labels", TextOptions::default()),
            "A10,20,0,4,1,1,N,\"C:\\\\labels\""
        );
    }

    #[test]
    fn text_rect_follows_quadrant() {
        let mut enc = encoder();
        // Font 2 at 203 dpi is 12x18 per character.
        let options = TextOptions {
            font_size: 2,
            ..TextOptions::default()
        };
        assert_eq!(enc.add_text("abc", 100, 200, options), Rect::new(100, 200, 36, 18));

        let rotated = |rotation| TextOptions { rotation, ..options };
        assert_eq!(
            enc.add_text("abc", 100, 200, rotated(90)),
            Rect::new(82, 200, 18, 36)
        );
        assert_eq!(
            enc.add_text("abc", 100, 200, rotated(180)),
            Rect::new(64, 182, 36, 18)
        );
        assert_eq!(
            enc.add_text("abc", 100, 200, rotated(270)),
            Rect::new(100, 164, 18, 36)
        );
    }

    #[test]
    fn text_size_uses_encoder_dpi() {
        let enc = LabelEncoder::new(300);
        assert_eq!(enc.text_size("ab", 1, 2, 3), Size::new(14 * 2 * 2, 22 * 3));
        let enc = LabelEncoder::new(250);
        assert_eq!(enc.text_size("ab", 1, 1, 1), Size::new(20, 14));
    }

    #[test]
    fn code39_barcode_command() {
        let mut enc = encoder();
        enc.add_barcode(
            "1234",
            BarcodeType::Code39,
            25,
            100,
            BarcodeOptions {
                height: 100,
                print_readable: false,
                ..BarcodeOptions::default()
            },
        );
        let data = String::from_utf8_lossy(enc.label_data()).to_string();
        assert!(data.ends_with("B25,100,0,3,2,4,100,N,\"1234\"\n"));
    }

    #[test]
    fn barcode_rect_reaches_label_edge() {
        let mut enc = encoder();
        let plain = BarcodeOptions {
            height: 100,
            print_readable: false,
            ..BarcodeOptions::default()
        };
        assert_eq!(
            enc.add_barcode("1", BarcodeType::Code128Auto, 25, 100, plain),
            Rect::new(25, 100, 770, 100)
        );

        // Readable line adds one font 4 cell (26 dots at 203 dpi).
        let readable = BarcodeOptions {
            print_readable: true,
            ..plain
        };
        assert_eq!(
            enc.add_barcode("1", BarcodeType::Code128Auto, 25, 100, readable),
            Rect::new(25, 100, 770, 126)
        );
    }

    #[test]
    fn rotated_barcode_rects() {
        let mut enc = encoder();
        let options = |rotation| BarcodeOptions {
            height: 50,
            print_readable: false,
            rotation,
            ..BarcodeOptions::default()
        };
        assert_eq!(
            enc.add_barcode("1", BarcodeType::Ean13, 300, 400, options(90)),
            Rect::new(250, 400, 50, 850)
        );
        assert_eq!(
            enc.add_barcode("1", BarcodeType::Ean13, 300, 400, options(180)),
            Rect::new(0, 350, 300, 50)
        );
        assert_eq!(
            enc.add_barcode("1", BarcodeType::Ean13, 300, 400, options(270)),
            Rect::new(300, 0, 50, 400)
        );
        let lines = commands(&enc);
        assert_eq!(lines[0], "B300,400,1,E30,2,4,50,N,\"1\"");
        assert_eq!(lines[2], "B300,400,3,E30,2,4,50,N,\"1\"");
    }

    #[test]
    fn barcode_data_is_escaped() {
        let mut enc = encoder();
        enc.add_barcode("A\"B", BarcodeType::Code128B, 0, 0, BarcodeOptions::default());
        assert_eq!(commands(&enc)[0], "B0,0,0,1B,2,4,200,B,\"A\\\"B\"");
    }

    #[test]
    fn lines_and_diagonals() {
        let mut enc = encoder();
        assert_eq!(
            enc.add_line(10, 20, 300, 4, LineType::Black),
            Rect::new(10, 20, 300, 4)
        );
        enc.add_line(10, 30, 300, 4, LineType::White);
        enc.add_line(10, 40, 300, 4, LineType::Xor);
        assert_eq!(
            enc.add_diagonal_line(200, 50, 100, 150, 3),
            Rect::new(100, 50, 100, 103)
        );
        assert_eq!(
            commands(&enc),
            vec![
                "LO10,20,300,4",
                "LW10,30,300,4",
                "LE10,40,300,4",
                "LS200,50,3,100,150"
            ]
        );
    }

    #[test]
    fn print_and_clear_commands() {
        let mut enc = encoder();
        enc.add_clear_buffer_command();
        enc.add_print_command(3);
        assert_eq!(commands(&enc), vec!["N", "P3"]);
    }

    struct FixedQr;

    impl QrBitmapEncoder for FixedQr {
        fn generate_epl_binary_data(
            &self,
            _data: &str,
            width: u32,
            mode: QrMode,
            error_correction: QrErrorCorrection,
        ) -> Result<Vec<u8>, QrError> {
            assert_eq!(mode, QrMode::Character);
            assert_eq!(error_correction, QrErrorCorrection::Quartile);
            Ok(vec![0xAA; (width.div_ceil(8) * width) as usize])
        }
    }

    struct FailingQr;

    impl QrBitmapEncoder for FailingQr {
        fn generate_epl_binary_data(
            &self,
            _data: &str,
            _width: u32,
            _mode: QrMode,
            _error_correction: QrErrorCorrection,
        ) -> Result<Vec<u8>, QrError> {
            Err(QrError::Encode("data too long".into()))
        }
    }

    #[test]
    fn qr_code_graphic_command() {
        let mut enc = LabelEncoder::with_qr_encoder(203, Box::new(FixedQr));
        enc.start_label(LabelSetup::default());
        let preamble_len = enc.label_data().len();

        let rect = enc.add_qr_code("payload", 30, 40, 196);
        assert_eq!(rect, Rect::new(30, 40, 200, 200));

        let graphic = &enc.label_data()[preamble_len..];
        let header = b"GW30,40,25,200,";
        assert!(graphic.starts_with(header));
        assert_eq!(graphic.len(), header.len() + 25 * 200 + 1);
        assert_eq!(graphic.last(), Some(&b'\n'));
    }

    #[test]
    fn failed_qr_code_appends_nothing() {
        let mut enc = LabelEncoder::with_qr_encoder(203, Box::new(FailingQr));
        enc.start_label(LabelSetup::default());
        let before = enc.label_data().to_vec();
        assert_eq!(enc.add_qr_code("x", 5, 6, 200), Rect::new(5, 6, 0, 0));
        assert_eq!(enc.label_data(), before.as_slice());
    }

    #[test]
    fn oversized_qr_width_is_capped() {
        let mut enc = LabelEncoder::with_qr_encoder(203, Box::new(FixedQr));
        enc.start_label(LabelSetup::default());
        let preamble_len = enc.label_data().len();

        let rect = enc.add_qr_code("payload", 0, 0, u32::MAX - 3);
        assert_eq!(rect, Rect::new(0, 0, 2400, 2400));
        let graphic = &enc.label_data()[preamble_len..];
        assert!(graphic.starts_with(b"GW0,0,300,2400,"));
        assert_eq!(graphic.len(), b"GW0,0,300,2400,".len() + 300 * 2400 + 1);
    }

    #[test]
    fn extreme_coordinates_never_panic() {
        let mut enc = encoder();
        let rect = enc.add_barcode("1", BarcodeType::Code39, i32::MIN, 0, BarcodeOptions::default());
        assert_eq!(rect.width, i32::MAX);

        let rotated = BarcodeOptions {
            rotation: 90,
            ..BarcodeOptions::default()
        };
        let rect = enc.add_barcode("1", BarcodeType::Code39, i32::MIN, i32::MIN, rotated);
        assert_eq!((rect.x, rect.height), (i32::MIN, i32::MAX));

        let text = TextOptions {
            rotation: 90,
            ..TextOptions::default()
        };
        assert_eq!(enc.add_text("abc", i32::MIN, 0, text).x, i32::MIN);

        let rect = enc.add_diagonal_line(i32::MIN, i32::MIN, i32::MAX, i32::MAX, 5);
        assert_eq!(rect, Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX));

        let huge = LabelSetup {
            width: u32::MAX,
            ..LabelSetup::default()
        };
        enc.start_label(huge);
        assert_eq!(enc.label_size().width, i32::MAX);
        assert!(enc.label_data().starts_with(b"I8,A,001\nOD\nq4294967295\n"));
    }

    #[test]
    fn default_qr_encoder_writes_full_bitmap() {
        let mut enc = encoder();
        let preamble_len = enc.label_data().len();
        enc.add_qr_code("https://example.com/p/42", 0, 0, 200);
        assert_eq!(
            enc.label_data().len() - preamble_len,
            b"GW0,0,25,200,".len() + 25 * 200 + 1
        );
    }
}
