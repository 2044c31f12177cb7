// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// EPL2 barcode symbologies and their `B` command type codes.

use serde::{Deserialize, Serialize};

/// Every symbology the `B` command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarcodeType {
    Code39,
    Code39CheckDigit,
    Code93,
    Code128Ucc,
    Code128Auto,
    Code128A,
    Code128B,
    Code128C,
    Code128UccEan,
    Codabar,
    Ean8,
    Ean8Addon2,
    Ean8Addon5,
    Ean13,
    Ean13Addon2,
    Ean13Addon5,
    GermanPost,
    Interleaved2of5,
    Interleaved2of5Mod10,
    Interleaved2of5HumanCheck,
    Postnet,
    Planet,
    JapanesePostnet,
    UpcA,
    UpcAAddon2,
    UpcAAddon5,
    UpcE,
    UpcEAddon2,
    UpcEAddon5,
    UpcInterleaved2of5,
    Msi1,
    Msi3,
}

/// Type code used when a symbology name is not recognised.
pub const DEFAULT_TYPE_CODE: &str = "1";

/// Name and type code of every symbology, in declaration order.
const TABLE: [(BarcodeType, &str, &str); 32] = [
    (BarcodeType::Code39, "Code39", "3"),
    (BarcodeType::Code39CheckDigit, "Code39CheckDigit", "3C"),
    (BarcodeType::Code93, "Code93", "9"),
    (BarcodeType::Code128Ucc, "Code128Ucc", "0"),
    (BarcodeType::Code128Auto, "Code128Auto", "1"),
    (BarcodeType::Code128A, "Code128A", "1A"),
    (BarcodeType::Code128B, "Code128B", "1B"),
    (BarcodeType::Code128C, "Code128C", "1C"),
    (BarcodeType::Code128UccEan, "Code128UccEan", "1E"),
    (BarcodeType::Codabar, "Codabar", "K"),
    (BarcodeType::Ean8, "Ean8", "E80"),
    (BarcodeType::Ean8Addon2, "Ean8Addon2", "E82"),
    (BarcodeType::Ean8Addon5, "Ean8Addon5", "E85"),
    (BarcodeType::Ean13, "Ean13", "E30"),
    (BarcodeType::Ean13Addon2, "Ean13Addon2", "E32"),
    (BarcodeType::Ean13Addon5, "Ean13Addon5", "E35"),
    (BarcodeType::GermanPost, "GermanPost", "2G"),
    (BarcodeType::Interleaved2of5, "Interleaved2of5", "2"),
    (BarcodeType::Interleaved2of5Mod10, "Interleaved2of5Mod10", "2C"),
    (BarcodeType::Interleaved2of5HumanCheck, "Interleaved2of5HumanCheck", "2D"),
    (BarcodeType::Postnet, "Postnet", "P"),
    (BarcodeType::Planet, "Planet", "PL"),
    (BarcodeType::JapanesePostnet, "JapanesePostnet", "J"),
    (BarcodeType::UpcA, "UpcA", "UA0"),
    (BarcodeType::UpcAAddon2, "UpcAAddon2", "UA2"),
    (BarcodeType::UpcAAddon5, "UpcAAddon5", "UA5"),
    (BarcodeType::UpcE, "UpcE", "UE0"),
    (BarcodeType::UpcEAddon2, "UpcEAddon2", "UE2"),
    (BarcodeType::UpcEAddon5, "UpcEAddon5", "UE5"),
    (BarcodeType::UpcInterleaved2of5, "UpcInterleaved2of5", "2U"),
    (BarcodeType::Msi1, "Msi1", "L"),
    (BarcodeType::Msi3, "Msi3", "M"),
];

impl BarcodeType {
    pub fn all() -> impl Iterator<Item = BarcodeType> {
        TABLE.iter().map(|(kind, _, _)| *kind)
    }

    /// Value of the `p4` field of the `B` command.
    pub fn type_code(self) -> &'static str {
        TABLE[self as usize].2
    }

    pub fn name(self) -> &'static str {
        TABLE[self as usize].1
    }

    /// Case-insensitive lookup by name; `-` and `_` are ignored.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect();
        TABLE
            .iter()
            .find(|(_, n, _)| n.eq_ignore_ascii_case(&wanted))
            .map(|(kind, _, _)| *kind)
    }
}

/// Type code for a symbology given by name, Code128Auto when unknown.
pub fn type_code_for_name(name: &str) -> &'static str {
    BarcodeType::from_name(name)
        .map(BarcodeType::type_code)
        .unwrap_or(DEFAULT_TYPE_CODE)
}
