// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Common interface of the local queue and the print service.

use std::path::Path;

use async_trait::async_trait;

use etikett_core::error::Result;
use etikett_core::{PrintOptions, PrinterInfo, PrinterStatus, TransportKind};

/// A way of getting bytes onto paper.
///
/// Print operations check readiness first unless
/// [`PrintOptions::ignore_printer_state`] is set, and return the number of
/// payload bytes handed over.
#[async_trait]
pub trait PrinterTransport: Send + Sync {
    fn kind(&self) -> TransportKind;

    /// Printer description for logs and receipts.
    fn printer(&self) -> String;

    async fn fetch_status(&self) -> Result<PrinterStatus>;

    async fn print_raw(&self, data: &[u8], options: PrintOptions) -> Result<u64>;

    /// The file is read (or at least opened) before anything is sent, so a
    /// missing file fails without touching the printer.
    async fn print_file(&self, path: &Path, options: PrintOptions) -> Result<u64>;

    async fn list_printers(&self) -> Result<Vec<PrinterInfo>>;
}
