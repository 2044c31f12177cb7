// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Readiness classification of `lpq` and `lpoptions` output.
//
// `lpq` prints a line such as `zebra is ready` followed by the queue
// contents. A queue hosted by the Windows LPD service answers with a
// `Windows LPD Server` banner instead and never says "ready".
//
// `lpoptions` prints the printer's IPP attributes as `key=value` pairs. The
// relevant ones are `printer-state` (3 idle, 4 processing, 5 stopped) and
// `printer-state-reasons`.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use etikett_core::error::Result;
use etikett_core::{EtikettError, PrinterTarget};

/// IPP `printer-state` value for an idle printer.
pub const STATE_IDLE: u32 = 3;
/// IPP `printer-state` value for a stopped printer.
pub const STATE_STOPPED: u32 = 5;

static STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)printer-state=(\d+)").unwrap_or_else(|e| unreachable!("{e}"))
});

static REASONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)printer-state-reasons=('[^']*'|\S+)")
        .unwrap_or_else(|e| unreachable!("{e}"))
});

/// Classify `lpq` output for `target`.
///
/// Returns `Ok(())` when the printer may be used.
pub fn classify_queue_output(output: &str, target: &PrinterTarget) -> Result<()> {
    let printer = target.queue_name();
    let trimmed = output.trim();

    if trimmed.is_empty() {
        return Err(EtikettError::Protocol(format!(
            "printer {target} doesn't exist"
        )));
    }

    if output.contains(&format!("{printer} is not ready")) {
        return Err(EtikettError::not_ready(
            target.to_string(),
            "queue reports not ready",
        ));
    }

    if trimmed.to_ascii_lowercase().starts_with("windows lpd") {
        return classify_windows_lpd(trimmed, target);
    }

    if output.contains(&format!("{printer} is ready")) {
        debug!(printer = %target, "queue reports ready");
        return Ok(());
    }

    Err(EtikettError::not_ready_diagnostic(
        target.to_string(),
        trimmed.to_string(),
    ))
}

/// Windows LPD queues are assumed ready unless they report an error or name
/// a different printer.
fn classify_windows_lpd(output: &str, target: &PrinterTarget) -> Result<()> {
    let lower = output.to_ascii_lowercase();

    if lower.contains("error:") {
        return Err(EtikettError::not_ready_diagnostic(
            target.to_string(),
            output.to_string(),
        ));
    }

    if let Some(name) = target.name() {
        if !lower.contains(&name.to_ascii_lowercase()) {
            return Err(EtikettError::not_ready_diagnostic(
                target.to_string(),
                format!("queue does not list {name}: {output}"),
            ));
        }
    }

    warn!(printer = %target, "Windows LPD queue, readiness not verified");
    Ok(())
}

/// Printer state extracted from `lpoptions` output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrinterOptionsState {
    pub state: Option<u32>,
    /// Comma separated reasons, with `none` normalised to empty.
    pub reasons: String,
}

impl PrinterOptionsState {
    pub fn parse(output: &str) -> Self {
        let state = STATE_RE
            .captures(output)
            .and_then(|c| c[1].parse().ok());
        let reasons = REASONS_RE
            .captures(output)
            .map(|c| c[1].trim_matches('\'').to_string())
            .filter(|r| r != "none")
            .unwrap_or_default();
        Self { state, reasons }
    }

    /// Stopped, or idle with a pending reason.
    pub fn is_offline(&self) -> bool {
        match self.state {
            Some(STATE_STOPPED) => true,
            Some(STATE_IDLE) => !self.reasons.is_empty(),
            _ => false,
        }
    }
}

/// Classify `lpoptions` output for `target`.
pub fn classify_printer_options(output: &str, target: &PrinterTarget) -> Result<()> {
    let parsed = PrinterOptionsState::parse(output);
    debug!(printer = %target, state = ?parsed.state, reasons = %parsed.reasons, "lpoptions");

    if parsed.is_offline() {
        let state = parsed.state.map_or_else(|| "?".to_string(), |s| s.to_string());
        let detail = if parsed.reasons.is_empty() {
            format!("printer-state={state}")
        } else {
            format!("printer-state={state}, reasons: {}", parsed.reasons)
        };
        return Err(EtikettError::PrinterOffline {
            printer: target.to_string(),
            detail,
        });
    }
    Ok(())
}
