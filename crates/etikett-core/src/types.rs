// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Etikett label printing stack.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a dispatched print operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a readiness probe. Transient, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterStatus {
    pub is_ready: bool,
    #[serde(default)]
    pub reason: String,
}

impl PrinterStatus {
    pub fn ready() -> Self {
        Self {
            is_ready: true,
            reason: String::new(),
        }
    }

    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self {
            is_ready: false,
            reason: reason.into(),
        }
    }
}

/// One entry of the print service's printer list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterInfo {
    #[serde(rename = "printer", default)]
    pub printer_name: String,
    #[serde(default)]
    pub accepts_raw: bool,
    #[serde(default)]
    pub accepts_files: bool,
}

/// Identifies a physical or logical printer.
///
/// An absent host means the local machine; an absent name means the OS
/// default queue. Passed by value into each print call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterTarget {
    pub host: Option<String>,
    pub name: Option<String>,
    /// Abort printing when the readiness probe itself cannot run.
    pub strict: bool,
}

impl PrinterTarget {
    pub fn new(host: Option<&str>, name: Option<&str>) -> Self {
        Self {
            host: non_empty(host),
            name: non_empty(name),
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref().filter(|h| !h.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    pub fn host_or_localhost(&self) -> &str {
        self.host().unwrap_or("localhost")
    }

    /// Printer name as it appears in queue output; empty for the default queue.
    pub fn queue_name(&self) -> &str {
        self.name().unwrap_or("")
    }

    /// Key used to serialise subprocess work for one printer.
    pub fn resource_key(&self) -> String {
        format!(
            "{}/{}",
            self.host_or_localhost(),
            self.name().unwrap_or("default")
        )
    }
}

impl std::fmt::Display for PrinterTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.host(), self.name()) {
            (Some(host), Some(name)) => write!(f, "{name} on {host}"),
            (None, Some(name)) => write!(f, "{name}"),
            (Some(host), None) => write!(f, "default printer on {host}"),
            (None, None) => write!(f, "default printer"),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Which transport delivered (or will deliver) a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportKind {
    /// Local hardware queue driven through `lpr`/`lpq`/`lpoptions`.
    Lpr,
    /// Remote print micro-service over HTTP.
    Service,
}

impl TransportKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Lpr => "local LPR queue",
            Self::Service => "print service",
        }
    }
}

/// Per-call print options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintOptions {
    /// Number of copies; only meaningful for file printing.
    pub copies: u32,
    /// Skip the readiness probe entirely.
    pub ignore_printer_state: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            copies: 1,
            ignore_printer_state: false,
        }
    }
}

/// Summary of a completed print operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintReceipt {
    pub job_id: JobId,
    pub printer: String,
    pub transport: TransportKind,
    /// Payload size handed to the transport.
    pub bytes: u64,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_mean_defaults() {
        let target = PrinterTarget::new(Some(""), Some(""));
        assert_eq!(target.host(), None);
        assert_eq!(target.name(), None);
        assert_eq!(target.host_or_localhost(), "localhost");
        assert_eq!(target.resource_key(), "localhost/default");
        assert_eq!(target.to_string(), "default printer");
    }

    #[test]
    fn resource_key_separates_printers() {
        let a = PrinterTarget::new(Some("printhost"), Some("zebra"));
        let b = PrinterTarget::new(Some("printhost"), Some("eltron"));
        assert_ne!(a.resource_key(), b.resource_key());
        assert_eq!(a.to_string(), "zebra on printhost");
    }

    #[test]
    fn status_deserializes_without_reason() {
        let status: PrinterStatus = serde_json::from_str(r#"{"is_ready":true}"#).unwrap();
        assert_eq!(status, PrinterStatus::ready());
    }

    #[test]
    fn printer_info_uses_service_field_names() {
        let info: PrinterInfo = serde_json::from_str(
            r#"{"printer":"zebra","accepts_raw":true,"accepts_files":false}"#,
        )
        .unwrap();
        assert_eq!(info.printer_name, "zebra");
        assert!(info.accepts_raw);
        assert!(!info.accepts_files);
    }
}
