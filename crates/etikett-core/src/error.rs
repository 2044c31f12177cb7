// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Etikett.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all printing operations.
///
/// Every failure is returned on the operation's future; nothing is thrown
/// past the async boundary.
#[derive(Debug, Error)]
pub enum EtikettError {
    // -- Input --
    #[error("cannot read '{}': {source}", .path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -- Subprocess transport --
    #[error("{tool} could not be started: {detail}")]
    ToolUnavailable { tool: String, detail: String },

    #[error("{tool} failed with exit code {}: {stderr}", .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    ProcessFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    // -- Printer state --
    #[error("printer {printer} is not ready: {reason}")]
    PrinterNotReady {
        printer: String,
        reason: String,
        /// Whether `reason` is short enough to show to an operator as-is.
        user_facing: bool,
    },

    #[error("printer {printer} is offline or in a wrong state: {detail}")]
    PrinterOffline { printer: String, detail: String },

    // -- Replies --
    #[error("unexpected reply: {0}")]
    Protocol(String),

    // -- Print service --
    #[error("print service rejected the request: {0}")]
    ServerReported(String),

    #[error("print service request failed: {0}")]
    Request(String),

    // -- Runtime --
    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    #[error("background print task failed: {0}")]
    TaskFailed(String),

    #[error("not supported: {0}")]
    Unsupported(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Flat failure classification, so callers can branch without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    FileIo,
    ToolUnavailable,
    ProcessFailed,
    PrinterNotReady,
    PrinterOffline,
    Protocol,
    ServerReported,
    Request,
    Timeout,
    Internal,
}

impl EtikettError {
    /// Convenience constructor for a printer that reports it is not ready.
    pub fn not_ready(printer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PrinterNotReady {
            printer: printer.into(),
            reason: reason.into(),
            user_facing: true,
        }
    }

    /// Like [`EtikettError::not_ready`] but carrying raw diagnostic text.
    pub fn not_ready_diagnostic(printer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PrinterNotReady {
            printer: printer.into(),
            reason: reason.into(),
            user_facing: false,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::FileIo { .. } => FailureKind::FileIo,
            Self::ToolUnavailable { .. } => FailureKind::ToolUnavailable,
            Self::ProcessFailed { .. } => FailureKind::ProcessFailed,
            Self::PrinterNotReady { .. } => FailureKind::PrinterNotReady,
            Self::PrinterOffline { .. } => FailureKind::PrinterOffline,
            Self::Protocol(_) => FailureKind::Protocol,
            Self::ServerReported(_) => FailureKind::ServerReported,
            Self::Request(_) => FailureKind::Request,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::TaskFailed(_)
            | Self::Unsupported(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Serialization(_) => FailureKind::Internal,
        }
    }

    /// Whether the message is meant for the operator rather than the log.
    pub fn is_user_facing(&self) -> bool {
        match self {
            Self::PrinterNotReady { user_facing, .. } => *user_facing,
            Self::FileIo { .. } | Self::PrinterOffline { .. } | Self::ServerReported(_) => true,
            _ => false,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EtikettError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinguishable() {
        let not_ready = EtikettError::not_ready("zebra", "paper out");
        let offline = EtikettError::PrinterOffline {
            printer: "zebra".into(),
            detail: "state 5".into(),
        };
        assert_eq!(not_ready.kind(), FailureKind::PrinterNotReady);
        assert_eq!(offline.kind(), FailureKind::PrinterOffline);
        assert_eq!(
            EtikettError::Protocol("bad json".into()).kind(),
            FailureKind::Protocol
        );
        assert_eq!(
            EtikettError::ServerReported("jammed".into()).kind(),
            FailureKind::ServerReported
        );
    }

    #[test]
    fn diagnostic_not_ready_is_not_user_facing() {
        assert!(EtikettError::not_ready("zebra", "is not ready").is_user_facing());
        assert!(!EtikettError::not_ready_diagnostic("zebra", "raw lpq text").is_user_facing());
        assert!(
            !EtikettError::ToolUnavailable {
                tool: "lpq".into(),
                detail: "not found".into()
            }
            .is_user_facing()
        );
    }

    #[test]
    fn process_failure_message_names_exit_code() {
        let err = EtikettError::ProcessFailed {
            tool: "lpr".into(),
            code: Some(2),
            stderr: "lpr: error".into(),
        };
        assert!(err.to_string().contains("exit code 2"));

        let killed = EtikettError::ProcessFailed {
            tool: "lpr".into(),
            code: None,
            stderr: String::new(),
        };
        assert!(killed.to_string().contains("exit code none"));
    }
}
