// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operator-facing error messages.
//
// Every failure is mapped to a short sentence plus a suggestion. Diagnostic
// detail (raw lpq output, stderr, HTTP bodies) stays in the log; only errors
// flagged as user-facing quote their reason verbatim.

use crate::error::EtikettError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Timeout, busy queue, network blip; trying again may work.
    Transient,
    /// Somebody has to do something (load labels, switch the printer on).
    ActionRequired,
    /// Retrying will not help without a configuration or input change.
    Permanent,
}

/// A human-readable error with a short message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert an [`EtikettError`] into a [`HumanError`].
pub fn humanize_error(err: &EtikettError) -> HumanError {
    match err {
        EtikettError::FileIo { path, source } => {
            if source.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: format!("The file {} couldn't be found.", path.display()),
                    suggestion: "Check the path and try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: format!("The file {} couldn't be read.", path.display()),
                    suggestion: "Check the file permissions and try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            }
        }

        EtikettError::ToolUnavailable { tool, .. } => HumanError {
            message: format!("The printing tool '{tool}' isn't available on this machine."),
            suggestion: "Install the LPR client tools (CUPS on Linux/macOS, LPR Port Monitor on Windows), or configure the print service instead.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        EtikettError::ProcessFailed { tool, code, .. } => HumanError {
            message: format!(
                "The print command '{tool}' failed (exit code {}).",
                code.map_or_else(|| "none".to_string(), |c| c.to_string())
            ),
            suggestion: "Check that the printer queue exists and accepts jobs.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        EtikettError::PrinterNotReady {
            printer,
            reason,
            user_facing,
        } => HumanError {
            message: if *user_facing {
                format!("Printer {printer} is not ready: {reason}")
            } else {
                format!("Printer {printer} is not ready.")
            },
            suggestion: "Make sure the printer is switched on, loaded with labels and not paused.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        EtikettError::PrinterOffline { printer, .. } => HumanError {
            message: format!("Printer {printer} is offline or stopped."),
            suggestion: "Switch the printer on and resume its queue, then try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        EtikettError::ServerReported(reason) => HumanError {
            message: format!("The print service refused the job: {reason}"),
            suggestion: "Check the printer attached to the print service.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        EtikettError::Protocol(detail) if detail.contains("doesn't exist") => HumanError {
            message: "The printer couldn't be found.".into(),
            suggestion: "Check the printer name and host in the settings, and that the printer is installed.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        EtikettError::Protocol(_) => HumanError {
            message: "The print service sent a reply we don't understand.".into(),
            suggestion: "Check that the configured service URL points to the print service.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        EtikettError::Request(_) => HumanError {
            message: "The print service couldn't be reached.".into(),
            suggestion: "Check the network connection and that the service is running.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        EtikettError::Timeout { operation, secs } => HumanError {
            message: format!("{operation} didn't finish within {secs} seconds."),
            suggestion: "The printer or its queue may be hung. Check it and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        EtikettError::Unsupported(detail) => HumanError {
            message: format!("That isn't possible with the current setup ({detail})."),
            suggestion: "Change the printer configuration and try again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        EtikettError::Config(detail) => HumanError {
            message: "The configuration file is invalid.".into(),
            suggestion: format!("Fix the configuration and try again. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        EtikettError::TaskFailed(_) | EtikettError::Io(_) | EtikettError::Serialization(_) => {
            HumanError {
                message: "Something went wrong while printing.".into(),
                suggestion: "Try again. If this keeps happening, run with --verbose and report the log.".into(),
                retriable: true,
                severity: Severity::Transient,
            }
        }
    }
}
