// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Etikett core: types, configuration and error definitions shared by the
// label encoder, the printer transports and the command-line front end.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::{AppConfig, ServiceConfig};
pub use error::{EtikettError, FailureKind};
pub use types::*;
