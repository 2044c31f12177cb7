// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EtikettError, Result};
use crate::types::PrinterTarget;

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Local hardware printer. When set, jobs go through `lpr`; otherwise
    /// they are sent to the print service.
    pub hardware_printer: Option<PrinterTarget>,
    /// Remote print service used when no hardware printer is configured.
    pub service: ServiceConfig,
    /// Skip readiness probes before printing.
    pub ignore_printer_state: bool,
    /// Upper bound for a single `lpr`/`lpq`/`lpoptions` run; the process is
    /// killed when it expires.
    pub command_timeout_secs: u64,
    /// Printer resolution used by the label encoder (203 or 300).
    pub printer_dpi: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hardware_printer: None,
            service: ServiceConfig::default(),
            ignore_printer_state: false,
            command_timeout_secs: 30,
            printer_dpi: 203,
        }
    }
}

/// Connection settings for the print micro-service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL, e.g. `http://printbox.local:8080`.
    pub base_url: String,
    /// Printer name passed as `?printer=`; empty/absent means the service default.
    pub printer: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            printer: None,
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Read configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| EtikettError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Write configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.hardware_printer.is_none() && self.service.base_url.trim().is_empty() {
            return Err(EtikettError::Config(
                "either hardware_printer or service.base_url must be set".into(),
            ));
        }
        if self.command_timeout_secs == 0 {
            return Err(EtikettError::Config(
                "command_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Target handed to the service transport.
    pub fn service_target(&self) -> PrinterTarget {
        PrinterTarget::new(None, self.service.printer.as_deref())
    }
}
