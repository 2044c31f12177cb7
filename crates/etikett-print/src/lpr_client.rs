// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Local hardware queue transport driven by the system print tools.
//
// A print job is: acquire the printer's worker slot, probe readiness, then
// spawn `lpr`. The probe asks `lpq` first; when `lpq` cannot be started a
// non-strict target falls back to `lpoptions`, and when that is missing too
// the printer is assumed ready.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OwnedSemaphorePermit;
use tracing::{debug, info, instrument, warn};

use etikett_core::error::Result;
use etikett_core::{
    EtikettError, PrintOptions, PrinterInfo, PrinterStatus, PrinterTarget, TransportKind,
};

use crate::command::{Invocation, Platform};
use crate::probe;
use crate::restrictor::Restrictor;
use crate::runner::CommandRunner;
use crate::transport::PrinterTransport;

/// Prints through `lpr` on the local machine.
pub struct LprPrinter {
    target: PrinterTarget,
    platform: Platform,
    runner: Arc<dyn CommandRunner>,
    restrictor: Restrictor,
}

impl LprPrinter {
    pub fn new(target: PrinterTarget, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            target,
            platform: Platform::current(),
            runner,
            restrictor: Restrictor::new(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Share worker slots with other printers built from the same registry.
    pub fn with_restrictor(mut self, restrictor: Restrictor) -> Self {
        self.restrictor = restrictor;
        self
    }

    pub fn target(&self) -> &PrinterTarget {
        &self.target
    }

    async fn check_ready(&self) -> Result<()> {
        let lpq = self.platform.queue_status(&self.target);
        match self.runner.run(&lpq).await {
            Ok(output) => {
                debug!(stdout = %output.stdout.trim(), "lpq");
                probe::classify_queue_output(&output.stdout, &self.target)
            }
            Err(EtikettError::ToolUnavailable { tool, detail }) if !self.target.strict => {
                warn!(%tool, %detail, "queue probe unavailable, asking lpoptions");
                self.check_options().await
            }
            Err(e) => Err(e),
        }
    }

    async fn check_options(&self) -> Result<()> {
        let lpoptions = self.platform.printer_options(&self.target);
        match self.runner.run(&lpoptions).await {
            Ok(output) => probe::classify_printer_options(&output.stdout, &self.target),
            Err(EtikettError::ToolUnavailable { tool, detail }) if !self.target.strict => {
                warn!(%tool, %detail, "no probe tool available, assuming printer is ready");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Take the worker slot and, unless told otherwise, probe readiness.
    async fn prepare(&self, options: PrintOptions) -> Result<OwnedSemaphorePermit> {
        let permit = self.restrictor.acquire(&self.target.resource_key()).await?;
        if options.ignore_printer_state {
            debug!("printer state ignored, skipping probe");
        } else {
            self.check_ready().await?;
        }
        Ok(permit)
    }

    async fn run_checked(&self, invocation: &Invocation) -> Result<()> {
        let output = self.runner.run(invocation).await?;
        if !output.success() {
            let stderr = output.stderr.trim().to_string();
            warn!(command = %invocation, code = ?output.code, %stderr, "print tool failed");
            return Err(EtikettError::ProcessFailed {
                tool: invocation.tool().to_string(),
                code: output.code,
                stderr,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PrinterTransport for LprPrinter {
    fn kind(&self) -> TransportKind {
        TransportKind::Lpr
    }

    fn printer(&self) -> String {
        self.target.to_string()
    }

    /// Runs the readiness probe. A printer that is missing, not ready or
    /// offline is reported in the status; only probe failures are errors.
    #[instrument(skip(self), fields(printer = %self.target))]
    async fn fetch_status(&self) -> Result<PrinterStatus> {
        let _permit = self.restrictor.acquire(&self.target.resource_key()).await?;
        match self.check_ready().await {
            Ok(()) => Ok(PrinterStatus::ready()),
            Err(EtikettError::PrinterNotReady { reason, .. }) => Ok(PrinterStatus::not_ready(reason)),
            Err(EtikettError::PrinterOffline { detail, .. }) => Ok(PrinterStatus::not_ready(detail)),
            Err(EtikettError::Protocol(message)) => Ok(PrinterStatus::not_ready(message)),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, data, options), fields(printer = %self.target, bytes = data.len()))]
    async fn print_raw(&self, data: &[u8], options: PrintOptions) -> Result<u64> {
        let _permit = self.prepare(options).await?;

        if self.platform.spools_raw_data() {
            let mut spool = tempfile::Builder::new()
                .prefix("etikett-")
                .suffix(".prn")
                .tempfile()?;
            spool.write_all(data)?;
            spool.flush()?;
            debug!(path = %spool.path().display(), "spooled raw data");
            for invocation in self.platform.print_file(&self.target, spool.path(), 1) {
                self.run_checked(&invocation).await?;
            }
        } else {
            let invocation = self.platform.print_stdin(&self.target, data.to_vec());
            self.run_checked(&invocation).await?;
        }

        info!("raw job sent to queue");
        Ok(data.len() as u64)
    }

    #[instrument(skip(self, options), fields(printer = %self.target, path = %path.display(), copies = options.copies))]
    async fn print_file(&self, path: &Path, options: PrintOptions) -> Result<u64> {
        let file_error = |source: std::io::Error| EtikettError::FileIo {
            path: path.to_path_buf(),
            source,
        };
        let metadata = tokio::fs::metadata(path).await.map_err(file_error)?;
        if !metadata.is_file() {
            return Err(file_error(std::io::Error::other("not a regular file")));
        }
        tokio::fs::File::open(path).await.map_err(file_error)?;

        let _permit = self.prepare(options).await?;
        for invocation in self.platform.print_file(&self.target, path, options.copies) {
            self.run_checked(&invocation).await?;
        }

        info!(bytes = metadata.len(), "file sent to queue");
        Ok(metadata.len())
    }

    async fn list_printers(&self) -> Result<Vec<PrinterInfo>> {
        Err(EtikettError::Unsupported(
            "listing printers needs the print service".into(),
        ))
    }
}
