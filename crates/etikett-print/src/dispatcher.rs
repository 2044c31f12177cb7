// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transport selection and background execution of print operations.
//
// A configured hardware printer selects the local queue; otherwise jobs go
// to the print service. Every operation runs as its own Tokio task and is
// handed back as a `PrintHandle`, which can be awaited or waited on with a
// deadline.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, info_span};

use etikett_core::error::Result;
use etikett_core::{
    AppConfig, EtikettError, JobId, PrintOptions, PrintReceipt, PrinterInfo, PrinterStatus,
    TransportKind,
};
use etikett_label::LabelEncoder;

use crate::lpr_client::LprPrinter;
use crate::runner::SystemRunner;
use crate::service_client::{PrintServiceClient, ServicePrinter};
use crate::transport::PrinterTransport;

/// Pending result of a dispatched operation.
///
/// Awaiting the handle yields the operation's result. Dropping it does not
/// cancel the operation.
#[derive(Debug)]
pub struct PrintHandle<T> {
    job_id: JobId,
    task: JoinHandle<Result<T>>,
}

impl<T> PrintHandle<T> {
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait at most `deadline`. On expiry the operation keeps running in the
    /// background and [`EtikettError::Timeout`] is returned.
    pub async fn wait_timeout(self, deadline: Duration) -> Result<T> {
        let job_id = self.job_id;
        match tokio::time::timeout(deadline, self).await {
            Ok(result) => result,
            Err(_) => Err(EtikettError::Timeout {
                operation: format!("print job {job_id}"),
                secs: deadline.as_secs(),
            }),
        }
    }
}

impl<T> Future for PrintHandle<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().task)
            .poll(cx)
            .map(|joined| match joined {
                Ok(result) => result,
                Err(e) => Err(EtikettError::TaskFailed(e.to_string())),
            })
    }
}

/// Runs print operations on the configured transport.
///
/// All dispatching methods spawn onto the current Tokio runtime and must be
/// called from within one.
#[derive(Clone)]
pub struct PrintDispatcher {
    transport: Arc<dyn PrinterTransport>,
    ignore_printer_state: bool,
}

impl PrintDispatcher {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let transport: Arc<dyn PrinterTransport> = match &config.hardware_printer {
            Some(target) => {
                let runner = Arc::new(SystemRunner::new(config.command_timeout()));
                Arc::new(LprPrinter::new(target.clone(), runner))
            }
            None => {
                let client = PrintServiceClient::new(
                    &config.service.base_url,
                    Duration::from_secs(config.service.timeout_secs),
                )?;
                Arc::new(ServicePrinter::new(client, config.service_target()))
            }
        };
        info!(
            transport = transport.kind().display_name(),
            printer = %transport.printer(),
            "print dispatcher ready"
        );

        Ok(Self {
            transport,
            ignore_printer_state: config.ignore_printer_state,
        })
    }

    pub fn with_transport(transport: Arc<dyn PrinterTransport>) -> Self {
        Self {
            transport,
            ignore_printer_state: false,
        }
    }

    /// Skip readiness checks for every job, whatever the per-call options say.
    pub fn ignore_printer_state(mut self, ignore: bool) -> Self {
        self.ignore_printer_state = ignore;
        self
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.transport.kind()
    }

    pub fn printer(&self) -> String {
        self.transport.printer()
    }

    pub fn fetch_status(&self) -> PrintHandle<PrinterStatus> {
        let transport = Arc::clone(&self.transport);
        self.spawn("status", async move { transport.fetch_status().await })
    }

    pub fn list_printers(&self) -> PrintHandle<Vec<PrinterInfo>> {
        let transport = Arc::clone(&self.transport);
        self.spawn("list", async move { transport.list_printers().await })
    }

    pub fn print_raw(&self, data: Vec<u8>, options: PrintOptions) -> PrintHandle<PrintReceipt> {
        let transport = Arc::clone(&self.transport);
        let options = self.effective(options);
        self.spawn_job("print_raw", move |job_id| async move {
            let bytes = transport.print_raw(&data, options).await?;
            Ok(receipt(job_id, transport.as_ref(), bytes))
        })
    }

    pub fn print_file(
        &self,
        path: impl Into<PathBuf>,
        options: PrintOptions,
    ) -> PrintHandle<PrintReceipt> {
        let path = path.into();
        let transport = Arc::clone(&self.transport);
        let options = self.effective(options);
        self.spawn_job("print_file", move |job_id| async move {
            let bytes = transport.print_file(&path, options).await?;
            Ok(receipt(job_id, transport.as_ref(), bytes))
        })
    }

    /// Print the program accumulated in `encoder` as raw data.
    pub fn print_label(
        &self,
        encoder: &LabelEncoder,
        options: PrintOptions,
    ) -> PrintHandle<PrintReceipt> {
        self.print_raw(encoder.label_data().to_vec(), options)
    }

    fn effective(&self, mut options: PrintOptions) -> PrintOptions {
        options.ignore_printer_state |= self.ignore_printer_state;
        options
    }

    fn spawn<T, F>(&self, operation: &'static str, work: F) -> PrintHandle<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        self.spawn_job(operation, move |_| work)
    }

    fn spawn_job<T, F, Fut>(&self, operation: &'static str, work: F) -> PrintHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(JobId) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let job_id = JobId::new();
        let span = info_span!(
            "print_job",
            %job_id,
            operation,
            printer = %self.transport.printer()
        );
        let future = work(job_id);
        let task = tokio::spawn(
            async move {
                let result = future.await;
                match &result {
                    Ok(_) => info!("done"),
                    Err(e) => error!(error = %e, kind = ?e.kind(), "failed"),
                }
                result
            }
            .instrument(span),
        );
        PrintHandle { job_id, task }
    }
}

fn receipt(job_id: JobId, transport: &dyn PrinterTransport, bytes: u64) -> PrintReceipt {
    PrintReceipt {
        job_id,
        printer: transport.printer(),
        transport: transport.kind(),
        bytes,
        completed_at: Utc::now(),
    }
}
