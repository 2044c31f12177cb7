// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP client for the print micro-service, and the transport built on it.
//
// Endpoints:
//   GET  /lpr/status[?printer=]            -> {"is_ready": bool, "reason": string}
//   POST /lpr/print-raw[?printer=]         {"data": base64} -> status
//   POST /lpr/print?copies=[&printer=]     raw file bytes -> status
//   GET  /lpr/list                         -> [{"printer", "accepts_raw", "accepts_files"}]

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use etikett_core::error::Result;
use etikett_core::{
    EtikettError, PrintOptions, PrinterInfo, PrinterStatus, PrinterTarget, TransportKind,
};

use crate::transport::PrinterTransport;

/// Body of `POST /lpr/print-raw`.
#[derive(Serialize)]
struct RawJob {
    data: String,
}

/// Thin client for the print service REST API.
#[derive(Debug, Clone)]
pub struct PrintServiceClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl PrintServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EtikettError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_status(&self, printer: Option<&str>) -> Result<PrinterStatus> {
        let request = self
            .client
            .get(self.url("/lpr/status"))
            .query(&printer_query(printer));
        let body = self.send("GET /lpr/status", request).await?;
        parse_status(&body)
    }

    /// Send raw printer data. The returned status is the service's verdict.
    #[instrument(skip(self, data), fields(base_url = %self.base_url, bytes = data.len()))]
    pub async fn print_raw(&self, data: &[u8], printer: Option<&str>) -> Result<PrinterStatus> {
        let job = RawJob {
            data: STANDARD.encode(data),
        };
        let request = self
            .client
            .post(self.url("/lpr/print-raw"))
            .query(&printer_query(printer))
            .json(&job);
        let body = self.send("POST /lpr/print-raw", request).await?;
        parse_status(&body)
    }

    /// Upload a file's contents to be printed `copies` times.
    #[instrument(skip(self, contents), fields(base_url = %self.base_url, bytes = contents.len()))]
    pub async fn print_file(
        &self,
        contents: Vec<u8>,
        copies: u32,
        printer: Option<&str>,
    ) -> Result<PrinterStatus> {
        let mut query = vec![("copies", copies.max(1).to_string())];
        query.extend(printer_query(printer));
        let request = self
            .client
            .post(self.url("/lpr/print"))
            .query(&query)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(contents);
        let body = self.send("POST /lpr/print", request).await?;
        parse_status(&body)
    }

    /// Printers known to the service. Entries without a name are dropped.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn list_printers(&self) -> Result<Vec<PrinterInfo>> {
        let request = self.client.get(self.url("/lpr/list"));
        let body = self.send("GET /lpr/list", request).await?;
        let printers = parse_printer_list(&body)?;
        debug!(count = printers.len(), "printer list");
        Ok(printers)
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Vec<u8>> {
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(operation, e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(operation, e))?;
        debug!(operation, %status, len = body.len(), "service reply");

        if !status.is_success() {
            return Err(reply_error(status, &body));
        }
        Ok(body.to_vec())
    }

    fn transport_error(&self, operation: &str, e: reqwest::Error) -> EtikettError {
        if e.is_timeout() {
            EtikettError::Timeout {
                operation: operation.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else {
            EtikettError::Request(format!("{operation}: {e}"))
        }
    }
}

fn printer_query(printer: Option<&str>) -> Vec<(&'static str, String)> {
    printer
        .filter(|p| !p.is_empty())
        .map(|p| vec![("printer", p.to_string())])
        .unwrap_or_default()
}

/// Error for a non-2xx reply. A status-shaped body with a reason is the
/// service explaining itself; anything else is a plain HTTP failure.
fn reply_error(status: StatusCode, body: &[u8]) -> EtikettError {
    if let Ok(reply) = parse_status(body) {
        if !reply.reason.is_empty() {
            return EtikettError::ServerReported(reply.reason);
        }
    }
    EtikettError::Request(format!(
        "{status}: {}",
        String::from_utf8_lossy(body).trim()
    ))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_json(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(|e| EtikettError::Protocol(format!("reply is not JSON: {e}")))
}

/// Parse `{"is_ready": bool, "reason": string}`. Missing fields mean
/// not ready and no reason.
pub fn parse_status(body: &[u8]) -> Result<PrinterStatus> {
    let map = match parse_json(body)? {
        Value::Object(map) => map,
        other => {
            return Err(EtikettError::Protocol(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )));
        }
    };

    let is_ready = match map.get("is_ready") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(ready)) => *ready,
        Some(other) => {
            return Err(EtikettError::Protocol(format!(
                "is_ready is {}",
                json_kind(other)
            )));
        }
    };
    let reason = match map.get("reason") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(reason)) => reason.clone(),
        Some(other) => {
            return Err(EtikettError::Protocol(format!(
                "reason is {}",
                json_kind(other)
            )));
        }
    };

    Ok(PrinterStatus { is_ready, reason })
}

/// Parse the `/lpr/list` array, dropping entries with an empty name.
pub fn parse_printer_list(body: &[u8]) -> Result<Vec<PrinterInfo>> {
    let items = match parse_json(body)? {
        Value::Array(items) => items,
        other => {
            return Err(EtikettError::Protocol(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            )));
        }
    };

    let mut printers = Vec::with_capacity(items.len());
    for item in items {
        if !item.is_object() {
            return Err(EtikettError::Protocol(format!(
                "printer entry is {}",
                json_kind(&item)
            )));
        }
        // A null name is the same as a missing one.
        if item.get("printer").is_some_and(Value::is_null) {
            continue;
        }
        let info: PrinterInfo = serde_json::from_value(item)
            .map_err(|e| EtikettError::Protocol(format!("printer entry: {e}")))?;
        if !info.printer_name.is_empty() {
            printers.push(info);
        }
    }
    Ok(printers)
}

/// Transport printing through the service.
///
/// Requests are not serialised; the HTTP client runs them concurrently.
pub struct ServicePrinter {
    client: PrintServiceClient,
    target: PrinterTarget,
}

impl ServicePrinter {
    pub fn new(client: PrintServiceClient, target: PrinterTarget) -> Self {
        Self { client, target }
    }

    pub fn client(&self) -> &PrintServiceClient {
        &self.client
    }

    async fn ensure_ready(&self, options: PrintOptions) -> Result<()> {
        if options.ignore_printer_state {
            debug!("printer state ignored, skipping status check");
            return Ok(());
        }
        let status = self.client.fetch_status(self.target.name()).await?;
        if status.is_ready {
            Ok(())
        } else {
            warn!(printer = %self.target, reason = %status.reason, "service reports printer not ready");
            Err(EtikettError::not_ready(self.target.to_string(), status.reason))
        }
    }

    fn accept_reply(&self, reply: PrinterStatus) -> Result<()> {
        if reply.is_ready {
            return Ok(());
        }
        let reason = if reply.reason.is_empty() {
            format!("{} is not ready", self.target)
        } else {
            reply.reason
        };
        Err(EtikettError::ServerReported(reason))
    }
}

#[async_trait]
impl PrinterTransport for ServicePrinter {
    fn kind(&self) -> TransportKind {
        TransportKind::Service
    }

    fn printer(&self) -> String {
        format!("{} via {}", self.target, self.client.base_url())
    }

    async fn fetch_status(&self) -> Result<PrinterStatus> {
        self.client.fetch_status(self.target.name()).await
    }

    #[instrument(skip(self, data, options), fields(printer = %self.target))]
    async fn print_raw(&self, data: &[u8], options: PrintOptions) -> Result<u64> {
        self.ensure_ready(options).await?;
        let reply = self.client.print_raw(data, self.target.name()).await?;
        self.accept_reply(reply)?;
        info!(bytes = data.len(), "raw job accepted by service");
        Ok(data.len() as u64)
    }

    #[instrument(skip(self, options), fields(printer = %self.target, path = %path.display()))]
    async fn print_file(&self, path: &Path, options: PrintOptions) -> Result<u64> {
        let contents = tokio::fs::read(path)
            .await
            .map_err(|source| EtikettError::FileIo {
                path: path.to_path_buf(),
                source,
            })?;
        let bytes = contents.len() as u64;

        self.ensure_ready(options).await?;
        let reply = self
            .client
            .print_file(contents, options.copies, self.target.name())
            .await?;
        self.accept_reply(reply)?;
        info!(bytes, copies = options.copies, "file accepted by service");
        Ok(bytes)
    }

    async fn list_printers(&self) -> Result<Vec<PrinterInfo>> {
        self.client.list_printers().await
    }
}
