// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Etikett Print: delivers encoded labels and files to a printer.
//
// Two transports sit behind one trait: the local hardware queue, driven by
// spawning `lpr`/`lpq`/`lpoptions`, and a remote print micro-service reached
// over HTTP. Both check printer readiness before printing. The dispatcher
// picks one from configuration and runs every operation as a background
// task that callers can await or wait on with a deadline.

pub mod command;
pub mod dispatcher;
pub mod lpr_client;
pub mod probe;
pub mod restrictor;
pub mod runner;
pub mod service_client;
pub mod transport;

pub use command::{Invocation, Platform};
pub use dispatcher::{PrintDispatcher, PrintHandle};
pub use lpr_client::LprPrinter;
pub use restrictor::Restrictor;
pub use runner::{CommandRunner, ProcessOutput, SystemRunner};
pub use service_client::{PrintServiceClient, ServicePrinter};
pub use transport::PrinterTransport;
