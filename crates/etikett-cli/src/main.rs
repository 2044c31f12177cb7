// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Etikett command-line front end.
//
// Entry point. Initialises logging, loads the configuration, then runs one
// subcommand against the configured printer transport.

mod config_dir;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tracing::{debug, error, warn};

use etikett_core::error::Result;
use etikett_core::human_errors::humanize_error;
use etikett_core::{AppConfig, EtikettError, PrintOptions, PrintReceipt};
use etikett_label::{
    BarcodeOptions, BarcodeType, LabelEncoder, LabelSetup, LineType, TextOptions,
};
use etikett_print::PrintDispatcher;

#[derive(Parser)]
#[command(name = "etikett")]
#[command(version)]
#[command(about = "Print EPL2 labels on local or networked label printers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file [default: $XDG_CONFIG_HOME/etikett/config.json]
    #[arg(short, long, global = true, env = "ETIKETT_CONFIG")]
    config: Option<PathBuf>,

    /// Print without checking whether the printer is ready
    #[arg(long, global = true)]
    ignore_state: bool,

    /// Give up waiting for the printer after this many seconds
    #[arg(long, global = true, default_value_t = 60)]
    wait_secs: u64,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether the configured printer is ready
    Status,

    /// List printers known to the print service
    List,

    /// Print a file
    PrintFile {
        path: PathBuf,

        /// Number of copies
        #[arg(short = 'n', long, default_value_t = 1)]
        copies: u32,
    },

    /// Send raw printer data from a file, or from standard input
    PrintRaw { path: Option<PathBuf> },

    /// Print a test label
    TestLabel {
        /// Headline text
        #[arg(long, default_value = "Etikett test label")]
        text: String,

        /// Barcode data
        #[arg(long)]
        barcode: Option<String>,

        /// Barcode symbology, e.g. Code39, Ean13, Code128Auto
        #[arg(long, default_value = "Code128Auto")]
        barcode_type: String,

        /// QR code data
        #[arg(long)]
        qr: Option<String>,

        /// Write the EPL2 program to standard output instead of printing
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(config_dir::config_file);
    let config = AppConfig::load_or_default(&config_path)?;
    debug!(path = %config_path.display(), "configuration loaded");

    let deadline = Duration::from_secs(cli.wait_secs);
    let options = |copies| PrintOptions {
        copies,
        ignore_printer_state: cli.ignore_state,
    };

    match cli.command {
        Commands::Status => {
            let dispatcher = PrintDispatcher::from_config(&config)?;
            let status = dispatcher.fetch_status().wait_timeout(deadline).await?;
            if status.is_ready {
                println!("{}: ready", dispatcher.printer());
            } else if status.reason.is_empty() {
                println!("{}: not ready", dispatcher.printer());
            } else {
                println!("{}: not ready ({})", dispatcher.printer(), status.reason);
            }
        }

        Commands::List => {
            let dispatcher = PrintDispatcher::from_config(&config)?;
            let printers = dispatcher.list_printers().wait_timeout(deadline).await?;
            if printers.is_empty() {
                println!("No printers found.");
            }
            for printer in printers {
                println!(
                    "{:<24} raw: {:<3} files: {}",
                    printer.printer_name,
                    yes_no(printer.accepts_raw),
                    yes_no(printer.accepts_files)
                );
            }
        }

        Commands::PrintFile { ref path, copies } => {
            let dispatcher = PrintDispatcher::from_config(&config)?;
            let receipt = dispatcher
                .print_file(path.clone(), options(copies))
                .wait_timeout(deadline)
                .await?;
            print_receipt(&receipt);
        }

        Commands::PrintRaw { ref path } => {
            let data = read_input(path.as_deref()).await?;
            let dispatcher = PrintDispatcher::from_config(&config)?;
            let receipt = dispatcher
                .print_raw(data, options(1))
                .wait_timeout(deadline)
                .await?;
            print_receipt(&receipt);
        }

        Commands::TestLabel {
            ref text,
            ref barcode,
            ref barcode_type,
            ref qr,
            dry_run,
        } => {
            let encoder = build_test_label(
                config.printer_dpi,
                text,
                barcode.as_deref(),
                barcode_type,
                qr.as_deref(),
            );
            if dry_run {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(encoder.label_data())?;
                stdout.flush()?;
            } else {
                let dispatcher = PrintDispatcher::from_config(&config)?;
                let receipt = dispatcher
                    .print_label(&encoder, options(1))
                    .wait_timeout(deadline)
                    .await?;
                print_receipt(&receipt);
            }
        }
    }
    Ok(())
}

async fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => tokio::fs::read(path)
            .await
            .map_err(|source| EtikettError::FileIo {
                path: path.to_path_buf(),
                source,
            }),
        None => {
            let mut data = Vec::new();
            tokio::io::stdin().read_to_end(&mut data).await?;
            Ok(data)
        }
    }
}

/// A label with a headline, a rule, and optionally a barcode and a QR code.
fn build_test_label(
    dpi: u32,
    text: &str,
    barcode: Option<&str>,
    barcode_type: &str,
    qr: Option<&str>,
) -> LabelEncoder {
    let mut encoder = LabelEncoder::new(dpi);
    encoder.start_label(LabelSetup::default());

    let headline = encoder.add_text(text, 40, 40, TextOptions::default());
    let rule = encoder.add_line(
        40,
        headline.bottom() + 16,
        encoder.label_size().width - 80,
        4,
        LineType::Black,
    );
    let mut y = rule.bottom() + 32;

    if let Some(data) = barcode {
        let kind = BarcodeType::from_name(barcode_type).unwrap_or_else(|| {
            warn!(barcode_type, "unknown barcode type, using Code128Auto");
            BarcodeType::Code128Auto
        });
        let options = BarcodeOptions {
            height: 120,
            ..BarcodeOptions::default()
        };
        y = encoder.add_barcode(data, kind, 40, y, options).bottom() + 32;
    }

    if let Some(data) = qr {
        encoder.add_qr_code(data, 40, y, 200);
    }

    encoder.add_print_command(1);
    encoder
}

fn print_receipt(receipt: &PrintReceipt) {
    println!(
        "Sent {} bytes to {} via {} (job {})",
        receipt.bytes,
        receipt.printer,
        receipt.transport.display_name(),
        receipt.job_id
    );
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn report(err: &EtikettError) {
    error!(error = %err, kind = ?err.kind(), "command failed");
    let human = humanize_error(err);
    eprintln!("{}", human.message);
    eprintln!("{}", human.suggestion);
    if !err.is_user_facing() {
        eprintln!("Detail: {err}");
    }
}
