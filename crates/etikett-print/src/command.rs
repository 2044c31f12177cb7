// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command lines for the local print tools.
//
// Unix and Windows ship tools with the same names but different flag letters
// (and Windows `lpr.exe` cannot read a job from standard input or print
// several copies). The differences live in one table per platform so the
// transport logic never branches on the OS.

use std::fmt;
use std::path::Path;

use etikett_core::PrinterTarget;

/// Flag layout of the print tools on one platform.
#[derive(Debug)]
struct ToolTable {
    lpr: &'static str,
    lpq: &'static str,
    lpoptions: &'static str,
    lpr_host: &'static str,
    lpr_printer: &'static str,
    lpq_host: &'static str,
    lpq_printer: &'static str,
    lpoptions_host: &'static str,
    lpoptions_printer: &'static str,
    /// Host passed when the target has none. `None` omits the flag.
    default_host: Option<&'static str>,
    /// `lpr` only prints files; raw data must be spooled to disk first.
    spools_raw_data: bool,
    /// `lpr` accepts `-#<copies>`; otherwise one spawn per copy.
    native_copies: bool,
}

const UNIX: ToolTable = ToolTable {
    lpr: "lpr",
    lpq: "lpq",
    lpoptions: "lpoptions",
    lpr_host: "-H",
    lpr_printer: "-P",
    lpq_host: "-h",
    lpq_printer: "-P",
    lpoptions_host: "-h",
    lpoptions_printer: "-p",
    default_host: None,
    spools_raw_data: false,
    native_copies: true,
};

const WINDOWS: ToolTable = ToolTable {
    lpr: "lpr.exe",
    lpq: "lpq.exe",
    lpoptions: "lpoptions.exe",
    lpr_host: "-S",
    lpr_printer: "-P",
    lpq_host: "-S",
    lpq_printer: "-P",
    lpoptions_host: "-h",
    lpoptions_printer: "-p",
    default_host: Some("localhost"),
    spools_raw_data: true,
    native_copies: false,
};

/// Operating system family whose print tools are invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    /// Platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    fn table(self) -> &'static ToolTable {
        match self {
            Self::Unix => &UNIX,
            Self::Windows => &WINDOWS,
        }
    }

    /// Whether raw data has to be written to a temporary file for `lpr`.
    pub fn spools_raw_data(self) -> bool {
        self.table().spools_raw_data
    }

    /// `lpr` reading the job from standard input.
    ///
    /// Only valid where [`Platform::spools_raw_data`] is false; elsewhere
    /// spool the data and use [`Platform::print_file`] with one copy.
    pub fn print_stdin(self, target: &PrinterTarget, data: Vec<u8>) -> Invocation {
        let t = self.table();
        let mut invocation = Invocation::new(t.lpr);
        self.push_target(&mut invocation, target, t.lpr_host, t.lpr_printer);
        invocation.stdin = Some(data);
        invocation
    }

    /// `lpr` invocations printing `copies` copies of a file.
    pub fn print_file(self, target: &PrinterTarget, path: &Path, copies: u32) -> Vec<Invocation> {
        let t = self.table();
        let copies = copies.max(1);
        let single = |extra: &[String]| {
            let mut invocation = Invocation::new(t.lpr);
            self.push_target(&mut invocation, target, t.lpr_host, t.lpr_printer);
            invocation.args.extend_from_slice(extra);
            invocation
        };

        if t.native_copies {
            vec![single(&[
                format!("-#{copies}"),
                path.display().to_string(),
            ])]
        } else {
            let extra = ["-o".to_string(), "l".to_string(), path.display().to_string()];
            (0..copies).map(|_| single(&extra)).collect()
        }
    }

    /// `lpq` for the readiness probe.
    pub fn queue_status(self, target: &PrinterTarget) -> Invocation {
        let t = self.table();
        let mut invocation = Invocation::new(t.lpq);
        self.push_target(&mut invocation, target, t.lpq_host, t.lpq_printer);
        invocation
    }

    /// `lpoptions` for the fallback probe.
    pub fn printer_options(self, target: &PrinterTarget) -> Invocation {
        let t = self.table();
        let mut invocation = Invocation::new(t.lpoptions);
        self.push_target(&mut invocation, target, t.lpoptions_host, t.lpoptions_printer);
        invocation
    }

    fn push_target(
        self,
        invocation: &mut Invocation,
        target: &PrinterTarget,
        host_flag: &str,
        printer_flag: &str,
    ) {
        if let Some(host) = target.host().or(self.table().default_host) {
            invocation.args.push(host_flag.to_string());
            invocation.args.push(host.to_string());
        }
        if let Some(name) = target.name() {
            invocation.args.push(printer_flag.to_string());
            invocation.args.push(name.to_string());
        }
    }
}

/// One subprocess to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: &'static str,
    pub args: Vec<String>,
    /// Bytes written to the child's standard input, which is closed afterwards.
    pub stdin: Option<Vec<u8>>,
}

impl Invocation {
    pub fn new(program: &'static str) -> Self {
        Self {
            program,
            args: Vec::new(),
            stdin: None,
        }
    }

    /// Program name without a platform extension, for messages.
    pub fn tool(&self) -> &'static str {
        self.program.trim_end_matches(".exe")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
