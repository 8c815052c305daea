//! Port scanner adapters.
//!
//! Two tool-backed implementations, picked once at startup from the running
//! platform: lsof on macOS and ss on Linux.

mod darwin;
mod enrich;
mod linux;
pub mod parser;

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::adapters::PsProcesses;
use crate::domain::PortRecord;
use crate::error::{Error, Result};
use crate::ports::PortScannerPort;

pub use darwin::LsofScanner;
pub use enrich::enrich;
pub use linux::SsScanner;
pub use parser::ToolFormat;

/// The platform scanner, fixed for the lifetime of the process.
pub enum PortScanner {
    Lsof(LsofScanner),
    Ss(SsScanner),
}

impl PortScanner {
    /// Pick the scanner for the platform this binary is running on.
    pub fn detect() -> Result<Self> {
        Self::for_os(std::env::consts::OS)
    }

    /// Pick the scanner for an OS name as reported by `std::env::consts::OS`.
    pub fn for_os(os: &str) -> Result<Self> {
        match os {
            "macos" => Ok(PortScanner::Lsof(LsofScanner::new(PsProcesses::new()))),
            "linux" => Ok(PortScanner::Ss(SsScanner::new(PsProcesses::new()))),
            other => Err(Error::UnsupportedPlatform(other.to_string())),
        }
    }

    /// Output shape of the underlying tool.
    pub fn format(&self) -> ToolFormat {
        match self {
            PortScanner::Lsof(_) => ToolFormat::Lsof,
            PortScanner::Ss(_) => ToolFormat::Ss,
        }
    }
}

impl PortScannerPort for PortScanner {
    async fn scan(&self) -> Result<Vec<PortRecord>> {
        match self {
            PortScanner::Lsof(scanner) => scanner.scan().await,
            PortScanner::Ss(scanner) => scanner.scan().await,
        }
    }
}

/// Run a diagnostic tool once and return its stdout.
///
/// A non-zero exit is tolerated as long as the tool printed something; only
/// empty output on failure is a `ScanFailed`.
pub(crate) async fn run_tool(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| Error::ScanFailed(format!("{}: {}", program, e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

    if !output.status.success() {
        if stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ScanFailed(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }
        warn!(program, status = %output.status, "tool exited non-zero, using partial output");
    }

    debug!(program, bytes = stdout.len(), "tool output captured");
    Ok(stdout)
}
