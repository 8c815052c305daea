//! CLI subcommands.

pub mod check;
pub mod config;
pub mod kill;
pub mod list;
pub mod watch;

use anyhow::Result;
use portpilot_core::{PortRecord, PortScanner, PortService};

/// Scan once and return a service holding the result.
pub async fn scan_once() -> Result<PortService<PortScanner>> {
    let service = PortService::new(PortScanner::detect()?);
    service.refresh().await?;
    Ok(service)
}

/// Render records as an aligned plain-text table.
pub fn format_table(records: &[PortRecord]) -> String {
    let mut out = format!(
        "{:<6} {:<5} {:<8} {:<20} {:<12} {:>6} {:>6}  {}\n",
        "PORT", "PROTO", "PID", "PROCESS", "USER", "CPU%", "MEM%", "STATE"
    );
    out.push_str(&"-".repeat(80));
    out.push('\n');

    for record in records {
        out.push_str(&format!(
            "{:<6} {:<5} {:<8} {:<20} {:<12} {:>6.1} {:>6.1}  {}\n",
            record.port,
            record.protocol,
            record.pid,
            truncate(&record.process_name, 20),
            truncate(&record.user, 12),
            record.cpu_percent,
            record.mem_percent,
            record.state,
        ));
    }
    out
}

/// Shorten to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
