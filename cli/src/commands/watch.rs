//! Watch command - redraw the port table on an interval.

use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use portpilot_core::{PortQuery, PortScanner, PortService};
use tracing::warn;

use super::format_table;

pub async fn run(port: Option<u16>, interval: Duration) -> Result<()> {
    let service = PortService::new(PortScanner::detect()?);
    let query = PortQuery { port, process: None };
    let mut ticker = tokio::time::interval(interval);

    loop {
        // The first tick completes immediately.
        ticker.tick().await;

        if let Err(e) = service.refresh().await {
            warn!(error = %e, "watch scan failed");
            eprintln!("Scan error: {}", e);
            continue;
        }

        let ports = service.query(&query);
        print!("\x1b[2J\x1b[H");
        println!(
            "PortPilot Watch | {} | {} ports\n",
            Local::now().format("%H:%M:%S"),
            ports.len()
        );
        print!("{}", format_table(&ports));
        println!(
            "\nRefreshing every {}s... Press Ctrl+C to stop.",
            interval.as_secs()
        );
    }
}
