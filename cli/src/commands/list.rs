//! List command - show all listening ports.

use anyhow::Result;
use portpilot_core::PortQuery;

use super::{format_table, scan_once};

pub async fn run(port: Option<u16>, process: Option<String>, json: bool) -> Result<()> {
    let service = scan_once().await?;
    let ports = service.query(&PortQuery { port, process });

    if json {
        println!("{}", serde_json::to_string_pretty(&ports)?);
        return Ok(());
    }

    if ports.is_empty() {
        println!("No listening ports found.");
        return Ok(());
    }

    print!("{}", format_table(&ports));
    println!("\nTotal: {} ports", ports.len());
    Ok(())
}
