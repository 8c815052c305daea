//! Check command - report whether a port is free.

use anyhow::Result;
use serde_json::json;

use super::scan_once;

/// Returns `true` when the port is in use.
pub async fn run(port: u16, json: bool) -> Result<bool> {
    let service = scan_once().await?;
    let owner = service.find_by_port(port);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "port": port,
                "in_use": owner.is_some(),
                "owner": owner,
            }))?
        );
        return Ok(owner.is_some());
    }

    match &owner {
        Some(record) => println!(
            "Port {} is in use by {:?} (PID {}, {})",
            port, record.process_name, record.pid, record.protocol
        ),
        None => println!("Port {} is free", port),
    }
    Ok(owner.is_some())
}
