//! Example: Scan listening ports once and flag conflicts.

use portpilot_core::{derive, PortScanner, PortService, SortSpec};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("Scanning ports...\n");

    let scanner = match PortScanner::detect() {
        Ok(scanner) => scanner,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    let service = PortService::new(scanner);

    if let Err(e) = service.refresh().await {
        eprintln!("Error scanning ports: {}", e);
        return;
    }

    let snapshot = service.get_ports();
    let display = derive(&snapshot, "", SortSpec::default());
    if display.is_empty() {
        println!("No listening ports found.");
        return;
    }

    println!(
        "{:<6} {:<6} {:<8} {:<20} {:<10} {}",
        "PORT", "PROTO", "PID", "PROCESS", "USER", "CONFLICT"
    );
    println!("{}", "-".repeat(64));

    for record in &display.rows {
        let name: String = record.process_name.chars().take(20).collect();
        println!(
            "{:<6} {:<6} {:<8} {:<20} {:<10} {}",
            record.port,
            record.protocol,
            record.pid,
            name,
            record.user,
            if display.is_conflict(record.port) { "yes" } else { "" }
        );
    }

    println!("\nTotal: {} ports, {} in conflict", display.len(), display.conflicts.len());
}
