//! Kill command - signal the process bound to a port.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use portpilot_core::ports::ProcessPort;
use portpilot_core::{PsProcesses, Signal};
use tracing::debug;

use super::scan_once;

/// How long to wait before checking whether the process went away.
const EXIT_GRACE: Duration = Duration::from_millis(500);

pub async fn run(port: u16, signal: &str, force: bool) -> Result<()> {
    // Reject a bad signal before touching the system.
    let signal: Signal = signal.parse()?;

    let service = scan_once().await?;
    let Some(target) = service.find_by_port(port) else {
        println!("No process found on port {}", port);
        return Ok(());
    };

    if !force && !confirm(&format!(
        "Kill {:?} (PID {}) on port {}? [y/N] ",
        target.process_name, target.pid, target.port
    ))? {
        println!("Cancelled.");
        return Ok(());
    }

    let processes = PsProcesses::new();
    processes
        .send_signal(target.pid, signal)
        .with_context(|| format!("killing process on port {}", port))?;
    println!(
        "Sent {} to PID {} ({}) on port {}",
        signal, target.pid, target.process_name, target.port
    );

    if matches!(signal, Signal::Term | Signal::Kill) {
        tokio::time::sleep(EXIT_GRACE).await;
        let alive = processes.is_alive(target.pid);
        debug!(pid = target.pid, alive, "post-signal check");
        if alive {
            println!("PID {} is still running; try --signal KILL", target.pid);
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
