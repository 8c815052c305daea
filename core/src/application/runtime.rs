//! Executes session effects against real (or mock) adapters.

use std::ops::ControlFlow;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::ports::{PortScannerPort, ProcessPort};

use super::session::{Effect, Event};

/// Runs the effects a [`Session`](super::Session) asks for.
///
/// Scans, ticks and detail lookups are spawned onto the tokio runtime; each
/// reports back by sending one [`Event`] into the session's queue. Signal
/// delivery is a single syscall and runs inline.
pub struct EffectRunner<S, P> {
    scanner: Arc<S>,
    processes: Arc<P>,
    events: UnboundedSender<Event>,
}

impl<S, P> EffectRunner<S, P>
where
    S: PortScannerPort + 'static,
    P: ProcessPort + 'static,
{
    pub fn new(scanner: Arc<S>, processes: Arc<P>, events: UnboundedSender<Event>) -> Self {
        Self {
            scanner,
            processes,
            events,
        }
    }

    /// Run a batch of effects; breaks as soon as one of them is `Quit`.
    pub fn run_all(&self, effects: impl IntoIterator<Item = Effect>) -> ControlFlow<()> {
        for effect in effects {
            self.run(effect)?;
        }
        ControlFlow::Continue(())
    }

    /// Run one effect.
    pub fn run(&self, effect: Effect) -> ControlFlow<()> {
        match effect {
            Effect::Scan { seq } => {
                let scanner = Arc::clone(&self.scanner);
                let events = self.events.clone();
                tokio::spawn(async move {
                    debug!(seq, "scan started");
                    let result = scanner.scan().await.map_err(|e| {
                        warn!(seq, error = %e, "scan failed");
                        e.to_string()
                    });
                    // The receiver is gone once the session has quit.
                    let _ = events.send(Event::ScanCompleted {
                        seq,
                        result,
                        finished_at: Local::now(),
                    });
                });
            }
            Effect::ScheduleTick(delay) => {
                let events = self.events.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = events.send(Event::Tick);
                });
            }
            Effect::FetchDetails { pid } => {
                let processes = Arc::clone(&self.processes);
                let events = self.events.clone();
                tokio::spawn(async move {
                    let result = processes.list_details(pid).await.map_err(|e| e.to_string());
                    let _ = events.send(Event::DetailsLoaded { pid, result });
                });
            }
            Effect::SendSignal { target, signal } => {
                let result = self
                    .processes
                    .send_signal(target.pid, signal)
                    .map_err(|e| e.to_string());
                match &result {
                    Ok(()) => info!(pid = target.pid, port = target.port, %signal, "signal delivered"),
                    Err(e) => warn!(pid = target.pid, port = target.port, %signal, error = %e, "signal failed"),
                }
                let _ = self.events.send(Event::SignalDelivered {
                    target,
                    signal,
                    result,
                });
            }
            Effect::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }
}
