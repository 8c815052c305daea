//! Process inspection and signalling ports (interfaces).

use crate::domain::{ProcessDetails, ProcessStats, Signal};
use crate::error::Result;

/// Port for the per-PID statistics lookup used by enrichment.
pub trait ProcessStatsPort: Send + Sync {
    /// Fetch CPU%, memory%, owner, start time and command line for one PID.
    fn process_stats(
        &self,
        pid: u32,
    ) -> impl std::future::Future<Output = Result<ProcessStats>> + Send;
}

/// Port for inspecting and signalling processes.
///
/// Implementations handle platform-specific signal delivery.
pub trait ProcessPort: Send + Sync {
    /// Fetch detailed information about a process.
    ///
    /// Returns `Error::ProcessNotFound` when the PID does not exist.
    fn list_details(
        &self,
        pid: u32,
    ) -> impl std::future::Future<Output = Result<ProcessDetails>> + Send;

    /// Check if a process is still running.
    fn is_alive(&self, pid: u32) -> bool;

    /// Deliver a signal to a process.
    fn send_signal(&self, pid: u32, signal: Signal) -> Result<()>;
}
