//! Secondary lookup pass attaching CPU, memory, start time and command data.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::PortRecord;
use crate::ports::ProcessStatsPort;

/// Enrich `records` in place, one lookup per distinct non-zero PID.
///
/// Lookups run sequentially in ascending PID order. A failed lookup leaves the
/// affected records at their defaults.
pub async fn enrich<S: ProcessStatsPort>(records: &mut [PortRecord], stats: &S) {
    let pids: BTreeSet<u32> = records
        .iter()
        .map(|r| r.pid)
        .filter(|pid| *pid > 0)
        .collect();

    for pid in pids {
        match stats.process_stats(pid).await {
            Ok(found) => {
                for record in records.iter_mut().filter(|r| r.pid == pid) {
                    record.apply_stats(&found);
                }
            }
            Err(e) => debug!(pid, error = %e, "stat lookup failed, keeping defaults"),
        }
    }
}
