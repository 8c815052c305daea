//! macOS port scanner implementation using lsof.

use tracing::debug;

use crate::domain::PortRecord;
use crate::error::Result;
use crate::ports::ProcessStatsPort;

use super::parser::{parse_output, ToolFormat};
use super::{enrich, run_tool};

/// macOS-specific port scanner using lsof.
pub struct LsofScanner<S = crate::adapters::PsProcesses> {
    stats: S,
}

impl<S: ProcessStatsPort> LsofScanner<S> {
    pub fn new(stats: S) -> Self {
        Self { stats }
    }

    /// Scan all listening TCP sockets and bound UDP sockets.
    ///
    /// Uses `lsof -iTCP -iUDP -nP -sTCP:LISTEN`:
    /// - -iTCP -iUDP: Internet sockets of both protocols
    /// - -n: Show IP addresses (don't resolve to hostnames)
    /// - -P: Show port numbers (don't resolve to service names)
    /// - -sTCP:LISTEN: Only TCP sockets in LISTEN state
    pub async fn scan(&self) -> Result<Vec<PortRecord>> {
        let output = run_tool("lsof", &["-iTCP", "-iUDP", "-nP", "-sTCP:LISTEN"]).await?;
        let mut records = parse_output(&output, ToolFormat::Lsof);
        debug!(count = records.len(), "lsof records parsed");

        enrich(&mut records, &self.stats).await;
        Ok(records)
    }
}
