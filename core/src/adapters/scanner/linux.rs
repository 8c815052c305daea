//! Linux port scanner implementation using ss.

use tracing::debug;

use crate::domain::PortRecord;
use crate::error::Result;
use crate::ports::ProcessStatsPort;

use super::parser::{parse_output, ToolFormat};
use super::{enrich, run_tool};

/// Linux-specific port scanner.
pub struct SsScanner<S = crate::adapters::PsProcesses> {
    stats: S,
}

impl<S: ProcessStatsPort> SsScanner<S> {
    pub fn new(stats: S) -> Self {
        Self { stats }
    }

    /// Scan listening TCP and bound UDP sockets with `ss -tulnp`.
    ///
    /// ss has no user column; enrichment fills it in.
    pub async fn scan(&self) -> Result<Vec<PortRecord>> {
        let output = run_tool("ss", &["-tulnp"]).await?;
        let mut records = parse_output(&output, ToolFormat::Ss);
        debug!(count = records.len(), "ss records parsed");

        enrich(&mut records, &self.stats).await;
        Ok(records)
    }
}
