//! Port scanning application service.

use parking_lot::RwLock;

use crate::domain::{sort_records, PortRecord, SortSpec};
use crate::error::Result;
use crate::ports::PortScannerPort;

/// Criteria for the non-interactive listing commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortQuery {
    /// Exact port number.
    pub port: Option<u16>,
    /// Case-insensitive substring of the process name.
    pub process: Option<String>,
}

impl PortQuery {
    pub fn matches(&self, record: &PortRecord) -> bool {
        if self.port.is_some_and(|port| record.port != port) {
            return false;
        }
        match &self.process {
            Some(name) => record
                .process_name
                .to_lowercase()
                .contains(&name.to_lowercase()),
            None => true,
        }
    }
}

/// Application service for port scanning operations.
///
/// This service handles port scanning, caching, and lookups for the one-shot
/// commands. It uses the `PortScannerPort` trait for the actual scanning,
/// allowing different implementations to be injected.
pub struct PortService<S: PortScannerPort> {
    scanner: S,
    ports_cache: RwLock<Vec<PortRecord>>,
}

impl<S: PortScannerPort> PortService<S> {
    /// Create a new port service with the given scanner.
    pub fn new(scanner: S) -> Self {
        Self {
            scanner,
            ports_cache: RwLock::new(Vec::new()),
        }
    }

    /// Refresh the port cache by scanning.
    ///
    /// On failure the previous cache is kept.
    pub async fn refresh(&self) -> Result<()> {
        let ports = self.scanner.scan().await?;
        *self.ports_cache.write() = ports;
        Ok(())
    }

    /// Get all cached ports, in scan order.
    pub fn get_ports(&self) -> Vec<PortRecord> {
        self.ports_cache.read().clone()
    }

    /// Cached ports matching `query`, sorted by port.
    pub fn query(&self, query: &PortQuery) -> Vec<PortRecord> {
        let ports = self.ports_cache.read();
        let mut matched: Vec<&PortRecord> = ports.iter().filter(|r| query.matches(r)).collect();
        sort_records(&mut matched, SortSpec::default());
        matched.into_iter().cloned().collect()
    }

    /// Find the first record bound to a port.
    pub fn find_by_port(&self, port: u16) -> Option<PortRecord> {
        self.ports_cache
            .read()
            .iter()
            .find(|p| p.port == port)
            .cloned()
    }
}
