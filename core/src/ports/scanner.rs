//! Port scanner port (interface).

use crate::domain::PortRecord;
use crate::error::Result;

/// Port for scanning network ports.
///
/// This trait defines the interface for port scanning functionality.
/// Implementations handle platform-specific details (lsof, ss).
pub trait PortScannerPort: Send + Sync {
    /// Scan for all listening TCP and UDP ports.
    ///
    /// Returns deduplicated, enriched records in first-appearance order.
    fn scan(&self) -> impl std::future::Future<Output = Result<Vec<PortRecord>>> + Send;
}
