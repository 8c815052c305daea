//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter handles communication with external systems.

mod process;
pub mod scanner;

// Re-export main types for convenience
pub use process::{hostname, parse_details_line, parse_lstart, parse_stats_line, PsProcesses};
pub use scanner::PortScanner;
