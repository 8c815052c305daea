//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod port;
mod signal;
mod view;

// Re-export all domain types
pub use port::{PortRecord, ProcessDetails, ProcessStats, Protocol, LISTEN};
pub use signal::Signal;
pub use view::{derive, filter_records, find_conflicts, sort_records, DisplayList, SortColumn, SortSpec};
