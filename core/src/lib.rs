//! PortPilot Core Library
//!
//! Listening-port discovery, process attribution and the interactive session
//! state machine behind the `portpilot` terminal UI.
//! Provides functionality to:
//! - Scan listening TCP ports and bound UDP sockets
//! - Attribute each socket to its process and enrich it with CPU/memory stats
//! - Filter, sort and flag conflicting ports
//! - Drive an interactive session as a pure event -> effects state machine
//! - Load user configuration (port groups, refresh interval)
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - macOS: Uses `lsof` and `ps` commands
//! - Linux: Uses `ss` and `ps` commands

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{
    derive, DisplayList, PortRecord, ProcessDetails, ProcessStats, Protocol, Signal, SortColumn,
    SortSpec,
};

// Re-export other commonly used types
pub use adapters::{PortScanner, PsProcesses};
pub use application::{EffectRunner, Effect, Event, Key, PortQuery, PortService, Session, ViewMode};
pub use config::{Config, ConfigStore, Group};
pub use error::{Error, Result};
