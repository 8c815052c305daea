//! Port and process domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ============================================================================
// Protocol
// ============================================================================

/// Transport protocol of a listening socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    /// Parse a protocol token (`TCP`, `tcp`, `UDP`, ...).
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("tcp") {
            Some(Protocol::Tcp)
        } else if token.eq_ignore_ascii_case("udp") {
            Some(Protocol::Udp)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// State token shared by TCP listeners and bound UDP sockets.
pub const LISTEN: &str = "LISTEN";

// ============================================================================
// PortRecord
// ============================================================================

/// One observed listening endpoint and the process that owns it.
///
/// Within one scan result the tuple `(port, protocol, pid)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    /// The port number (e.g., 3000, 8080).
    pub port: u16,
    /// TCP or UDP.
    pub protocol: Protocol,
    /// Owning process ID, 0 when the tool could not attribute the socket.
    pub pid: u32,
    /// Short process name, possibly truncated by the source tool.
    pub process_name: String,
    /// Owning account name, empty if unresolved.
    pub user: String,
    /// Socket state; always `LISTEN` for UDP.
    pub state: String,
    /// Full command line, filled by enrichment.
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub cpu_percent: f64,
    #[serde(default)]
    pub mem_percent: f64,
    /// Process start time as reported by the system.
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
}

impl PortRecord {
    /// Create a record from the fields the primary scan can see.
    pub fn new(
        port: u16,
        protocol: Protocol,
        pid: u32,
        process_name: impl Into<String>,
        user: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        let state = match protocol {
            Protocol::Udp => LISTEN.to_string(),
            Protocol::Tcp => state.into(),
        };
        Self {
            port,
            protocol,
            pid,
            process_name: process_name.into(),
            user: user.into(),
            state,
            command: String::new(),
            cpu_percent: 0.0,
            mem_percent: 0.0,
            start_time: None,
        }
    }

    /// Deduplication key.
    pub fn key(&self) -> (u16, Protocol, u32) {
        (self.port, self.protocol, self.pid)
    }

    /// Merge looked-up process statistics into this record.
    ///
    /// `command` and `user` are only filled when the primary scan left them empty.
    pub fn apply_stats(&mut self, stats: &ProcessStats) {
        self.cpu_percent = stats.cpu_percent;
        self.mem_percent = stats.mem_percent;
        self.start_time = stats.start_time;
        if self.command.is_empty() {
            self.command = stats.command.clone();
        }
        if self.user.is_empty() {
            self.user = stats.user.clone();
        }
    }

    /// Check if this record matches a filter query.
    ///
    /// Searches port number, process name, user and command, case-insensitively.
    pub fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query_lower = query.to_lowercase();
        self.port.to_string().contains(&query_lower)
            || self.process_name.to_lowercase().contains(&query_lower)
            || self.user.to_lowercase().contains(&query_lower)
            || self.command.to_lowercase().contains(&query_lower)
    }

    /// Processes with a low PID are usually system daemons.
    pub fn is_system(&self) -> bool {
        self.pid > 0 && self.pid < 100
    }
}

impl std::fmt::Display for PortRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} (PID: {}, Process: {})",
            self.port, self.protocol, self.pid, self.process_name
        )
    }
}

// ============================================================================
// Process information
// ============================================================================

/// Resource usage for one PID, gathered during enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessStats {
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub user: String,
    pub start_time: Option<NaiveDateTime>,
    pub command: String,
}

/// Detailed view of a single process, fetched when the detail pane opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDetails {
    pub pid: u32,
    pub parent_pid: u32,
    pub name: String,
    pub user: String,
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub start_time: Option<NaiveDateTime>,
    pub command: String,
}
