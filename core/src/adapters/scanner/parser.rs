//! Line parsers for lsof and ss output.
//!
//! Every function here is pure. A line that cannot be turned into a record is
//! skipped (`None`), never reported as an error.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{PortRecord, Protocol, LISTEN};

/// Output shape of the diagnostic tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFormat {
    /// Fixed-column table: `COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME [STATE]`.
    Lsof,
    /// `Netid State Recv-Q Send-Q Local Peer Process`, with the process in a
    /// trailing `users:(("name",pid=N,fd=M))` annotation.
    Ss,
}

/// Extract the port from an address field.
///
/// Takes the text after the last colon, so `*:8080`, `127.0.0.1:3000`,
/// `[::1]:443` and `[::]:80` all work. A wildcard port (`*`) or a missing
/// colon yields `None`.
pub fn parse_port(address: &str) -> Option<u16> {
    let last_colon = address.rfind(':')?;
    let port_str = &address[last_colon + 1..];
    if port_str == "*" {
        return None;
    }
    port_str.parse().ok()
}

/// Parse a single line of tool output.
pub fn parse_line(line: &str, format: ToolFormat) -> Option<PortRecord> {
    match format {
        ToolFormat::Lsof => parse_lsof_line(line),
        ToolFormat::Ss => parse_ss_line(line),
    }
}

/// Parse full tool output, dropping duplicate `(port, protocol, pid)` tuples.
pub fn parse_output(output: &str, format: ToolFormat) -> Vec<PortRecord> {
    dedup(output.lines().filter_map(|line| parse_line(line, format)))
}

/// Keep the first record for each `(port, protocol, pid)`, preserving order.
pub fn dedup(records: impl IntoIterator<Item = PortRecord>) -> Vec<PortRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.key()))
        .collect()
}

// ============================================================================
// lsof
// ============================================================================

/// Parse one line of `lsof -iTCP -iUDP -nP -sTCP:LISTEN`.
///
/// ```text
/// COMMAND     PID   USER   FD   TYPE  DEVICE SIZE/OFF NODE NAME
/// rapportd    496   mike    4u  IPv4  0x1234      0t0  TCP *:49153 (LISTEN)
/// mDNSRespo   100  _mdns    7u  IPv4  0x9999      0t0  UDP *:5353
/// ```
fn parse_lsof_line(line: &str) -> Option<PortRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 9 || fields[0] == "COMMAND" {
        return None;
    }

    // The NODE column is the protocol; this also rejects stray header lines.
    let protocol = Protocol::from_token(fields[7])?;
    // `local->remote` is a connected socket, not a listener.
    if fields[8].contains("->") {
        return None;
    }
    let port = parse_port(fields[8])?;

    let process_name = decode_escaped(fields[0]);
    let pid = fields[1].parse().unwrap_or(0);
    let user = fields[2];
    let state = fields
        .get(9)
        .map(|s| s.trim_matches(|c| c == '(' || c == ')'))
        .filter(|s| !s.is_empty())
        .unwrap_or(LISTEN);

    Some(PortRecord::new(port, protocol, pid, process_name, user, state))
}

/// Decode `\xNN` escapes lsof uses in process names.
fn decode_escaped(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(idx) = rest.find("\\x") {
        result.push_str(&rest[..idx]);
        let hex = rest.get(idx + 2..idx + 4);
        match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
            Some(byte) if byte.is_ascii() => {
                result.push(byte as char);
                rest = &rest[idx + 4..];
            }
            _ => {
                result.push_str("\\x");
                rest = &rest[idx + 2..];
            }
        }
    }
    result.push_str(rest);
    result
}

// ============================================================================
// ss
// ============================================================================

fn process_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\(\("([^"]*)""#).expect("valid process name regex"))
}

fn pid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"pid=(\d+)").expect("valid pid regex"))
}

/// Parse one line of `ss -tulnp`.
///
/// ```text
/// Netid State  Recv-Q Send-Q Local Address:Port Peer Address:Port Process
/// tcp   LISTEN 0      128    0.0.0.0:22         0.0.0.0:*         users:(("sshd",pid=1234,fd=3))
/// udp   UNCONN 0      0      0.0.0.0:5353       0.0.0.0:*         users:(("avahi-daemon",pid=567,fd=12))
/// ```
fn parse_ss_line(line: &str) -> Option<PortRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return None;
    }

    // Netid doubles as the header check.
    let protocol = Protocol::from_token(fields[0])?;
    let state = fields[1];
    let port = parse_port(fields[4])?;

    // Process names may contain spaces, so look at the whole tail.
    let annotation = fields.get(6..).map(|rest| rest.join(" ")).unwrap_or_default();
    let (pid, process_name) = parse_process_annotation(&annotation);

    Some(PortRecord::new(port, protocol, pid, process_name, "", state))
}

/// Extract `(pid, name)` from `users:(("sshd",pid=1234,fd=3))`.
///
/// Missing pieces come back as `0` / empty.
fn parse_process_annotation(annotation: &str) -> (u32, String) {
    let name = process_name_regex()
        .captures(annotation)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();
    let pid = pid_regex()
        .captures(annotation)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0);
    (pid, name)
}
