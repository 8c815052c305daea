//! Process inspection via `ps` and signal delivery via `kill(2)`.

use std::process::Stdio;

use chrono::NaiveDateTime;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::{ProcessDetails, ProcessStats, Signal};
use crate::error::{Error, Result};
use crate::ports::{ProcessPort, ProcessStatsPort};

/// `lstart` layout once whitespace has been collapsed: `Thu Feb 19 04:00:00 2026`.
const LSTART_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Number of whitespace-separated fields `lstart` occupies.
const LSTART_FIELDS: usize = 5;

/// Process collaborator backed by the system `ps` tool.
#[derive(Debug, Default, Clone, Copy)]
pub struct PsProcesses;

impl PsProcesses {
    pub fn new() -> Self {
        Self
    }

    /// Run `ps -p <pid> -o <columns>` and return its trimmed stdout.
    ///
    /// `ps` exits non-zero for a missing PID; that shows up as empty output.
    async fn ps(&self, pid: u32, columns: &str) -> Result<String> {
        let output = ps_command(pid, columns)
            .output()
            .await
            .map_err(|e| Error::CommandFailed(format!("ps: {}", e)))?;

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// `ps` pinned to the C locale so `lstart` always has the English layout.
fn ps_command(pid: u32, columns: &str) -> Command {
    let mut cmd = Command::new("ps");
    cmd.args(["-p", &pid.to_string(), "-o", columns])
        .env("LC_ALL", "C")
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    cmd
}

impl ProcessStatsPort for PsProcesses {
    async fn process_stats(&self, pid: u32) -> Result<ProcessStats> {
        let stdout = self.ps(pid, "%cpu=,%mem=,user=,lstart=,command=").await?;
        let line = stdout.lines().next().ok_or(Error::ProcessNotFound(pid))?;
        parse_stats_line(line)
    }
}

impl ProcessPort for PsProcesses {
    async fn list_details(&self, pid: u32) -> Result<ProcessDetails> {
        let stdout = self
            .ps(pid, "pid=,ppid=,%cpu=,%mem=,user=,lstart=,command=")
            .await?;
        let line = stdout.lines().next().ok_or(Error::ProcessNotFound(pid))?;
        parse_details_line(line)
    }

    fn is_alive(&self, pid: u32) -> bool {
        is_alive(pid)
    }

    fn send_signal(&self, pid: u32, signal: Signal) -> Result<()> {
        send_signal(pid, signal)
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse `%cpu %mem user lstart(5) command...`.
pub fn parse_stats_line(line: &str) -> Result<ProcessStats> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 + LSTART_FIELDS {
        return Err(Error::ParseError(format!("unexpected ps output: {:?}", line)));
    }

    Ok(ProcessStats {
        cpu_percent: parse_percent(fields[0], "cpu")?,
        mem_percent: parse_percent(fields[1], "mem")?,
        user: fields[2].to_string(),
        start_time: parse_lstart(&fields[3..3 + LSTART_FIELDS].join(" ")),
        command: fields[3 + LSTART_FIELDS..].join(" "),
    })
}

/// Parse `pid ppid %cpu %mem user lstart(5) command...`.
pub fn parse_details_line(line: &str) -> Result<ProcessDetails> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 + LSTART_FIELDS + 1 {
        return Err(Error::ParseError(format!("unexpected ps output: {:?}", line)));
    }

    let pid = fields[0]
        .parse()
        .map_err(|_| Error::ParseError(format!("invalid pid: {}", fields[0])))?;
    let parent_pid = fields[1]
        .parse()
        .map_err(|_| Error::ParseError(format!("invalid ppid: {}", fields[1])))?;
    let command = fields[5 + LSTART_FIELDS..].join(" ");

    Ok(ProcessDetails {
        pid,
        parent_pid,
        name: process_name_from_command(&command),
        user: fields[4].to_string(),
        cpu_percent: parse_percent(fields[2], "cpu")?,
        mem_percent: parse_percent(fields[3], "mem")?,
        start_time: parse_lstart(&fields[5..5 + LSTART_FIELDS].join(" ")),
        command,
    })
}

fn parse_percent(field: &str, what: &str) -> Result<f64> {
    field
        .parse()
        .map_err(|_| Error::ParseError(format!("invalid {}: {}", what, field)))
}

/// Parse a whitespace-normalised `lstart` value. Unparseable input yields `None`.
pub fn parse_lstart(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, LSTART_FORMAT).ok()
}

/// Basename of argv[0].
fn process_name_from_command(command: &str) -> String {
    command
        .split_whitespace()
        .next()
        .map(|argv0| argv0.rsplit('/').next().unwrap_or(argv0))
        .unwrap_or_default()
        .to_string()
}

// ============================================================================
// Signals
// ============================================================================

#[cfg(unix)]
fn to_nix_signal(signal: Signal) -> Result<nix::sys::signal::Signal> {
    use nix::sys::signal::Signal as Nix;

    Ok(match signal {
        Signal::Term => Nix::SIGTERM,
        Signal::Kill => Nix::SIGKILL,
        Signal::Int => Nix::SIGINT,
        Signal::Hup => Nix::SIGHUP,
        Signal::Usr1 => Nix::SIGUSR1,
        Signal::Usr2 => Nix::SIGUSR2,
        Signal::Raw(n) => Nix::try_from(n).map_err(|e| Error::InvalidSignal(format!("{}: {}", n, e)))?,
    })
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: Signal) -> Result<()> {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    if pid == 0 {
        return Err(Error::SignalFailed {
            pid,
            reason: "refusing to signal PID 0".to_string(),
        });
    }
    let raw_pid = i32::try_from(pid).map_err(|_| Error::SignalFailed {
        pid,
        reason: "PID out of range".to_string(),
    })?;
    let nix_signal = to_nix_signal(signal).map_err(|e| Error::SignalFailed {
        pid,
        reason: e.to_string(),
    })?;

    debug!(pid, signal = %signal, "Sending signal to process");
    kill(Pid::from_raw(raw_pid), nix_signal).map_err(|errno| {
        warn!(pid, signal = %signal, error = %errno, "Signal delivery failed");
        Error::SignalFailed {
            pid,
            reason: errno.desc().to_string(),
        }
    })
}

#[cfg(not(unix))]
fn send_signal(pid: u32, _signal: Signal) -> Result<()> {
    Err(Error::SignalFailed {
        pid,
        reason: "signals are not supported on this platform".to_string(),
    })
}

#[cfg(unix)]
fn is_alive(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw_pid) = i32::try_from(pid) else {
        return false;
    };
    if raw_pid == 0 {
        return false;
    }
    match kill(Pid::from_raw(raw_pid), None) {
        Ok(()) => true,
        // Exists, but owned by someone else.
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_alive(_pid: u32) -> bool {
    false
}

/// Name of this host, or an empty string if it cannot be determined.
pub fn hostname() -> String {
    #[cfg(unix)]
    {
        nix::unistd::gethostname()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
    #[cfg(not(unix))]
    {
        std::env::var("COMPUTERNAME").unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, s))
            .unwrap()
    }

    #[test]
    fn test_ps_command_uses_c_locale() {
        let cmd = ps_command(42, "lstart=");
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "ps");

        let args: Vec<_> = std_cmd.get_args().collect();
        assert_eq!(args, ["-p", "42", "-o", "lstart="]);

        let lc_all = std_cmd
            .get_envs()
            .find(|(key, _)| *key == std::ffi::OsStr::new("LC_ALL"))
            .and_then(|(_, value)| value);
        assert_eq!(lc_all, Some(std::ffi::OsStr::new("C")));
    }

    #[test]
    fn test_parse_stats_line() {
        let stats =
            parse_stats_line("  1.5  0.8 mike Thu Feb 19 04:00:00 2026 /usr/local/bin/node server.js")
                .unwrap();
        assert_eq!(stats.cpu_percent, 1.5);
        assert_eq!(stats.mem_percent, 0.8);
        assert_eq!(stats.user, "mike");
        assert_eq!(stats.start_time, Some(at(2026, 2, 19, 4, 0, 0)));
        assert_eq!(stats.command, "/usr/local/bin/node server.js");
    }

    #[test]
    fn test_parse_stats_line_single_digit_day() {
        let stats = parse_stats_line("0.0 0.1 root Mon Mar  2 09:15:30 2026 /usr/sbin/sshd -D").unwrap();
        assert_eq!(stats.start_time, Some(at(2026, 3, 2, 9, 15, 30)));
        assert_eq!(stats.command, "/usr/sbin/sshd -D");
    }

    #[test]
    fn test_parse_stats_line_bad_timestamp_keeps_stats() {
        let stats = parse_stats_line("2.0 3.0 root Xyz Foo 99 99:99:99 2026 /bin/thing").unwrap();
        assert_eq!(stats.cpu_percent, 2.0);
        assert_eq!(stats.start_time, None);
        assert_eq!(stats.command, "/bin/thing");
    }

    #[test]
    fn test_parse_stats_line_rejects_short_or_garbage() {
        assert!(parse_stats_line("1.5 0.8").is_err());
        assert!(parse_stats_line("x 0.8 root Thu Feb 19 04:00:00 2026 cmd").is_err());
    }

    #[test]
    fn test_parse_details_line() {
        let details = parse_details_line(
            "12345     1  2.5  1.0 mike     Thu Feb 19 04:00:00 2026 /usr/local/bin/node server.js --port 3000",
        )
        .unwrap();
        assert_eq!(details.pid, 12345);
        assert_eq!(details.parent_pid, 1);
        assert_eq!(details.name, "node");
        assert_eq!(details.user, "mike");
        assert_eq!(details.cpu_percent, 2.5);
        assert_eq!(details.mem_percent, 1.0);
        assert_eq!(details.start_time, Some(at(2026, 2, 19, 4, 0, 0)));
        assert_eq!(details.command, "/usr/local/bin/node server.js --port 3000");
    }

    #[test]
    fn test_parse_details_line_rejects_missing_command() {
        assert!(parse_details_line("1 0 0.0 0.0 root Thu Feb 19 04:00:00 2026").is_err());
    }

    #[test]
    fn test_process_name_from_command() {
        assert_eq!(process_name_from_command("/usr/bin/python3 -m http.server"), "python3");
        assert_eq!(process_name_from_command("nginx: master process"), "nginx:");
        assert_eq!(process_name_from_command(""), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_pid_zero_rejected() {
        let err = send_signal(0, Signal::Term).unwrap_err();
        assert!(matches!(err, Error::SignalFailed { pid: 0, .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_own_process_is_alive() {
        assert!(is_alive(std::process::id()));
        assert!(!is_alive(0));
    }

    #[cfg(unix)]
    #[test]
    fn test_raw_signal_out_of_range() {
        assert!(to_nix_signal(Signal::Raw(9)).is_ok());
        assert!(to_nix_signal(Signal::Raw(4096)).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_details_self() {
        let details = PsProcesses::new().list_details(std::process::id()).await;
        // ps may be missing in minimal containers.
        if let Ok(details) = details {
            assert_eq!(details.pid, std::process::id());
        }
    }
}
