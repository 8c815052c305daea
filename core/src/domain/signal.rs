//! Signals accepted by the kill paths, by name or number.

use std::str::FromStr;

use crate::error::Error;

/// A signal to deliver to a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    #[default]
    Term,
    Kill,
    Int,
    Hup,
    Usr1,
    Usr2,
    /// Raw signal number, passed through as given.
    Raw(i32),
}

impl Signal {
    /// Conventional name with the `SIG` prefix.
    pub fn name(&self) -> String {
        match self {
            Signal::Term => "SIGTERM".to_string(),
            Signal::Kill => "SIGKILL".to_string(),
            Signal::Int => "SIGINT".to_string(),
            Signal::Hup => "SIGHUP".to_string(),
            Signal::Usr1 => "SIGUSR1".to_string(),
            Signal::Usr2 => "SIGUSR2".to_string(),
            Signal::Raw(n) => format!("signal {}", n),
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Signal {
    type Err = Error;

    /// Parse `TERM`, `sigterm`, `SIGKILL`, `9`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        let name = upper.strip_prefix("SIG").unwrap_or(&upper);

        let signal = match name {
            "TERM" => Signal::Term,
            "KILL" => Signal::Kill,
            "INT" => Signal::Int,
            "HUP" => Signal::Hup,
            "USR1" => Signal::Usr1,
            "USR2" => Signal::Usr2,
            _ => match trimmed.parse::<i32>() {
                Ok(n) if n >= 0 => Signal::Raw(n),
                _ => return Err(Error::InvalidSignal(s.to_string())),
            },
        };
        Ok(signal)
    }
}
