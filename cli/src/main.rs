//! PortPilot CLI - Explore listening ports and the processes behind them
//!
//! A command-line tool and terminal UI for discovering listening ports,
//! inspecting their processes, and killing them.

mod commands;
mod logging;
mod tui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "portpilot")]
#[command(author, version, about = "Discover listening ports and manage their processes")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Disable interactive TUI mode
    #[arg(long, global = true)]
    no_tui: bool,

    /// Configuration file (default: ~/.portpilot.yaml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all listening ports
    #[command(alias = "ls")]
    List {
        /// Filter by port number
        #[arg(short, long)]
        port: Option<u16>,

        /// Filter by process name
        #[arg(short = 'n', long)]
        process: Option<String>,
    },

    /// Kill the process on a port
    Kill {
        /// Port number to kill
        port: u16,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,

        /// Signal to send (name like TERM/SIGKILL, or a number)
        #[arg(short, long, default_value = "SIGTERM")]
        signal: String,
    },

    /// Check whether a port is in use (exit status 1 if it is)
    Check {
        /// Port number to check
        port: u16,
    },

    /// Rescan periodically and redraw a plain table
    Watch {
        /// Watch a specific port
        #[arg(short, long)]
        port: Option<u16>,

        /// Refresh interval in seconds (default: from config)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Show current configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let interactive =
        cli.command.is_none() && !cli.no_tui && atty::is(atty::Stream::Stdout);
    logging::init(interactive);

    let store = commands::config::store(cli.config.clone());
    let config = commands::config::load(store.as_ref()).await;

    match cli.command {
        Some(Commands::List { port, process }) => {
            commands::list::run(port, process, cli.json).await?;
        }
        Some(Commands::Kill {
            port,
            force,
            signal,
        }) => {
            commands::kill::run(port, &signal, force).await?;
        }
        Some(Commands::Check { port }) => {
            if commands::check::run(port, cli.json).await? {
                std::process::exit(1);
            }
        }
        Some(Commands::Watch { port, interval }) => {
            let interval = interval
                .filter(|secs| *secs >= 1)
                .map(std::time::Duration::from_secs)
                .unwrap_or_else(|| config.refresh_interval());
            commands::watch::run(port, interval).await?;
        }
        Some(Commands::Config) => {
            commands::config::show(&config, store.as_ref(), cli.json)?;
        }
        None => {
            // Default: Launch TUI or list ports
            if interactive {
                tui::run(config).await?;
            } else {
                commands::list::run(None, None, cli.json).await?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_kill_defaults_to_sigterm() {
        let cli = Cli::parse_from(["portpilot", "kill", "3000"]);
        match cli.command {
            Some(Commands::Kill {
                port,
                force,
                signal,
            }) => {
                assert_eq!(port, 3000);
                assert!(!force);
                assert_eq!(signal, "SIGTERM");
            }
            _ => panic!("expected kill"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["portpilot", "list", "--process", "node", "--json", "--config", "/tmp/p.yaml"]);
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.yaml")));
        assert!(matches!(cli.command, Some(Commands::List { process: Some(ref p), .. }) if p == "node"));
    }

    #[test]
    fn test_rejects_out_of_range_port() {
        assert!(Cli::try_parse_from(["portpilot", "check", "70000"]).is_err());
    }
}
