//! Interactive terminal UI.
//!
//! Input is read on a dedicated thread and funnelled, together with the
//! results of background work, into one event queue that drives the
//! [`Session`] state machine.

mod theme;
mod ui;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use crossterm::{
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use portpilot_core::adapters::hostname;
use portpilot_core::{Config, EffectRunner, Event, Key, PortScanner, PsProcesses, Session};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use theme::Theme;
use ui::View;

type Term = Terminal<CrosstermBackend<Stdout>>;

const INPUT_POLL: Duration = Duration::from_millis(100);

/// Run the TUI until the user quits.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let scanner = PortScanner::detect()?;

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, scanner, &config).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> anyhow::Result<Term> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("failed to create terminal")
}

fn restore_terminal(terminal: &mut Term) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn event_loop(
    terminal: &mut Term,
    scanner: PortScanner,
    config: &Config,
) -> anyhow::Result<()> {
    let (tx, mut rx): (UnboundedSender<Event>, UnboundedReceiver<Event>) =
        mpsc::unbounded_channel();
    spawn_input_thread(tx.clone());

    let size = terminal.size()?;
    tx.send(Event::Resize {
        width: size.width,
        height: size.height,
    })?;

    let runner = EffectRunner::new(Arc::new(scanner), Arc::new(PsProcesses::new()), tx);
    let mut session = Session::new(config.refresh_interval());

    let theme = Theme::new(config);
    let host = hostname();
    let view = View {
        theme: &theme,
        config,
        hostname: &host,
    };

    info!(interval = ?session.refresh_interval(), "tui started");
    if runner.run_all(session.start()).is_break() {
        return Ok(());
    }

    loop {
        terminal.draw(|f| ui::draw(f, &session, &view))?;

        let Some(event) = rx.recv().await else {
            break;
        };
        let effects = session.handle(event);
        if runner.run_all(effects).is_break() {
            break;
        }
    }

    info!("tui stopped");
    Ok(())
}

/// Forward terminal input to the event queue until the queue is closed.
fn spawn_input_thread(tx: UnboundedSender<Event>) {
    thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(INPUT_POLL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    debug!(error = %e, "input poll failed");
                    break;
                }
            }

            let mapped = match event::read() {
                Ok(TermEvent::Key(key)) => map_key(key).map(Event::Key),
                Ok(TermEvent::Resize(width, height)) => Some(Event::Resize { width, height }),
                Ok(_) => None,
                Err(e) => {
                    debug!(error = %e, "input read failed");
                    break;
                }
            };

            if let Some(event) = mapped {
                if tx.send(event).is_err() {
                    break;
                }
            }
        }
    });
}

/// Translate a crossterm key press into a session key.
fn map_key(key: KeyEvent) -> Option<Key> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Key::Interrupt);
    }

    Some(match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => return None,
    })
}
