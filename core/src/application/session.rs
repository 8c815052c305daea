//! Interactive session state machine.
//!
//! `Session` owns everything the table view needs and changes only through
//! [`Session::handle`], which consumes one [`Event`] and returns the
//! [`Effect`]s an outer driver should carry out. No I/O happens here.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::domain::{derive, DisplayList, PortRecord, ProcessDetails, Signal, SortColumn, SortSpec};

/// Rows moved by PageUp/PageDown.
const PAGE_SIZE: usize = 10;

// ============================================================================
// Events and effects
// ============================================================================

/// UI-agnostic key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    /// Ctrl+C.
    Interrupt,
}

/// The process a pending kill will signal, fixed when the dialog opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillTarget {
    pub pid: u32,
    pub process_name: String,
    pub port: u16,
}

impl From<&PortRecord> for KillTarget {
    fn from(record: &PortRecord) -> Self {
        Self {
            pid: record.pid,
            process_name: record.process_name.clone(),
            port: record.port,
        }
    }
}

/// Everything that can happen to a session.
#[derive(Debug, Clone)]
pub enum Event {
    Tick,
    Key(Key),
    Resize {
        width: u16,
        height: u16,
    },
    ScanCompleted {
        seq: u64,
        result: Result<Vec<PortRecord>, String>,
        finished_at: DateTime<Local>,
    },
    DetailsLoaded {
        pid: u32,
        result: Result<ProcessDetails, String>,
    },
    SignalDelivered {
        target: KillTarget,
        signal: Signal,
        result: Result<(), String>,
    },
}

/// Work requested by a transition, executed by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Run one scan and report `Event::ScanCompleted` with this sequence number.
    Scan { seq: u64 },
    /// Deliver `Event::Tick` after the delay.
    ScheduleTick(Duration),
    FetchDetails { pid: u32 },
    SendSignal { target: KillTarget, signal: Signal },
    Quit,
}

// ============================================================================
// State
// ============================================================================

/// Mutually exclusive view modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Table,
    Detail,
    Help,
    ConfirmKill,
}

/// Transient status line text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Refreshing,
    ScanError(String),
    Message(String),
}

impl Status {
    /// Statuses describing scan progress go away once a scan succeeds.
    fn cleared_by_scan(&self) -> bool {
        matches!(self, Status::Refreshing | Status::ScanError(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Refreshing => f.write_str("Refreshing…"),
            Status::ScanError(e) => write!(f, "Scan error: {}", e),
            Status::Message(m) => f.write_str(m),
        }
    }
}

/// Detail pane for one captured PID.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPane {
    pub pid: u32,
    /// `None` until the first lookup lands.
    pub details: Option<Result<ProcessDetails, String>>,
}

/// State behind the interactive port table.
#[derive(Debug, Clone)]
pub struct Session {
    snapshot: Vec<PortRecord>,
    cursor: usize,
    filter: String,
    filter_mode: bool,
    sort: SortSpec,
    mode: ViewMode,
    show_groups: bool,
    last_refresh: Option<DateTime<Local>>,
    last_error: Option<String>,
    status: Option<Status>,
    refresh_interval: Duration,
    /// Highest scan sequence number handed out.
    issued_seq: u64,
    /// Sequence number of the last completion applied.
    applied_seq: u64,
    kill_target: Option<KillTarget>,
    detail: Option<DetailPane>,
    size: (u16, u16),
    quitting: bool,
}

impl Session {
    /// New session with an empty snapshot.
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            snapshot: Vec::new(),
            cursor: 0,
            filter: String::new(),
            filter_mode: false,
            sort: SortSpec::default(),
            mode: ViewMode::Table,
            show_groups: false,
            last_refresh: None,
            last_error: None,
            status: None,
            refresh_interval,
            issued_seq: 0,
            applied_seq: 0,
            kill_target: None,
            detail: None,
            size: (0, 0),
            quitting: false,
        }
    }

    /// Effects to run once at startup: an immediate scan and the first tick.
    pub fn start(&mut self) -> Vec<Effect> {
        vec![self.request_scan(), Effect::ScheduleTick(self.refresh_interval)]
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn snapshot(&self) -> &[PortRecord] {
        &self.snapshot
    }

    /// Filtered, sorted, conflict-annotated rows.
    pub fn display(&self) -> DisplayList<'_> {
        derive(&self.snapshot, &self.filter, self.sort)
    }

    /// Record under the cursor, if any.
    pub fn selected(&self) -> Option<&PortRecord> {
        self.display().get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn is_filtering(&self) -> bool {
        self.filter_mode
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn show_groups(&self) -> bool {
        self.show_groups
    }

    pub fn last_refresh(&self) -> Option<DateTime<Local>> {
        self.last_refresh
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn kill_target(&self) -> Option<&KillTarget> {
        self.kill_target.as_ref()
    }

    pub fn detail(&self) -> Option<&DetailPane> {
        self.detail.as_ref()
    }

    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Apply one event.
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        if self.quitting {
            return Vec::new();
        }

        match event {
            Event::Tick => self.on_tick(),
            Event::Key(key) => self.on_key(key),
            Event::Resize { width, height } => {
                self.size = (width, height);
                Vec::new()
            }
            Event::ScanCompleted {
                seq,
                result,
                finished_at,
            } => {
                self.on_scan_completed(seq, result, finished_at);
                Vec::new()
            }
            Event::DetailsLoaded { pid, result } => {
                if let Some(pane) = self.detail.as_mut().filter(|pane| pane.pid == pid) {
                    pane.details = Some(result);
                }
                Vec::new()
            }
            Event::SignalDelivered {
                target,
                signal,
                result,
            } => self.on_signal_delivered(target, signal, result),
        }
    }

    fn request_scan(&mut self) -> Effect {
        self.issued_seq += 1;
        Effect::Scan {
            seq: self.issued_seq,
        }
    }

    fn quit(&mut self) -> Vec<Effect> {
        self.quitting = true;
        vec![Effect::Quit]
    }

    fn on_tick(&mut self) -> Vec<Effect> {
        let mut effects = vec![self.request_scan(), Effect::ScheduleTick(self.refresh_interval)];
        if let (ViewMode::Detail, Some(pane)) = (self.mode, &self.detail) {
            effects.push(Effect::FetchDetails { pid: pane.pid });
        }
        effects
    }

    fn on_scan_completed(
        &mut self,
        seq: u64,
        result: Result<Vec<PortRecord>, String>,
        finished_at: DateTime<Local>,
    ) {
        if seq <= self.applied_seq {
            return;
        }
        self.applied_seq = seq;

        match result {
            Ok(records) => {
                self.snapshot = records;
                self.last_refresh = Some(finished_at);
                self.last_error = None;
                if self.status.as_ref().is_some_and(Status::cleared_by_scan) {
                    self.status = None;
                }
                self.clamp_cursor();
            }
            Err(e) => {
                self.status = Some(Status::ScanError(e.clone()));
                self.last_error = Some(e);
            }
        }
    }

    fn on_signal_delivered(
        &mut self,
        target: KillTarget,
        signal: Signal,
        result: Result<(), String>,
    ) -> Vec<Effect> {
        let message = match result {
            Ok(()) if signal == Signal::Term => format!(
                "Killed PID {} ({}) on port {}",
                target.pid, target.process_name, target.port
            ),
            Ok(()) => format!(
                "Sent {} to PID {} ({}) on port {}",
                signal, target.pid, target.process_name, target.port
            ),
            Err(e) => format!("Failed to kill PID {}: {}", target.pid, e),
        };
        self.status = Some(Status::Message(message));
        vec![self.request_scan()]
    }

    fn on_key(&mut self, key: Key) -> Vec<Effect> {
        if key == Key::Interrupt {
            return self.quit();
        }

        match self.mode {
            ViewMode::ConfirmKill => self.on_confirm_key(key),
            ViewMode::Help => {
                if matches!(key, Key::Char('?') | Key::Char('q') | Key::Esc | Key::Enter) {
                    self.mode = ViewMode::Table;
                }
                Vec::new()
            }
            ViewMode::Detail => {
                if matches!(key, Key::Esc | Key::Enter | Key::Char('q')) {
                    self.mode = ViewMode::Table;
                    self.detail = None;
                }
                Vec::new()
            }
            ViewMode::Table if self.filter_mode => {
                self.on_filter_key(key);
                Vec::new()
            }
            ViewMode::Table => self.on_table_key(key),
        }
    }

    fn on_filter_key(&mut self, key: Key) {
        match key {
            Key::Esc => self.filter_mode = false,
            Key::Enter => {
                self.filter_mode = false;
                self.cursor = 0;
            }
            Key::Backspace => {
                self.filter.pop();
                self.cursor = 0;
            }
            Key::Char(c) => {
                self.filter.push(c);
                self.cursor = 0;
            }
            _ => {}
        }
    }

    fn on_table_key(&mut self, key: Key) -> Vec<Effect> {
        let len = self.display().len();

        match key {
            Key::Char('q') => return self.quit(),
            Key::Char('?') => self.mode = ViewMode::Help,
            Key::Char('/') => self.filter_mode = true,
            Key::Char('r') => {
                self.status = Some(Status::Refreshing);
                return vec![self.request_scan()];
            }
            Key::Char('g') => self.show_groups = !self.show_groups,
            Key::Char('k') => {
                if let Some(target) = self.selected().map(KillTarget::from) {
                    self.kill_target = Some(target);
                    self.mode = ViewMode::ConfirmKill;
                }
            }
            Key::Enter => {
                if let Some(pid) = self.selected().map(|r| r.pid) {
                    self.detail = Some(DetailPane { pid, details: None });
                    self.mode = ViewMode::Detail;
                    return vec![Effect::FetchDetails { pid }];
                }
            }
            Key::Char(c @ '1'..='8') => {
                let index = c as usize - '1' as usize;
                if let Some(column) = SortColumn::from_index(index) {
                    self.sort.select(column);
                }
            }
            Key::Esc => {
                if !self.filter.is_empty() {
                    self.filter.clear();
                    self.cursor = 0;
                }
            }
            Key::Up => self.cursor = self.cursor.saturating_sub(1),
            Key::Down | Key::Char('j') => {
                if self.cursor + 1 < len {
                    self.cursor += 1;
                }
            }
            Key::PageUp => self.cursor = self.cursor.saturating_sub(PAGE_SIZE),
            Key::PageDown => self.cursor = (self.cursor + PAGE_SIZE).min(len.saturating_sub(1)),
            Key::Home => self.cursor = 0,
            Key::End => self.cursor = len.saturating_sub(1),
            _ => {}
        }
        Vec::new()
    }

    fn on_confirm_key(&mut self, key: Key) -> Vec<Effect> {
        match key {
            Key::Char('y') | Key::Char('Y') => {
                self.mode = ViewMode::Table;
                match self.kill_target.take() {
                    Some(target) => vec![Effect::SendSignal {
                        target,
                        signal: Signal::Term,
                    }],
                    None => Vec::new(),
                }
            }
            Key::Char('n') | Key::Char('N') | Key::Esc => {
                self.mode = ViewMode::Table;
                self.kill_target = None;
                self.status = Some(Status::Message("Kill cancelled".to_string()));
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Keep the cursor inside the current display list.
    fn clamp_cursor(&mut self) {
        let len = self.display().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Protocol;

    fn record(port: u16, pid: u32, name: &str, cpu: f64, mem: f64) -> PortRecord {
        let mut r = PortRecord::new(port, Protocol::Tcp, pid, name, "mike", "LISTEN");
        r.cpu_percent = cpu;
        r.mem_percent = mem;
        r
    }

    fn test_ports() -> Vec<PortRecord> {
        vec![
            record(3000, 100, "node", 2.1, 1.3),
            record(5432, 200, "postgres", 0.1, 0.5),
            record(6379, 300, "redis-ser", 0.0, 0.1),
            record(8080, 400, "Python", 55.0, 12.0),
        ]
    }

    fn scan_done(seq: u64, records: Vec<PortRecord>) -> Event {
        Event::ScanCompleted {
            seq,
            result: Ok(records),
            finished_at: Local::now(),
        }
    }

    fn scan_failed(seq: u64, error: &str) -> Event {
        Event::ScanCompleted {
            seq,
            result: Err(error.to_string()),
            finished_at: Local::now(),
        }
    }

    /// A session that has already applied one scan of `test_ports()`.
    fn loaded() -> Session {
        let mut session = Session::new(Duration::from_secs(2));
        session.start();
        session.handle(scan_done(1, test_ports()));
        session
    }

    fn press(session: &mut Session, key: Key) -> Vec<Effect> {
        session.handle(Event::Key(key))
    }

    fn type_text(session: &mut Session, text: &str) {
        for c in text.chars() {
            press(session, Key::Char(c));
        }
    }

    #[test]
    fn test_new_session_initialization() {
        let session = Session::new(Duration::from_secs(2));
        assert_eq!(session.cursor(), 0);
        assert!(!session.is_filtering());
        assert_eq!(session.mode(), ViewMode::Table);
        assert!(!session.show_groups());
        assert_eq!(session.sort(), SortSpec::default());
        assert!(session.snapshot().is_empty());
        assert!(session.last_refresh().is_none());
    }

    #[test]
    fn test_start_requests_scan_and_tick() {
        let mut session = Session::new(Duration::from_secs(5));
        assert_eq!(
            session.start(),
            vec![Effect::Scan { seq: 1 }, Effect::ScheduleTick(Duration::from_secs(5))]
        );
    }

    #[test]
    fn test_quit_on_q_and_interrupt() {
        let mut session = loaded();
        assert_eq!(press(&mut session, Key::Char('q')), vec![Effect::Quit]);
        assert!(session.is_quitting());
        assert!(session.handle(Event::Tick).is_empty());

        for mode_key in [Key::Char('?'), Key::Enter, Key::Char('k')] {
            let mut session = loaded();
            press(&mut session, mode_key);
            assert_ne!(session.mode(), ViewMode::Table);
            assert_eq!(press(&mut session, Key::Interrupt), vec![Effect::Quit]);
        }
    }

    #[test]
    fn test_filter_mode_toggle() {
        let mut session = loaded();
        press(&mut session, Key::Char('/'));
        assert!(session.is_filtering());

        press(&mut session, Key::Esc);
        assert!(!session.is_filtering());
    }

    #[test]
    fn test_filter_text_input() {
        let mut session = loaded();
        press(&mut session, Key::Char('/'));
        type_text(&mut session, "node");
        assert_eq!(session.filter(), "node");
        assert_eq!(session.display().len(), 1);

        press(&mut session, Key::Backspace);
        assert_eq!(session.filter(), "nod");
    }

    #[test]
    fn test_filter_captures_command_keys() {
        let mut session = loaded();
        press(&mut session, Key::Char('/'));
        assert!(press(&mut session, Key::Char('q')).is_empty());
        type_text(&mut session, "?k");
        assert_eq!(session.filter(), "q?k");
        assert_eq!(session.mode(), ViewMode::Table);
        assert!(!session.is_quitting());
    }

    #[test]
    fn test_filter_resets_cursor() {
        let mut session = loaded();
        press(&mut session, Key::Down);
        press(&mut session, Key::Down);
        assert_eq!(session.cursor(), 2);

        press(&mut session, Key::Char('/'));
        type_text(&mut session, "o");
        assert_eq!(session.cursor(), 0);

        press(&mut session, Key::Esc);
        press(&mut session, Key::Down);
        assert_eq!(session.cursor(), 1);

        press(&mut session, Key::Char('/'));
        press(&mut session, Key::Enter);
        assert!(!session.is_filtering());
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn test_esc_clears_committed_filter() {
        let mut session = loaded();
        press(&mut session, Key::Char('/'));
        type_text(&mut session, "post");
        press(&mut session, Key::Enter);
        assert_eq!(session.display().len(), 1);

        press(&mut session, Key::Esc);
        assert_eq!(session.filter(), "");
        assert_eq!(session.display().len(), 4);
    }

    #[test]
    fn test_help_overlay_toggle() {
        let mut session = loaded();
        press(&mut session, Key::Char('?'));
        assert_eq!(session.mode(), ViewMode::Help);

        press(&mut session, Key::Char('?'));
        assert_eq!(session.mode(), ViewMode::Table);

        press(&mut session, Key::Char('?'));
        press(&mut session, Key::Char('q'));
        assert_eq!(session.mode(), ViewMode::Table);
        assert!(!session.is_quitting());

        press(&mut session, Key::Char('?'));
        press(&mut session, Key::Enter);
        assert_eq!(session.mode(), ViewMode::Table);
        assert!(session.detail().is_none());
    }

    #[test]
    fn test_cursor_navigation() {
        let mut session = loaded();
        press(&mut session, Key::Down);
        assert_eq!(session.cursor(), 1);
        press(&mut session, Key::Char('j'));
        assert_eq!(session.cursor(), 2);
        press(&mut session, Key::Up);
        assert_eq!(session.cursor(), 1);

        press(&mut session, Key::Up);
        press(&mut session, Key::Up);
        assert_eq!(session.cursor(), 0);

        for _ in 0..10 {
            press(&mut session, Key::Down);
        }
        assert_eq!(session.cursor(), 3);
    }

    #[test]
    fn test_page_and_jump_navigation() {
        let mut session = loaded();
        press(&mut session, Key::End);
        assert_eq!(session.cursor(), 3);
        press(&mut session, Key::Home);
        assert_eq!(session.cursor(), 0);
        press(&mut session, Key::PageDown);
        assert_eq!(session.cursor(), 3);
        press(&mut session, Key::PageUp);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn test_group_toggle() {
        let mut session = loaded();
        press(&mut session, Key::Char('g'));
        assert!(session.show_groups());
        press(&mut session, Key::Char('g'));
        assert!(!session.show_groups());
    }

    #[test]
    fn test_detail_view_toggle() {
        let mut session = loaded();
        let effects = press(&mut session, Key::Enter);
        assert_eq!(session.mode(), ViewMode::Detail);
        assert_eq!(effects, vec![Effect::FetchDetails { pid: 100 }]);
        assert_eq!(session.detail().map(|d| d.pid), Some(100));

        press(&mut session, Key::Esc);
        assert_eq!(session.mode(), ViewMode::Table);
        assert!(session.detail().is_none());
    }

    #[test]
    fn test_detail_refetched_on_tick() {
        let mut session = loaded();
        press(&mut session, Key::Enter);

        let effects = session.handle(Event::Tick);
        assert!(effects.contains(&Effect::FetchDetails { pid: 100 }));
        assert!(effects.contains(&Effect::ScheduleTick(Duration::from_secs(2))));

        press(&mut session, Key::Enter);
        let effects = session.handle(Event::Tick);
        assert!(!effects.iter().any(|e| matches!(e, Effect::FetchDetails { .. })));
    }

    #[test]
    fn test_details_loaded_only_for_captured_pid() {
        let mut session = loaded();
        press(&mut session, Key::Enter);

        session.handle(Event::DetailsLoaded {
            pid: 999,
            result: Err("gone".to_string()),
        });
        assert_eq!(session.detail().and_then(|d| d.details.clone()), None);

        session.handle(Event::DetailsLoaded {
            pid: 100,
            result: Err("Process 100 not found".to_string()),
        });
        assert!(matches!(
            session.detail().and_then(|d| d.details.clone()),
            Some(Err(_))
        ));
    }

    #[test]
    fn test_confirm_kill_view_declined() {
        let mut session = loaded();
        press(&mut session, Key::Down);
        press(&mut session, Key::Char('3'));
        let before_sort = session.sort();

        press(&mut session, Key::Char('k'));
        assert_eq!(session.mode(), ViewMode::ConfirmKill);

        let effects = press(&mut session, Key::Char('n'));
        assert!(effects.is_empty());
        assert_eq!(session.mode(), ViewMode::Table);
        assert_eq!(session.status().map(|s| s.to_string()).as_deref(), Some("Kill cancelled"));
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.sort(), before_sort);
        assert_eq!(session.snapshot().len(), 4);
    }

    #[test]
    fn test_confirm_kill_sends_term_to_captured_target() {
        let mut session = loaded();
        press(&mut session, Key::Char('k'));

        // A rescan lands while the dialog is open and reorders the rows.
        session.handle(scan_done(2, vec![record(1, 999, "init", 0.0, 0.0), record(3000, 100, "node", 0.0, 0.0)]));

        let effects = press(&mut session, Key::Char('y'));
        assert_eq!(session.mode(), ViewMode::Table);
        assert_eq!(
            effects,
            vec![Effect::SendSignal {
                target: KillTarget {
                    pid: 100,
                    process_name: "node".to_string(),
                    port: 3000,
                },
                signal: Signal::Term,
            }]
        );
    }

    #[test]
    fn test_signal_delivered_sets_status_and_rescans() {
        let mut session = loaded();
        let target = KillTarget {
            pid: 400,
            process_name: "Python".to_string(),
            port: 8080,
        };

        let effects = session.handle(Event::SignalDelivered {
            target: target.clone(),
            signal: Signal::Term,
            result: Ok(()),
        });
        assert_eq!(effects, vec![Effect::Scan { seq: 2 }]);
        assert_eq!(
            session.status().map(|s| s.to_string()).as_deref(),
            Some("Killed PID 400 (Python) on port 8080")
        );

        let effects = session.handle(Event::SignalDelivered {
            target,
            signal: Signal::Term,
            result: Err("Operation not permitted".to_string()),
        });
        assert_eq!(effects, vec![Effect::Scan { seq: 3 }]);
        assert_eq!(
            session.status().map(|s| s.to_string()).as_deref(),
            Some("Failed to kill PID 400: Operation not permitted")
        );
    }

    #[test]
    fn test_sort_column_toggle() {
        let mut session = loaded();
        press(&mut session, Key::Char('1'));
        assert_eq!(session.sort().column, SortColumn::Port);
        assert!(!session.sort().ascending);

        press(&mut session, Key::Char('3'));
        assert_eq!(session.sort().column, SortColumn::Pid);
        assert!(session.sort().ascending);

        press(&mut session, Key::Char('8'));
        assert_eq!(session.sort().column, SortColumn::State);
    }

    #[test]
    fn test_window_resize() {
        let mut session = loaded();
        session.handle(Event::Resize {
            width: 200,
            height: 50,
        });
        assert_eq!(session.size(), (200, 50));
    }

    #[test]
    fn test_scan_result_replaces_snapshot() {
        let mut session = Session::new(Duration::from_secs(2));
        session.start();
        session.handle(scan_done(1, test_ports()[..2].to_vec()));
        assert_eq!(session.snapshot().len(), 2);
        assert!(session.last_refresh().is_some());
    }

    #[test]
    fn test_scan_failure_keeps_snapshot() {
        let mut session = loaded();
        session.handle(Event::Tick);
        session.handle(scan_failed(2, "ss exited with 1"));

        assert_eq!(session.snapshot().len(), 4);
        assert_eq!(session.last_error(), Some("ss exited with 1"));
        assert_eq!(
            session.status().map(|s| s.to_string()).as_deref(),
            Some("Scan error: ss exited with 1")
        );

        session.handle(Event::Tick);
        session.handle(scan_done(3, test_ports()));
        assert_eq!(session.last_error(), None);
        assert!(session.status().is_none());
    }

    #[test]
    fn test_manual_refresh() {
        let mut session = loaded();
        let effects = press(&mut session, Key::Char('r'));
        assert_eq!(effects, vec![Effect::Scan { seq: 2 }]);
        assert_eq!(session.status(), Some(&Status::Refreshing));

        session.handle(scan_done(2, test_ports()));
        assert!(session.status().is_none());
    }

    #[test]
    fn test_stale_scan_discarded() {
        let mut session = loaded();
        session.handle(Event::Tick); // seq 2
        press(&mut session, Key::Char('r')); // seq 3

        session.handle(scan_done(3, test_ports()[..1].to_vec()));
        session.handle(scan_done(2, test_ports()));
        assert_eq!(session.snapshot().len(), 1);

        session.handle(scan_failed(2, "late failure"));
        assert_eq!(session.last_error(), None);
    }

    #[test]
    fn test_cursor_clamped_after_scan_uses_filtered_length() {
        let mut session = loaded();
        press(&mut session, Key::End);
        assert_eq!(session.cursor(), 3);

        // node, postgres and Python pass the filter.
        press(&mut session, Key::Char('/'));
        type_text(&mut session, "o");
        press(&mut session, Key::Enter);
        press(&mut session, Key::End);
        let before = session.display().len();
        assert_eq!(session.cursor(), before - 1);

        session.handle(Event::Tick);
        session.handle(scan_done(
            2,
            vec![
                record(3000, 100, "node", 0.0, 0.0),
                record(7000, 700, "xyz", 0.0, 0.0),
                record(7001, 701, "abc", 0.0, 0.0),
            ],
        ));
        assert_eq!(session.display().len(), 1);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn test_empty_ports_list() {
        let mut session = Session::new(Duration::from_secs(2));
        session.start();

        press(&mut session, Key::Down);
        press(&mut session, Key::End);
        press(&mut session, Key::PageDown);
        assert_eq!(session.cursor(), 0);

        assert!(press(&mut session, Key::Char('k')).is_empty());
        assert_eq!(session.mode(), ViewMode::Table);
        assert!(press(&mut session, Key::Enter).is_empty());
        assert_eq!(session.mode(), ViewMode::Table);
        assert!(session.selected().is_none());
    }

    #[test]
    fn test_selected_follows_sort() {
        let mut session = loaded();
        press(&mut session, Key::Char('6')); // CPU ascending
        press(&mut session, Key::Char('6')); // CPU descending
        assert_eq!(session.selected().map(|r| r.port), Some(8080));
    }
}
