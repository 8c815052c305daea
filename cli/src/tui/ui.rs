//! TUI rendering.

use portpilot_core::application::{DetailPane, Session, ViewMode};
use portpilot_core::{Config, ProcessDetails, SortColumn};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use super::theme::Theme;

/// Everything the renderer needs besides the session itself.
pub struct View<'a> {
    pub theme: &'a Theme,
    pub config: &'a Config,
    pub hostname: &'a str,
}

const HELP_ENTRIES: &[(&str, &str)] = &[
    ("1-8", "Sort by column (toggle asc/desc)"),
    ("/", "Search / filter by port, process, user or command"),
    ("Esc", "Clear search / close panel"),
    ("Enter", "View process details"),
    ("k", "Kill selected process"),
    ("r", "Manual refresh"),
    ("g", "Toggle group column"),
    ("?", "Toggle this help"),
    ("q", "Quit"),
    ("Up/Down, j", "Navigate rows"),
    ("PgUp/PgDn", "Move ten rows"),
    ("Home/End", "Jump to first / last row"),
];

pub fn draw(f: &mut Frame, session: &Session, view: &View<'_>) {
    let show_filter = session.is_filtering() || !session.filter().is_empty();

    let mut constraints = vec![Constraint::Length(3)]; // Header
    if show_filter {
        constraints.push(Constraint::Length(3)); // Filter
    }
    constraints.push(Constraint::Min(0)); // Body
    constraints.push(Constraint::Length(3)); // Footer

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    let mut next = 0;
    draw_header(f, session, view, chunks[next]);
    next += 1;
    if show_filter {
        draw_filter(f, session, view, chunks[next]);
        next += 1;
    }
    let body = chunks[next];
    let footer = chunks[next + 1];

    match session.mode() {
        ViewMode::Table => draw_table(f, session, view, body),
        ViewMode::ConfirmKill => {
            draw_table(f, session, view, body);
            draw_confirm(f, session, view, body);
        }
        ViewMode::Detail => draw_detail(f, session.detail(), view, body),
        ViewMode::Help => draw_help(f, view, body),
    }

    draw_footer(f, session, view, footer);
}

fn bordered<'a>(view: &View<'_>) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(view.theme.border)
}

fn draw_header(f: &mut Frame, session: &Session, view: &View<'_>, area: Rect) {
    let line = Line::from(vec![
        Span::styled("PortPilot", view.theme.title),
        Span::styled(
            format!(
                " │ {} │ {} ports │ {} shown",
                view.hostname,
                session.snapshot().len(),
                session.display().len()
            ),
            view.theme.header,
        ),
    ]);

    f.render_widget(Paragraph::new(line).block(bordered(view)), area);
}

fn draw_filter(f: &mut Frame, session: &Session, view: &View<'_>, area: Rect) {
    let mut spans = vec![
        Span::styled("Filter: ", view.theme.filter_label),
        Span::raw(session.filter().to_string()),
    ];
    if session.is_filtering() {
        spans.push(Span::raw("█"));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).block(bordered(view)), area);
}

fn column_title(column: SortColumn, session: &Session) -> String {
    let sort = session.sort();
    if sort.column != column {
        return column.title().to_string();
    }
    let arrow = if sort.ascending { "▲" } else { "▼" };
    format!("{} {}", column.title(), arrow)
}

fn draw_table(f: &mut Frame, session: &Session, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let show_groups = session.show_groups();
    let display = session.display();

    let mut header_cells: Vec<Cell> = SortColumn::ALL
        .iter()
        .map(|c| Cell::from(column_title(*c, session)))
        .collect();
    if show_groups {
        header_cells.push(Cell::from("Group"));
    }
    let header = Row::new(header_cells).style(theme.table_header).height(1);

    let rows = display.rows.iter().enumerate().map(|(i, record)| {
        let mut cells = vec![
            Cell::from(record.port.to_string()),
            Cell::from(record.protocol.as_str()),
            Cell::from(record.pid.to_string()),
            Cell::from(record.process_name.clone()),
            Cell::from(record.user.clone()),
            Cell::from(format!("{:.1}", record.cpu_percent)),
            Cell::from(format!("{:.1}", record.mem_percent)),
            Cell::from(record.state.clone()),
        ];
        if show_groups {
            let group = view.config.group_for_port(record.port).unwrap_or("");
            cells.push(Cell::from(group.to_string()).style(theme.group_style(group)));
        }

        let style = theme.row_style(record, i == session.cursor(), display.is_conflict(record.port));
        Row::new(cells).style(style)
    });

    let mut widths = vec![
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Min(10),
        Constraint::Length(12),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(8),
    ];
    if show_groups {
        widths.push(Constraint::Length(10));
    }

    let block = bordered(view).title(" Listening Ports ");

    if display.is_empty() {
        let message = if session.filter().is_empty() {
            "No ports found".to_string()
        } else {
            format!("No ports matching {:?}", session.filter())
        };
        let table = Table::new(Vec::<Row>::new(), widths).header(header);
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(table, inner);
        if inner.height > 2 {
            let message_area = Rect {
                y: inner.y + 2,
                height: 1,
                ..inner
            };
            f.render_widget(Paragraph::new(message).style(theme.dim), message_area);
        }
        return;
    }

    let table = Table::new(rows, widths).header(header).block(block);

    let mut state = TableState::default();
    state.select(Some(session.cursor()));

    f.render_stateful_widget(table, area, &mut state);
}

fn draw_confirm(f: &mut Frame, session: &Session, view: &View<'_>, area: Rect) {
    let Some(target) = session.kill_target() else {
        return;
    };

    let text = vec![
        Line::from(format!(
            "Kill process {:?} (PID {}) on port {}?",
            target.process_name, target.pid, target.port
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", view.theme.key_hint),
            Span::raw(" Yes   "),
            Span::styled("[n]", view.theme.key_hint),
            Span::raw(" No"),
        ]),
    ];

    let popup = centered_rect(60, 7, area);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(view.theme.confirm_border)
                .title(" Confirm "),
        ),
        popup,
    );
}

fn detail_lines<'a>(details: &ProcessDetails, view: &View<'_>) -> Vec<Line<'a>> {
    let started = details
        .start_time
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let rows = [
        ("PID", details.pid.to_string()),
        ("Parent PID", details.parent_pid.to_string()),
        ("Name", details.name.clone()),
        ("User", details.user.clone()),
        ("CPU", format!("{:.1}%", details.cpu_percent)),
        ("Memory", format!("{:.1}%", details.mem_percent)),
        ("Started", started),
        ("Command", details.command.clone()),
    ];

    rows.into_iter()
        .map(|(key, value)| {
            Line::from(vec![
                Span::styled(format!("{:>12}: ", key), view.theme.detail_key),
                Span::raw(value),
            ])
        })
        .collect()
}

fn draw_detail(f: &mut Frame, pane: Option<&DetailPane>, view: &View<'_>, area: Rect) {
    let mut lines = match pane {
        Some(DetailPane {
            details: Some(Ok(details)),
            ..
        }) => detail_lines(details, view),
        Some(DetailPane {
            pid,
            details: Some(Err(e)),
        }) => vec![Line::from(format!("Error getting details for PID {}: {}", pid, e))],
        Some(DetailPane { pid, details: None }) => {
            vec![Line::from(format!("Loading details for PID {}…", pid))]
        }
        None => Vec::new(),
    };
    lines.push(Line::from(""));
    lines.push(Line::styled("Press Esc or Enter to close", view.theme.dim));

    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(view.theme.dim)
                .title(" Process Details "),
        ),
        area,
    );
}

fn draw_help(f: &mut Frame, view: &View<'_>, area: Rect) {
    let mut lines: Vec<Line> = HELP_ENTRIES
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("{:<12}", key), view.theme.key_hint),
                Span::raw(*desc),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::styled("Press ?, Esc or Enter to close", view.theme.dim));

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(view.theme.help_border)
                .title(" Keybindings "),
        ),
        area,
    );
}

fn draw_footer(f: &mut Frame, session: &Session, view: &View<'_>, area: Rect) {
    let left = if let Some(status) = session.status() {
        status.to_string()
    } else if let Some(error) = session.last_error() {
        format!("Error: {}", error)
    } else if let Some(at) = session.last_refresh() {
        format!("Last refresh: {}", at.format("%H:%M:%S"))
    } else {
        "Scanning…".to_string()
    };

    let mut spans = vec![Span::styled(left, view.theme.status), Span::raw("  ")];
    let hints: &[(&str, &str)] = if session.is_filtering() {
        &[("Enter", "done"), ("Esc", "cancel")]
    } else {
        &[("?", "help"), ("/", "filter"), ("k", "kill"), ("q", "quit")]
    };
    for (key, desc) in hints {
        spans.push(Span::styled(*key, view.theme.key_hint));
        spans.push(Span::styled(format!(" {}  ", desc), view.theme.status));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).block(bordered(view)), area);
}

/// A rectangle `percent_x` wide and `height` tall, centred in `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
