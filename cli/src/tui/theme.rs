//! Colours and styles for the TUI, built once from the configuration.

use std::collections::BTreeMap;
use std::str::FromStr;

use portpilot_core::{Config, PortRecord};
use ratatui::style::{Color, Modifier, Style};

const RED: Color = Color::Rgb(0xFF, 0x55, 0x55);
const GREEN: Color = Color::Rgb(0x50, 0xFA, 0x7B);
const YELLOW: Color = Color::Rgb(0xF1, 0xFA, 0x8C);
const BLUE: Color = Color::Rgb(0x62, 0x72, 0xA4);
const MAGENTA: Color = Color::Rgb(0xFF, 0x79, 0xC6);
const CYAN: Color = Color::Rgb(0x8B, 0xE9, 0xFD);
const WHITE: Color = Color::Rgb(0xF8, 0xF8, 0xF2);
const DIM: Color = Color::Rgb(0x62, 0x72, 0xA4);
const BG_ALT: Color = Color::Rgb(0x44, 0x47, 0x5A);

/// CPU percentage above which a row is highlighted.
const HIGH_CPU: f64 = 50.0;
/// Memory percentage above which a row is highlighted.
const HIGH_MEM: f64 = 10.0;

/// Palette for group colour names.
fn named_color(name: &str) -> Option<Color> {
    match name.to_ascii_lowercase().as_str() {
        "red" => Some(RED),
        "green" => Some(GREEN),
        "yellow" => Some(YELLOW),
        "blue" => Some(BLUE),
        "magenta" => Some(MAGENTA),
        "cyan" => Some(CYAN),
        "white" => Some(WHITE),
        // Anything ratatui understands: "#rrggbb", indexed colours, ...
        other => Color::from_str(other).ok(),
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Style,
    pub header: Style,
    pub border: Style,
    pub table_header: Style,
    pub selected: Style,
    pub conflict: Style,
    pub warning: Style,
    pub healthy: Style,
    pub dim: Style,
    pub status: Style,
    pub key_hint: Style,
    pub filter_label: Style,
    pub detail_key: Style,
    pub help_border: Style,
    pub confirm_border: Style,
    /// Dim rows owned by system processes.
    dim_system: bool,
    groups: BTreeMap<String, Color>,
}

impl Theme {
    pub fn new(config: &Config) -> Self {
        let groups = config
            .groups
            .iter()
            .map(|(name, group)| (name.clone(), named_color(&group.color).unwrap_or(DIM)))
            .collect();

        Self {
            title: Style::default().fg(MAGENTA).add_modifier(Modifier::BOLD),
            header: Style::default().fg(CYAN).add_modifier(Modifier::BOLD),
            border: Style::default().fg(Color::DarkGray),
            table_header: Style::default().fg(WHITE).bg(BG_ALT).add_modifier(Modifier::BOLD),
            selected: Style::default().fg(WHITE).bg(BG_ALT).add_modifier(Modifier::BOLD),
            conflict: Style::default().fg(WHITE).bg(RED),
            warning: Style::default().fg(YELLOW),
            healthy: Style::default().fg(GREEN),
            dim: Style::default().fg(DIM),
            status: Style::default().fg(DIM),
            key_hint: Style::default().fg(CYAN).add_modifier(Modifier::BOLD),
            filter_label: Style::default().fg(CYAN).add_modifier(Modifier::BOLD),
            detail_key: Style::default().fg(CYAN).add_modifier(Modifier::BOLD),
            help_border: Style::default().fg(MAGENTA),
            confirm_border: Style::default().fg(RED),
            dim_system: !config.show_system_ports,
            groups,
        }
    }

    /// Row style: selected, then conflict, then high usage, then system, then healthy.
    pub fn row_style(&self, record: &PortRecord, selected: bool, conflict: bool) -> Style {
        if selected {
            self.selected
        } else if conflict {
            self.conflict
        } else if record.cpu_percent > HIGH_CPU || record.mem_percent > HIGH_MEM {
            self.warning
        } else if self.dim_system && record.is_system() {
            self.dim
        } else {
            self.healthy
        }
    }

    /// Style for a group label.
    pub fn group_style(&self, name: &str) -> Style {
        let color = self.groups.get(name).copied().unwrap_or(DIM);
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}
