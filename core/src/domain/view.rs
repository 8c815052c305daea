//! Display-list derivation: filter, then sort, then conflict detection.
//!
//! Everything here is a pure function of `(snapshot, filter text, sort spec)`.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use super::PortRecord;

// ============================================================================
// Sorting
// ============================================================================

/// Sortable table columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortColumn {
    #[default]
    Port,
    Protocol,
    Pid,
    Process,
    User,
    Cpu,
    Mem,
    State,
}

impl SortColumn {
    /// All columns in display order.
    pub const ALL: [SortColumn; 8] = [
        SortColumn::Port,
        SortColumn::Protocol,
        SortColumn::Pid,
        SortColumn::Process,
        SortColumn::User,
        SortColumn::Cpu,
        SortColumn::Mem,
        SortColumn::State,
    ];

    /// Column for a zero-based index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    /// Column heading.
    pub fn title(self) -> &'static str {
        match self {
            SortColumn::Port => "Port",
            SortColumn::Protocol => "Proto",
            SortColumn::Pid => "PID",
            SortColumn::Process => "Process",
            SortColumn::User => "User",
            SortColumn::Cpu => "CPU%",
            SortColumn::Mem => "Mem%",
            SortColumn::State => "State",
        }
    }

    /// Ascending comparison of two records on this column.
    pub fn compare(self, a: &PortRecord, b: &PortRecord) -> Ordering {
        match self {
            SortColumn::Port => a.port.cmp(&b.port),
            SortColumn::Protocol => a.protocol.as_str().cmp(b.protocol.as_str()),
            SortColumn::Pid => a.pid.cmp(&b.pid),
            SortColumn::Process => a
                .process_name
                .to_lowercase()
                .cmp(&b.process_name.to_lowercase()),
            SortColumn::User => a.user.to_lowercase().cmp(&b.user.to_lowercase()),
            SortColumn::Cpu => a.cpu_percent.total_cmp(&b.cpu_percent),
            SortColumn::Mem => a.mem_percent.total_cmp(&b.mem_percent),
            SortColumn::State => a.state.cmp(&b.state),
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: SortColumn,
    pub ascending: bool,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            column: SortColumn::Port,
            ascending: true,
        }
    }
}

impl SortSpec {
    /// Same column flips direction; a new column starts ascending.
    pub fn select(&mut self, column: SortColumn) {
        if self.column == column {
            self.ascending = !self.ascending;
        } else {
            self.column = column;
            self.ascending = true;
        }
    }

    pub fn compare(&self, a: &PortRecord, b: &PortRecord) -> Ordering {
        let ordering = self.column.compare(a, b);
        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }
}

// ============================================================================
// Derivation
// ============================================================================

/// The rows to render and the ports among them bound by more than one process.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList<'a> {
    pub rows: Vec<&'a PortRecord>,
    pub conflicts: BTreeSet<u16>,
}

impl<'a> DisplayList<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a PortRecord> {
        self.rows.get(index).copied()
    }

    pub fn is_conflict(&self, port: u16) -> bool {
        self.conflicts.contains(&port)
    }
}

/// Records passing the case-insensitive substring filter, in snapshot order.
pub fn filter_records<'a>(snapshot: &'a [PortRecord], filter: &str) -> Vec<&'a PortRecord> {
    snapshot.iter().filter(|r| r.matches_search(filter)).collect()
}

/// Stable sort; ties keep their filtered order in both directions.
pub fn sort_records(records: &mut [&PortRecord], sort: SortSpec) {
    records.sort_by(|a, b| sort.compare(a, b));
}

/// Ports held by more than one distinct PID within `records`.
pub fn find_conflicts(records: &[&PortRecord]) -> BTreeSet<u16> {
    let mut pids_by_port: HashMap<u16, HashSet<u32>> = HashMap::new();
    for record in records {
        pids_by_port.entry(record.port).or_default().insert(record.pid);
    }

    pids_by_port
        .into_iter()
        .filter(|(_, pids)| pids.len() > 1)
        .map(|(port, _)| port)
        .collect()
}

/// Derive the display list for a snapshot.
pub fn derive<'a>(snapshot: &'a [PortRecord], filter: &str, sort: SortSpec) -> DisplayList<'a> {
    let mut rows = filter_records(snapshot, filter);
    sort_records(&mut rows, sort);
    let conflicts = find_conflicts(&rows);
    DisplayList { rows, conflicts }
}
