//! Sorting, searching and cell text for the process table.
//!
//! Everything here works on row indices into a [`Snapshot`], so re-sorting or
//! searching never touches the published snapshot itself.

use std::cmp::Ordering;

use crate::format::{format_cpu, format_megabytes, format_memory};
use crate::system::record::{ProcessRecord, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Pid,
    Name,
    Cpu,
    Memory,
}

impl SortColumn {
    pub fn next(self) -> Self {
        match self {
            SortColumn::Pid => SortColumn::Name,
            SortColumn::Name => SortColumn::Cpu,
            SortColumn::Cpu => SortColumn::Memory,
            SortColumn::Memory => SortColumn::Pid,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Pid => "PID",
            SortColumn::Name => "Name",
            SortColumn::Cpu => "CPU",
            SortColumn::Memory => "Memory",
        }
    }

    /// Numeric columns sort high to low; PID and name sort as text, low to high.
    pub fn descending(self) -> bool {
        matches!(self, SortColumn::Cpu | SortColumn::Memory)
    }

    /// Header position of this column; the same in both column sets.
    pub fn column_index(self) -> usize {
        match self {
            SortColumn::Pid => 0,
            SortColumn::Name => 1,
            SortColumn::Cpu => 2,
            SortColumn::Memory => 3,
        }
    }

    /// `None` keeps enumeration order.
    pub fn from_str_config(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pid" => Some(SortColumn::Pid),
            "name" => Some(SortColumn::Name),
            "cpu" => Some(SortColumn::Cpu),
            "memory" | "mem" => Some(SortColumn::Memory),
            _ => None,
        }
    }
}

/// Which fixed column set is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnSet {
    #[default]
    Basic,
    Extended,
}

impl ColumnSet {
    pub fn toggle(self) -> Self {
        match self {
            ColumnSet::Basic => ColumnSet::Extended,
            ColumnSet::Extended => ColumnSet::Basic,
        }
    }

    pub fn headers(self) -> &'static [&'static str] {
        match self {
            ColumnSet::Basic => &["PID", "Name", "CPU (%)", "Memory (MB)"],
            ColumnSet::Extended => &[
                "PID",
                "Name",
                "CPU %",
                "Memory Usage",
                "Status",
                "Threads",
            ],
        }
    }
}

/// Text shown for each visible field of a record, in header order.
pub fn row_cells(record: &ProcessRecord, columns: ColumnSet) -> Vec<String> {
    let mut cells = vec![
        record.pid.to_string(),
        record.name.clone(),
        format_cpu(record.cpu_percent),
    ];
    let memory = record.memory_bytes;
    match columns {
        ColumnSet::Basic => {
            cells.push(memory.map_or_else(|| "N/A".to_string(), format_megabytes));
        }
        ColumnSet::Extended => {
            cells.push(memory.map_or_else(|| "N/A".to_string(), format_memory));
            cells.push(record.status.label().to_string());
            cells.push(record.thread_count.to_string());
        }
    }
    cells
}

fn compare(a: &ProcessRecord, b: &ProcessRecord, column: SortColumn) -> Ordering {
    match column {
        // PIDs order by their rendered text: "100" before "20" before "9".
        SortColumn::Pid => a.pid.to_string().cmp(&b.pid.to_string()),
        SortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortColumn::Cpu => b
            .cpu_percent
            .partial_cmp(&a.cpu_percent)
            .unwrap_or(Ordering::Equal),
        // Absent memory sorts after every known value.
        SortColumn::Memory => match (a.memory_bytes, b.memory_bytes) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

/// Display order for `snapshot`: indices into `snapshot.processes`.
///
/// The sort is stable and always starts from snapshot order, so ties keep the
/// order the sampler produced.
pub fn sort_order(snapshot: &Snapshot, column: Option<SortColumn>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..snapshot.processes.len()).collect();
    if let Some(column) = column {
        let records = &snapshot.processes;
        order.sort_by(|&a, &b| compare(&records[a], &records[b], column));
    }
    order
}

/// Position in `order` of the first row whose cells contain `query`, ignoring case.
///
/// The query is matched as typed, surrounding spaces included. A query of only
/// whitespace matches nothing.
pub fn find_first(
    snapshot: &Snapshot,
    order: &[usize],
    query: &str,
    columns: ColumnSet,
) -> Option<usize> {
    if query.trim().is_empty() {
        return None;
    }
    let needle = query.to_lowercase();
    order.iter().position(|&index| {
        row_cells(&snapshot.processes[index], columns)
            .iter()
            .any(|cell| cell.to_lowercase().contains(&needle))
    })
}
