//! Headless mode: prints each published snapshot to stdout instead of drawing the TUI.

use std::io::{self, Write};

use color_eyre::Result;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use serde::Serialize;
use tokio::sync::mpsc;
use unicode_width::UnicodeWidthStr;

use crate::format::{pad_right, truncate_unicode};
use crate::system::record::{ProcessRecord, Snapshot};
use crate::system::scheduler::{SampleOutcome, SamplingScheduler};
use crate::system::source::ProcessSource;
use crate::table::{self, ColumnSet, SortColumn};

const MAX_NAME_WIDTH: usize = 32;

/// Boxed text table of the extended columns, sorted by CPU descending.
pub fn render_table(snapshot: &Snapshot) -> String {
    let columns = ColumnSet::Extended;
    let headers = columns.headers();
    let order = table::sort_order(snapshot, Some(SortColumn::Cpu));

    let rows: Vec<Vec<String>> = order
        .iter()
        .map(|&i| {
            let mut cells = table::row_cells(&snapshot.processes[i], columns);
            cells[1] = truncate_unicode(&cells[1], MAX_NAME_WIDTH);
            cells
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let rule = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    };

    let mut out = Vec::with_capacity(rows.len() + 4);
    out.push(rule.clone());
    out.push(boxed_row(headers.iter().copied(), &widths));
    out.push(rule.clone());
    for row in &rows {
        out.push(boxed_row(row.iter().map(String::as_str), &widths));
    }
    out.push(rule);
    out.join("\n")
}

fn boxed_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.zip(widths) {
        line.push(' ');
        line.push_str(&pad_right(cell, *width));
        line.push_str(" |");
    }
    line
}

#[derive(Serialize)]
struct JsonLine<'a> {
    taken_at_ms: u64,
    cpu_percent: f32,
    memory_used: u64,
    memory_total: u64,
    processes: &'a [ProcessRecord],
}

/// One snapshot as a single JSON line, processes in enumeration order.
pub fn render_json(snapshot: &Snapshot) -> serde_json::Result<String> {
    let taken_at_ms = snapshot
        .taken_at
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    serde_json::to_string(&JsonLine {
        taken_at_ms,
        cpu_percent: snapshot.totals.cpu_percent,
        memory_used: snapshot.totals.memory_used,
        memory_total: snapshot.totals.memory_total,
        processes: &snapshot.processes,
    })
}

fn print_snapshot(out: &mut impl Write, snapshot: &Snapshot, json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", render_json(snapshot)?)?;
    } else {
        execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        writeln!(out, "{}", render_table(snapshot))?;
        writeln!(out, "\nPress Ctrl+C to exit.")?;
    }
    out.flush()?;
    Ok(())
}

/// Prints snapshots until Ctrl+C or `iterations` snapshots have been shown.
pub async fn run<S>(
    mut scheduler: SamplingScheduler<S>,
    iterations: Option<u64>,
    json: bool,
) -> Result<()>
where
    S: ProcessSource + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<SampleOutcome>();
    scheduler.start(tx);

    let mut stdout = io::stdout();
    let mut shown = 0u64;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            outcome = rx.recv() => match outcome {
                Some(Ok(snapshot)) => {
                    print_snapshot(&mut stdout, &snapshot, json)?;
                    shown += 1;
                    if iterations.is_some_and(|limit| shown >= limit) {
                        break;
                    }
                }
                Some(Err(err)) => eprintln!("sampling failed: {err}"),
                None => break,
            },
        }
    }

    scheduler.stop().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::record::{ProcessState, SystemTotals};
    use std::time::{Duration, UNIX_EPOCH};

    fn snapshot() -> Snapshot {
        let record = |pid, name: &str, cpu, memory| ProcessRecord {
            pid,
            name: name.to_string(),
            cpu_percent: cpu,
            memory_bytes: memory,
            status: ProcessState::Running,
            thread_count: 4,
        };
        Snapshot {
            taken_at: UNIX_EPOCH + Duration::from_millis(1_500),
            totals: SystemTotals {
                cpu_percent: 50.0,
                memory_used: 2048,
                memory_total: 4096,
            },
            processes: vec![
                record(1, "init", 0.5, Some(1024)),
                record(42, "nginx", 2.3, Some(1_572_864)),
                record(77, "ghost", 0.0, None),
            ],
        }
    }

    #[test]
    fn table_is_boxed_and_sorted_by_cpu() {
        let text = render_table(&snapshot());
        insta::assert_snapshot!(text, @r"
        +-----+-------+-------+--------------+---------+---------+
        | PID | Name  | CPU % | Memory Usage | Status  | Threads |
        +-----+-------+-------+--------------+---------+---------+
        | 42  | nginx | 2.3   | 1.50 MB      | running | 4       |
        | 1   | init  | 0.5   | 1.00 KB      | running | 4       |
        | 77  | ghost | 0.0   | N/A          | running | 4       |
        +-----+-------+-------+--------------+---------+---------+
        ");
    }

    #[test]
    fn long_names_are_truncated() {
        let mut snap = snapshot();
        snap.processes[0].name = "x".repeat(80);
        let text = render_table(&snap);
        assert!(text.contains(&format!("{}\u{2026}", "x".repeat(MAX_NAME_WIDTH - 1))));
        assert!(!text.contains(&"x".repeat(MAX_NAME_WIDTH)));
    }

    #[test]
    fn json_line_carries_totals_and_absent_memory() {
        let line = render_json(&snapshot()).unwrap();
        assert!(!line.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["taken_at_ms"], 1500);
        assert_eq!(value["memory_total"], 4096);
        assert_eq!(value["processes"][0]["pid"], 1);
        assert_eq!(value["processes"][2]["memory_bytes"], serde_json::Value::Null);
        assert_eq!(value["processes"][1]["status"], "running");
    }
}
