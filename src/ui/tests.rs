use std::sync::Arc;
use std::time::SystemTime;

use ratatui::Terminal;
use ratatui::backend::TestBackend;

use crate::action::Action;
use crate::app::App;
use crate::config::Config;
use crate::system::record::{ProcessRecord, ProcessState, Snapshot, SystemTotals};
use crate::system::source::SampleError;

fn buffer_to_string(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            let cell = buf.cell((x, y)).unwrap();
            out.push_str(cell.symbol());
        }
        if y + 1 < area.height {
            out.push('\n');
        }
    }
    out
}

fn render_app(app: &mut App, width: u16, height: u16) -> String {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| super::draw(frame, app)).unwrap();
    buffer_to_string(terminal.backend().buffer())
}

fn make_process(pid: u32, name: &str, memory: Option<u64>, cpu: f32) -> ProcessRecord {
    ProcessRecord {
        pid,
        name: name.to_string(),
        cpu_percent: cpu,
        memory_bytes: memory,
        status: ProcessState::Sleeping,
        thread_count: 3,
    }
}

fn make_snapshot() -> Snapshot {
    Snapshot {
        taken_at: SystemTime::now(),
        totals: SystemTotals {
            cpu_percent: 12.5,
            memory_used: 420 * 1024 * 1024,
            memory_total: 1024 * 1024 * 1024,
        },
        processes: vec![
            make_process(1, "alpha", Some(200 * 1024 * 1024), 12.5),
            make_process(2, "beta", Some(120 * 1024 * 1024), 7.2),
            make_process(3, "gamma", None, 0.0),
        ],
    }
}

fn make_app() -> App {
    App::new(&Config::default(), make_snapshot())
}

#[test]
fn renders_basic_columns_with_sort_marker() {
    let mut app = make_app();
    let screen = render_app(&mut app, 100, 16);

    assert!(screen.contains("proctab"));
    assert!(screen.contains("Procs: 3"));
    assert!(screen.contains("PID"));
    assert!(screen.contains("CPU (%) \u{25bc}"));
    assert!(screen.contains("Memory (MB)"));
    assert!(screen.contains("alpha"));
    assert!(screen.contains("200.00"));
    assert!(screen.contains("N/A"));
}

#[test]
fn rows_follow_cpu_order() {
    let mut app = make_app();
    let screen = render_app(&mut app, 100, 16);

    let alpha = screen.find("alpha").unwrap();
    let beta = screen.find("beta").unwrap();
    let gamma = screen.find("gamma").unwrap();
    assert!(alpha < beta && beta < gamma);
}

#[test]
fn extended_columns_show_status_and_threads() {
    let mut app = make_app();
    app.dispatch(Action::ToggleColumns);
    let screen = render_app(&mut app, 110, 16);

    assert!(screen.contains("Memory Usage"));
    assert!(screen.contains("Status"));
    assert!(screen.contains("Threads"));
    assert!(screen.contains("200.00 MB"));
    assert!(screen.contains("sleeping"));
}

#[test]
fn header_shows_totals() {
    let mut app = make_app();
    let screen = render_app(&mut app, 100, 16);

    assert!(screen.contains("CPU 12%") || screen.contains("CPU 13%"));
    assert!(screen.contains("MEM 41% of 1.00 GB"));
}

#[test]
fn search_mode_shows_input() {
    let mut app = make_app();
    app.dispatch(Action::EnterSearchMode);
    app.dispatch(Action::UpdateSearch("bet".to_string()));
    let screen = render_app(&mut app, 100, 16);

    assert!(screen.contains(" bet"));
    assert!(screen.contains("Find"));
}

#[test]
fn error_notice_replaces_key_pills() {
    let mut app = make_app();
    app.apply_sample(Err(SampleError::EmptyProcessTable));
    let screen = render_app(&mut app, 120, 16);

    assert!(screen.contains("Sampling failed"));
    assert!(!screen.contains("Theme"));
    // The last good snapshot is still shown
    assert!(screen.contains("alpha"));
}

#[test]
fn help_overlay_lists_keybinds() {
    let mut app = make_app();
    app.dispatch(Action::ToggleHelp);
    let screen = render_app(&mut app, 100, 24);

    assert!(screen.contains("Keys"));
    assert!(screen.contains("Terminate (SIGTERM)"));
    assert!(screen.contains("Toggle extended columns"));
}

#[test]
fn empty_snapshot_renders_headers_only() {
    let mut app = App::new(&Config::default(), Snapshot::empty());
    app.publish(Arc::new(Snapshot::empty()));
    let screen = render_app(&mut app, 80, 12);

    assert!(screen.contains("Procs: 0"));
    assert!(screen.contains("Name"));
}

#[test]
fn renderer_records_viewport_height() {
    let mut app = make_app();
    render_app(&mut app, 100, 20);
    // 20 rows minus header (4) and status bar (1), minus borders and header row
    assert_eq!(app.viewport_rows, 12);
}
