pub mod header;
pub mod help;
pub mod process_table;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    app.expire_notice();
    let theme = app.theme.clone();

    header::render(
        frame,
        chunks[0],
        &header::HeaderView {
            snapshot: &app.snapshot,
            sort: app.sort,
            cpu_history: &app.cpu_history,
            memory_history: &app.memory_history,
        },
        &theme,
    );

    process_table::render(frame, chunks[1], app, &theme);

    statusbar::render(
        frame,
        chunks[2],
        app.input_mode,
        &app.search_text,
        app.notice.as_ref(),
        &app.keybinds,
        &theme,
    );

    // Help overlay is drawn last so it sits on top
    if app.show_help() {
        help::render(frame, frame.area(), &app.help_entries(), &theme);
    }
}

#[cfg(test)]
mod tests;
