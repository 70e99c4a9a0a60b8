use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState};

use crate::app::App;
use crate::table::{ColumnSet, SortColumn, row_cells};
use crate::ui::theme::Theme;

fn widths(columns: ColumnSet) -> Vec<Constraint> {
    match columns {
        ColumnSet::Basic => vec![
            Constraint::Length(8),
            Constraint::Min(16),
            Constraint::Length(9),
            Constraint::Length(13),
        ],
        ColumnSet::Extended => vec![
            Constraint::Length(8),
            Constraint::Min(16),
            Constraint::Length(7),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(8),
        ],
    }
}

/// Header labels with a direction marker on the active sort column.
fn header_labels(columns: ColumnSet, sort: Option<SortColumn>) -> Vec<String> {
    columns
        .headers()
        .iter()
        .enumerate()
        .map(|(i, label)| match sort {
            Some(column) if column.column_index() == i => {
                let marker = if column.descending() { '\u{25bc}' } else { '\u{25b2}' };
                format!("{label} {marker}")
            }
            _ => (*label).to_string(),
        })
        .collect()
}

pub fn render(frame: &mut Frame, area: Rect, app: &mut App, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border));

    // Borders plus the header row.
    app.viewport_rows = area.height.saturating_sub(3).max(1) as usize;

    let header = Row::new(
        header_labels(app.columns, app.sort)
            .into_iter()
            .map(Cell::from),
    )
    .style(
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = app
        .rows()
        .map(|record| Row::new(row_cells(record, app.columns).into_iter().map(Cell::from)))
        .collect();

    let table = Table::new(rows, widths(app.columns))
        .header(header)
        .block(block)
        .style(Style::default().fg(theme.text_primary))
        .row_highlight_style(
            Style::default()
                .fg(theme.row_highlight_fg)
                .bg(theme.row_highlight_bg)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = TableState::default();
    if !app.order.is_empty() {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(table, area, &mut state);
}
