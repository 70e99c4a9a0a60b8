use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Sparkline};

use crate::format::format_memory;
use crate::system::history::RollingHistory;
use crate::system::record::Snapshot;
use crate::table::SortColumn;
use crate::ui::theme::Theme;

pub struct HeaderView<'a> {
    pub snapshot: &'a Snapshot,
    pub sort: Option<SortColumn>,
    pub cpu_history: &'a RollingHistory<f32>,
    pub memory_history: &'a RollingHistory<f32>,
}

pub fn render(frame: &mut Frame, area: Rect, view: &HeaderView, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(area);

    render_branding(frame, chunks[0], view, theme);

    let totals = &view.snapshot.totals;
    render_sparkline(
        frame,
        chunks[1],
        format!(" CPU {:.0}% ", totals.cpu_percent),
        view.cpu_history,
        theme.cpu_sparkline,
        theme,
    );
    render_sparkline(
        frame,
        chunks[2],
        format!(
            " MEM {:.0}% of {} ",
            totals.memory_percent(),
            format_memory(totals.memory_total)
        ),
        view.memory_history,
        theme.memory_sparkline,
        theme,
    );
}

fn render_branding(frame: &mut Frame, area: Rect, view: &HeaderView, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sort_label = view.sort.map_or("none", SortColumn::label);
    let line = Line::from(vec![
        Span::styled(
            " proctab ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Procs: {}", view.snapshot.len()),
            Style::default().fg(theme.text_secondary),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Sort: {sort_label}"),
            Style::default().fg(theme.text_secondary),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

/// Percentages are scaled by 100 so the sparkline keeps two decimals of resolution.
fn sparkline_data(history: &RollingHistory<f32>) -> Vec<u64> {
    history
        .iter()
        .map(|v| (v.clamp(0.0, 100.0) * 100.0) as u64)
        .collect()
}

fn render_sparkline(
    frame: &mut Frame,
    area: Rect,
    title: String,
    history: &RollingHistory<f32>,
    color: ratatui::style::Color,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let data = sparkline_data(history);
    let sparkline = Sparkline::default()
        .block(block)
        .data(&data)
        .max(10000)
        .style(Style::default().fg(color));

    frame.render_widget(sparkline, area);
}
