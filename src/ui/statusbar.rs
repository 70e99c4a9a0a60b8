use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{InputMode, Notice, NoticeKind, ResolvedKeybinds, key_label};
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    input_mode: InputMode,
    search_text: &str,
    notice: Option<&Notice>,
    keybinds: &ResolvedKeybinds,
    theme: &Theme,
) {
    let bg_style = Style::default().bg(theme.statusbar_bg);

    // Notices take priority outside of search input
    if let Some(notice) = notice
        && input_mode != InputMode::Search
    {
        let color = match notice.kind {
            NoticeKind::Success => theme.status_ok,
            NoticeKind::Error => theme.status_err,
            NoticeKind::Info => theme.status_info,
        };
        let line = Line::from(Span::styled(
            format!(" {}", notice.text),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line).style(bg_style), area);
        return;
    }

    let line = match input_mode {
        InputMode::Search => {
            let mut spans = vec![
                Span::styled(
                    " / ",
                    Style::default()
                        .fg(theme.pill_key_fg)
                        .bg(theme.pill_key_bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {search_text}"),
                    Style::default().fg(theme.pill_desc_fg),
                ),
                Span::styled("\u{2588}", Style::default().fg(theme.pill_key_bg)),
            ];
            spans.extend(pill_spans("Esc".to_string(), "Cancel", theme));
            spans.extend(pill_spans("Enter".to_string(), "Find", theme));
            Line::from(spans)
        }
        InputMode::Normal | InputMode::Help => {
            let mut spans = Vec::new();
            spans.extend(pill_spans(key_label(keybinds.quit), "Quit", theme));
            spans.extend(pill_spans(key_label(keybinds.search), "Search", theme));
            spans.extend(pill_spans(key_label(keybinds.terminate), "Term", theme));
            spans.extend(pill_spans(key_label(keybinds.cycle_sort), "Sort", theme));
            spans.extend(pill_spans(key_label(keybinds.toggle_columns), "Cols", theme));
            spans.extend(pill_spans(key_label(keybinds.cycle_theme), "Theme", theme));
            spans.extend(pill_spans(key_label(keybinds.help), "Help", theme));
            Line::from(spans)
        }
    };

    frame.render_widget(Paragraph::new(line).style(bg_style), area);
}

fn pill_spans<'a>(key: String, desc: &'a str, theme: &Theme) -> Vec<Span<'a>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}
