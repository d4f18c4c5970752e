use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use crate::app::App;
use super::helpers::centered_rect;

const NAVIGATION: [(&str, &str); 4] = [
    ("  1-4      ", "Switch to tab"),
    ("  Tab      ", "Next tab"),
    ("  Up/Down  ", "Select node"),
    ("  /        ", "Search nodes (Enter to finish)"),
];

const ACTIONS: [(&str, &str); 9] = [
    ("  f        ", "Cycle status filter"),
    ("  s        ", "Cycle sort column"),
    ("  o        ", "Toggle sort order"),
    ("  w        ", "Cycle history window (15/30/60)"),
    ("  c        ", "Cycle chart"),
    ("  n        ", "Trend node (fleet / each node)"),
    ("  r        ", "Refresh now"),
    ("  q / Esc  ", "Quit"),
    ("  ?        ", "Toggle help"),
];

pub fn render_help(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let popup_area = centered_rect(50, 70, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(theme.accent))
        .title(Span::styled(" Help ", Style::default().fg(theme.title).add_modifier(Modifier::BOLD)));

    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)))
    };
    let entry = |(key, what): (&'static str, &'static str)| {
        Line::from(vec![
            Span::styled(key, Style::default().fg(theme.accent)),
            Span::styled(what, Style::default().fg(theme.text)),
        ])
    };

    let mut lines = vec![heading("Navigation"), Line::from("")];
    lines.extend(NAVIGATION.into_iter().map(entry));
    lines.push(Line::from(""));
    lines.push(heading("Actions"));
    lines.push(Line::from(""));
    lines.extend(ACTIONS.into_iter().map(entry));

    f.render_widget(Clear, popup_area);
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), popup_area);
}
