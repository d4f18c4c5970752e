mod charts;
mod help;
mod helpers;
mod nodes;
mod overview;
mod settings;
mod tabs;

pub use charts::render_charts;
pub use help::render_help;
pub use nodes::render_nodes;
pub use overview::render_overview;
pub use settings::render_settings;
pub use tabs::render_tabs;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use crate::app::{App, InputMode};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn render_ui(f: &mut Frame, app: &mut App) {
    let theme = &app.theme;
    let size = f.area();
    if size.width < 4 || size.height < 4 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(
            " pNode Dashboard ",
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);
    f.render_widget(block, size);

    let inner = Rect::new(size.x + 1, size.y + 1, size.width - 2, size.height - 2);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(inner);

    render_tabs(f, app, chunks[0]);

    match app.tab {
        0 => render_overview(f, app, chunks[1]),
        1 => render_nodes(f, app, chunks[1]),
        2 => render_charts(f, app, chunks[1]),
        3 => render_settings(f, app, chunks[1]),
        _ => {}
    }

    render_status_bar(f, app, chunks[2]);

    if app.show_help {
        render_help(f, app, size);
    }
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let snapshot = &app.snapshot;

    let mut spans = vec![
        Span::styled(" [Q]", Style::default().fg(theme.accent)),
        Span::styled(" Quit ", Style::default().fg(theme.text)),
        Span::styled("[R]", Style::default().fg(theme.accent)),
        Span::styled(" Refresh ", Style::default().fg(theme.text)),
        Span::styled("[?]", Style::default().fg(theme.accent)),
        Span::styled(" Help ", Style::default().fg(theme.text)),
        Span::raw(" | "),
        Span::styled(format!("v{}", VERSION), Style::default().fg(theme.label)),
        Span::raw(" | "),
    ];

    if app.input_mode == InputMode::Search {
        spans.push(Span::styled("SEARCH ", Style::default().fg(theme.warning)));
        spans.push(Span::styled(format!("/{}_", app.query.search), Style::default().fg(theme.text)));
    } else if snapshot.loading {
        spans.push(Span::styled("LOADING", Style::default().fg(theme.warning)));
    } else if let Some(ref error) = snapshot.error {
        spans.push(Span::styled(
            format!("ERROR {}", error),
            Style::default().fg(theme.offline),
        ));
    } else {
        match snapshot.last_updated {
            Some(at) => spans.push(Span::styled(
                format!("Updated {}", at.format("%H:%M:%S")),
                Style::default().fg(theme.online),
            )),
            None => spans.push(Span::styled("Waiting for first fetch", Style::default().fg(theme.label))),
        }
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
