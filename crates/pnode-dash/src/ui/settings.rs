use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use crate::app::App;
use crate::theme::Theme;
use super::helpers::label_line;

pub fn render_settings(f: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;
    let config = &app.config;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(" Settings ", Style::default().fg(theme.title)));

    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)))
    };

    let seeds = if config.seeds.is_empty() {
        "none".to_string()
    } else {
        config.seeds.join(", ")
    };

    let lines = vec![
        heading("Dashboard"),
        Line::from(""),
        label_line("  Theme:           ", format!("{} ({})", theme.name, Theme::NAMES.join("/")), theme),
        label_line("  History window:  ", format!("{} samples", app.history_window), theme),
        label_line("  Config file:     ", app.config_path.clone(), theme),
        Line::from(""),
        heading("Sources"),
        Line::from(""),
        label_line("  Gossip RPC:      ", config.resolved_rpc_endpoint(), theme),
        label_line("  Seeds:           ", seeds, theme),
        label_line(
            "  Seed RPC:        ",
            format!(":{}{}", config.seed_rpc_port, config.seed_rpc_path),
            theme,
        ),
        label_line("  Poll interval:   ", format!("{}s", config.poll_interval_secs), theme),
        label_line("  Request timeout: ", format!("{}s", config.request_timeout_secs), theme),
        Line::from(""),
        heading("Geolocation"),
        Line::from(""),
        label_line(
            "  Lookups:         ",
            if config.geo.enabled { "enabled".to_string() } else { "disabled".to_string() },
            theme,
        ),
    ];

    f.render_widget(Paragraph::new(lines).block(block), area);
}
