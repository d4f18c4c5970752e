use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use pnode_monitor::view::NodeRow;
use crate::app::{App, InputMode};
use super::helpers::{fmt_count, fmt_num, fmt_percent, format_uptime, label_line};

const HEADER: [&str; 10] = [
    "ID", "Status", "Address", "Version", "Location", "Storage GB", "CPU %", "RAM GB", "Uptime", "Observed",
];

pub fn render_nodes(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5), Constraint::Length(7)])
        .split(area);

    render_query_line(f, app, chunks[0]);
    render_table(f, app, chunks[1]);
    render_detail(f, app, chunks[2]);
}

fn render_query_line(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let search_style = if app.input_mode == InputMode::Search {
        Style::default().fg(theme.warning).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    };
    let search = if app.query.search.is_empty() { "-".to_string() } else { app.query.search.clone() };

    let line = Line::from(vec![
        Span::styled(" Search: ", Style::default().fg(theme.label)),
        Span::styled(search, search_style),
        Span::styled("  Status: ", Style::default().fg(theme.label)),
        Span::styled(app.query.status.as_str(), Style::default().fg(theme.text)),
        Span::styled("  Sort: ", Style::default().fg(theme.label)),
        Span::styled(app.sort_label(), Style::default().fg(theme.text)),
        Span::styled(
            format!("  {} of {} shown", app.snapshot.rows.len(), app.snapshot.total_items),
            Style::default().fg(theme.label),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_table(f: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;

    let header = Row::new(
        HEADER
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    );

    let rows: Vec<Row> = app
        .snapshot
        .rows
        .iter()
        .map(|row| {
            let node = &row.node;
            let observed_color = row
                .uptime_percent
                .map(|p| theme.uptime_color(p))
                .unwrap_or(theme.unknown);
            Row::new(vec![
                Cell::from(node.id.clone()),
                Cell::from(node.status.as_str()).style(Style::default().fg(theme.status_color(node.status))),
                Cell::from(node.address.clone()),
                Cell::from(node.version.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(row.location.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(fmt_num(node.storage_gb, 2)),
                Cell::from(fmt_num(node.cpu_percent, 2)),
                Cell::from(format!("{}/{}", fmt_num(node.ram_used_gb, 2), fmt_num(node.ram_total_gb, 2))),
                Cell::from(node.uptime_seconds.map(format_uptime).unwrap_or_else(|| "-".to_string())),
                Cell::from(fmt_percent(row.uptime_percent)).style(Style::default().fg(observed_color)),
            ])
            .style(Style::default().fg(theme.text))
        })
        .collect();

    let widths = [
        Constraint::Length(14),
        Constraint::Length(8),
        Constraint::Min(18),
        Constraint::Length(9),
        Constraint::Length(16),
        Constraint::Length(10),
        Constraint::Length(7),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(9),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(" pNodes ", Style::default().fg(theme.title)));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(theme.selected_bg).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn selected_row(app: &App) -> Option<&NodeRow> {
    app.table_state
        .selected()
        .and_then(|i| app.snapshot.rows.get(i))
}

fn render_detail(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(" Selected ", Style::default().fg(theme.title)));

    let Some(row) = selected_row(app) else {
        let hint = Line::from(Span::styled("Use Up/Down to select a node", Style::default().fg(theme.label)));
        f.render_widget(Paragraph::new(hint).block(block), area);
        return;
    };
    let node = &row.node;

    let lines = vec![
        Line::from(vec![
            Span::styled(node.title(), Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", node.address), Style::default().fg(theme.text)),
        ]),
        label_line(
            "Region: ",
            format!(
                "{}  Last seen: {}",
                node.region.clone().unwrap_or_else(|| "-".to_string()),
                node.last_seen.clone().unwrap_or_else(|| "-".to_string()),
            ),
            theme,
        ),
        label_line(
            "RAM used: ",
            format!(
                "{}  Uptime: {} h",
                fmt_percent(node.ram_used_percent),
                fmt_num(node.uptime_hours(), 1),
            ),
            theme,
        ),
        label_line(
            "Streams: ",
            format!(
                "{}  Packets rx/tx: {}/{}  Pages: {}",
                fmt_count(node.active_streams),
                fmt_count(node.packets_received),
                fmt_count(node.packets_sent),
                fmt_count(node.total_pages),
            ),
            theme,
        ),
        label_line("Observed uptime: ", fmt_percent(row.uptime_percent), theme),
    ];

    f.render_widget(Paragraph::new(lines).block(block), area);
}
