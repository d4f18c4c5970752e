use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Sparkline, Wrap},
    Frame,
};
use crate::app::App;
use super::helpers::{fmt_num, fmt_percent};

pub fn render_overview(f: &mut Frame, app: &mut App, area: Rect) {
    let banner = if app.snapshot.error.is_some() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(6),
        ])
        .split(area);

    render_error_banner(f, app, chunks[0]);
    render_stat_boxes(f, app, chunks[1]);
    render_fleet_gauge(f, app, chunks[2]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[3]);

    render_uptime_sparkline(f, app, bottom[0]);
    render_status_list(f, app, bottom[1]);
}

fn render_error_banner(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let Some(ref error) = app.snapshot.error else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.offline))
        .title(Span::styled(" Fetch failed ", Style::default().fg(theme.offline).add_modifier(Modifier::BOLD)));

    let text = Line::from(vec![
        Span::styled(error.as_str(), Style::default().fg(theme.text)),
        Span::styled("  (showing last good data, press r to retry)", Style::default().fg(theme.label)),
    ]);
    f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
}

fn render_stat_boxes(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let stats = &app.snapshot.stats;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let boxes = [
        (" Total pNodes ", stats.total.to_string(), theme.accent),
        (" Online ", stats.online.to_string(), theme.online),
        (" Offline ", stats.offline.to_string(), theme.offline),
        (
            " Storage (GB) ",
            format!("{:.1} (avg {:.1})", stats.total_storage_gb, stats.avg_storage_gb),
            theme.chart_primary,
        ),
    ];

    for ((title, value, color), chunk) in boxes.into_iter().zip(chunks.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .title(Span::styled(title, Style::default().fg(theme.title)));
        let body = vec![
            Line::from(""),
            Line::from(Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD))),
        ];
        f.render_widget(Paragraph::new(body).block(block).alignment(Alignment::Center), *chunk);
    }
}

fn render_fleet_gauge(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let stats = &app.snapshot.stats;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let uptime = stats.fleet_uptime_percent.unwrap_or(0.0);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.border)).title(" Fleet Uptime "))
        .gauge_style(Style::default().fg(theme.uptime_color(uptime)))
        .percent(uptime.clamp(0.0, 100.0) as u16)
        .label(fmt_percent(stats.fleet_uptime_percent));
    f.render_widget(gauge, chunks[0]);

    let cpu = stats.avg_cpu_percent.unwrap_or(0.0);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.border)).title(" Avg CPU "))
        .gauge_style(Style::default().fg(theme.chart_secondary))
        .percent(cpu.clamp(0.0, 100.0) as u16)
        .label(format!("{}%", fmt_num(stats.avg_cpu_percent, 2)));
    f.render_widget(gauge, chunks[1]);
}

fn render_uptime_sparkline(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let history = &app.snapshot.history;

    let title = format!(" Fleet Uptime, last {} of {} samples ", history.len(), app.history_window);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(title, Style::default().fg(theme.title)));

    let data: Vec<u64> = history.iter().map(|s| s.average_percent.round() as u64).collect();

    f.render_widget(
        Sparkline::default()
            .block(block)
            .data(&data)
            .max(100)
            .style(Style::default().fg(theme.chart_primary)),
        area,
    );
}

fn render_status_list(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let stats = &app.snapshot.stats;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(" Status ", Style::default().fg(theme.title)));

    let mut items = vec![
        ListItem::new(Line::from(vec![
            Span::styled("[+] ", Style::default().fg(theme.online)),
            Span::styled(format!("{} online", stats.online), Style::default().fg(theme.text)),
        ])),
        ListItem::new(Line::from(vec![
            Span::styled("[-] ", Style::default().fg(theme.offline)),
            Span::styled(format!("{} offline", stats.offline), Style::default().fg(theme.text)),
        ])),
        ListItem::new(Line::from(vec![
            Span::styled("[?] ", Style::default().fg(theme.unknown)),
            Span::styled(format!("{} unknown", stats.unknown), Style::default().fg(theme.text)),
        ])),
        ListItem::new(""),
    ];

    if app.snapshot.total_items == 0 && !app.snapshot.loading {
        items.push(ListItem::new(Span::styled("No pNodes reported yet", Style::default().fg(theme.label))));
    }
    if let Some(ref geo) = app.geo {
        if geo.is_enabled() {
            items.push(ListItem::new(Span::styled("Geolocation on", Style::default().fg(theme.label))));
        }
    }

    f.render_widget(List::new(items).block(block), area);
}
