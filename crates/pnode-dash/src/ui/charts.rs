use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};
use pnode_monitor::view::{resource_series, trend_series, ChartMode};
use crate::app::App;

pub fn render_charts(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(8)])
        .split(area);

    render_chart_header(f, app, chunks[0]);

    match app.chart_mode {
        ChartMode::UptimeTrend => render_trend(f, app, chunks[1]),
        mode => render_resources(f, app, mode, chunks[1]),
    }
}

fn render_chart_header(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(" [c] ", Style::default().fg(theme.accent))];
    for mode in ChartMode::ALL {
        let style = if mode == app.chart_mode {
            Style::default().fg(theme.active_tab).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.inactive_tab)
        };
        spans.push(Span::styled(format!("{}  ", mode.title()), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Bars carry tenths so small readings stay visible; labels show the real value.
fn bar(label: &'static str, value: f64, style: Style) -> Bar<'static> {
    Bar::default()
        .label(Line::from(label))
        .value((value.max(0.0) * 10.0).round() as u64)
        .text_value(format!("{:.1}", value))
        .style(style)
}

fn render_resources(f: &mut Frame, app: &App, mode: ChartMode, area: Rect) {
    let theme = &app.theme;
    let nodes: Vec<_> = app.snapshot.rows.iter().map(|r| r.node.clone()).collect();
    let series = resource_series(&nodes, mode);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(format!(" {} ", mode.title()), Style::default().fg(theme.title)));

    if series.is_empty() {
        let empty = Paragraph::new(Span::styled("No pNodes to chart", Style::default().fg(theme.label)));
        f.render_widget(empty.block(block), area);
        return;
    }

    let palette = [
        Style::default().fg(theme.chart_primary),
        Style::default().fg(theme.chart_secondary),
    ];

    let mut chart = BarChart::default()
        .block(block)
        .bar_width(5)
        .bar_gap(1)
        .group_gap(3)
        .value_style(Style::default().fg(theme.text).add_modifier(Modifier::BOLD))
        .label_style(Style::default().fg(theme.label));

    for point in &series {
        let bars: Vec<Bar> = point
            .values
            .iter()
            .enumerate()
            .map(|(i, (label, value))| bar(*label, *value, palette[i % palette.len()]))
            .collect();
        chart = chart.data(BarGroup::default().label(Line::from(point.name.clone())).bars(&bars));
    }

    f.render_widget(chart, area);
}

fn render_trend(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let samples: Vec<_> = app.snapshot.history.iter().collect();
    let series = trend_series(&samples, app.trend_node.as_deref());

    let subject = match app.trend_node {
        Some(ref id) => format!("node {}", id),
        None => "fleet average".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(
            format!(" Uptime % Trend, {} ([n] to change) ", subject),
            Style::default().fg(theme.title),
        ));

    if series.is_empty() {
        let empty = Paragraph::new(Span::styled("No samples yet", Style::default().fg(theme.label)));
        f.render_widget(empty.block(block), area);
        return;
    }

    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, (_, percent))| (i as f64, *percent))
        .collect();
    let x_max = (points.len().max(2) - 1) as f64;

    let first = series.first().map(|(t, _)| t.format("%H:%M:%S").to_string()).unwrap_or_default();
    let last = series.last().map(|(t, _)| t.format("%H:%M:%S").to_string()).unwrap_or_default();

    let dataset = Dataset::default()
        .name(subject)
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(theme.chart_primary))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(theme.label))
                .bounds([0.0, x_max])
                .labels([Span::raw(first), Span::raw(last)]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(theme.label))
                .bounds([0.0, 100.0])
                .labels([Span::raw("0"), Span::raw("50"), Span::raw("100")]),
        );

    f.render_widget(chart, area);
}
