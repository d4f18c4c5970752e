//! Application state for the pNode dashboard

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pnode_monitor::view::{windowed_history, ChartMode, NodeRow, OverviewStats, SortOrder, ViewQuery};
use pnode_monitor::{GeoCache, HttpTransport, MonitorConfig, Poller, PnodeStore};
use pnode_types::{UptimeHistorySample, HISTORY_WINDOW_CHOICES};
use ratatui::widgets::TableState;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::theme::Theme;

pub const TAB_TITLES: [&str; 4] = ["Overview", "Nodes", "Charts", "Settings"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// Side effects a key press asks the event loop to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Refresh,
    SetHistoryWindow(usize),
}

/// Render-side copy of the store, refreshed every tick.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub total_items: usize,
    pub rows: Vec<NodeRow>,
    pub stats: OverviewStats,
    pub history: Vec<UptimeHistorySample>,
    pub node_ids: Vec<String>,
}

pub struct App {
    pub tab: u8,
    pub theme: Theme,
    pub config: MonitorConfig,
    pub config_path: String,
    pub store: Arc<RwLock<PnodeStore>>,
    pub geo: Option<Arc<GeoCache>>,
    pub poller: Option<Poller<HttpTransport>>,
    pub query: ViewQuery,
    pub history_window: usize,
    pub chart_mode: ChartMode,
    pub trend_node: Option<String>,
    pub input_mode: InputMode,
    pub table_state: TableState,
    pub show_help: bool,
    pub snapshot: Snapshot,
}

impl App {
    pub fn new(config: MonitorConfig, config_path: String, store: Arc<RwLock<PnodeStore>>, theme: Theme) -> Self {
        let history_window = config.history_window;
        Self {
            tab: 0,
            theme,
            config,
            config_path,
            store,
            geo: None,
            poller: None,
            query: ViewQuery::default(),
            history_window,
            chart_mode: ChartMode::default(),
            trend_node: None,
            input_mode: InputMode::Normal,
            table_state: TableState::default(),
            show_help: false,
            snapshot: Snapshot::default(),
        }
    }

    pub fn with_poller(mut self, poller: Poller<HttpTransport>) -> Self {
        self.geo = poller.geo();
        self.poller = Some(poller);
        self
    }

    /// Copies the store into [`Snapshot`] under a short read lock.
    pub async fn sync(&mut self) {
        let items = self.store.read().await.items().to_vec();
        let locations = match self.geo {
            Some(ref geo) => geo.locations_for(&items).await,
            None => HashMap::new(),
        };

        let store = self.store.read().await;
        let rows = self.query.rows(&store, &locations);
        let history = windowed_history(&store, store.history_window())
            .into_iter()
            .cloned()
            .collect();

        self.history_window = store.history_window();
        self.snapshot = Snapshot {
            loading: store.is_loading(),
            error: store.error().map(str::to_string),
            last_updated: store.last_updated(),
            total_items: store.items().len(),
            stats: OverviewStats::from_store(&store),
            node_ids: store.items().iter().map(|n| n.id.clone()).collect(),
            rows,
            history,
        };
        drop(store);

        self.clamp_selection();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        if self.input_mode == InputMode::Search {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.input_mode = InputMode::Normal,
                KeyCode::Backspace => {
                    self.query.search.pop();
                }
                KeyCode::Char(c) => self.query.search.push(c),
                _ => {}
            }
            return Action::None;
        }

        if self.show_help {
            match key.code {
                KeyCode::Char('q') => return Action::Quit,
                KeyCode::Esc | KeyCode::Char('?') => self.show_help = false,
                _ => {}
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Char(c @ '1'..='4') => self.tab = c as u8 - b'1',
            KeyCode::Tab => self.tab = (self.tab + 1) % TAB_TITLES.len() as u8,
            KeyCode::BackTab => {
                self.tab = (self.tab + TAB_TITLES.len() as u8 - 1) % TAB_TITLES.len() as u8
            }
            KeyCode::Char('r') => return Action::Refresh,
            KeyCode::Char('/') => {
                self.tab = 1;
                self.input_mode = InputMode::Search;
            }
            KeyCode::Char('f') => self.query.status = self.query.status.next(),
            KeyCode::Char('s') => self.query.sort_key = self.query.sort_key.next(),
            KeyCode::Char('o') => self.query.order = self.query.order.toggle(),
            KeyCode::Char('w') => return Action::SetHistoryWindow(self.next_history_window()),
            KeyCode::Char('c') => self.chart_mode = self.chart_mode.next(),
            KeyCode::Char('n') => self.cycle_trend_node(),
            KeyCode::Up => self.scroll_up(),
            KeyCode::Down => self.scroll_down(),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
        Action::None
    }

    pub fn next_history_window(&self) -> usize {
        let idx = HISTORY_WINDOW_CHOICES
            .iter()
            .position(|w| *w == self.history_window);
        match idx {
            Some(i) => HISTORY_WINDOW_CHOICES[(i + 1) % HISTORY_WINDOW_CHOICES.len()],
            None => HISTORY_WINDOW_CHOICES[0],
        }
    }

    /// Steps through fleet average, then each known node id.
    pub fn cycle_trend_node(&mut self) {
        let ids = &self.snapshot.node_ids;
        self.trend_node = match self.trend_node {
            None => ids.first().cloned(),
            Some(ref current) => match ids.iter().position(|id| id == current) {
                Some(i) => ids.get(i + 1).cloned(),
                None => None,
            },
        };
    }

    pub fn scroll_up(&mut self) {
        let selected = self.table_state.selected().unwrap_or(0);
        self.table_state.select(Some(selected.saturating_sub(1)));
    }

    pub fn scroll_down(&mut self) {
        let max = self.snapshot.rows.len().saturating_sub(1);
        let next = self.table_state.selected().map(|s| s + 1).unwrap_or(0);
        self.table_state.select(Some(next.min(max)));
    }

    fn clamp_selection(&mut self) {
        if self.snapshot.rows.is_empty() {
            self.table_state.select(None);
        } else if let Some(selected) = self.table_state.selected() {
            let max = self.snapshot.rows.len() - 1;
            if selected > max {
                self.table_state.select(Some(max));
            }
        }
    }

    pub fn request_refresh(&self) {
        if let Some(ref poller) = self.poller {
            poller.request_refresh();
        }
    }

    pub fn sort_label(&self) -> String {
        let arrow = match self.query.order {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        };
        format!("{} ({})", self.query.sort_key, arrow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pnode_monitor::view::{SortKey, StatusFilter};
    use pnode_types::{NodeState, NodeStatus};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        App::new(
            MonitorConfig::default(),
            "config.toml".to_string(),
            Arc::new(RwLock::new(PnodeStore::new())),
            Theme::default(),
        )
    }

    async fn seeded_app() -> App {
        let app = app();
        {
            let mut store = app.store.write().await;
            store.begin_fetch();
            store.complete_fetch(
                vec![
                    NodeStatus::new("a", "http://1.1.1.1:6000", NodeState::Online),
                    NodeStatus::new("b", "http://2.2.2.2:6000", NodeState::Offline),
                ],
                Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            );
        }
        app
    }

    #[test]
    fn test_tab_navigation() {
        let mut app = app();
        assert_eq!(app.handle_key(key(KeyCode::Char('3'))), Action::None);
        assert_eq!(app.tab, 2);
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.tab, 0);
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.tab, 3);
    }

    #[test]
    fn test_quit_and_refresh() {
        let mut app = app();
        assert_eq!(app.handle_key(key(KeyCode::Char('r'))), Action::Refresh);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn test_search_mode_captures_keys() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('/')));
        assert_eq!(app.input_mode, InputMode::Search);
        assert_eq!(app.tab, 1);

        for c in "q1x".chars() {
            assert_eq!(app.handle_key(key(KeyCode::Char(c))), Action::None);
        }
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.query.search, "q1");

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.tab, 1);
    }

    #[test]
    fn test_filter_sort_and_window_keys() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('f')));
        assert_eq!(app.query.status, StatusFilter::Online);
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.query.sort_key, SortKey::Id);
        app.handle_key(key(KeyCode::Char('o')));
        assert_eq!(app.query.order, SortOrder::Desc);
        assert_eq!(app.sort_label(), "id (desc)");

        assert_eq!(app.history_window, 30);
        assert_eq!(app.handle_key(key(KeyCode::Char('w'))), Action::SetHistoryWindow(60));
        app.history_window = 60;
        assert_eq!(app.next_history_window(), 15);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('?')));
        assert!(app.show_help);
        assert_eq!(app.handle_key(key(KeyCode::Char('2'))), Action::None);
        assert_eq!(app.tab, 0);
        app.handle_key(key(KeyCode::Esc));
        assert!(!app.show_help);
    }

    #[tokio::test]
    async fn test_sync_builds_snapshot() {
        let mut app = seeded_app().await;
        app.query.status = StatusFilter::Offline;
        app.sync().await;

        assert_eq!(app.snapshot.total_items, 2);
        assert_eq!(app.snapshot.rows.len(), 1);
        assert_eq!(app.snapshot.rows[0].node.id, "b");
        assert_eq!(app.snapshot.stats.online, 1);
        assert_eq!(app.snapshot.history.len(), 1);
        assert!(!app.snapshot.loading);
    }

    #[tokio::test]
    async fn test_trend_node_cycle_and_scroll() {
        let mut app = seeded_app().await;
        app.sync().await;

        app.cycle_trend_node();
        assert_eq!(app.trend_node.as_deref(), Some("a"));
        app.cycle_trend_node();
        assert_eq!(app.trend_node.as_deref(), Some("b"));
        app.cycle_trend_node();
        assert_eq!(app.trend_node, None);

        app.scroll_down();
        app.scroll_down();
        app.scroll_down();
        assert_eq!(app.table_state.selected(), Some(1));
        app.scroll_up();
        app.scroll_up();
        assert_eq!(app.table_state.selected(), Some(0));
    }
}
