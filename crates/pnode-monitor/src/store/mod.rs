use chrono::{DateTime, Utc};
use pnode_types::{
    round1, NodeStatus, ObservationCounter, UptimeHistorySample, DEFAULT_HISTORY_WINDOW,
    MAX_HISTORY_SAMPLES,
};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;


pub const DEFAULT_FETCH_ERROR: &str = "Failed to fetch pNodes";

/// Externally visible fetch state.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchState {
    pub items: Vec<NodeStatus>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub history_window: usize,
}

impl Default for FetchState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            last_updated: None,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }
}

/// Session-lifetime aggregation of fetch results.
///
/// Every mutation goes through one of the transition methods below. Callers share the
/// store behind `Arc<tokio::sync::RwLock<_>>` and hold the write lock only for the
/// duration of a transition.
#[derive(Clone, Debug, Default)]
pub struct PnodeStore {
    state: FetchState,
    counters: BTreeMap<String, ObservationCounter>,
    history: VecDeque<UptimeHistorySample>,
}

impl PnodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_window(window: usize) -> Self {
        let mut store = Self::default();
        store.state.history_window = window;
        store
    }

    /// Marks a cycle as in flight. Returns `false` without touching anything if one
    /// already is.
    pub fn begin_fetch(&mut self) -> bool {
        if self.state.loading {
            return false;
        }
        self.state.loading = true;
        self.state.error = None;
        true
    }

    pub fn complete_fetch(&mut self, nodes: Vec<NodeStatus>, now: DateTime<Utc>) {
        for node in &nodes {
            self.counters
                .entry(node.id.clone())
                .or_default()
                .record(node.is_online());
        }

        let by_id: BTreeMap<String, f64> = self
            .counters
            .iter()
            .filter_map(|(id, counter)| counter.percent().map(|p| (id.clone(), p)))
            .collect();

        let average_percent = if by_id.is_empty() {
            0.0
        } else {
            round1(by_id.values().sum::<f64>() / by_id.len() as f64)
        };

        self.history.push_back(UptimeHistorySample {
            timestamp: now,
            average_percent,
            by_id,
        });
        while self.history.len() > MAX_HISTORY_SAMPLES {
            self.history.pop_front();
        }

        debug!(
            "Fetch settled: {} nodes, fleet uptime {}%, {} samples",
            nodes.len(),
            average_percent,
            self.history.len()
        );

        self.state.items = nodes;
        self.state.loading = false;
        self.state.last_updated = Some(now);
    }

    pub fn fail_fetch(&mut self, message: Option<String>) {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FETCH_ERROR.to_string());
        self.state.loading = false;
        self.state.error = Some(message);
    }

    pub fn set_history_window(&mut self, window: usize) {
        self.state.history_window = window;
    }

    /// Replaces the node list without recording an observation.
    pub fn replace_items(&mut self, nodes: Vec<NodeStatus>, now: DateTime<Utc>) {
        self.state.items = nodes;
        self.state.last_updated = Some(now);
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.state.error = error;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.state.loading = loading;
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn items(&self) -> &[NodeStatus] {
        &self.state.items
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state.last_updated
    }

    pub fn history_window(&self) -> usize {
        self.state.history_window
    }

    pub fn counters(&self) -> &BTreeMap<String, ObservationCounter> {
        &self.counters
    }

    pub fn counter(&self, id: &str) -> Option<ObservationCounter> {
        self.counters.get(id).copied()
    }

    pub fn history(&self) -> &VecDeque<UptimeHistorySample> {
        &self.history
    }

    pub fn uptime_percent(&self, id: &str) -> Option<f64> {
        self.counters.get(id).and_then(ObservationCounter::percent)
    }
}
