//! Read-only projections over a [`PnodeStore`] snapshot: filtering, sorting,
//! history windowing, location text and the aggregates the presentation layers render.

use chrono::{DateTime, Utc};
use pnode_types::{round1, round2, NodeState, NodeStatus, UptimeHistorySample};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::geo::GeoLocation;
use crate::store::PnodeStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Online,
    Offline,
    Unknown,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Online,
        StatusFilter::Offline,
        StatusFilter::Unknown,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "all" => Some(StatusFilter::All),
            "online" => Some(StatusFilter::Online),
            "offline" => Some(StatusFilter::Offline),
            "unknown" => Some(StatusFilter::Unknown),
            _ => None,
        }
    }

    pub fn matches(&self, status: NodeState) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Online => status == NodeState::Online,
            StatusFilter::Offline => status == NodeState::Offline,
            StatusFilter::Unknown => status == NodeState::Unknown,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Online => "online",
            StatusFilter::Offline => "offline",
            StatusFilter::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sortable columns. `None` keeps fetch order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    None,
    Id,
    Status,
    Storage,
    Cpu,
    ObservedUptime,
    UptimeSeconds,
    RamUsed,
    RamTotal,
    RamPercent,
    ActiveStreams,
    PacketsReceived,
    PacketsSent,
    Region,
    Version,
    LastSeen,
    NodeIndex,
}

impl SortKey {
    pub const ALL: [SortKey; 17] = [
        SortKey::None,
        SortKey::Id,
        SortKey::Status,
        SortKey::Storage,
        SortKey::Cpu,
        SortKey::ObservedUptime,
        SortKey::UptimeSeconds,
        SortKey::RamUsed,
        SortKey::RamTotal,
        SortKey::RamPercent,
        SortKey::ActiveStreams,
        SortKey::PacketsReceived,
        SortKey::PacketsSent,
        SortKey::Region,
        SortKey::Version,
        SortKey::LastSeen,
        SortKey::NodeIndex,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase().replace(['-', '_'], "");
        let key = match value.as_str() {
            "" | "none" => SortKey::None,
            "id" => SortKey::Id,
            "status" => SortKey::Status,
            "storage" => SortKey::Storage,
            "cpu" | "perf" => SortKey::Cpu,
            "uptime" => SortKey::ObservedUptime,
            "uptimeseconds" => SortKey::UptimeSeconds,
            "ram" | "ramused" => SortKey::RamUsed,
            "ramtotal" => SortKey::RamTotal,
            "rampercent" => SortKey::RamPercent,
            "streams" | "activestreams" => SortKey::ActiveStreams,
            "packetsreceived" | "rx" => SortKey::PacketsReceived,
            "packetssent" | "tx" => SortKey::PacketsSent,
            "region" => SortKey::Region,
            "version" => SortKey::Version,
            "lastseen" => SortKey::LastSeen,
            "index" | "nodeindex" => SortKey::NodeIndex,
            _ => return None,
        };
        Some(key)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::None => "none",
            SortKey::Id => "id",
            SortKey::Status => "status",
            SortKey::Storage => "storage",
            SortKey::Cpu => "cpu",
            SortKey::ObservedUptime => "uptime",
            SortKey::UptimeSeconds => "uptime-seconds",
            SortKey::RamUsed => "ram-used",
            SortKey::RamTotal => "ram-total",
            SortKey::RamPercent => "ram-percent",
            SortKey::ActiveStreams => "active-streams",
            SortKey::PacketsReceived => "packets-received",
            SortKey::PacketsSent => "packets-sent",
            SortKey::Region => "region",
            SortKey::Version => "version",
            SortKey::LastSeen => "last-seen",
            SortKey::NodeIndex => "node-index",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn value(&self, row: &NodeRow) -> Option<SortValue> {
        let node = &row.node;
        let num = |v: Option<f64>| v.map(SortValue::Num);
        let count = |v: Option<u64>| v.map(|v| SortValue::Num(v as f64));
        let text = |v: &Option<String>| v.as_ref().map(|s| SortValue::Text(s.to_lowercase()));
        match self {
            SortKey::None => None,
            SortKey::Id => Some(SortValue::Text(node.id.to_lowercase())),
            SortKey::Status => Some(SortValue::Text(node.status.as_str().to_string())),
            SortKey::Storage => num(node.storage_gb),
            SortKey::Cpu => num(node.cpu_percent),
            SortKey::ObservedUptime => num(row.uptime_percent),
            SortKey::UptimeSeconds => count(node.uptime_seconds),
            SortKey::RamUsed => num(node.ram_used_gb),
            SortKey::RamTotal => num(node.ram_total_gb),
            SortKey::RamPercent => num(node.ram_used_percent),
            SortKey::ActiveStreams => count(node.active_streams),
            SortKey::PacketsReceived => count(node.packets_received),
            SortKey::PacketsSent => count(node.packets_sent),
            SortKey::Region => text(&node.region),
            SortKey::Version => text(&node.version),
            SortKey::LastSeen => text(&node.last_seen),
            SortKey::NodeIndex => count(node.node_index),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum SortValue {
    Num(f64),
    Text(String),
}

impl SortValue {
    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Num(a), SortValue::Num(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Num(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Num(_)) => Ordering::Greater,
        }
    }
}

/// A node joined with the derived values views show next to it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRow {
    #[serde(flatten)]
    pub node: NodeStatus,
    pub uptime_percent: Option<f64>,
    pub location: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewQuery {
    pub search: String,
    pub status: StatusFilter,
    pub sort_key: SortKey,
    pub order: SortOrder,
}

impl ViewQuery {
    /// Case-insensitive substring match over id, address, version and region.
    pub fn matches_search(&self, node: &NodeStatus) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let hit = |s: &str| s.to_lowercase().contains(&needle);
        hit(node.id.as_str())
            || hit(node.address.as_str())
            || node.version.as_deref().is_some_and(hit)
            || node.region.as_deref().is_some_and(hit)
    }

    pub fn matches(&self, node: &NodeStatus) -> bool {
        self.status.matches(node.status) && self.matches_search(node)
    }

    /// Filters and sorts the store's current items.
    pub fn rows(&self, store: &PnodeStore, locations: &HashMap<String, GeoLocation>) -> Vec<NodeRow> {
        let rows = store
            .items()
            .iter()
            .filter(|node| self.matches(node))
            .map(|node| NodeRow {
                node: node.clone(),
                uptime_percent: store.uptime_percent(&node.id),
                location: locate_text(node, locations.get(&node.id)),
            })
            .collect();
        self.sort(rows)
    }

    /// Stable sort; rows missing the key always go last.
    pub fn sort(&self, mut rows: Vec<NodeRow>) -> Vec<NodeRow> {
        if self.sort_key == SortKey::None {
            return rows;
        }
        let key = self.sort_key;
        let order = self.order;
        rows.sort_by(|a, b| match (key.value(a), key.value(b)) {
            (Some(a), Some(b)) => match order {
                SortOrder::Asc => a.compare(&b),
                SortOrder::Desc => b.compare(&a),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        rows
    }
}

/// The trailing `window` samples, oldest first.
pub fn windowed_history(store: &PnodeStore, window: usize) -> Vec<&UptimeHistorySample> {
    let history = store.history();
    let skip = history.len().saturating_sub(window);
    history.iter().skip(skip).collect()
}

/// Geo lookup label, else the node's reported region.
pub fn locate_text(node: &NodeStatus, location: Option<&GeoLocation>) -> Option<String> {
    location
        .and_then(GeoLocation::label)
        .or_else(|| node.region.clone())
}

/// Uptime trend points for the fleet average (`node_id == None`) or a single node.
/// Samples taken before the node was first seen read as 0.
pub fn trend_series(samples: &[&UptimeHistorySample], node_id: Option<&str>) -> Vec<(DateTime<Utc>, f64)> {
    samples
        .iter()
        .map(|sample| {
            let value = match node_id {
                Some(id) => sample.percent_for(id).unwrap_or(0.0),
                None => sample.average_percent,
            };
            (sample.timestamp, value)
        })
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
    pub unknown: usize,
    pub total_storage_gb: f64,
    pub avg_storage_gb: f64,
    pub avg_cpu_percent: Option<f64>,
    pub fleet_uptime_percent: Option<f64>,
}

impl OverviewStats {
    pub fn from_nodes(nodes: &[NodeStatus]) -> Self {
        let mut stats = Self {
            total: nodes.len(),
            ..Self::default()
        };

        for node in nodes {
            match node.status {
                NodeState::Online => stats.online += 1,
                NodeState::Offline => stats.offline += 1,
                NodeState::Unknown => stats.unknown += 1,
            }
        }

        let storage: Vec<f64> = nodes.iter().filter_map(|n| n.storage_gb).collect();
        if !storage.is_empty() {
            let sum: f64 = storage.iter().sum();
            stats.total_storage_gb = round1(sum);
            stats.avg_storage_gb = round1(sum / storage.len() as f64);
        }

        let cpu: Vec<f64> = nodes.iter().filter_map(|n| n.cpu_percent).collect();
        if !cpu.is_empty() {
            stats.avg_cpu_percent = Some(round2(cpu.iter().sum::<f64>() / cpu.len() as f64));
        }

        stats
    }

    pub fn from_store(store: &PnodeStore) -> Self {
        let mut stats = Self::from_nodes(store.items());
        stats.fleet_uptime_percent = store.history().back().map(|s| s.average_percent);
        stats
    }
}

/// Per-node resource chart selections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChartMode {
    #[default]
    CpuRam,
    RamStack,
    RamPercent,
    UptimeTrend,
    Storage,
}

impl ChartMode {
    pub const ALL: [ChartMode; 5] = [
        ChartMode::CpuRam,
        ChartMode::RamStack,
        ChartMode::RamPercent,
        ChartMode::UptimeTrend,
        ChartMode::Storage,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartMode::CpuRam => "CPU and RAM by Node",
            ChartMode::RamStack => "RAM Used vs Free",
            ChartMode::RamPercent => "RAM Used % by Node",
            ChartMode::UptimeTrend => "Uptime % Trend",
            ChartMode::Storage => "Storage by Node",
        }
    }
}

/// One bar group of a per-node resource chart. Missing readings chart as 0.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourcePoint {
    pub name: String,
    pub values: Vec<(&'static str, f64)>,
}

pub fn resource_series(nodes: &[NodeStatus], mode: ChartMode) -> Vec<ResourcePoint> {
    nodes
        .iter()
        .map(|n| {
            let values = match mode {
                ChartMode::CpuRam => vec![
                    ("cpu", round2(n.cpu_percent.unwrap_or(0.0))),
                    ("ram", round2(n.ram_used_gb.unwrap_or(0.0))),
                ],
                ChartMode::RamStack => {
                    let used = round2(n.ram_used_gb.unwrap_or(0.0));
                    let total = round2(n.ram_total_gb.unwrap_or(0.0));
                    let free = if total > used { round2(total - used) } else { 0.0 };
                    vec![("used", used), ("free", free)]
                }
                ChartMode::RamPercent => vec![("ram %", round1(n.ram_used_percent.unwrap_or(0.0)))],
                ChartMode::Storage | ChartMode::UptimeTrend => {
                    vec![("storage", round2(n.storage_gb.unwrap_or(0.0)))]
                }
            };
            ResourcePoint {
                name: n.id.clone(),
                values,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn node(id: &str, status: NodeState) -> NodeStatus {
        NodeStatus::new(id, format!("http://{}:6000", id), status)
    }

    fn store_with(nodes: Vec<NodeStatus>) -> PnodeStore {
        let mut store = PnodeStore::new();
        store.begin_fetch();
        store.complete_fetch(nodes, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        store
    }

    fn ids(rows: &[NodeRow]) -> Vec<&str> {
        rows.iter().map(|r| r.node.id.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let mut a = node("alpha", NodeState::Online);
        a.version = Some("0.8.1".into());
        let mut b = node("beta", NodeState::Online);
        b.region = Some("EU-West".into());

        let query = ViewQuery { search: "eu-w".into(), ..ViewQuery::default() };
        assert!(!query.matches(&a));
        assert!(query.matches(&b));

        let query = ViewQuery { search: "0.8".into(), ..ViewQuery::default() };
        assert!(query.matches(&a));

        let query = ViewQuery { search: "ALPHA:6000".into(), ..ViewQuery::default() };
        assert!(query.matches(&a));

        let query = ViewQuery { search: "   ".into(), ..ViewQuery::default() };
        assert!(query.matches(&a) && query.matches(&b));
    }

    #[test]
    fn test_status_filter() {
        let store = store_with(vec![
            node("a", NodeState::Online),
            node("b", NodeState::Offline),
            node("c", NodeState::Unknown),
        ]);
        let query = ViewQuery { status: StatusFilter::Offline, ..ViewQuery::default() };
        assert_eq!(ids(&query.rows(&store, &HashMap::new())), vec!["b"]);

        let query = ViewQuery::default();
        assert_eq!(ids(&query.rows(&store, &HashMap::new())), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_absent_values_last_in_both_orders() {
        let mut a = node("a", NodeState::Online);
        a.storage_gb = Some(2.0);
        let b = node("b", NodeState::Online);
        let mut c = node("c", NodeState::Online);
        c.storage_gb = Some(9.5);
        let store = store_with(vec![a, b, c]);

        let mut query = ViewQuery { sort_key: SortKey::Storage, ..ViewQuery::default() };
        assert_eq!(ids(&query.rows(&store, &HashMap::new())), vec!["a", "c", "b"]);

        query.order = SortOrder::Desc;
        assert_eq!(ids(&query.rows(&store, &HashMap::new())), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_sort_by_observed_uptime() {
        let mut store = PnodeStore::new();
        let t = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        store.begin_fetch();
        store.complete_fetch(vec![node("a", NodeState::Online), node("b", NodeState::Offline)], t);
        // c has never been observed
        store.replace_items(
            vec![
                node("c", NodeState::Online),
                node("b", NodeState::Offline),
                node("a", NodeState::Online),
            ],
            t,
        );

        let query = ViewQuery {
            sort_key: SortKey::ObservedUptime,
            order: SortOrder::Desc,
            ..ViewQuery::default()
        };
        let rows = query.rows(&store, &HashMap::new());
        assert_eq!(ids(&rows), vec!["a", "b", "c"]);
        assert_eq!(rows[0].uptime_percent, Some(100.0));
        assert_eq!(rows[2].uptime_percent, None);
    }

    #[test]
    fn test_unsorted_keeps_fetch_order() {
        let store = store_with(vec![node("z", NodeState::Online), node("a", NodeState::Online)]);
        let query = ViewQuery { order: SortOrder::Desc, ..ViewQuery::default() };
        assert_eq!(ids(&query.rows(&store, &HashMap::new())), vec!["z", "a"]);
    }

    #[test]
    fn test_windowed_history() {
        let mut store = PnodeStore::new();
        for i in 0..40 {
            store.begin_fetch();
            store.complete_fetch(vec![], Utc.timestamp_opt(1_700_000_000 + i, 0).unwrap());
        }
        let window = windowed_history(&store, 15);
        assert_eq!(window.len(), 15);
        assert_eq!(window[0].timestamp, Utc.timestamp_opt(1_700_000_025, 0).unwrap());
        assert_eq!(windowed_history(&store, 60).len(), 40);
        assert!(windowed_history(&store, 0).is_empty());
    }

    #[test]
    fn test_trend_series() {
        let mut store = PnodeStore::new();
        let t = |s: i64| Utc.timestamp_opt(1_700_000_000 + s, 0).unwrap();
        store.begin_fetch();
        store.complete_fetch(vec![node("a", NodeState::Online)], t(0));
        store.begin_fetch();
        store.complete_fetch(vec![node("a", NodeState::Offline), node("b", NodeState::Online)], t(30));

        let window = windowed_history(&store, 30);
        let fleet: Vec<f64> = trend_series(&window, None).into_iter().map(|(_, v)| v).collect();
        assert_eq!(fleet, vec![100.0, 75.0]);

        let b: Vec<f64> = trend_series(&window, Some("b")).into_iter().map(|(_, v)| v).collect();
        assert_eq!(b, vec![0.0, 100.0]);
    }

    #[test]
    fn test_locate_text() {
        let mut n = node("a", NodeState::Online);
        assert_eq!(locate_text(&n, None), None);

        n.region = Some("us-east".into());
        assert_eq!(locate_text(&n, None).as_deref(), Some("us-east"));

        let loc = GeoLocation {
            lat: None,
            lon: None,
            city: Some("Paris".into()),
            country: Some("France".into()),
            country_code: Some("FR".into()),
        };
        assert_eq!(locate_text(&n, Some(&loc)).as_deref(), Some("Paris, FR"));
    }

    #[test]
    fn test_overview_stats() {
        let mut a = node("a", NodeState::Online);
        a.storage_gb = Some(1.5);
        a.cpu_percent = Some(10.0);
        let mut b = node("b", NodeState::Offline);
        b.storage_gb = Some(2.0);
        let c = node("c", NodeState::Unknown);

        let stats = OverviewStats::from_nodes(&[a, b, c]);
        assert_eq!(stats.total, 3);
        assert_eq!((stats.online, stats.offline, stats.unknown), (1, 1, 1));
        assert_eq!(stats.total_storage_gb, 3.5);
        assert_eq!(stats.avg_storage_gb, 1.8);
        assert_eq!(stats.avg_cpu_percent, Some(10.0));

        let empty = OverviewStats::from_nodes(&[]);
        assert_eq!(empty.avg_storage_gb, 0.0);
        assert_eq!(empty.avg_cpu_percent, None);
    }

    #[test]
    fn test_resource_series_ram_stack() {
        let mut a = node("a", NodeState::Online);
        a.ram_used_gb = Some(3.0);
        a.ram_total_gb = Some(8.0);
        let mut b = node("b", NodeState::Online);
        b.ram_used_gb = Some(9.0);
        b.ram_total_gb = Some(8.0);

        let series = resource_series(&[a, b], ChartMode::RamStack);
        assert_eq!(series[0].values, vec![("used", 3.0), ("free", 5.0)]);
        assert_eq!(series[1].values, vec![("used", 9.0), ("free", 0.0)]);
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!(SortKey::parse("perf"), Some(SortKey::Cpu));
        assert_eq!(SortKey::parse("ram_percent"), Some(SortKey::RamPercent));
        assert_eq!(SortKey::parse("bogus"), None);
        assert_eq!(StatusFilter::parse("OFFLINE"), Some(StatusFilter::Offline));
        assert_eq!(StatusFilter::Unknown.next(), StatusFilter::All);
        assert_eq!(SortKey::NodeIndex.next(), SortKey::None);
        for key in SortKey::ALL {
            assert_eq!(SortKey::parse(key.as_str()), Some(key));
        }
    }
}
