use serde::{Deserialize, Serialize};
use std::fmt;

/// Liveness reported for a pNode in one fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Online,
    Offline,
    #[default]
    Unknown,
}

impl NodeState {
    /// Case-insensitive parse of a raw status string. Anything other than
    /// `online` or `offline` is `Unknown`.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "online" => NodeState::Online,
            "offline" => NodeState::Offline,
            _ => NodeState::Unknown,
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, NodeState::Online)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeState::Online => "online",
            NodeState::Offline => "offline",
            NodeState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical per-node record produced by the normalizer.
///
/// Every telemetry field is optional: `None` means the node did not report
/// it, which is distinct from a reading of zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    pub id: String,
    #[serde(rename = "gossipAddress")]
    pub address: String,
    pub status: NodeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_used_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_total_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_used_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_streams: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packets_received: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packets_sent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_index: Option<u64>,
}

impl NodeStatus {
    pub fn new(id: impl Into<String>, address: impl Into<String>, status: NodeState) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            status,
            ..Default::default()
        }
    }

    pub fn is_online(&self) -> bool {
        self.status.is_online()
    }

    /// Display title, preferring the node index over the id.
    pub fn title(&self) -> String {
        match self.node_index {
            Some(index) => format!("pNode-{}", index),
            None => format!("pNode-{}", self.id),
        }
    }

    /// Uptime in hours with one decimal.
    pub fn uptime_hours(&self) -> Option<f64> {
        self.uptime_seconds
            .map(|secs| crate::round1(secs as f64 / 3600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_parsing() {
        assert_eq!(NodeState::from_raw("online"), NodeState::Online);
        assert_eq!(NodeState::from_raw("ONLINE"), NodeState::Online);
        assert_eq!(NodeState::from_raw(" Offline "), NodeState::Offline);
        assert_eq!(NodeState::from_raw("active"), NodeState::Unknown);
        assert_eq!(NodeState::from_raw(""), NodeState::Unknown);
    }

    #[test]
    fn test_status_serialization() {
        let mut node = NodeStatus::new("7", "http://10.0.0.7:6000", NodeState::Online);
        node.cpu_percent = Some(12.5);

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["gossipAddress"], "http://10.0.0.7:6000");
        assert_eq!(json["status"], "online");
        assert_eq!(json["cpuPercent"], 12.5);
        assert!(json.get("storageGb").is_none());

        let parsed: NodeStatus = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, node);
    }

    #[test]
    fn test_title_and_hours() {
        let mut node = NodeStatus::new("abc", "", NodeState::Unknown);
        assert_eq!(node.title(), "pNode-abc");
        assert_eq!(node.uptime_hours(), None);

        node.node_index = Some(4);
        node.uptime_seconds = Some(5400);
        assert_eq!(node.title(), "pNode-4");
        assert_eq!(node.uptime_hours(), Some(1.5));
    }
}
