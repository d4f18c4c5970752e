//! Conversion of raw JSON-RPC node payloads into canonical [`NodeStatus`] records.
//!
//! Two wire shapes exist: the per-node `get-stats` payload (snake_case byte
//! counters) and the generic gossip record (camelCase, already close to the
//! canonical form). [`RawNode::classify`] decides once which one a record is;
//! nothing downstream of this module looks at raw JSON again.

use chrono::{DateTime, SecondsFormat};
use pnode_types::{bytes_to_gb, round1, round2, NodeState, NodeStatus};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::warn;

const SYNTHETIC_ID_PREFIX: &str = "unidentified";

/// One raw record as delivered by the fetcher, plus the seed IP it came from
/// when it was gathered through the seed fallback.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawRecord {
    pub source_ip: Option<String>,
    pub fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { source_ip: None, fields }
    }

    pub fn from_seed(ip: &str, fields: Map<String, Value>) -> Self {
        Self {
            source_ip: Some(ip.to_string()),
            fields,
        }
    }

    /// Wraps a JSON object. Non-object values carry no record and yield `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self::new(fields)),
            _ => None,
        }
    }
}

/// A raw record tagged with its detected wire shape.
#[derive(Clone, Debug, PartialEq)]
pub enum RawNode {
    Stats(RawRecord),
    Generic(RawRecord),
}

impl RawNode {
    /// A record carrying `cpu_percent` or `uptime` is a stats payload.
    pub fn classify(record: RawRecord) -> Self {
        if record.fields.contains_key("cpu_percent") || record.fields.contains_key("uptime") {
            RawNode::Stats(record)
        } else {
            RawNode::Generic(record)
        }
    }

    /// `position` is the record's index in its batch and only feeds the
    /// synthetic id of records that carry no identity at all.
    pub fn normalize(&self, position: usize, ctx: &NormalizeContext) -> NodeStatus {
        match self {
            RawNode::Stats(record) => normalize_stats(record, position, ctx),
            RawNode::Generic(record) => normalize_generic(record, position, ctx),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NormalizeContext {
    /// Address given to stats records that have no source IP.
    pub gossip_endpoint: String,
    pub seed_rpc_port: u16,
}

impl NormalizeContext {
    pub fn new(gossip_endpoint: impl Into<String>, seed_rpc_port: u16) -> Self {
        Self {
            gossip_endpoint: gossip_endpoint.into(),
            seed_rpc_port,
        }
    }

    fn seed_address(&self, ip: &str) -> String {
        format!("http://{}:{}", ip, self.seed_rpc_port)
    }
}

/// Normalizes a fetched batch, keeping the first record for any repeated id.
pub fn normalize_batch(records: Vec<RawRecord>, ctx: &NormalizeContext) -> Vec<NodeStatus> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::with_capacity(records.len());

    for (position, record) in records.into_iter().enumerate() {
        let node = RawNode::classify(record).normalize(position, ctx);
        if !seen.insert(node.id.clone()) {
            warn!("Dropping duplicate pNode record for id {}", node.id);
            continue;
        }
        nodes.push(node);
    }

    nodes
}

fn synthetic_id(position: usize) -> String {
    format!("{}-{}", SYNTHETIC_ID_PREFIX, position)
}

fn normalize_stats(record: &RawRecord, position: usize, ctx: &NormalizeContext) -> NodeStatus {
    let f = &record.fields;

    let id = identity(f, "current_index")
        .or_else(|| record.source_ip.clone())
        .unwrap_or_else(|| synthetic_id(position));
    let address = match &record.source_ip {
        Some(ip) => ctx.seed_address(ip),
        None => ctx.gossip_endpoint.clone(),
    };

    let ram_used = number(f, "ram_used");
    let ram_total = number(f, "ram_total");
    let ram_used_percent = match (ram_used, ram_total) {
        (Some(used), Some(total)) if total > 0.0 => Some(round1(used / total * 100.0)),
        _ => None,
    };

    NodeStatus {
        id,
        address,
        status: NodeState::Online,
        storage_gb: number(f, "file_size").map(bytes_to_gb),
        region: None,
        version: text(f, "version"),
        last_seen: number(f, "last_updated").and_then(epoch_to_iso),
        cpu_percent: number(f, "cpu_percent").map(round2),
        ram_used_gb: ram_used.map(bytes_to_gb),
        ram_total_gb: ram_total.map(bytes_to_gb),
        ram_used_percent,
        uptime_seconds: unsigned(f, "uptime"),
        active_streams: unsigned(f, "active_streams"),
        packets_received: unsigned(f, "packets_received"),
        packets_sent: unsigned(f, "packets_sent"),
        total_bytes: unsigned(f, "total_bytes"),
        total_pages: unsigned(f, "total_pages"),
        node_index: unsigned(f, "current_index"),
    }
}

fn normalize_generic(record: &RawRecord, position: usize, ctx: &NormalizeContext) -> NodeStatus {
    let f = &record.fields;

    let id = identity(f, "id")
        .or_else(|| identity(f, "nodeId"))
        .or_else(|| record.source_ip.clone())
        .unwrap_or_else(|| synthetic_id(position));
    let address = match &record.source_ip {
        Some(ip) => ctx.seed_address(ip),
        None => text(f, "gossipAddress")
            .or_else(|| text(f, "address"))
            .or_else(|| text(f, "addr"))
            .unwrap_or_default(),
    };
    let status = if offline_marker(f) {
        NodeState::Offline
    } else {
        text(f, "status")
            .map(|s| NodeState::from_raw(&s))
            .unwrap_or(NodeState::Unknown)
    };

    NodeStatus {
        id,
        address,
        status,
        storage_gb: number(f, "storageGb"),
        region: text(f, "region"),
        version: text(f, "version"),
        last_seen: text(f, "lastSeen"),
        cpu_percent: number(f, "cpuPercent"),
        ram_used_gb: number(f, "ramUsedGb"),
        ram_total_gb: number(f, "ramTotalGb"),
        ram_used_percent: number(f, "ramUsedPercent"),
        uptime_seconds: unsigned(f, "uptimeSeconds"),
        active_streams: unsigned(f, "activeStreams"),
        packets_received: unsigned(f, "packetsReceived"),
        packets_sent: unsigned(f, "packetsSent"),
        total_bytes: unsigned(f, "totalBytes"),
        total_pages: unsigned(f, "totalPages"),
        node_index: unsigned(f, "nodeIndex"),
    }
}

/// Only a literal `true` marks a node offline.
fn offline_marker(fields: &Map<String, Value>) -> bool {
    matches!(fields.get("offline"), Some(Value::Bool(true)))
}

fn identity(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key)?.as_str().map(str::to_string)
}

fn number(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    fields.get(key)?.as_f64().filter(|v| v.is_finite())
}

/// Counters may arrive float-encoded; fractions are truncated.
fn unsigned(fields: &Map<String, Value>, key: &str) -> Option<u64> {
    let value = fields.get(key)?;
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.trunc() as u64)
    })
}

fn epoch_to_iso(secs: f64) -> Option<String> {
    let millis = (secs * 1000.0).round() as i64;
    DateTime::from_timestamp_millis(millis).map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
}
