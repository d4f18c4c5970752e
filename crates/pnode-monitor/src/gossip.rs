use futures::future::join_all;
use pnode_types::{NodeStatus, PnodeError, PnodeResult};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::normalize::{normalize_batch, NormalizeContext, RawRecord};
use crate::rpc::{
    JsonRpcRequest, RpcTransport, METHOD_GET_STATS, METHOD_GET_VERSION, METHOD_GOSSIP_NODES,
};

/// A statically configured fallback host and the RPC endpoint derived for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedHost {
    pub ip: String,
    pub endpoint: String,
}

impl SeedHost {
    pub fn new(ip: &str, port: u16, path: &str) -> Self {
        Self {
            ip: ip.to_string(),
            endpoint: format!("http://{}:{}{}", ip, port, path),
        }
    }
}

pub struct GossipFetcher<T: RpcTransport> {
    transport: T,
    gossip_endpoint: String,
    seeds: Vec<SeedHost>,
    context: NormalizeContext,
    next_id: AtomicU64,
}

impl<T: RpcTransport> GossipFetcher<T> {
    pub fn new(transport: T, gossip_endpoint: String, seeds: Vec<SeedHost>, seed_rpc_port: u16) -> Self {
        let context = NormalizeContext::new(gossip_endpoint.clone(), seed_rpc_port);
        Self {
            transport,
            gossip_endpoint,
            seeds,
            context,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn from_config(transport: T, config: &MonitorConfig) -> Self {
        let seeds = config
            .seeds
            .iter()
            .map(|ip| SeedHost::new(ip, config.seed_rpc_port, &config.seed_rpc_path))
            .collect();
        Self::new(transport, config.resolved_rpc_endpoint(), seeds, config.seed_rpc_port)
    }

    pub fn gossip_endpoint(&self) -> &str {
        &self.gossip_endpoint
    }

    pub fn seeds(&self) -> &[SeedHost] {
        &self.seeds
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches and normalizes the current fleet.
    pub async fn fetch_nodes(&self) -> PnodeResult<Vec<NodeStatus>> {
        let records = self.fetch_raw().await?;
        let nodes = normalize_batch(records, &self.context);
        debug!("Normalized {} pNode records", nodes.len());
        Ok(nodes)
    }

    /// Queries the gossip endpoint, falling back to the seed hosts when it fails.
    pub async fn fetch_raw(&self) -> PnodeResult<Vec<RawRecord>> {
        match self.call(&self.gossip_endpoint, METHOD_GOSSIP_NODES).await {
            Ok(result) => Ok(records_from_result(result)),
            Err(e) => {
                warn!("Gossip endpoint {} failed: {}", self.gossip_endpoint, e);
                if self.seeds.is_empty() {
                    return Err(PnodeError::NoSources(e.to_string()));
                }
                info!("Falling back to {} seed hosts", self.seeds.len());
                Ok(self.fetch_from_seeds().await)
            }
        }
    }

    /// Queries every seed concurrently and waits for all of them to settle.
    pub async fn fetch_from_seeds(&self) -> Vec<RawRecord> {
        join_all(self.seeds.iter().map(|seed| self.fetch_seed(seed))).await
    }

    async fn fetch_seed(&self, seed: &SeedHost) -> RawRecord {
        let (stats, version) = tokio::join!(
            self.call(&seed.endpoint, METHOD_GET_STATS),
            self.call(&seed.endpoint, METHOD_GET_VERSION),
        );

        if let Err(e) = &stats {
            debug!("Seed {} get-stats failed: {}", seed.ip, e);
        }
        if let Err(e) = &version {
            debug!("Seed {} get-version failed: {}", seed.ip, e);
        }

        merge_seed_results(&seed.ip, stats, version)
    }

    async fn call(&self, endpoint: &str, method: &str) -> PnodeResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method);
        self.transport.call(endpoint, &request).await
    }
}

/// Combines one seed's stats and version outcomes into a single raw record.
pub fn merge_seed_results(
    ip: &str,
    stats: PnodeResult<Value>,
    version: PnodeResult<Value>,
) -> RawRecord {
    let version_ok = version.is_ok();
    let version = version.ok().and_then(|v| version_string(&v));

    match stats {
        Ok(value) => {
            let mut fields = match value {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            match version {
                Some(v) => {
                    fields.insert("version".to_string(), Value::String(v));
                }
                None => {
                    fields.remove("version");
                }
            }
            RawRecord::from_seed(ip, fields)
        }
        Err(_) if version_ok => {
            let mut fields = Map::new();
            if let Some(v) = version {
                fields.insert("version".to_string(), Value::String(v));
            }
            RawRecord::from_seed(ip, fields)
        }
        Err(_) => {
            let mut fields = Map::new();
            fields.insert("offline".to_string(), Value::Bool(true));
            RawRecord::from_seed(ip, fields)
        }
    }
}

fn version_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("version").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn records_from_result(result: Value) -> Vec<RawRecord> {
    let values = match result {
        Value::Array(items) => items,
        other => vec![other],
    };

    values
        .into_iter()
        .filter_map(|value| {
            let record = RawRecord::from_value(value);
            if record.is_none() {
                warn!("Skipping non-object entry in gossip result");
            }
            record
        })
        .collect()
}
