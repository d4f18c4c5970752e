use chrono::Utc;
use pnode_types::NodeStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};
use tracing::{debug, info, warn};

use crate::geo::GeoCache;
use crate::gossip::GossipFetcher;
use crate::rpc::RpcTransport;
use crate::store::PnodeStore;

/// Result of one fetch cycle.
#[derive(Clone, Debug, PartialEq)]
pub enum CycleOutcome {
    /// Another cycle was already in flight.
    Skipped,
    Settled { nodes: Vec<NodeStatus> },
    Failed { message: String },
}

impl CycleOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, CycleOutcome::Settled { .. })
    }
}

/// Drives fetch cycles against a shared store.
pub struct Poller<T: RpcTransport> {
    fetcher: Arc<GossipFetcher<T>>,
    store: Arc<RwLock<PnodeStore>>,
    geo: Option<Arc<GeoCache>>,
    refresh: Arc<Notify>,
}

impl<T: RpcTransport> Clone for Poller<T> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            store: self.store.clone(),
            geo: self.geo.clone(),
            refresh: self.refresh.clone(),
        }
    }
}

impl<T: RpcTransport + 'static> Poller<T> {
    pub fn new(fetcher: GossipFetcher<T>, store: Arc<RwLock<PnodeStore>>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            store,
            geo: None,
            refresh: Arc::new(Notify::new()),
        }
    }

    pub fn with_geo(mut self, geo: Arc<GeoCache>) -> Self {
        self.geo = Some(geo);
        self
    }

    pub fn store(&self) -> Arc<RwLock<PnodeStore>> {
        self.store.clone()
    }

    pub fn fetcher(&self) -> &GossipFetcher<T> {
        &self.fetcher
    }

    pub fn geo(&self) -> Option<Arc<GeoCache>> {
        self.geo.clone()
    }

    /// Wakes a running [`Poller::run`] loop for an immediate cycle.
    pub fn request_refresh(&self) {
        self.refresh.notify_one();
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        if !self.store.write().await.begin_fetch() {
            debug!("Fetch already in flight, skipping cycle");
            return CycleOutcome::Skipped;
        }

        match self.fetcher.fetch_nodes().await {
            Ok(nodes) => {
                {
                    let mut store = self.store.write().await;
                    store.complete_fetch(nodes.clone(), Utc::now());
                    info!(
                        "Fetch cycle settled: {} pNodes, {} samples",
                        nodes.len(),
                        store.history().len()
                    );
                }

                if let Some(ref geo) = self.geo {
                    if geo.is_enabled() {
                        let located = geo.locate_all(&nodes).await;
                        debug!("Located {}/{} pNodes", located.len(), nodes.len());
                    }
                }

                CycleOutcome::Settled { nodes }
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Fetch cycle failed: {}", message);
                self.store.write().await.fail_fetch(Some(message.clone()));
                CycleOutcome::Failed { message }
            }
        }
    }

    /// Runs a cycle immediately, then on every tick or refresh request until `shutdown` is set.
    pub async fn run(&self, interval: Duration, shutdown: Arc<AtomicBool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!("Poller started with {:?} interval", interval);

        loop {
            if shutdown.load(Ordering::SeqCst) {
                info!("Poller shutting down");
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.refresh.notified() => {
                    debug!("Manual refresh requested");
                }
                _ = tokio::time::sleep(Duration::from_millis(250)) => continue,
            }

            if shutdown.load(Ordering::SeqCst) {
                continue;
            }

            self.run_cycle().await;
        }
    }

    /// Spawns [`Poller::run`] on the current runtime.
    pub fn spawn(&self, interval: Duration, shutdown: Arc<AtomicBool>) -> tokio::task::JoinHandle<()> {
        let poller = self.clone();
        tokio::spawn(async move { poller.run(interval, shutdown).await })
    }
}
