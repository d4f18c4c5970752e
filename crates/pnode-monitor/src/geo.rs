use futures::future::join_all;
use pnode_types::NodeStatus;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::GeoConfig;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

impl GeoLocation {
    /// Short display form, `City, CC` or whatever part is known.
    pub fn label(&self) -> Option<String> {
        let place = self.city.as_deref().or(self.country.as_deref());
        match (place, self.country_code.as_deref()) {
            (Some(place), Some(code)) => Some(format!("{}, {}", place, code)),
            (Some(place), None) => Some(place.to_string()),
            (None, Some(code)) => Some(code.to_string()),
            (None, None) => None,
        }
    }
}

/// Failed hosts are not retried before this elapses.
pub const GEO_RETRY_AFTER: Duration = Duration::from_secs(600);

/// Cached ip-api.com lookups keyed by host.
pub struct GeoCache {
    cache: Arc<RwLock<HashMap<String, GeoLocation>>>,
    failures: Arc<RwLock<HashMap<String, Instant>>>,
    client: reqwest::Client,
    endpoint: String,
    enabled: bool,
    retry_after: Duration,
}

impl GeoCache {
    pub fn new(config: &GeoConfig) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            enabled: config.enabled,
            retry_after: GEO_RETRY_AFTER,
        }
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = retry_after;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pulls the host out of a node address (`http://1.2.3.4:6000`, `1.2.3.4:6000` or a bare host).
    pub fn extract_host(address: &str) -> Option<String> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }

        if let Ok(url) = Url::parse(address) {
            if let Some(host) = url.host_str() {
                return Some(host.trim_matches(|c| c == '[' || c == ']').to_string());
            }
        }

        if let Ok(ip) = address.parse::<IpAddr>() {
            return Some(ip.to_string());
        }

        let host = address.split('/').next().unwrap_or(address);
        let host = host.rsplit_once(':').map(|(h, _)| h).unwrap_or(host);
        if host.is_empty() {
            None
        } else {
            Some(host.to_string())
        }
    }

    pub fn is_private_host(host: &str) -> bool {
        if host.eq_ignore_ascii_case("localhost") {
            return true;
        }
        match host.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) => {
                ip.is_private() || ip.is_loopback() || ip.is_unspecified() || ip.is_link_local()
            }
            Ok(IpAddr::V6(ip)) => ip.is_loopback() || ip.is_unspecified(),
            Err(_) => false,
        }
    }

    pub async fn cached(&self, host: &str) -> Option<GeoLocation> {
        self.cache.read().await.get(host).cloned()
    }

    /// True while a recent failed lookup for `host` suppresses retries.
    pub async fn is_backing_off(&self, host: &str) -> bool {
        match self.failures.read().await.get(host) {
            Some(failed_at) => failed_at.elapsed() < self.retry_after,
            None => false,
        }
    }

    async fn record_failure(&self, host: &str) {
        self.failures.write().await.insert(host.to_string(), Instant::now());
    }

    pub async fn lookup(&self, host: &str) -> Option<GeoLocation> {
        if let Some(loc) = self.cached(host).await {
            return Some(loc);
        }

        if !self.enabled || Self::is_private_host(host) || self.is_backing_off(host).await {
            return None;
        }

        let loc = self.fetch(host).await;
        match loc {
            Some(ref loc) => {
                self.failures.write().await.remove(host);
                self.cache.write().await.insert(host.to_string(), loc.clone());
                debug!("Geo lookup for {}: {:?}", host, loc.label());
            }
            None => self.record_failure(host).await,
        }
        loc
    }

    async fn fetch(&self, host: &str) -> Option<GeoLocation> {

        let url = format!(
            "{}/{}?fields=status,lat,lon,city,country,countryCode",
            self.endpoint, host
        );

        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Geo lookup failed for {}: {}", host, e);
                return None;
            }
        };

        let data = match resp.json::<IpApiResponse>().await {
            Ok(data) => data,
            Err(e) => {
                warn!("Geo lookup for {} returned an unreadable body: {}", host, e);
                return None;
            }
        };

        if data.status != "success" {
            debug!("Geo lookup for {} returned status {}", host, data.status);
            return None;
        }

        Some(GeoLocation {
            lat: data.lat,
            lon: data.lon,
            city: data.city,
            country: data.country,
            country_code: data.country_code,
        })
    }

    pub async fn lookup_node(&self, node: &NodeStatus) -> Option<GeoLocation> {
        let host = Self::extract_host(&node.address)?;
        self.lookup(&host).await
    }

    /// Looks up every node concurrently, returning the hits keyed by node id.
    pub async fn locate_all(&self, nodes: &[NodeStatus]) -> HashMap<String, GeoLocation> {
        let lookups = nodes.iter().map(|node| async move {
            self.lookup_node(node).await.map(|loc| (node.id.clone(), loc))
        });
        join_all(lookups).await.into_iter().flatten().collect()
    }

    /// Cache-only resolution for rendering; never touches the network.
    pub async fn locations_for(&self, nodes: &[NodeStatus]) -> HashMap<String, GeoLocation> {
        let cache = self.cache.read().await;
        nodes
            .iter()
            .filter_map(|node| {
                let host = Self::extract_host(&node.address)?;
                cache.get(&host).map(|loc| (node.id.clone(), loc.clone()))
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    country: Option<String>,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
}

impl Default for GeoCache {
    fn default() -> Self {
        Self::new(&GeoConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnode_types::NodeState;

    #[test]
    fn test_extract_host() {
        assert_eq!(GeoCache::extract_host("http://1.2.3.4:6000").as_deref(), Some("1.2.3.4"));
        assert_eq!(GeoCache::extract_host("https://node.example/rpc").as_deref(), Some("node.example"));
        assert_eq!(GeoCache::extract_host("1.2.3.4:9001").as_deref(), Some("1.2.3.4"));
        assert_eq!(GeoCache::extract_host("1.2.3.4").as_deref(), Some("1.2.3.4"));
        assert_eq!(GeoCache::extract_host("http://[::1]:6000").as_deref(), Some("::1"));
        assert_eq!(GeoCache::extract_host("  "), None);
    }

    #[test]
    fn test_private_hosts() {
        assert!(GeoCache::is_private_host("127.0.0.1"));
        assert!(GeoCache::is_private_host("10.1.2.3"));
        assert!(GeoCache::is_private_host("192.168.0.10"));
        assert!(GeoCache::is_private_host("172.16.0.1"));
        assert!(GeoCache::is_private_host("0.0.0.0"));
        assert!(GeoCache::is_private_host("localhost"));
        assert!(GeoCache::is_private_host("::1"));
        assert!(!GeoCache::is_private_host("173.212.203.145"));
        assert!(!GeoCache::is_private_host("172.32.0.1"));
        assert!(!GeoCache::is_private_host("node.example"));
    }

    #[test]
    fn test_label() {
        let loc = GeoLocation {
            lat: Some(48.1),
            lon: Some(11.6),
            city: Some("Munich".into()),
            country: Some("Germany".into()),
            country_code: Some("DE".into()),
        };
        assert_eq!(loc.label().as_deref(), Some("Munich, DE"));

        let loc = GeoLocation { city: None, ..loc };
        assert_eq!(loc.label().as_deref(), Some("Germany, DE"));

        let loc = GeoLocation { country: None, country_code: None, ..loc };
        assert_eq!(loc.label(), None);
    }

    #[tokio::test]
    async fn test_private_and_disabled_skip_network() {
        let cache = GeoCache::default();
        assert_eq!(cache.lookup("127.0.0.1").await, None);

        let disabled = GeoCache::new(&GeoConfig {
            enabled: false,
            ..GeoConfig::default()
        });
        assert!(!disabled.is_enabled());
        assert_eq!(disabled.lookup("173.212.203.145").await, None);

        let nodes = vec![NodeStatus::new("a", "http://10.0.0.1:6000", NodeState::Online)];
        assert!(disabled.locate_all(&nodes).await.is_empty());
        assert!(disabled.locations_for(&nodes).await.is_empty());
    }
}
