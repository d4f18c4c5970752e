mod common;

use common::{start, GossipReply};
use pnode_monitor::{GeoCache, GeoConfig};
use pnode_types::{NodeState, NodeStatus};
use serde_json::json;
use std::time::Duration;

const HOST: &str = "173.212.203.145";

fn geo_cache(endpoint: String) -> GeoCache {
    GeoCache::new(&GeoConfig {
        enabled: true,
        endpoint,
        timeout_secs: 2,
    })
}

#[tokio::test]
async fn test_failed_lookup_is_not_retried_until_backoff_expires() {
    let Some(server) = start(GossipReply::Nodes(json!([])), None, None).await else {
        return;
    };
    let cache = geo_cache(server.geo_url());

    assert_eq!(cache.lookup(HOST).await, None);
    assert!(cache.is_backing_off(HOST).await);
    assert_eq!(cache.lookup(HOST).await, None);
    assert_eq!(server.geo_hosts(), vec![HOST.to_string()]);

    let nodes = vec![NodeStatus::new("a", format!("http://{}:6000", HOST), NodeState::Online)];
    assert!(cache.locate_all(&nodes).await.is_empty());
    assert_eq!(server.geo_hosts().len(), 1);
}

#[tokio::test]
async fn test_retry_after_backoff_and_absent_coordinates() {
    let Some(server) = start(GossipReply::Nodes(json!([])), None, None).await else {
        return;
    };
    let cache = geo_cache(server.geo_url()).with_retry_after(Duration::ZERO);

    assert_eq!(cache.lookup(HOST).await, None);

    server.set_geo(json!({ "status": "success", "city": "Nuremberg", "countryCode": "DE" }));
    let loc = cache.lookup(HOST).await.expect("second lookup should resolve");
    assert_eq!(loc.lat, None);
    assert_eq!(loc.lon, None);
    assert_eq!(loc.label().as_deref(), Some("Nuremberg, DE"));
    assert!(!cache.is_backing_off(HOST).await);

    // served from cache from here on
    assert_eq!(cache.lookup(HOST).await, Some(loc));
    assert_eq!(server.geo_hosts().len(), 2);
}
