use super::commands::Cli;
use pnode_monitor::config::parse_seed_list;
use pnode_monitor::logging::{init_logging as init_subscriber, LogSettings};
use pnode_monitor::{GeoCache, GossipFetcher, HttpTransport, MonitorConfig, Poller, PnodeStore};
use pnode_types::PnodeResult;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

pub fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(MonitorConfig::default_path)
}

/// Loads the config file (or defaults), then applies env and command-line overrides.
pub fn load_config(cli: &Cli) -> PnodeResult<MonitorConfig> {
    let mut config = MonitorConfig::load(config_path(cli))?;

    if let Some(ref endpoint) = cli.rpc_endpoint {
        config.rpc_endpoint = Some(endpoint.clone());
    }
    if let Some(ref seeds) = cli.seeds {
        config.seeds = parse_seed_list(seeds);
    }

    config.validate()?;
    Ok(config)
}

pub fn init_logging(cli: &Cli, config: &MonitorConfig) -> PnodeResult<()> {
    let settings = LogSettings::from_config(&config.logging, cli.verbose, cli.quiet)
        .with_file(cli.log_file.clone());
    init_subscriber(&settings)
}

pub fn build_poller(config: &MonitorConfig, with_geo: bool) -> PnodeResult<Poller<HttpTransport>> {
    let transport = HttpTransport::new(config.request_timeout())?;
    let fetcher = GossipFetcher::from_config(transport, config);
    let store = Arc::new(RwLock::new(PnodeStore::with_history_window(config.history_window)));
    let poller = Poller::new(fetcher, store);

    if with_geo && config.geo.enabled {
        Ok(poller.with_geo(Arc::new(GeoCache::new(&config.geo))))
    } else {
        Ok(poller)
    }
}

pub fn fmt_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn fmt_fixed(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_else(|| "-".to_string())
}

pub fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let kept: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{}~", kept)
    }
}
