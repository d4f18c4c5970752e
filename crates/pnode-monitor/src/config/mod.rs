mod constants;
mod geo;
mod logging;
mod monitor;
mod types;

pub use constants::*;
pub use geo::GeoConfig;
pub use logging::LoggingConfig;
pub use monitor::{parse_seed_list, MonitorConfig};
pub use types::LogLevel;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config_validation() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.seeds.len(), DEFAULT_SEEDS.len());
        assert_eq!(config.history_window, 30);
    }

    #[test]
    fn test_endpoint_derived_from_first_seed() {
        let config = MonitorConfig::default();
        assert_eq!(config.resolved_rpc_endpoint(), "http://173.212.203.145:6000/rpc");

        let mut config = MonitorConfig::default();
        config.rpc_endpoint = Some("https://gossip.example/rpc".to_string());
        assert_eq!(config.resolved_rpc_endpoint(), "https://gossip.example/rpc");
    }

    #[test]
    fn test_invalid_values() {
        let mut config = MonitorConfig::default();
        config.poll_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = MonitorConfig::default();
        config.history_window = 201;
        assert!(config.validate().is_err());

        let mut config = MonitorConfig::default();
        config.seed_rpc_port = 0;
        assert!(config.validate().is_err());

        let mut config = MonitorConfig::default();
        config.rpc_endpoint = Some("/prpc".to_string());
        assert!(config.validate().is_err());

        let mut config = MonitorConfig::default();
        config.rpc_endpoint = Some("ftp://gossip.example".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_no_endpoint_and_no_seeds() {
        let mut config = MonitorConfig::default();
        config.seeds.clear();
        assert!(config.validate().is_err());

        config.rpc_endpoint = Some("http://127.0.0.1:6000/rpc".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_seed_list_parsing() {
        assert_eq!(parse_seed_list(" 1.1.1.1, ,2.2.2.2 ,"), vec!["1.1.1.1", "2.2.2.2"]);
        assert!(parse_seed_list("").is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = MonitorConfig::default();
        config.apply_overrides(lookup(&[
            ("PNODE_RPC_ENDPOINT", "http://10.0.0.1:6000/rpc"),
            ("PNODE_SEEDS", "10.0.0.2, 10.0.0.3"),
            ("PNODE_POLL_INTERVAL", "15"),
            ("PNODE_GEO_DISABLED", "1"),
            ("PNODE_LOG_LEVEL", "DEBUG"),
            ("PNODE_LOG_JSON", "1"),
        ]));

        assert_eq!(config.rpc_endpoint.as_deref(), Some("http://10.0.0.1:6000/rpc"));
        assert_eq!(config.seeds, vec!["10.0.0.2", "10.0.0.3"]);
        assert_eq!(config.poll_interval_secs, 15);
        assert!(!config.geo.enabled);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.logging.json);
    }

    #[test]
    fn test_invalid_env_interval_is_ignored() {
        let mut config = MonitorConfig::default();
        config.apply_overrides(lookup(&[("PNODE_POLL_INTERVAL", "soon")]));
        assert_eq!(config.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
    }

    #[test]
    fn test_config_serialization() {
        let mut config = MonitorConfig::default();
        config.rpc_endpoint = Some("http://10.0.0.1:6000/rpc".to_string());
        let toml_str = config.to_toml().expect("Failed to serialize");
        let parsed: MonitorConfig = toml::from_str(&toml_str).expect("Failed to parse");
        assert_eq!(parsed.rpc_endpoint, config.rpc_endpoint);
        assert_eq!(parsed.seeds, config.seeds);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: MonitorConfig = toml::from_str("poll_interval_secs = 10\n[geo]\nenabled = false\n").unwrap();
        assert_eq!(parsed.poll_interval_secs, 10);
        assert!(!parsed.geo.enabled);
        assert_eq!(parsed.seed_rpc_port, DEFAULT_SEED_RPC_PORT);
        assert_eq!(parsed.geo.endpoint, DEFAULT_GEO_ENDPOINT);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = MonitorConfig::default();
        config.history_window = 60;
        config.save(&path).unwrap();

        let loaded = MonitorConfig::load(&path).unwrap();
        assert_eq!(loaded.history_window, 60);
    }
}
