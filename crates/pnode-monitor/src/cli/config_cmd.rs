use super::commands::ConfigAction;
use pnode_monitor::MonitorConfig;
use pnode_types::{PnodeError, PnodeResult};
use std::path::Path;

pub fn handle_config(config_path: &Path, config: &MonitorConfig, action: Option<ConfigAction>) -> PnodeResult<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            if config_path.exists() {
                println!("\x1b[38;5;245m# {:?}\x1b[0m", config_path);
            } else {
                println!("\x1b[38;5;245m# No configuration file at {:?}, showing defaults\x1b[0m", config_path);
            }
            println!("\x1b[38;5;245m# gossip endpoint: {}\x1b[0m", config.resolved_rpc_endpoint());
            println!("{}", config.to_toml()?);
        }
        Some(ConfigAction::Init { force }) => {
            init_config(config_path, force)?;
            println!("\x1b[38;5;46m[+]\x1b[0m Configuration written to {:?}", config_path);
        }
    }
    Ok(())
}

pub fn init_config(config_path: &Path, force: bool) -> PnodeResult<()> {
    if config_path.exists() && !force {
        return Err(PnodeError::Config(format!(
            "{:?} already exists (use --force to overwrite)",
            config_path
        )));
    }
    MonitorConfig::default().save(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        init_config(&path, false).unwrap();
        assert!(path.exists());
        assert!(init_config(&path, false).is_err());
        assert!(init_config(&path, true).is_ok());

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: MonitorConfig = toml::from_str(&contents).unwrap();
        assert_eq!(parsed.seed_rpc_port, 6000);
    }
}
