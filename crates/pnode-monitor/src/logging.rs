use crate::config::{LogLevel, LoggingConfig};
use pnode_types::{PnodeError, PnodeResult};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Resolved subscriber settings after CLI flags are merged over the config file.
#[derive(Clone, Debug)]
pub struct LogSettings {
    pub filter: String,
    pub json: bool,
    pub file: Option<PathBuf>,
    /// Skip the stdout layer entirely. Used by the terminal dashboard.
    pub silent_stdout: bool,
    pub with_target: bool,
}

impl LogSettings {
    pub fn from_config(config: &LoggingConfig, verbose: u8, quiet: bool) -> Self {
        Self {
            filter: filter_directive(config.level, verbose, quiet),
            json: config.json,
            file: config.file.clone(),
            silent_stdout: false,
            with_target: verbose >= 2,
        }
    }

    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        if file.is_some() {
            self.file = file;
        }
        self
    }

    pub fn silent_stdout(mut self) -> Self {
        self.silent_stdout = true;
        self
    }
}

/// Builds the filter directive. `-q` wins over `-v`, and `-v` raises the configured level.
pub fn filter_directive(level: LogLevel, verbose: u8, quiet: bool) -> String {
    if quiet {
        return "warn".to_string();
    }
    match verbose {
        0 => level.as_filter().to_string(),
        1 => format!("{},pnode_monitor=debug,pnode_dash=debug", level.as_filter()),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

pub fn init_logging(settings: &LogSettings) -> PnodeResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.filter));

    let file_layer = match settings.file {
        Some(ref log_file) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .map_err(|e| PnodeError::Io(format!("Failed to open log file {:?}: {}", log_file, e)))?;
            let layer = fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false);
            Some(if settings.json { layer.json().boxed() } else { layer.boxed() })
        }
        None => None,
    };

    let stdout_layer = if settings.silent_stdout || settings.file.is_some() {
        None
    } else if settings.json {
        Some(fmt::layer().json().with_writer(std::io::stderr).boxed())
    } else {
        Some(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(settings.with_target)
                .boxed(),
        )
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| PnodeError::Config(format!("Failed to initialise logging: {}", e)))
}
