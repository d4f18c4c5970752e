#![forbid(unsafe_code)]
#![warn(clippy::all)]

use thiserror::Error;

pub mod history;
pub mod node;

pub use history::{ObservationCounter, UptimeHistorySample};
pub use node::{NodeState, NodeStatus};

/// Maximum number of uptime samples retained by a store.
pub const MAX_HISTORY_SAMPLES: usize = 200;

/// Trailing window sizes offered to views.
pub const HISTORY_WINDOW_CHOICES: [usize; 3] = [15, 30, 60];

pub const DEFAULT_HISTORY_WINDOW: usize = 30;

pub const BYTES_PER_GB: f64 = 1_000_000_000.0;

#[derive(Error, Debug)]
pub enum PnodeError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC {0}")]
    HttpStatus(u16),

    #[error("{0}")]
    Rpc(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Gossip endpoint unavailable and no seed hosts configured: {0}")]
    NoSources(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type PnodeResult<T> = Result<T, PnodeError>;

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Converts a byte count to gigabytes with one decimal.
pub fn bytes_to_gb(bytes: f64) -> f64 {
    round1(bytes / BYTES_PER_GB)
}
