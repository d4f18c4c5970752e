use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "pnode")]
#[command(version = BUILD_VERSION)]
#[command(about = "pNode fleet monitor - gossip polling, uptime aggregation and snapshots")]
#[command(long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(short, long, global = true, value_name = "FILE", env = "PNODE_CONFIG", help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[arg(long, global = true, value_name = "FILE", help = "Write logs to file")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text", help = "Output format")]
    pub format: OutputFormat,

    #[arg(long, global = true, value_name = "URL", help = "Gossip JSON-RPC endpoint")]
    pub rpc_endpoint: Option<String>,

    #[arg(long, global = true, value_name = "IPS", help = "Comma-separated seed hosts")]
    pub seeds: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Fetch the fleet once and print it")]
    Snapshot {
        #[arg(long, value_name = "TEXT", help = "Filter by id, address, version or region")]
        search: Option<String>,
        #[arg(long, value_name = "STATUS", help = "Only show nodes with this status (online, offline, unknown)")]
        status: Option<String>,
        #[arg(long, value_name = "FIELD", help = "Sort by field (storage, cpu, uptime, ram-percent, ...)")]
        sort: Option<String>,
        #[arg(long, help = "Sort descending")]
        desc: bool,
        #[arg(long, help = "Resolve node locations through the geo lookup service")]
        locate: bool,
    },

    #[command(about = "Poll repeatedly and print a summary per cycle")]
    Watch {
        #[arg(long, value_name = "SECS", help = "Seconds between cycles (defaults to poll_interval_secs)")]
        interval: Option<u64>,
        #[arg(long, value_name = "N", help = "Stop after N cycles")]
        cycles: Option<u64>,
    },

    #[command(about = "Manage configuration")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    #[command(about = "Show version information")]
    Version,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    #[command(about = "Print the effective configuration")]
    Show,
    #[command(about = "Write a default configuration file")]
    Init {
        #[arg(short, long, help = "Overwrite an existing file")]
        force: bool,
    },
}
