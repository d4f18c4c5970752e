mod commands;
mod config_cmd;
mod snapshot;
mod utils;
mod watch;

pub use commands::{Cli, Commands};
pub use config_cmd::handle_config;
pub use snapshot::{take_snapshot, SnapshotArgs};
pub use utils::{config_path, init_logging, load_config};
pub use watch::watch_fleet;

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn show_version() {
    println!("pnode {}", BUILD_VERSION);
    println!("  target   {}-{}", std::env::consts::ARCH, std::env::consts::OS);
    println!("  rpc      JSON-RPC 2.0 (pn_gossip_getNodes, get-stats, get-version)");
}
