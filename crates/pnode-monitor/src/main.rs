mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{
    config_path, handle_config, init_logging, load_config, show_version, take_snapshot,
    watch_fleet, Cli, Commands, SnapshotArgs,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    init_logging(&cli, &config)?;

    let config_file = config_path(&cli);

    match cli.command {
        Commands::Snapshot { ref search, ref status, ref sort, desc, locate } => {
            let args = SnapshotArgs {
                search: search.clone(),
                status: status.clone(),
                sort: sort.clone(),
                desc,
                locate,
            };
            take_snapshot(&config, args, cli.format).await?;
        }
        Commands::Watch { interval, cycles } => {
            watch_fleet(&config, interval, cycles, cli.format).await?;
        }
        Commands::Config { action } => {
            handle_config(&config_file, &config, action)?;
        }
        Commands::Version => {
            show_version();
        }
    }

    Ok(())
}
