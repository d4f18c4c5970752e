use super::commands::OutputFormat;
use super::utils::{build_poller, fmt_fixed};
use chrono::Utc;
use pnode_monitor::view::OverviewStats;
use pnode_monitor::{CycleOutcome, MonitorConfig, Poller, RpcTransport};
use pnode_types::{PnodeError, PnodeResult};
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tracing::info;

pub async fn watch_fleet(
    config: &MonitorConfig,
    interval: Option<u64>,
    cycles: Option<u64>,
    format: OutputFormat,
) -> PnodeResult<()> {
    let interval = match interval {
        Some(0) => return Err(PnodeError::Config("Watch interval cannot be 0".into())),
        Some(secs) => Duration::from_secs(secs),
        None => config.poll_interval(),
    };
    let poller = build_poller(config, false)?;

    info!("Watching {} every {:?}", poller.fetcher().gossip_endpoint(), interval);

    watch_loop(&poller, interval, cycles, format, tokio::signal::ctrl_c()).await;
    Ok(())
}

/// Runs cycles until `cycles` complete or `stop` resolves, returning the
/// number of completed cycles. `stop` is also observed while a cycle is in flight.
pub async fn watch_loop<T, S>(
    poller: &Poller<T>,
    interval: Duration,
    cycles: Option<u64>,
    format: OutputFormat,
    stop: S,
) -> u64
where
    T: RpcTransport + 'static,
    S: Future,
{
    let mut ticker = tokio::time::interval(interval);
    let mut completed = 0u64;
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut stop => {
                info!("Interrupted, stopping watch");
                break;
            }
        }

        let outcome = tokio::select! {
            outcome = poller.run_cycle() => outcome,
            _ = &mut stop => {
                info!("Interrupted during a fetch, stopping watch");
                break;
            }
        };
        let store = poller.store();
        let store = store.read().await;
        let stats = OverviewStats::from_store(&store);
        let now = Utc::now();

        match format {
            OutputFormat::Json => {
                let line = match outcome {
                    CycleOutcome::Failed { ref message } => json!({
                        "timestamp": now,
                        "error": message,
                        "stats": stats,
                    }),
                    _ => json!({ "timestamp": now, "stats": stats }),
                };
                println!("{}", line);
            }
            OutputFormat::Text => match outcome {
                CycleOutcome::Failed { ref message } => println!(
                    "{}  \x1b[38;5;196m[-]\x1b[0m {} (showing last snapshot: {} nodes)",
                    now.format("%H:%M:%S"),
                    message,
                    stats.total
                ),
                _ => println!(
                    "{}  \x1b[38;5;46m[+]\x1b[0m {} nodes  {} online  {} offline  {} unknown  fleet uptime {}%",
                    now.format("%H:%M:%S"),
                    stats.total,
                    stats.online,
                    stats.offline,
                    stats.unknown,
                    fmt_fixed(stats.fleet_uptime_percent, 1)
                ),
            },
        }

        completed += 1;
        if cycles.is_some_and(|limit| completed >= limit) {
            break;
        }
    }

    completed
}
