use super::commands::OutputFormat;
use super::utils::{build_poller, fmt_fixed, fmt_opt, truncate};
use chrono::{DateTime, Utc};
use pnode_monitor::view::{NodeRow, OverviewStats, SortKey, SortOrder, StatusFilter, ViewQuery};
use pnode_monitor::{CycleOutcome, MonitorConfig};
use pnode_types::{PnodeError, PnodeResult};
use serde::Serialize;
use std::collections::HashMap;

pub struct SnapshotArgs {
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub desc: bool,
    pub locate: bool,
}

impl SnapshotArgs {
    pub fn query(&self) -> PnodeResult<ViewQuery> {
        let status = match self.status {
            Some(ref raw) => StatusFilter::parse(raw)
                .ok_or_else(|| PnodeError::Config(format!("Unknown status filter: {}", raw)))?,
            None => StatusFilter::All,
        };
        let sort_key = match self.sort {
            Some(ref raw) => SortKey::parse(raw)
                .ok_or_else(|| PnodeError::Config(format!("Unknown sort field: {}", raw)))?,
            None => SortKey::None,
        };
        Ok(ViewQuery {
            search: self.search.clone().unwrap_or_default(),
            status,
            sort_key,
            order: if self.desc { SortOrder::Desc } else { SortOrder::Asc },
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotReport {
    endpoint: String,
    last_updated: Option<DateTime<Utc>>,
    stats: OverviewStats,
    nodes: Vec<NodeRow>,
}

pub async fn take_snapshot(config: &MonitorConfig, args: SnapshotArgs, format: OutputFormat) -> PnodeResult<()> {
    let query = args.query()?;
    let poller = build_poller(config, args.locate)?;

    match poller.run_cycle().await {
        CycleOutcome::Settled { .. } => {}
        CycleOutcome::Failed { message } => return Err(PnodeError::Transport(message)),
        CycleOutcome::Skipped => {}
    }

    let locations = match poller.geo() {
        Some(geo) => {
            let store = poller.store();
            let items = store.read().await.items().to_vec();
            geo.locations_for(&items).await
        }
        None => HashMap::new(),
    };

    let store = poller.store();
    let store = store.read().await;
    let report = SnapshotReport {
        endpoint: poller.fetcher().gossip_endpoint().to_string(),
        last_updated: store.last_updated(),
        stats: OverviewStats::from_store(&store),
        nodes: query.rows(&store, &locations),
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| PnodeError::Decode(format!("Failed to encode snapshot: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Text => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &SnapshotReport) {
    let stats = &report.stats;
    println!();
    println!("\x1b[38;5;51mpNode fleet\x1b[0m  {}", report.endpoint);
    println!(
        "  Total: {}   \x1b[38;5;46mOnline: {}\x1b[0m   \x1b[38;5;196mOffline: {}\x1b[0m   Unknown: {}",
        stats.total, stats.online, stats.offline, stats.unknown
    );
    println!(
        "  Storage: {:.1} GB total, {:.1} GB avg   CPU avg: {}",
        stats.total_storage_gb,
        stats.avg_storage_gb,
        fmt_fixed(stats.avg_cpu_percent, 2)
    );
    if let Some(ts) = report.last_updated {
        println!("  Updated: {}", ts.to_rfc3339());
    }
    println!();

    if report.nodes.is_empty() {
        println!("\x1b[38;5;245mNo pNodes found\x1b[0m");
        return;
    }

    println!(
        "{:<24} {:<8} {:>9} {:>7} {:>7} {:>9} {:>8} {:<18} {:<10}",
        "ID", "STATUS", "STORAGE", "CPU%", "RAM%", "UPTIME(h)", "OBSERVED", "LOCATION", "VERSION"
    );
    for row in &report.nodes {
        let node = &row.node;
        println!(
            "{:<24} {:<8} {:>9} {:>7} {:>7} {:>9} {:>8} {:<18} {:<10}",
            truncate(&node.id, 24),
            node.status.as_str(),
            fmt_fixed(node.storage_gb, 1),
            fmt_fixed(node.cpu_percent, 2),
            fmt_fixed(node.ram_used_percent, 1),
            fmt_fixed(node.uptime_hours(), 1),
            fmt_fixed(row.uptime_percent, 1),
            truncate(&fmt_opt(row.location.as_deref()), 18),
            truncate(&fmt_opt(node.version.as_deref()), 10),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(status: Option<&str>, sort: Option<&str>) -> SnapshotArgs {
        SnapshotArgs {
            search: Some("eu".into()),
            status: status.map(String::from),
            sort: sort.map(String::from),
            desc: true,
            locate: false,
        }
    }

    #[test]
    fn test_query_from_args() {
        let query = args(Some("offline"), Some("storage")).query().unwrap();
        assert_eq!(query.search, "eu");
        assert_eq!(query.status, StatusFilter::Offline);
        assert_eq!(query.sort_key, SortKey::Storage);
        assert_eq!(query.order, SortOrder::Desc);
    }

    #[test]
    fn test_query_rejects_unknown_values() {
        assert!(args(Some("sleeping"), None).query().is_err());
        assert!(args(None, Some("colour")).query().is_err());
    }
}
