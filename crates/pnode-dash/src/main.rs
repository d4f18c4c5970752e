//! pNode Dashboard
//! Usage: pnode-dash [OPTIONS]
//!
//! Options:
//!   --theme <THEME>         Dashboard theme (ocean, light, mono) [default: ocean]
//!   --config <PATH>         Config file [default: ~/.pnode/config.toml]
//!   --rpc-endpoint <URL>    Override the gossip RPC endpoint
//!   --log-file <PATH>       Write logs to a file (the terminal stays clean)

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pnode_monitor::logging::{init_logging, LogSettings};
use pnode_monitor::{GeoCache, GossipFetcher, HttpTransport, MonitorConfig, Poller, PnodeStore};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, warn};

mod app;
mod theme;
mod ui;

use app::{Action, App};
use theme::Theme;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "pnode-dash")]
#[command(about = "pNode Dashboard - terminal view of the storage-node fleet")]
#[command(version = VERSION)]
struct Cli {
    /// Dashboard theme (ocean, light, mono)
    #[arg(long, default_value = "ocean")]
    theme: String,

    /// Configuration file
    #[arg(short, long, env = "PNODE_CONFIG")]
    config: Option<PathBuf>,

    /// Gossip RPC endpoint
    #[arg(long)]
    rpc_endpoint: Option<String>,

    /// Log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Disable mouse capture
    #[arg(long)]
    no_mouse: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(MonitorConfig::default_path);
    let mut config = MonitorConfig::load(&config_path)?;
    if let Some(ref endpoint) = cli.rpc_endpoint {
        config.rpc_endpoint = Some(endpoint.clone());
    }
    config.validate()?;

    if cli.log_file.is_some() {
        let settings = LogSettings::from_config(&config.logging, 0, false)
            .with_file(cli.log_file.clone())
            .silent_stdout();
        init_logging(&settings)?;
    }

    let poller = build_poller(&config)?;
    let shutdown = Arc::new(AtomicBool::new(false));
    let poll_task = poller.spawn(config.poll_interval(), shutdown.clone());
    info!("Polling {} every {:?}", config.resolved_rpc_endpoint(), config.poll_interval());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if !cli.no_mouse {
        execute!(stdout, EnableMouseCapture)?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let theme = Theme::from_name(&cli.theme);
    let mut app = App::new(
        config,
        config_path.display().to_string(),
        poller.store(),
        theme,
    )
    .with_poller(poller);

    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    if !cli.no_mouse {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    terminal.show_cursor()?;

    shutdown.store(true, Ordering::SeqCst);
    if tokio::time::timeout(Duration::from_secs(2), poll_task).await.is_err() {
        warn!("Poller did not stop in time");
    }

    if let Err(err) = res {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn build_poller(config: &MonitorConfig) -> Result<Poller<HttpTransport>> {
    let transport = HttpTransport::new(config.request_timeout())?;
    let fetcher = GossipFetcher::from_config(transport, config);
    let store = Arc::new(RwLock::new(PnodeStore::with_history_window(config.history_window)));
    let poller = Poller::new(fetcher, store);

    if config.geo.enabled {
        Ok(poller.with_geo(Arc::new(GeoCache::new(&config.geo))))
    } else {
        Ok(poller)
    }
}

async fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    app.sync().await;

    loop {
        terminal.draw(|f| ui::render_ui(f, app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.handle_key(key) {
                        Action::Quit => return Ok(()),
                        Action::Refresh => app.request_refresh(),
                        Action::SetHistoryWindow(window) => {
                            app.store.write().await.set_history_window(window);
                            app.history_window = window;
                        }
                        Action::None => {}
                    }
                    app.sync().await;
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.sync().await;
            last_tick = Instant::now();
        }
    }
}
