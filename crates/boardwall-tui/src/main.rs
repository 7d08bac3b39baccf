//! `boardwall` — terminal dashboard for watching many chess games at once.
//!
//! Built on [ratatui](https://ratatui.rs). The board lifecycle (layout,
//! polling, game-end restarts) lives in `boardwall-core`; this binary draws
//! it and feeds it terminal resizes.
//!
//! Logs are written to a file (default `/tmp/boardwall.log`) to avoid
//! corrupting the terminal UI.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;
mod widget;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tokio::sync::mpsc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use boardwall_api::{BackendClient, TransportConfig};
use boardwall_core::Dashboard;

use crate::app::App;
use crate::data_bridge::HealthCheck;
use crate::widget::TuiWidgetFactory;

/// Terminal dashboard for watching many chess games at once.
#[derive(Parser, Debug)]
#[command(name = "boardwall", version, about)]
struct Cli {
    /// Backend URL (e.g., http://localhost:3000)
    #[arg(short = 'u', long, env = "BOARDWALL_URL")]
    url: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(short = 'c', long, env = "BOARDWALL_CONFIG")]
    config: Option<PathBuf>,

    /// Log file path (defaults to /tmp/boardwall.log)
    #[arg(long, default_value = "/tmp/boardwall.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing; stdout belongs to the TUI. Hold the guard for the
/// lifetime of the application so logs flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "boardwall={log_level},boardwall_core={log_level},boardwall_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("boardwall.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Priority: CLI flags > environment > config file > defaults.
fn load_config(cli: &Cli) -> Result<boardwall_config::Config> {
    let mut cfg = match &cli.config {
        Some(path) => boardwall_config::load_config_from(path)
            .wrap_err_with(|| format!("failed to load {}", path.display()))?,
        None => boardwall_config::load_config_or_default(),
    };
    if let Some(url) = &cli.url {
        cfg.backend_url.clone_from(url);
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks first, so a panic during init still restores the terminal
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let cfg = load_config(&cli)?;
    let dashboard_config =
        boardwall_config::to_dashboard_config(&cfg).wrap_err("invalid configuration")?;
    let url = cfg.backend_url()?;

    info!(url = %url, "starting boardwall");

    let transport = TransportConfig::default().with_timeout(cfg.request_timeout());
    let client = Arc::new(BackendClient::new(url.as_str(), &transport)?);

    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let factory = Arc::new(TuiWidgetFactory::new(action_tx.clone()));
    let dashboard = Dashboard::new(Arc::clone(&client), factory, dashboard_config);

    let health = HealthCheck {
        attempts: cfg.health_check_attempts,
        backoff: cfg.health_check_backoff(),
    };

    let mut app = App::new(client, dashboard, health, action_tx, action_rx);
    app.run().await?;

    Ok(())
}
