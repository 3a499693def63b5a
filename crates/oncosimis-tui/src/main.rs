use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use oncosimis_core::monitor::StatusMonitor;
use oncosimis_core::{Action, BackendClient, Config};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{AppEvent, EventHandler};

#[derive(Parser)]
#[command(name = "oncosimis")]
#[command(version, about = "Chat with the Oncosimis AI assistant from your terminal")]
struct Cli {
    /// Backend base URL (local server or tunnel address)
    #[arg(long, env = "ONCOSIMIS_BACKEND_URL")]
    backend_url: Option<String>,

    /// Seconds between health checks
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Where downloaded documents are saved
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Log file (defaults to the user data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Persist the given options as the new defaults
    #[arg(long)]
    save_config: bool,
}

fn default_log_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("oncosimis")
        .join("oncosimis.log")
}

/// Log to a file; stderr is owned by the terminal UI.
fn init_logging(log_file: PathBuf, verbose: u8) -> Result<WorkerGuard> {
    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = log_file
        .file_name()
        .context("log file path has no file name")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,oncosimis={level},oncosimis_core={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(guard)
}

/// Apply command-line overrides to the stored config. An unreadable config
/// file falls back to defaults but is never overwritten.
fn resolve_config(cli: &Cli, stored: Result<Config>) -> Result<Config> {
    let mut config = match stored {
        Ok(config) => config,
        Err(e) => {
            warn!("ignoring unreadable config file, using defaults: {:#}", e);
            if cli.save_config {
                bail!("refusing to overwrite unreadable config file: {:#}", e);
            }
            Config::new()
        }
    };

    if let Some(url) = &cli.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(secs) = cli.poll_interval {
        config.poll_interval_secs = secs;
    }
    if let Some(dir) = &cli.download_dir {
        config.download_dir = Some(dir.clone());
    }

    if cli.save_config {
        config.save()?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_file.clone().unwrap_or_else(default_log_file), cli.verbose)?;
    let config = resolve_config(&cli, Config::load())?;

    let client = BackendClient::with_options(&config.backend_url, config.skip_browser_warning)?;
    info!(backend = %client.base_url(), "starting");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    // Health polling runs for the life of the UI; it stops once the
    // event channel closes.
    let monitor = StatusMonitor::new(client.clone(), config.poll_interval());
    let status_tx = events.sender();
    tokio::spawn(monitor.run(move |connectivity| {
        status_tx
            .send(AppEvent::Session(Action::HealthPolled(connectivity)))
            .is_ok()
    }));

    let mut app = App::new(
        client,
        config.download_dir(),
        config.welcome_message.as_deref(),
        events.sender(),
    );

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    info!("exiting");
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn flags_override_stored_config() {
        let cli = Cli::parse_from(["oncosimis", "--backend-url", "https://abc.ngrok.app", "--poll-interval", "3"]);
        let config = resolve_config(&cli, Ok(Config::new())).unwrap();
        assert_eq!(config.backend_url, "https://abc.ngrok.app");
        assert_eq!(config.poll_interval_secs, 3);
    }

    #[test]
    fn unreadable_config_falls_back_to_defaults() {
        let cli = Cli::parse_from(["oncosimis"]);
        let config = resolve_config(&cli, Err(anyhow!("expected value at line 1 column 1"))).unwrap();
        assert_eq!(config.backend_url, oncosimis_core::config::DEFAULT_BACKEND_URL);
    }

    #[test]
    fn unreadable_config_is_not_overwritten() {
        let cli = Cli::parse_from(["oncosimis", "--save-config"]);
        let err = resolve_config(&cli, Err(anyhow!("expected value at line 1 column 1"))).unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"));
    }
}
