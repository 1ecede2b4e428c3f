mod app;
mod cache;
mod client;
mod config;
mod event;
mod portfolio;
mod query;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "A terminal browser for a project portfolio")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/folio/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Site origin to browse, overriding the config
  #[arg(short, long)]
  origin: Option<String>,

  /// Serve everything from cache; never touch the network
  #[arg(long)]
  offline: bool,

  /// Print the cache status as JSON and exit
  #[arg(long)]
  cache_status: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  // Logs go to a file; stdout belongs to the TUI
  let _log_guard = init_logging();

  let args = Args::parse();

  let mut config = config::Config::load(args.config.as_deref())?;

  // Command-line overrides
  if let Some(origin) = args.origin {
    config.site.origin = origin;
  }
  if args.offline {
    config.cache.offline = true;
  }

  let client = client::SiteClient::new(&config)?;

  if args.cache_status {
    match client.cache_status()? {
      Some(status) => println!("{}", serde_json::to_string_pretty(&status)?),
      None => println!("cache disabled"),
    }
    return Ok(());
  }

  // Worker-style lifecycle: precache the shell, drop old cache versions
  client.start().await;

  let mut app = app::App::new(config, client);
  app.run().await?;

  Ok(())
}

fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
  let log_dir = dirs::data_dir()?.join("folio").join("logs");
  std::fs::create_dir_all(&log_dir).ok()?;

  let appender = tracing_appender::rolling::daily(log_dir, "folio.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Some(guard)
}
