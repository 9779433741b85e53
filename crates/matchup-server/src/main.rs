//! matchup server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the matching API over HTTP.
//!
//! Every setting can also come from the environment with a `MATCHUP_`
//! prefix, e.g. `MATCHUP_PORT=8080`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::Duration;
use clap::Parser;
use matchup_core::MatchEngine;
use matchup_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Matchup pairing server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:               String,
  #[serde(default = "default_port")]
  port:               u16,
  #[serde(default = "default_store_path")]
  store_path:         PathBuf,
  /// Hours between signup and reveal.
  #[serde(default = "default_reveal_delay_hours")]
  reveal_delay_hours: i64,
  /// Fixed RNG seed; omit for entropy-seeded assignment.
  #[serde(default)]
  rng_seed:           Option<u64>,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("matchup.db") }
fn default_reveal_delay_hours() -> i64 { 24 }

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("MATCHUP"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let reveal_delay = Duration::hours(server_cfg.reveal_delay_hours);
  let engine = match server_cfg.rng_seed {
    Some(seed) => MatchEngine::with_seed(store, reveal_delay, seed),
    None => MatchEngine::new(store, reveal_delay),
  };

  let app = matchup_api::api_router(Arc::new(engine))
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
