//! byline-api server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`, with
//! `BYLINE_*` environment overrides), connects to MongoDB, and serves the
//! blog API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use byline_api::{AppState, ServerConfig};
use byline_auth::{TokenVerifier, VerifierConfig};
use byline_store::MongoStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "byline blog API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

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
    .add_source(config::Environment::with_prefix("BYLINE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.auth_development_mode {
    tracing::warn!(
      "auth development mode is enabled; premature tokens will be accepted \
       unverified"
    );
  }

  // Connect to the store.
  let store = MongoStore::connect(&server_cfg.mongodb_uri, &server_cfg.database)
    .await
    .context("failed to connect to MongoDB")?;

  // Token verifier; the provider key set is fetched lazily on first use.
  let verifier = TokenVerifier::new(VerifierConfig {
    jwks_url:         server_cfg.jwks_url.clone(),
    audience:         server_cfg.auth_audience.clone(),
    issuer:           server_cfg.auth_issuer.clone(),
    development_mode: server_cfg.auth_development_mode,
    ..VerifierConfig::default()
  });

  // Build application state.
  let state = AppState {
    store:    Arc::new(store),
    verifier: Arc::new(verifier),
    config:   Arc::new(server_cfg.clone()),
  };

  let app = byline_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
