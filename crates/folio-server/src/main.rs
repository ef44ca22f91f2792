//! folio server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `FOLIO_*`
//! environment variables, opens the SQLite store, and serves the site API and
//! admin pages over HTTP.
//!
//! # Provisioning
//!
//! Accounts are never created over HTTP. Add one with
//!
//! ```text
//! folio-server --create-account "Admin User" --email admin@example.com
//! ```
//!
//! which reads the password from stdin.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use folio_api::{
  ApiSettings, ApiState,
  auth::hash_password,
  media::{CloudinaryHost, MediaHost},
  session::TokenIssuer,
};
use folio_core::{
  account::NewAccount,
  clock::{Clock, SystemClock},
  store::PortfolioStore,
};
use folio_server::{ServerConfig, load_config};
use folio_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "folio portfolio server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Create an admin account with this display name and exit.
  #[arg(long, value_name = "NAME", requires = "email")]
  create_account: Option<String>,

  /// Email address for `--create-account`.
  #[arg(long, value_name = "EMAIL")]
  email: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  let server_cfg = load_config(&cli.config).context("failed to load configuration")?;
  anyhow::ensure!(
    !server_cfg.jwt_secret.trim().is_empty(),
    "jwt_secret must not be empty"
  );

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let Some(name) = cli.create_account {
    let email = cli.email.context("--create-account needs --email")?;
    return create_account(&store, name, email).await;
  }

  let clock: Arc<dyn Clock> = Arc::new(SystemClock);
  let media = match server_cfg.media.clone() {
    Some(cfg) => {
      let host = CloudinaryHost::new(cfg, clock.clone())
        .context("failed to build media client")?;
      Some(Arc::new(host) as Arc<dyn MediaHost>)
    }
    None => {
      tracing::warn!("no media host configured; uploads will fail");
      None
    }
  };

  let state = ApiState {
    store: Arc::new(store),
    tokens: Arc::new(TokenIssuer::from_secret(server_cfg.jwt_secret.as_bytes())),
    media,
    clock,
    settings: Arc::new(ApiSettings {
      cookie_secure:       server_cfg.cookie_secure,
      trusted_media_hosts: server_cfg.trusted_media_hosts.clone(),
    }),
  };

  let app = folio_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn create_account(store: &SqliteStore, name: String, email: String) -> anyhow::Result<()> {
  let password = read_password()?;
  anyhow::ensure!(!password.is_empty(), "password must not be empty");
  let password_hash =
    hash_password(&password).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;

  let input = NewAccount { name, email, password_hash }
    .validate()
    .context("invalid account")?;
  let account = store
    .create_account(input)
    .await
    .context("failed to create account")?;
  tracing::info!(account = %account.id, name = %account.name, "created account");
  println!("{}", account.id);
  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
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
