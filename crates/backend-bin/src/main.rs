use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use portal_auth::{config::Settings, router, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Driver portal authentication server
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML config file; `PORTAL_*` environment variables override it
    #[arg(short, long, default_value = portal_auth::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let settings = Settings::load_from(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.to_ascii_lowercase()));
    if args.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    if settings.uses_default_secret() {
        warn!("jwt_secret is the built-in development value; set PORTAL_JWT_SECRET in production");
    }
    info!(directory = %settings.directory_path.display(), "using flat-file credential directory");

    let addr = settings.bind_addr;
    let state = Arc::new(AppState::from_settings(settings));
    let app = router::create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
