mod config;
mod routes;
mod session;

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use streaming::{CachePolicy, DataCache, HttpBackend};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::load_settings;
use crate::routes::{router, AppState};
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(author, version, about = "Cluster evolution dashboard server")]
struct Args {
    /// Path to settings.json (defaults to $DASHBOARD_SETTINGS or ./settings.json).
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Backend base URL (defaults to $BACKEND_URL).
    #[arg(long)]
    backend_url: Option<String>,
    /// Listen address (defaults to $DASHBOARD_ADDR).
    #[arg(long)]
    addr: Option<SocketAddr>,
    #[arg(long, default_value_t = CachePolicy::SharedAcrossSides)]
    cache_policy: CachePolicy,
    /// Skip loading the start step before serving.
    #[arg(long)]
    no_preload: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let settings_path = args.settings.unwrap_or_else(|| {
        PathBuf::from(env::var("DASHBOARD_SETTINGS").unwrap_or_else(|_| "settings.json".into()))
    });
    let backend_url = args.backend_url.unwrap_or_else(|| {
        env::var("BACKEND_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".into())
    });
    let addr = match args.addr {
        Some(addr) => addr,
        None => env::var("DASHBOARD_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:9200".into())
            .parse()?,
    };

    let settings = load_settings(&settings_path).await?;
    let params = settings.query_params();
    info!(
        sim_start = %params.sim_start,
        dist_threshold = params.dist_threshold,
        required_ratio = params.required_ratio.0,
        line_type = %params.line_type,
        cache_policy = %args.cache_policy,
        "dashboard configured"
    );

    let cache = DataCache::new(Arc::new(HttpBackend::new(backend_url)), args.cache_policy);
    let session = Arc::new(Session::new(
        cache,
        params,
        settings.start_offset,
        settings.mounts,
    ));

    if !args.no_preload {
        if let Err(err) = session.refresh().await {
            warn!("initial load failed: {err}");
        }
    }

    let app = router(AppState { session });
    info!("dashboard listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
