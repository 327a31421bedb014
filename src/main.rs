//! Service entry point
//!
//! Wires the concrete services together with explicit dependency
//! injection, spawns the recurring scheduler, and serves the HTTP API
//! until ctrl-c.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use volleyhunt::services::scheduler;
use volleyhunt::web::{self, AppState};
use volleyhunt::{
    Collector, GroqSearchProvider, LlmQueryGenerator, ProgressTracker, RotationPolicy, Settings,
    VenueStore,
};

/// Scheduled LLM-backed volleyball venue collector
#[derive(Parser)]
#[command(name = "volleyhunt")]
#[command(about = "Collects volleyball venue data across US and India states")]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Data directory (overrides DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// HTTP bind address (overrides BIND_ADDR)
    #[arg(long)]
    bind_addr: Option<std::net::SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut settings = Settings::from_env()?;
    if let Some(data_dir) = args.data_dir {
        settings.data_dir = data_dir;
    }
    if let Some(bind_addr) = args.bind_addr {
        settings.bind_addr = bind_addr;
    }

    info!("🏐 Starting volleyhunt collector");
    info!(
        "📁 Data directory: {}, interval: {} minutes",
        settings.data_dir.display(),
        settings.schedule_interval.as_secs() / 60
    );

    // Construct everything up front and inject it; no hidden globals.
    let store = VenueStore::new(&settings.data_dir);
    let progress = ProgressTracker::new(&settings.data_dir);
    let rotation = RotationPolicy::open(&settings.data_dir).await;
    let search = GroqSearchProvider::new(settings.groq_api_key.clone());
    let query_gen = LlmQueryGenerator::new(settings.groq_api_key.clone());

    let collector = Arc::new(Collector::new(
        store,
        progress,
        rotation,
        search,
        query_gen,
        settings.results_per_run,
        settings.search_timeout,
    ));

    let scheduler = scheduler::spawn(Arc::clone(&collector), settings.schedule_interval);

    let app = web::router(AppState {
        collector,
        scheduler,
    });

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    info!("🌐 HTTP API listening on {}", settings.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("🛑 Received ctrl-c, shutting down");
        })
        .await?;

    info!("👋 Shutdown complete");
    Ok(())
}
