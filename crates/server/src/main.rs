use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use tierflow_core::config::{load_config, validate_config};
use tierflow_core::extractor::MetadataExtractor;
use tierflow_core::journal::{create_journal_system, JournalStore, RunEvent, SqliteJournal};
use tierflow_core::router::Router;
use tierflow_core::service::IngestService;
use tierflow_core::store::{MemoryObjectStore, ObjectStore};
use tierflow_core::unit::UnitCatalog;

use tierflow_server::api::create_router;
use tierflow_server::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const JOURNAL_BUFFER_SIZE: usize = 256;

fn config_path() -> PathBuf {
    std::env::var("TIERFLOW_CONFIG")
        .unwrap_or_else(|_| "config.toml".to_string())
        .into()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

async fn run() -> anyhow::Result<()> {
    let path = config_path();
    let config = load_config(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    validate_config(&config).context("invalid configuration")?;

    let journal_store: Arc<dyn JournalStore> = Arc::new(
        SqliteJournal::new(&config.journal.path).with_context(|| {
            format!(
                "failed to open journal at {}",
                config.journal.path.display()
            )
        })?,
    );
    let (journal, writer) = create_journal_system(journal_store.clone(), JOURNAL_BUFFER_SIZE);
    let writer_task = tokio::spawn(writer.run());

    journal
        .emit(RunEvent::ServiceStarted {
            version: VERSION.to_string(),
        })
        .await;

    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
    let catalog = Arc::new(
        UnitCatalog::from_config(&config, store.clone()).context("failed to build unit catalog")?,
    );
    let router = Arc::new(
        Router::new(catalog, config.router.clone()).with_journal(journal.clone()),
    );
    let extractor = Arc::new(MetadataExtractor::new(store, config.tiers.clone()));
    let service = Arc::new(IngestService::new(extractor, router, journal.clone()));

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, service, journal_store));
    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(version = VERSION, %addr, "tierflow listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    journal
        .emit(RunEvent::ServiceStopped {
            reason: "graceful_shutdown".to_string(),
        })
        .await;

    // Dropping the handle closes the channel so the writer can drain.
    drop(journal);
    writer_task.await.context("journal writer panicked")?;

    tracing::info!("shutdown complete");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    run().await
}
