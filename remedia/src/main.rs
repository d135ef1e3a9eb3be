use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use remedia::api::{create_router, AppState};
use remedia::config::Config;
use remedia::db::{Database, LibSqlBackend, RemedyStore};
use remedia::embeddings::EmbeddingProvider;
use remedia::llm::{ClassifierSeed, LlmProvider};
use remedia::retry::RetryPolicy;
use remedia::search::{SimilaritySearchEngine, SymptomCorpus};
use remedia::services::{Classifier, SessionRegistry, TriageService};

#[derive(Parser)]
#[command(name = "remedia")]
#[command(about = "Symptom triage over a homeopathic repertory")]
struct Args {
    /// JSON Lines corpus snapshot; overrides CORPUS_PATH
    #[arg(long)]
    corpus: Option<String>,

    /// Listen port; overrides REMEDIA_PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let mut config = Config::from_env();
    if let Some(corpus) = args.corpus {
        config.corpus.path = Some(corpus);
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "remedia=info,tower_http=debug".into());
    if config.server.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    if config.server.api_keys.is_empty() {
        tracing::warn!(
            "REMEDIA_API_KEYS is not set: session routes are locked. Set REMEDIA_API_KEYS to enable access."
        );
    }

    tracing::info!("Opening reference database...");
    let backend = Arc::new(LibSqlBackend::new(Database::open(&config.database).await?));
    backend.ping().await?;

    let corpus = match &config.corpus.path {
        Some(path) => {
            tracing::info!(path = %path, "Loading symptom corpus snapshot...");
            SymptomCorpus::from_jsonl(path)?
        }
        None => {
            tracing::info!("Loading symptom corpus from the reference database...");
            SymptomCorpus::from_store(&*backend).await?
        }
    };
    tracing::info!(
        entries = corpus.len(),
        dimensions = corpus.dimensions(),
        "Symptom corpus loaded"
    );

    let retry = RetryPolicy::from(&config.retry);

    tracing::info!("Initializing embedding provider: {}...", config.embeddings.model);
    let embeddings = EmbeddingProvider::new(&config.embeddings, retry.clone())?;

    tracing::info!("Initializing LLM provider: {}...", config.llm.model);
    let llm = LlmProvider::new(Some(&config.llm), retry);
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - classification requests will fail");
    }

    let seed = ClassifierSeed::load(&config.llm)?;
    let classifier = Classifier::new(llm, seed);
    let engine = SimilaritySearchEngine::new(Arc::new(corpus), embeddings, &config.search);
    let remedies: Arc<dyn RemedyStore> = backend;

    let triage = TriageService::new(
        classifier,
        engine,
        remedies.clone(),
        SessionRegistry::new(config.sessions.capacity),
        config.report.delimiter,
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = create_router(AppState::new(config, remedies, triage));

    tracing::info!("Remedia starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests...");
}
