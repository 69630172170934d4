use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use titlegate_core::remote::huggingface::{DEFAULT_EMBEDDING_API_URL, HuggingFaceEmbedder};
use titlegate_core::remote::supabase::SupabaseStore;
use titlegate_core::{CorpusStore, Embedder, EngineConfig, VectorSearch, VerificationEngine};

mod handlers;
mod models;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = EngineConfig::from_env();

    let base_url = std::env::var("SUPABASE_URL").context("SUPABASE_URL must be set")?;
    let api_key =
        std::env::var("SUPABASE_SERVICE_KEY").context("SUPABASE_SERVICE_KEY must be set")?;
    let store = Arc::new(SupabaseStore::new(base_url, api_key));

    // Without an embedder token the engine still runs; verdicts then rest on
    // the lexical and guideline stages alone.
    let (embedder, vector_search): (Option<Arc<dyn Embedder>>, Option<Arc<dyn VectorSearch>>) =
        match std::env::var("HF_TOKEN") {
            Ok(token) => {
                let api_url = std::env::var("EMBEDDING_API_URL")
                    .unwrap_or_else(|_| DEFAULT_EMBEDDING_API_URL.to_string());
                (
                    Some(Arc::new(HuggingFaceEmbedder::new(api_url, token))),
                    Some(store.clone() as Arc<dyn VectorSearch>),
                )
            }
            Err(_) => {
                tracing::warn!("HF_TOKEN not set; semantic stage disabled");
                (None, None)
            }
        };

    let engine = Arc::new(VerificationEngine::new(
        config,
        store as Arc<dyn CorpusStore>,
        embedder,
        vector_search,
    ));

    // Bind first, bootstrap in the background: readiness probes watch the
    // indexed-title count climb instead of timing out on a cold start.
    let cancel = CancellationToken::new();
    {
        let engine = engine.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match engine.bootstrap(&cancel).await {
                Ok(loaded) => tracing::info!(loaded, "corpus bootstrap complete"),
                Err(err) => tracing::error!(error = %err, "corpus bootstrap failed"),
            }
        });
    }

    let app_state = Arc::new(AppState {
        engine: engine.clone(),
    });
    let app = axum::Router::new()
        .route("/healthz", axum::routing::get(handlers::health::healthz))
        .route("/verify", axum::routing::post(handlers::verify::verify))
        .route(
            "/submit_application",
            axum::routing::post(handlers::submit::submit_application),
        )
        .route(
            "/webhook/registry_sync",
            axum::routing::post(handlers::webhook::registry_sync),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    engine.clear();
    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    cancel.cancel();
}
