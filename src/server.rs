use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    collection::fetch_collection,
    eden,
    error::{ApiError, UpstreamError},
    metrics::Metrics,
    store::OutputStore,
    Config,
};

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<eden::Client>,
    pub store: OutputStore,
    pub max_pages: Option<usize>,
    pub metrics: Metrics,
    pub registry: prometheus::Registry,
}

impl AppState {
    pub fn new(config: &Config, registry: prometheus::Registry) -> Result<Self, crate::Error> {
        let client = eden::Client::new(&config.upstream)?;
        let metrics = Metrics::new(&registry)?;

        Ok(Self {
            client: Arc::new(client),
            store: OutputStore::new(config.output_dir.clone()),
            max_pages: config.upstream.max_pages,
            metrics,
            registry,
        })
    }
}

/// - `GET /metrics` - prometheus metrics
/// - `GET /:collection_symbol` - echo of the selected symbol
/// - `GET /api/eden/:collection_symbol` - every token of the collection, projected
/// - `GET /api/:collection_id` - the first upstream page, unmodified
pub fn router(state: AppState, cors: bool) -> Router {
    let router = Router::new()
        .route("/metrics", get(metrics))
        .route("/:collection_symbol", get(echo))
        .route("/api/eden/:collection_symbol", get(eden_collection))
        .route("/api/:collection_id", get(first_page))
        .with_state(state);

    let router = if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

#[tracing::instrument(skip(state))]
async fn metrics(State(state): State<AppState>) -> String {
    tracing::trace!("Getting metrics");

    let encoder = prometheus::TextEncoder::new();
    let metrics_families = state.registry.gather();
    match encoder.encode_to_string(&metrics_families) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Encoding Metrics {:?}", e);

            String::new()
        }
    }
}

#[tracing::instrument]
async fn echo(Path(collection_symbol): Path<String>) -> String {
    tracing::info!("name: {}", collection_symbol);

    format!("Hello world!! Collection symbol you selected is {collection_symbol}")
}

#[tracing::instrument(skip(state))]
async fn eden_collection(
    State(state): State<AppState>,
    Path(collection_symbol): Path<String>,
) -> Result<Response, ApiError> {
    let result = load_and_store(&state, &collection_symbol).await;

    match result {
        Ok(response) => Ok(response),
        Err(e) => {
            tracing::error!("Fetching collection {:?}", e);
            state.metrics.record_failure(e.reason());
            Err(e)
        }
    }
}

async fn load_and_store(state: &AppState, symbol: &str) -> Result<Response, ApiError> {
    OutputStore::check_symbol(symbol)?;

    let collection = fetch_collection(&state.client, symbol, state.max_pages).await?;
    state.store.write_collection(&collection).await?;

    state
        .metrics
        .record_success(symbol, collection.len(), collection.pages);

    Ok(Json(collection.prices()).into_response())
}

#[tracing::instrument(skip(state))]
async fn first_page(
    State(state): State<AppState>,
    Path(collection_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = state
        .client
        .load_raw_page(&collection_id, 0)
        .await
        .map_err(|e: UpstreamError| {
            tracing::error!("Loading first page {:?}", e);
            e
        })?;

    Ok(Json(page))
}
