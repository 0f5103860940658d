mod analysis;
mod llm;
mod middleware;
mod normalize;
mod prompt;
mod routes;
mod store;

use crate::analysis::Analyzer;
use crate::llm::OpenAiClient;
use crate::store::{MemoryStore, ResultStore};
use axum::Router;
use env_logger::Env;
use log::{error, info};
use serde::Deserialize;
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_redoc::Redoc;
use utoipa_redoc::Servable;

fn get_default_port() -> u16 {
    8080
}

fn get_default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn get_default_model() -> String {
    "o1-mini".to_string()
}

fn get_default_temperature() -> f32 {
    1.0
}

fn get_default_llm_timeout_secs() -> u64 {
    120
}

fn get_default_upstream_max_concurrent() -> usize {
    5
}

fn get_default_chunk_concurrency() -> usize {
    4
}

// No Debug: the api key must never end up in logs.
#[derive(Deserialize)]
pub struct Config {
    #[serde(default = "get_default_port")]
    port: u16,
    #[serde(default = "get_default_base_url")]
    base_url: String,
    openai_api_key: String,
    #[serde(default = "get_default_model")]
    model: String,
    #[serde(default = "get_default_temperature")]
    temperature: f32,
    #[serde(default = "get_default_llm_timeout_secs")]
    llm_timeout_secs: u64,
    #[serde(default = "get_default_upstream_max_concurrent")]
    upstream_max_concurrent: usize,
    #[serde(default = "get_default_chunk_concurrency")]
    chunk_concurrency: usize,
}

#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<Analyzer>,
    store: Arc<dyn ResultStore>,
}

#[derive(OpenApi)]
#[openapi(info(description = "API for generating essay feedback using llms"))]
struct ApiDoc;

fn app(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(routes::analyze))
        .routes(routes!(routes::get_result))
        .routes(routes!(routes::ai_analyze))
        .routes(routes!(routes::get_ai_result))
        .split_for_parts();

    middleware::with_security_headers(
        router
            .merge(Redoc::with_url("/redoc", api))
            .layer(middleware::cors()),
    )
    .with_state(state)
}

async fn run() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let config = envy::from_env::<Config>()?;

    let client = OpenAiClient::new(
        config.base_url,
        config.openai_api_key,
        config.model,
        config.temperature,
        Duration::from_secs(config.llm_timeout_secs),
        config.upstream_max_concurrent,
    )?;
    let state = AppState {
        analyzer: Arc::new(Analyzer::new(Arc::new(client), config.chunk_concurrency)),
        store: Arc::new(MemoryStore::default()),
    };

    info!("Starting on port {}", config.port);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn main() {
    let rt = tokio::runtime::Runtime::new().unwrap();

    if let Err(err) = rt.block_on(run()) {
        error!("{}", err);
        exit(1)
    }
}
