use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;
mod model_output;
mod prompt;
mod provider;

use api::{build_router, cors_layer};
use app_state::{AppState, GenerationSettings};
use config::load_settings;
use provider::GeminiProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = load_settings()?;
    settings.validate()?;
    let api_key = settings
        .gemini_api_key
        .clone()
        .context("GEMINI_API_KEY must be set")?;

    let state = AppState {
        provider: Arc::new(GeminiProvider::new(api_key)),
        generation: GenerationSettings::from(&settings),
    };
    let app = build_router(Arc::new(state)).layer(cors_layer(&settings.allowed_origins));

    let addr = settings.bind_addr()?;
    info!(%addr, model = %settings.gemini_model, "topic service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
