use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use luku_backend::api::{self, AppState};
use luku_backend::config::Config;
use luku_backend::llm::GeminiClient;
use luku_backend::metrics;
use luku_backend::puzzle::{TemplateLibrary, TemplateRenderer, Vocabulary};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();
    metrics::register_metrics();

    let library = match &config.templates_file {
        Some(path) => match TemplateLibrary::load(path) {
            Ok(lib) => {
                tracing::info!(path = %path.display(), "loaded puzzle templates");
                lib
            }
            Err(e) => {
                tracing::error!("{e}; using built-in templates");
                TemplateLibrary::builtin()
            }
        },
        None => TemplateLibrary::builtin(),
    };
    let renderer = TemplateRenderer::new(library, Vocabulary::builtin());

    let gemini = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
        config.llm_timeout,
    )
    .expect("Failed to build HTTP client");
    if config.gemini_api_key.is_some() {
        tracing::info!(model = %config.gemini_model, "Gemini API configured");
    } else {
        tracing::warn!("GEMINI_API_KEY not found; model-backed features are disabled");
    }

    let port = config.port;
    let static_dir = config.static_dir.clone();
    let state = AppState::new(config, renderer, Arc::new(gemini));

    let mut app = api::router(state);
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }
    let app = app.layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to port {port}: {e}"));

    tracing::info!("LUKU backend listening on port {port}");
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
