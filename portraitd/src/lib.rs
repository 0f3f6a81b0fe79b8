//! Portrait transform gateway.
//!
//! `portraitd` exposes a single transform endpoint: a JPEG headshot arrives
//! as a multipart upload, travels to the Gemini `generateContent` API with a
//! fixed portrait instruction, and the first image part of the response
//! returns to the caller as a PNG data URI.
//!
//! The gateway is stateless: nothing is cached or persisted, each request is
//! handled independently end to end, and the upstream call is the only
//! suspension point. If a client disconnects mid-call, the upstream result
//! is simply dropped with the request task.

pub mod api;
pub mod config;
pub mod errors;
pub mod gemini;
pub mod openapi;
pub mod telemetry;
pub mod upload;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, warn};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

pub use config::Config;
use gemini::GeminiClient;

/// Application state shared across all request handlers.
///
/// Holds only immutable configuration and the upstream client. There is no
/// shared mutable state between requests, so no locks either.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Present when a credential was configured at startup; otherwise every
    /// transform request fails with a configuration error.
    pub gemini: Option<Arc<GeminiClient>>,
}

impl AppState {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let gemini = GeminiClient::from_config(&config.gemini)?.map(Arc::new);
        if gemini.is_none() {
            warn!("No upstream API key configured; transform requests will fail until GEMINI_API_KEY is set");
        }
        Ok(Self { config, gemini })
    }
}

pub fn build_router(state: AppState) -> Router {
    // Multipart framing adds overhead beyond the image itself, so the body
    // limit sits above the validator's ceiling; the validator produces the
    // user-facing rejection.
    let body_limit = state.config.upload.max_file_size as usize + 1024 * 1024;

    Router::new()
        .route(
            "/api/transform-image",
            post(api::handlers::transform::transform_image).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/health", get(api::handlers::transform::health))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", openapi::ApiDoc::openapi()).path("/docs"))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Main application struct that owns the router and configuration.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] builds the upstream client and router
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles requests
///    until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let state = AppState::from_config(config.clone())?;
        let router = build_router(state);
        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Portrait gateway listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
