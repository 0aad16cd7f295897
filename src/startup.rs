//! Application startup and lifecycle management.

use crate::config::AnswerConfig;
use crate::error::AppError;
use crate::handlers::{answer, not_found, status};
use crate::middleware::{cors_middleware, request_id_middleware, REQUEST_ID_HEADER};
use crate::services::providers::openai::OpenAiProvider;
use crate::services::providers::CompletionProvider;
use axum::{
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AnswerConfig,
    pub provider: Arc<dyn CompletionProvider>,
}

/// Assemble the router with the full middleware stack.
///
/// Unmatched methods on known paths fall back to the 404 catalog as well,
/// so every unrouted method/path pair gets the same response shape.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status).fallback(not_found))
        .route("/answer", post(answer).fallback(not_found))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(from_fn(cors_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let headers = request.headers();
                let header = |name: &str| {
                    headers
                        .get(name)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-")
                };
                let client_ip = headers
                    .get("x-forwarded-for")
                    .or_else(|| headers.get("x-real-ip"))
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %header(REQUEST_ID_HEADER),
                    method = %request.method(),
                    uri = %request.uri(),
                    client_ip = %client_ip,
                    content_type = %header("content-type"),
                    user_agent = %header("user-agent"),
                    origin = %header("origin"),
                    referer = %header("referer"),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Convert a handler panic into the standard JSON error response.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(details = %details, "Request handler panicked");
    AppError::Internal(anyhow::anyhow!(details)).into_response()
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Bind the listener and assemble shared state (port 0 = random port for
    /// testing).
    pub async fn build(config: AnswerConfig) -> Result<Self, AppError> {
        let provider: Arc<dyn CompletionProvider> =
            Arc::new(OpenAiProvider::new(config.upstream.clone()));

        tracing::info!(
            base_url = %config.upstream.base_url,
            model = %config.upstream.model,
            system_prompt_len = config.upstream.system_prompt.len(),
            "Initialized chat completion provider"
        );

        let state = AppState { config, provider };

        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.server.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        tracing::info!("AI question bank server listening on port {}", self.port);
        axum::serve(self.listener, router).await
    }
}
