//! HTTP listener for server mode.
//!
//! Accepts combination requests over HTTP and runs each as a background
//! job on the runtime. The handler replies as soon as the job is accepted;
//! the caller learns the outcome through its callback URL.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;

use crate::config::{ServerConfig, StorageConfig};
use crate::error::Result;
use crate::job::{Job, JobRequest};
use crate::merge::PdfMerger;
use crate::notify::{LogNotifier, Notifier, WebhookNotifier};

/// Shared state handed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Storage configuration applied to every accepted job.
    pub storage: StorageConfig,
}

/// Body returned when a job is accepted.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// Human-readable acceptance message.
    pub response: String,
    /// Number of documents in the accepted job.
    pub documents: usize,
}

/// Body returned when a request is rejected.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// What was wrong with the request.
    pub error: String,
}

/// Liveness probe body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving.
    pub status: &'static str,
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(submit))
        .route("/health-check", get(health_check))
        .with_state(state)
}

/// Binds the listener and serves until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error when the address cannot be bound or the listener
/// fails while serving.
pub async fn serve(config: ServerConfig, storage: StorageConfig) -> Result<()> {
    let state = Arc::new(AppState { storage });
    let app = router(state);

    let listener = TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening for combination requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("listener stopped");

    Ok(())
}

/// Accepts a combination request and spawns it as a background job.
async fn submit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JobRequest>,
) -> std::result::Result<(StatusCode, Json<SubmitResponse>), (StatusCode, Json<ErrorResponse>)> {
    request.validate().map_err(bad_request)?;

    let notifier: Box<dyn Notifier> = match request.callback.as_deref() {
        Some(url) => Box::new(WebhookNotifier::new(url).map_err(bad_request)?),
        None => Box::new(LogNotifier::new()),
    };

    let documents = request.doc_list.len();
    let mut job = Job::new(request, state.storage.clone()).map_err(bad_request)?;

    tokio::spawn(async move {
        let combiner = PdfMerger::new();
        job.run(&combiner, notifier.as_ref()).await;
    });

    Ok((
        StatusCode::OK,
        Json(SubmitResponse {
            response: "ok, combination started".to_string(),
            documents,
        }),
    ))
}

/// Liveness probe.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

fn bad_request(err: impl std::fmt::Display) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Waits for a shutdown signal (SIGTERM or SIGINT/Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        } else {
            tracing::info!("received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                tracing::info!("received SIGTERM, shutting down");
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
