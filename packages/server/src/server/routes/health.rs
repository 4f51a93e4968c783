use axum::{extract::Extension, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::app::AxumAppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    message: String,
    backend: BackendHealth,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct BackendHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Probes the civic store. Returns 200 OK when it answers within five seconds,
/// 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AxumAppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let backend = match tokio::time::timeout(
        std::time::Duration::from_secs(5),
        state.server_deps.civic.ping(),
    )
    .await
    {
        Ok(Ok(())) => BackendHealth {
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(e)) => BackendHealth {
            status: "error".to_string(),
            error: Some(format!("Probe failed: {}", e)),
        },
        Err(_) => BackendHealth {
            status: "error".to_string(),
            error: Some("Probe timeout (>5s)".to_string()),
        },
    };

    let is_healthy = backend.status == "ok";

    let (status_code, status, message) = if is_healthy {
        (StatusCode::OK, "healthy", "Flint Spark backend is running")
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "unhealthy",
            "Flint Spark backend cannot reach its data store",
        )
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            message: message.to_string(),
            backend,
            timestamp: Utc::now(),
        }),
    )
}
