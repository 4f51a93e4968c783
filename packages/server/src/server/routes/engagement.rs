//! Append-only engagement endpoints.

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Extension, Query},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::engagement::{
    CompletionEvent, EmailSignup, NewCompletionEvent, NewEmailSignup, ReadinessStats,
};
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;

#[derive(Serialize)]
pub struct StoredResponse {
    pub success: bool,
    pub id: Uuid,
}

/// POST /api/user-completion
pub async fn record_completion_handler(
    Extension(state): Extension<AxumAppState>,
    body: Result<Json<NewCompletionEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredResponse>), ApiError> {
    let Json(input) = body?;
    let event = state.server_deps.engagement.record_completion(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(StoredResponse {
            success: true,
            id: event.id,
        }),
    ))
}

/// POST /api/email-signup
pub async fn record_email_signup_handler(
    Extension(state): Extension<AxumAppState>,
    body: Result<Json<NewEmailSignup>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredResponse>), ApiError> {
    let Json(input) = body?;
    let signup = state.server_deps.engagement.record_email_signup(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(StoredResponse {
            success: true,
            id: signup.id,
        }),
    ))
}

/// GET /api/readiness-stats
pub async fn readiness_stats_handler(
    Extension(state): Extension<AxumAppState>,
) -> Result<Json<ReadinessStats>, ApiError> {
    Ok(Json(state.server_deps.engagement.readiness_stats().await?))
}

#[derive(Debug, Deserialize)]
pub struct EngagementListParams {
    pub limit: Option<usize>,
    pub source: Option<String>,
}

#[derive(Serialize)]
pub struct CompletionsResponse {
    pub completions: Vec<CompletionEvent>,
}

/// GET /api/user-completions[?limit=N], newest first
pub async fn list_completions_handler(
    Extension(state): Extension<AxumAppState>,
    params: Result<Query<EngagementListParams>, QueryRejection>,
) -> Result<Json<CompletionsResponse>, ApiError> {
    let Query(params) = params?;
    let completions = state
        .server_deps
        .engagement
        .list_completions(params.limit)
        .await?;
    Ok(Json(CompletionsResponse { completions }))
}

#[derive(Serialize)]
pub struct EmailSignupsResponse {
    pub email_signups: Vec<EmailSignup>,
}

/// GET /api/email-signups[?limit=N][&source=cast], newest first
pub async fn list_email_signups_handler(
    Extension(state): Extension<AxumAppState>,
    params: Result<Query<EngagementListParams>, QueryRejection>,
) -> Result<Json<EmailSignupsResponse>, ApiError> {
    let Query(params) = params?;
    let email_signups = state
        .server_deps
        .engagement
        .list_email_signups(params.limit, params.source.as_deref())
        .await?;
    Ok(Json(EmailSignupsResponse { email_signups }))
}
