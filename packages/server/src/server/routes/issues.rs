//! Issue routes: listing, social-proof counts and the increment/reset writes.

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::IssueId;
use crate::domains::issues::{FrequencyExport, Issue, IssueFrequencies};
use crate::kernel::IncrementOutcome;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;

const DEFAULT_TOP_LIMIT: usize = 5;

#[derive(Serialize)]
pub struct IssuesResponse {
    pub issues: Vec<Issue>,
    pub total_users: i64,
}

/// GET /api/issues
pub async fn list_issues_handler(
    Extension(state): Extension<AxumAppState>,
) -> Result<Json<IssuesResponse>, ApiError> {
    let snapshot = state.server_deps.civic.snapshot().await?;
    Ok(Json(IssuesResponse {
        issues: snapshot.catalog.issues(),
        total_users: snapshot.total_participants,
    }))
}

/// GET /api/issues/frequencies
pub async fn issue_frequencies_handler(
    Extension(state): Extension<AxumAppState>,
) -> Result<Json<IssueFrequencies>, ApiError> {
    Ok(Json(state.server_deps.civic.issue_frequencies().await?))
}

#[derive(Debug, Deserialize)]
pub struct TopIssuesParams {
    pub limit: Option<usize>,
}

/// GET /api/issues/top?limit=N
pub async fn top_issues_handler(
    Extension(state): Extension<AxumAppState>,
    params: Result<Query<TopIssuesParams>, QueryRejection>,
) -> Result<Json<IssuesResponse>, ApiError> {
    let Query(params) = params?;
    let snapshot = state.server_deps.civic.snapshot().await?;
    let limit = params.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    Ok(Json(IssuesResponse {
        issues: Issue::rank_by_count(snapshot.catalog.issues(), limit),
        total_users: snapshot.total_participants,
    }))
}

/// GET /api/issues/export
pub async fn export_issues_handler(
    Extension(state): Extension<AxumAppState>,
) -> Result<Json<FrequencyExport>, ApiError> {
    Ok(Json(state.server_deps.civic.export().await?))
}

/// GET /api/issues/:id
pub async fn get_issue_handler(
    Extension(state): Extension<AxumAppState>,
    Path(id): Path<String>,
) -> Result<Json<Issue>, ApiError> {
    state
        .server_deps
        .civic
        .get_issue(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Issue", id))
}

#[derive(Debug, Deserialize)]
pub struct IncrementBody {
    #[serde(default, alias = "issueIds")]
    pub issue_ids: Vec<IssueId>,
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WriteResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_issues: Option<Vec<IssueId>>,
}

/// POST /api/issues/increment
///
/// 200 with `success: true` when counts moved, 409 for a participant already
/// counted, 200 with `success: false` when no requested issue exists.
pub async fn increment_issues_handler(
    Extension(state): Extension<AxumAppState>,
    body: Result<Json<IncrementBody>, JsonRejection>,
) -> Result<(StatusCode, Json<WriteResponse>), ApiError> {
    let Json(body) = body?;

    let outcome = state
        .server_deps
        .civic
        .increment_issue_counts(&body.issue_ids, body.user_id.as_deref())
        .await?;

    let response = match outcome {
        IncrementOutcome::Applied { incremented } => (
            StatusCode::OK,
            WriteResponse {
                success: true,
                message: "Issue counts updated successfully".to_string(),
                updated_issues: Some(incremented),
            },
        ),
        IncrementOutcome::DuplicateParticipant => (
            StatusCode::CONFLICT,
            WriteResponse {
                success: false,
                message: "This participant has already been counted".to_string(),
                updated_issues: None,
            },
        ),
        IncrementOutcome::NoIssuesResolved => (
            StatusCode::OK,
            WriteResponse {
                success: false,
                message: "None of the requested issues exist".to_string(),
                updated_issues: Some(vec![]),
            },
        ),
    };

    Ok((response.0, Json(response.1)))
}

/// POST /api/issues/reset
pub async fn reset_issues_handler(
    Extension(state): Extension<AxumAppState>,
) -> Result<Json<WriteResponse>, ApiError> {
    state.server_deps.civic.reset().await?;
    Ok(Json(WriteResponse {
        success: true,
        message: "All issue counts have been reset to demo values".to_string(),
        updated_issues: None,
    }))
}
