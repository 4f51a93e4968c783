use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query},
    Json,
};
use serde::Serialize;

use crate::domains::offices::Office;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::filters::FilterParams;

#[derive(Serialize)]
pub struct OfficesResponse {
    pub offices: Vec<Office>,
}

/// GET /api/offices[?issues=a,b]
pub async fn list_offices_handler(
    Extension(state): Extension<AxumAppState>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<OfficesResponse>, ApiError> {
    let Query(params) = params?;
    let civic = &state.server_deps.civic;
    let offices = match params.issue_ids() {
        Some(issue_ids) => civic.offices_for_issues(&issue_ids).await?,
        None => civic.list_offices().await?,
    };
    Ok(Json(OfficesResponse { offices }))
}

/// GET /api/offices/:id
pub async fn get_office_handler(
    Extension(state): Extension<AxumAppState>,
    Path(id): Path<String>,
) -> Result<Json<Office>, ApiError> {
    state
        .server_deps
        .civic
        .get_office(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Office", id))
}
