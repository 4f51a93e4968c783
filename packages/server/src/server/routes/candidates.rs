use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query},
    Json,
};
use serde::Serialize;

use crate::domains::candidates::Candidate;
use crate::domains::relationships::CandidateFilter;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::filters::FilterParams;

#[derive(Serialize)]
pub struct CandidatesResponse {
    pub candidates: Vec<Candidate>,
}

/// GET /api/candidates[?issues=a,b][&offices=x]
///
/// When both filters are given, `offices` wins and `issues` is ignored.
pub async fn list_candidates_handler(
    Extension(state): Extension<AxumAppState>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<CandidatesResponse>, ApiError> {
    let Query(params) = params?;
    let filter = CandidateFilter::from_parts(params.issue_ids(), params.office_ids());
    let candidates = state.server_deps.civic.filter_candidates(&filter).await?;
    Ok(Json(CandidatesResponse { candidates }))
}

/// GET /api/candidates/:id
pub async fn get_candidate_handler(
    Extension(state): Extension<AxumAppState>,
    Path(id): Path<String>,
) -> Result<Json<Candidate>, ApiError> {
    state
        .server_deps
        .civic
        .get_candidate(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Candidate", id))
}
