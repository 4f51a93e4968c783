use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query},
    Json,
};
use serde::Serialize;

use crate::domains::ballot_measures::BallotMeasure;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::filters::FilterParams;

#[derive(Serialize)]
pub struct BallotMeasuresResponse {
    pub ballot_measures: Vec<BallotMeasure>,
}

/// GET /api/ballot-measures[?issues=a,b]
pub async fn list_ballot_measures_handler(
    Extension(state): Extension<AxumAppState>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<BallotMeasuresResponse>, ApiError> {
    let Query(params) = params?;
    let civic = &state.server_deps.civic;
    let ballot_measures = match params.issue_ids() {
        Some(issue_ids) => civic.measures_for_issues(&issue_ids).await?,
        None => civic.list_ballot_measures().await?,
    };
    Ok(Json(BallotMeasuresResponse { ballot_measures }))
}

/// GET /api/ballot-measures/:id
pub async fn get_ballot_measure_handler(
    Extension(state): Extension<AxumAppState>,
    Path(id): Path<String>,
) -> Result<Json<BallotMeasure>, ApiError> {
    state
        .server_deps
        .civic
        .get_ballot_measure(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Ballot measure", id))
}
