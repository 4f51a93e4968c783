use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    Json,
};

use crate::domains::relationships::CivicData;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::filters::FilterParams;

/// GET /api/civic-data[?issues=a,b]
///
/// Everything a ballot screen needs in one consistent read.
pub async fn civic_data_handler(
    Extension(state): Extension<AxumAppState>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<CivicData>, ApiError> {
    let Query(params) = params?;
    let issue_ids = params.issue_ids();
    let data = state
        .server_deps
        .civic
        .civic_data(issue_ids.as_deref())
        .await?;
    Ok(Json(data))
}
