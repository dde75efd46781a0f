use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use tikboard_orchestrator::{ConsolidatedResult, SummaryResult};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct DashboardQuery {
    pub user_id: Option<i64>,
}

fn user_filter(
    req_id: &RequestId,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Option<i64>, ApiError> {
    match query {
        Ok(Query(q)) => Ok(q.user_id),
        Err(rejection) => Err(ApiError::new(
            req_id.0.clone(),
            "bad_request",
            format!("invalid query: {}", rejection.body_text()),
        )),
    }
}

pub(super) async fn get_consolidated(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<ConsolidatedResult>, ApiError> {
    let user_id = user_filter(&req_id, query)?;
    Ok(Json(state.orchestrator.consolidate(user_id).await))
}

pub(super) async fn get_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<SummaryResult>, ApiError> {
    let user_id = user_filter(&req_id, query)?;
    Ok(Json(state.orchestrator.summary(user_id).await))
}
