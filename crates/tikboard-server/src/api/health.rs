use std::collections::BTreeMap;

use axum::{extract::State, Json};
use tikboard_core::Upstream;
use tikboard_orchestrator::HealthStatus;

use super::AppState;

pub(super) async fn services_health(
    State(state): State<AppState>,
) -> Json<BTreeMap<Upstream, HealthStatus>> {
    Json(state.orchestrator.probe().await)
}
