use adlens_core::PatternReport;
use adlens_scoring::PatternSource;
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct PatternsQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct PatternsData {
    #[serde(flatten)]
    pub report: PatternReport,
    pub source: PatternSource,
}

/// Current pattern report. Always succeeds; an empty report means there is
/// not enough data yet.
pub(super) async fn get_patterns(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PatternsQuery>,
) -> Json<ApiResponse<PatternsData>> {
    let (report, source) = state.pattern_store().resolve(query.refresh).await;

    Json(ApiResponse {
        data: PatternsData { report, source },
        meta: ResponseMeta::new(req_id.0),
    })
}
