use adlens_core::ScoredAd;
use adlens_scoring::{spawn_pattern_refresh, SuccessStore};
use adlens_source::SourceError;
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_store_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

const DEFAULT_SEARCH_LIMIT: i64 = 25;
const MAX_SEARCH_LIMIT: i64 = 100;
const DEFAULT_PAGE_LIMIT: i64 = 50;
const MAX_PAGE_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResults {
    pub query: String,
    pub count: usize,
    /// How many of `items` met the success threshold and were stored.
    pub persisted: usize,
    pub items: Vec<ScoredAd>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct PaginatedAds {
    pub items: Vec<ScoredAd>,
    pub total: u64,
    pub limit: i64,
    pub offset: i64,
}

fn map_source_error(request_id: String, error: &SourceError) -> ApiError {
    match error {
        SourceError::RateLimited { retry_after_secs } => {
            tracing::warn!(retry_after_secs = ?retry_after_secs, "ad library rate limit exhausted");
            ApiError::new(request_id, "rate_limited", "ad library rate limit reached, retry later")
        }
        SourceError::InvalidRequest(message) => {
            ApiError::new(request_id, "validation_error", message.clone())
        }
        other => {
            tracing::error!(error = %other, "ad library request failed");
            ApiError::new(request_id, "upstream_error", "ad library request failed")
        }
    }
}

/// Fetch ads for `q`, score them, store the successful ones and refresh
/// patterns in the background. Results are sorted by score, best first.
pub(super) async fn search_ads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<SearchResults>>, ApiError> {
    let keyword = query.q.as_deref().map(str::trim).unwrap_or_default();
    if keyword.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "query parameter `q` is required",
        ));
    }
    let Some(source) = state.source.as_ref() else {
        return Err(ApiError::new(
            req_id.0,
            "source_unavailable",
            "ad library access is not configured",
        ));
    };

    let limit = normalize_limit(query.limit, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT);
    let raw_ads = source
        .search_ads(keyword, usize::try_from(limit).unwrap_or(1))
        .await
        .map_err(|e| map_source_error(req_id.0.clone(), &e))?;

    let scorer = state.scorer();
    let mut items = scorer.score_batch(&raw_ads).await;
    items.sort_by(|a, b| b.success_score.cmp(&a.success_score));
    let persisted = scorer.persist_successful(&items).await;

    spawn_pattern_refresh(state.pattern_store());

    tracing::info!(
        keyword,
        fetched = items.len(),
        persisted,
        "search scored"
    );

    Ok(Json(ApiResponse {
        data: SearchResults {
            query: keyword.to_owned(),
            count: items.len(),
            persisted,
            items,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_successful_ads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<PaginatedAds>>, ApiError> {
    let limit = normalize_limit(query.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);

    let (items, total) = state
        .store()
        .list_successful(
            usize::try_from(limit).unwrap_or(1),
            usize::try_from(offset).unwrap_or(0),
        )
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: PaginatedAds {
            items,
            total,
            limit,
            offset,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
