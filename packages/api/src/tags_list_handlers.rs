// ABOUTME: AJAX autocomplete endpoint for tag names
// ABOUTME: Returns names containing a query substring as {"tags": [...]}

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use tagging_tags::TagFilter;

use crate::db::DbState;
use crate::error::{ApiResult, AppError};

/// Number of names returned when `limit` is absent or unusable
pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TagsListResponse {
    pub tags: Vec<String>,
}

/// Whether the request was made by client-side script
pub fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "XMLHttpRequest")
}

/// Search every tag
pub async fn tags_list(
    State(db): State<DbState>,
    headers: HeaderMap,
    params: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> ApiResult<Json<TagsListResponse>> {
    search(&db, &headers, params, TagFilter::default()).await
}

/// Search tags used on records of one content type
pub async fn tags_list_for_model(
    State(db): State<DbState>,
    Path(content_type): Path<String>,
    headers: HeaderMap,
    params: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> ApiResult<Json<TagsListResponse>> {
    let filter = TagFilter {
        content_type: Some(content_type),
    };
    search(&db, &headers, params, filter).await
}

async fn search(
    db: &DbState,
    headers: &HeaderMap,
    params: Result<Query<HashMap<String, String>>, QueryRejection>,
    filter: TagFilter,
) -> ApiResult<Json<TagsListResponse>> {
    if !is_ajax(headers) {
        return Err(AppError::not_found());
    }

    // Unparseable parameters count as absent
    let params = params.map(|Query(params)| params).unwrap_or_default();
    let query = params.get("query").map(String::as_str).unwrap_or_default();
    let limit = parse_limit(params.get("limit").map(String::as_str));

    debug!("Tag search (query: '{}', limit: {}, filter: {:?})", query, limit, filter);

    let tags = if query.is_empty() {
        Vec::new()
    } else {
        db.tag_storage.search_by_name(query, &filter, limit).await?
    };

    Ok(Json(TagsListResponse { tags }))
}

fn parse_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("3")), 3);
        assert_eq!(parse_limit(Some(" 7 ")), 7);
        assert_eq!(parse_limit(Some("lots")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("0")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some("-2")), DEFAULT_LIMIT);
    }

    #[test]
    fn test_is_ajax() {
        let mut headers = HeaderMap::new();
        assert!(!is_ajax(&headers));

        headers.insert("X-Requested-With", HeaderValue::from_static("fetch"));
        assert!(!is_ajax(&headers));

        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
        assert!(is_ajax(&headers));
    }
}
