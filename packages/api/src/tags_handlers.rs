// ABOUTME: HTTP request handlers for tag administration and object tagging
// ABOUTME: Validates submissions with the tag form fields before touching storage

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use tagging_core::ValidationError;
use tagging_tags::{
    parse_tag_input, TagAdminForm, TagCreateInput, TagField, TagFieldMultiSelect,
};

use crate::db::DbState;
use crate::error::ApiResult;
use crate::response::ApiResponse;

/// List all tags
pub async fn list_tags(State(db): State<DbState>) -> ApiResult<impl IntoResponse> {
    let tags = db.tag_storage.list_tags().await?;
    Ok(Json(ApiResponse::success(tags)))
}

/// Create a tag from the admin form
pub async fn create_tag(
    State(db): State<DbState>,
    Json(form): Json<TagAdminForm>,
) -> ApiResult<impl IntoResponse> {
    let cleaned = form.clean_name(db.settings())?;
    let name = parse_tag_input(&cleaned)
        .into_iter()
        .next()
        .ok_or_else(|| ValidationError::required("name"))?;

    info!("Creating tag: {}", name);

    let tag = db.tag_storage.create_tag(TagCreateInput { name }).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(tag))))
}

/// Delete a tag and detach it from every record
pub async fn delete_tag(
    State(db): State<DbState>,
    Path(tag_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Deleting tag: {}", tag_id);

    db.tag_storage.delete_tag(&tag_id).await?;
    Ok(Json(ApiResponse::success("Tag deleted successfully")))
}

/// Tags attached to a record
pub async fn get_object_tags(
    State(db): State<DbState>,
    Path((content_type, object_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let tags = db
        .tag_storage
        .get_for_object(&content_type, &object_id)
        .await?;
    Ok(Json(ApiResponse::success(tags)))
}

/// Submitted tags: a tag string from a text input, or the values picked in
/// the multi-select widget
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    Text(String),
    Selected(Vec<String>),
}

/// Request body for replacing a record's tags
#[derive(Debug, Deserialize)]
pub struct UpdateObjectTagsRequest {
    #[serde(default)]
    pub tags: Option<TagsInput>,
}

/// Replace the tags on a record
pub async fn update_object_tags(
    State(db): State<DbState>,
    Path((content_type, object_id)): Path<(String, String)>,
    Json(request): Json<UpdateObjectTagsRequest>,
) -> ApiResult<impl IntoResponse> {
    let settings = db.settings();

    let cleaned = match &request.tags {
        Some(TagsInput::Selected(values)) => TagFieldMultiSelect::new("tags", settings)
            .optional()
            .clean(values)?,
        Some(TagsInput::Text(text)) => TagField::new("tags", settings)
            .optional()
            .clean(Some(text.as_str()))?,
        None => TagField::new("tags", settings).optional().clean(None)?,
    };

    info!("Updating tags for {}:{}", content_type, object_id);

    let tags = db
        .tag_storage
        .update_tags(&content_type, &object_id, &cleaned)
        .await?;
    Ok(Json(ApiResponse::success(tags)))
}

#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    pub min_count: Option<i64>,
}

/// Tags used on a content type, with how many records carry each
pub async fn model_usage(
    State(db): State<DbState>,
    Path(content_type): Path<String>,
    Query(params): Query<UsageQuery>,
) -> ApiResult<impl IntoResponse> {
    let usage = db
        .tag_storage
        .usage_for_model(&content_type, true, params.min_count)
        .await?;
    Ok(Json(ApiResponse::success(usage)))
}
