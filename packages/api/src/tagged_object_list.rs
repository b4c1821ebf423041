// ABOUTME: List view of the records carrying a given tag
// ABOUTME: Resolves the tag, filters the configured model or queryset, adds related tags

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use tagging_tags::{CountedTag, ObjectSource, Tag, TagStorage, TaggedObject};

use crate::db::DbState;
use crate::error::{ApiResult, AppError};
use crate::pagination::{PageQuery, PaginationMeta, PaginationParams};

/// Configuration of a tagged-object list view.
///
/// `source` names the records to filter: every record of a content type, or
/// an explicit subset. `tag` presets the tag when the URL does not carry one.
/// With `related_tags`, the response also lists tags that co-occur with the
/// tag on the same records, with counts unless `related_tag_counts` is off.
#[derive(Debug, Clone)]
pub struct TaggedObjectList {
    pub tag: Option<String>,
    pub source: Option<ObjectSource>,
    pub related_tags: bool,
    pub related_tag_counts: bool,
    pub paginate_by: Option<i64>,
}

impl Default for TaggedObjectList {
    fn default() -> Self {
        Self {
            tag: None,
            source: None,
            related_tags: false,
            related_tag_counts: true,
            paginate_by: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaggedObjectListContext {
    pub tag: Tag,
    pub object_list: Vec<TaggedObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_tags: Option<Vec<CountedTag>>,
}

impl TaggedObjectList {
    pub fn for_model(content_type: impl Into<String>) -> Self {
        Self {
            source: Some(ObjectSource::Model(content_type.into())),
            ..Self::default()
        }
    }

    pub fn for_queryset(content_type: impl Into<String>, object_ids: Vec<String>) -> Self {
        Self {
            source: Some(ObjectSource::Queryset {
                content_type: content_type.into(),
                object_ids,
            }),
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_related_tags(mut self, counts: bool) -> Self {
        self.related_tags = true;
        self.related_tag_counts = counts;
        self
    }

    pub fn paginate_by(mut self, page_size: i64) -> Self {
        self.paginate_by = Some(page_size);
        self
    }

    /// Resolve the tag from the URL, falling back to the preset one
    pub async fn get_tag(
        &self,
        storage: &TagStorage,
        kwargs_tag: Option<&str>,
    ) -> ApiResult<Tag> {
        let ident = kwargs_tag.or(self.tag.as_deref()).ok_or_else(|| {
            AppError::improperly_configured("TaggedObjectList must be called with a tag.")
        })?;

        storage
            .get_tag(ident)
            .await?
            .ok_or_else(|| AppError::not_found_with(format!("No Tag found matching \"{}\".", ident)))
    }

    pub fn get_queryset_or_model(&self) -> ApiResult<&ObjectSource> {
        self.source.as_ref().ok_or_else(|| {
            AppError::improperly_configured(
                "TaggedObjectList is missing a QuerySet. Define TaggedObjectList.model, \
                 TaggedObjectList.queryset, or override TaggedObjectList.get_queryset_or_model().",
            )
        })
    }

    /// Records from the configured source carrying `tag`, and how many there are
    pub async fn get_queryset(
        &self,
        storage: &TagStorage,
        tag: &Tag,
        pagination: Option<&PaginationParams>,
    ) -> ApiResult<(Vec<TaggedObject>, i64)> {
        let source = self.get_queryset_or_model()?;
        let (limit, offset) = match pagination {
            Some(params) => {
                let offset = params
                    .offset()
                    .ok_or_else(|| AppError::not_found_with("Invalid page."))?;
                (Some(params.limit()), Some(offset))
            }
            None => (None, None),
        };

        let result = storage
            .get_by_model(source, std::slice::from_ref(tag), limit, offset)
            .await?;
        Ok(result)
    }

    pub async fn get_context_data(
        &self,
        storage: &TagStorage,
        kwargs_tag: Option<&str>,
        page: Option<i64>,
    ) -> ApiResult<TaggedObjectListContext> {
        let source = self.get_queryset_or_model()?;
        let tag = self.get_tag(storage, kwargs_tag).await?;

        let pagination = self
            .paginate_by
            .map(|page_size| PaginationParams::new(page.unwrap_or(1), page_size));

        let (object_list, total) = self.get_queryset(storage, &tag, pagination.as_ref()).await?;

        let pagination = match pagination {
            Some(params) => {
                let meta = PaginationMeta::new(&params, total);
                if meta.is_out_of_range() {
                    return Err(AppError::not_found_with("Invalid page."));
                }
                Some(meta)
            }
            None => None,
        };

        let related_tags = if self.related_tags {
            Some(
                storage
                    .related_for_model(
                        std::slice::from_ref(&tag),
                        source.content_type(),
                        self.related_tag_counts,
                        None,
                    )
                    .await?,
            )
        } else {
            None
        };

        Ok(TaggedObjectListContext {
            tag,
            object_list,
            pagination,
            related_tags,
        })
    }

    /// Router serving this view at `/` (preset tag) and `/{tag}`
    pub fn router(self) -> Router<DbState> {
        Router::new()
            .route("/", get(tagged_object_list_preset))
            .route("/{tag}", get(tagged_object_list))
            .layer(Extension(Arc::new(self)))
    }
}

fn page_number(params: Result<Query<PageQuery>, QueryRejection>) -> ApiResult<Option<i64>> {
    match params {
        Ok(Query(query)) => Ok(query.page),
        Err(_) => Err(AppError::not_found_with("Invalid page.")),
    }
}

pub async fn tagged_object_list(
    State(db): State<DbState>,
    Extension(view): Extension<Arc<TaggedObjectList>>,
    Path(tag): Path<String>,
    params: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<TaggedObjectListContext>> {
    info!("Listing objects tagged with: {}", tag);

    let page = page_number(params)?;
    let context = view
        .get_context_data(&db.tag_storage, Some(&tag), page)
        .await?;
    Ok(Json(context))
}

pub async fn tagged_object_list_preset(
    State(db): State<DbState>,
    Extension(view): Extension<Arc<TaggedObjectList>>,
    params: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<TaggedObjectListContext>> {
    let page = page_number(params)?;
    let context = view.get_context_data(&db.tag_storage, None, page).await?;
    Ok(Json(context))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let view = TaggedObjectList::default();
        assert!(view.tag.is_none());
        assert!(!view.related_tags);
        assert!(view.related_tag_counts);
        assert!(view.paginate_by.is_none());
    }

    #[test]
    fn test_missing_source_is_improperly_configured() {
        let view = TaggedObjectList::default();
        assert!(matches!(
            view.get_queryset_or_model(),
            Err(AppError::ImproperlyConfigured(_))
        ));
    }

    #[test]
    fn test_builders() {
        let view = TaggedObjectList::for_queryset("article", vec!["1".to_string()])
            .with_tag("rust")
            .with_related_tags(false)
            .paginate_by(5);

        assert_eq!(view.get_queryset_or_model().unwrap().content_type(), "article");
        assert_eq!(view.tag.as_deref(), Some("rust"));
        assert!(view.related_tags);
        assert!(!view.related_tag_counts);
        assert_eq!(view.paginate_by, Some(5));
    }

    #[test]
    fn test_invalid_page_is_not_found() {
        let rejection = Query::<PageQuery>::try_from_uri(&"/?page=abc".parse().unwrap());
        assert!(rejection.is_err());
        assert!(matches!(
            page_number(rejection),
            Err(AppError::NotFound(Some(_)))
        ));
    }
}
