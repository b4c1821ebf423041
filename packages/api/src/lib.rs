// ABOUTME: HTTP API layer for the tagging service providing endpoints and routing
// ABOUTME: AJAX tag search, tagged-object list views, and tag administration

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod db;
pub mod error;
pub mod health;
pub mod pagination;
pub mod response;
pub mod tagged_object_list;
pub mod tags_handlers;
pub mod tags_list_handlers;

pub use db::DbState;
pub use error::{ApiResult, AppError};
pub use tagged_object_list::{TaggedObjectList, TaggedObjectListContext};
pub use tags_list_handlers::{TagsListResponse, DEFAULT_LIMIT};

/// Creates the tagging router. Each list view is mounted at `/tagged/{mount}`.
pub fn create_router(state: DbState, list_views: Vec<(String, TaggedObjectList)>) -> Router {
    let mut router = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/tags_list", get(tags_list_handlers::tags_list))
        .route(
            "/tags_list/{content_type}",
            get(tags_list_handlers::tags_list_for_model),
        )
        .route(
            "/tags",
            get(tags_handlers::list_tags).post(tags_handlers::create_tag),
        )
        .route("/tags/{tag_id}", delete(tags_handlers::delete_tag))
        .route(
            "/objects/{content_type}/{object_id}/tags",
            get(tags_handlers::get_object_tags).put(tags_handlers::update_object_tags),
        )
        .route(
            "/models/{content_type}/tags",
            get(tags_handlers::model_usage),
        );

    for (mount, view) in list_views {
        let path = format!("/tagged/{}", mount.trim_matches('/'));
        router = router.nest(&path, view.router());
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
