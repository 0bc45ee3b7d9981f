use crate::server::{Result, ServerError, ServerRouter, json::Json};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use blog_common::model::{
    Id,
    category::{Category, CategoryMarker},
    post::Post,
};
use blog_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(show_category)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/categories/{id}", rejection(ServerError))]
pub(crate) struct CategoryPath {
    pub id: Id<CategoryMarker>,
}

#[derive(Clone, Debug, Serialize)]
struct CategoryPosts {
    category: Category,
    posts: Vec<Post>,
}

/// Every post in the category, unpaginated.
async fn show_category(
    CategoryPath { id }: CategoryPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<CategoryPosts>> {
    let category = db
        .fetch_category(id)
        .await?
        .ok_or(ServerError::CategoryByIdNotFound(id))?;
    let posts = db.fetch_posts_in_category(id).await?;

    Ok(Json(CategoryPosts { category, posts }))
}
