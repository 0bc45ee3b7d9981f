use crate::server::{Result, ServerError, ServerRouter, auth::AuthenticatedUser, json::Json};
use axum::extract::{Query, State};
use axum_extra::routing::{RouterExt, TypedPath};
use blog_common::{model::post::Post, page::Page, page::PageSize};
use blog_db::client::DbClient;
use serde::Deserialize;
use std::sync::Arc;

use super::posts::{ListQuery, load_post_page};

/// The dashboard shows one more post per page than the public index.
pub(crate) const DASHBOARD_PAGE_SIZE: PageSize = PageSize::new_unchecked(4);

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_get(dashboard)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/dashboard", rejection(ServerError))]
pub(crate) struct DashboardPath();

async fn dashboard(
    DashboardPath(): DashboardPath,
    Query(query): Query<ListQuery>,
    State(db): State<Arc<DbClient>>,
    _user: AuthenticatedUser,
) -> Result<Json<Page<Post>>> {
    let page = load_post_page(&db, query, DASHBOARD_PAGE_SIZE).await?;

    Ok(Json(page))
}
