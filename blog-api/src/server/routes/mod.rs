use crate::server::ServerRouter;
use axum::Router;

mod categories;
mod dashboard;
mod posts;

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(posts::routes())
        .merge(categories::routes())
        .merge(dashboard::routes())
}
