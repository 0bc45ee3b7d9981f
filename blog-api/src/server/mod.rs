use crate::server::json::Json;
use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{FormRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::typed_header::TypedHeaderRejection;
use blog_common::model::{
    Id,
    category::CategoryMarker,
    post::PostMarker,
    session::{SessionTokenDecodeError, SessionTokenHashError},
};
use blog_db::client::{DbClient, DbError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

mod auth;
mod form;
mod json;
mod routes;

pub type ServerRouter = Router<ServerState>;

/// Where the external login flow lives; unauthenticated requests to
/// protected routes are sent here.
pub const LOGIN_PATH: &str = "/login";

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming form rejected: {0}")]
    FormRejection(#[from] FormRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Authorization header was missing or invalid: {0}")]
    InvalidAuthorizationHeader(TypedHeaderRejection),
    #[error("The provided session token could not be decoded: {0}")]
    InvalidSessionToken(#[from] SessionTokenDecodeError),
    #[error("The session token could not be hashed: {0}")]
    SessionTokenHash(#[from] SessionTokenHashError),
    #[error("No live session matched the provided token")]
    UnknownSession,
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error("Category with id {0} was not found.")]
    CategoryByIdNotFound(Id<CategoryMarker>),
    #[error("Page {0} is out of range.")]
    PageOutOfRange(u64),
}

impl ServerError {
    /// Failures that mean "nobody is logged in", as opposed to a broken
    /// request or a broken server.
    fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidAuthorizationHeader(_)
                | ServerError::InvalidSessionToken(_)
                | ServerError::UnknownSession
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_)
            | ServerError::CategoryByIdNotFound(_)
            | ServerError::PageOutOfRange(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidAuthorizationHeader(_)
            | ServerError::InvalidSessionToken(_)
            | ServerError::UnknownSession => StatusCode::SEE_OTHER,
            ServerError::FormRejection(_) => StatusCode::BAD_REQUEST,
            ServerError::JsonResponse(_)
            | ServerError::Database(_)
            | ServerError::SessionTokenHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
struct ErrorResponse {
    status: u16,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if self.is_unauthenticated() {
            debug!(reason = %self, "Redirecting unauthenticated request to login");
            return Redirect::to(LOGIN_PATH).into_response();
        }

        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
        };
        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use crate::server::{self, LOGIN_PATH, ServerState};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use blog_db::client::DbClient;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> axum::Router {
        let db_client = Arc::new(
            DbClient::connect_lazy("postgres://localhost/blog").expect("valid database url"),
        );
        server::routes().with_state(ServerState { db_client })
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let request = Request::builder()
            .uri("/no-such-route")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn protected_routes_redirect_anonymous_callers_to_login() {
        let protected = [
            ("GET", "/dashboard"),
            ("GET", "/posts/new"),
            ("POST", "/posts/new"),
            ("POST", "/posts/1"),
            ("GET", "/posts/1/edit"),
            ("POST", "/posts/1/edit"),
            ("GET", "/posts/1/delete"),
            ("POST", "/posts/1/delete"),
        ];

        for (method, path) in protected {
            let request = Request::builder()
                .method(method)
                .uri(path)
                .body(Body::empty())
                .unwrap();

            let response = test_app().oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{method} {path}");
            assert_eq!(
                response.headers()[header::LOCATION],
                LOGIN_PATH,
                "{method} {path}"
            );
        }
    }

    #[tokio::test]
    async fn garbled_bearer_token_redirects_to_login() {
        let request = Request::builder()
            .uri("/dashboard")
            .header(header::AUTHORIZATION, "Bearer not-a-session-token")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], LOGIN_PATH);
    }

    #[tokio::test]
    async fn page_zero_is_not_found() {
        let request = Request::builder()
            .uri("/?page=0")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_numeric_page_is_a_bad_request() {
        let request = Request::builder()
            .uri("/?page=first")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
