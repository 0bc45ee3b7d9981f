use crate::server::{ServerError, json::Json};
use axum::{
    Form as AxumForm,
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use blog_common::form::FormErrors;
use serde::Serialize;

/// Urlencoded form body that routes deserialization failures through
/// [`ServerError`].
#[derive(FromRequest, Debug, Clone, Copy, Default)]
#[from_request(via(AxumForm), rejection(ServerError))]
pub struct Form<T>(pub T);

#[derive(Clone, Debug, Serialize)]
struct InvalidForm<'a, F> {
    values: &'a F,
    errors: &'a FormErrors,
}

/// The re-render context for a failed submission: the submitted values echoed
/// back together with the field errors.
pub fn invalid<F: Serialize>(values: &F, errors: &FormErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(InvalidForm { values, errors }),
    )
        .into_response()
}
