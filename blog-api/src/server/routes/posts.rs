use crate::server::{
    Result, ServerError, ServerRouter,
    auth::AuthenticatedUser,
    form::{self, Form},
    json::Json,
};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::routing::{RouterExt, TypedPath};
use blog_common::{
    form::{CommentForm, FormErrors, PostForm},
    model::{
        Id,
        category::{Category, CategoryMarker},
        comment::{Comment, CreateComment},
        post::{CreatePost, Post, PostMarker, UpdatePost},
    },
    page::{Page, PageNumber, PageSize},
};
use blog_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::UtcDateTime;

use super::dashboard::DashboardPath;

/// Public index page size. The dashboard uses its own.
pub(crate) const HOME_PAGE_SIZE: PageSize = PageSize::new_unchecked(3);

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(home)
        .typed_get(new_post_form)
        .typed_post(create_post)
        .typed_get(show_post)
        .typed_post(submit_comment)
        .typed_get(edit_post_form)
        .typed_post(update_post)
        .typed_get(confirm_delete_post)
        .typed_post(delete_post)
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Deserialize)]
pub(crate) struct ListQuery {
    pub page: Option<u64>,
}

/// Shared by the public index and the dashboard, which differ only in page
/// size and rendering.
pub(crate) async fn load_post_page(
    db: &DbClient,
    query: ListQuery,
    size: PageSize,
) -> Result<Page<Post>> {
    let requested = query.page.unwrap_or(1);
    let number = PageNumber::new(requested).ok_or(ServerError::PageOutOfRange(requested))?;

    db.fetch_post_page(number, size)
        .await?
        .ok_or(ServerError::PageOutOfRange(requested))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/", rejection(ServerError))]
pub(crate) struct HomePath();

async fn home(
    HomePath(): HomePath,
    Query(query): Query<ListQuery>,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<Page<Post>>> {
    let page = load_post_page(&db, query, HOME_PAGE_SIZE).await?;

    Ok(Json(page))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
pub(crate) struct PostPath {
    pub id: Id<PostMarker>,
}

#[derive(Clone, Debug, Serialize)]
struct PostDetail {
    post: Post,
    comments: Vec<Comment>,
    comment_form: CommentForm,
}

/// Every read counts one view before the post is fetched, so the returned
/// counter already includes this request.
#[axum::debug_handler]
async fn show_post(
    PostPath { id }: PostPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Json<PostDetail>> {
    if !db.bump_post_views(id).await? {
        return Err(ServerError::PostByIdNotFound(id));
    }

    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;
    let comments = db.fetch_post_comments(id).await?;

    Ok(Json(PostDetail {
        post,
        comments,
        comment_form: CommentForm::default(),
    }))
}

async fn submit_comment(
    PostPath { id }: PostPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    Form(comment_form): Form<CommentForm>,
) -> Result<Response> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    let body = match comment_form.validate() {
        Ok(body) => body,
        Err(errors) => return Ok(form::invalid(&comment_form, &errors)),
    };

    db.create_comment(&CreateComment {
        post: post.id,
        author: user.user_id(),
        body,
        created_at: UtcDateTime::now(),
    })
    .await?;

    Ok(Redirect::to(&PostPath { id }.to_string()).into_response())
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/new", rejection(ServerError))]
pub(crate) struct NewPostPath();

#[derive(Clone, Debug, Serialize)]
struct PostFormContext {
    values: PostForm,
    categories: Vec<Category>,
}

async fn new_post_form(
    NewPostPath(): NewPostPath,
    State(db): State<Arc<DbClient>>,
    _user: AuthenticatedUser,
) -> Result<Json<PostFormContext>> {
    let categories = db.fetch_categories().await?;

    Ok(Json(PostFormContext {
        values: PostForm::default(),
        categories,
    }))
}

async fn create_post(
    NewPostPath(): NewPostPath,
    State(db): State<Arc<DbClient>>,
    user: AuthenticatedUser,
    Form(post_form): Form<PostForm>,
) -> Result<Response> {
    let validated = match post_form.validate() {
        Ok(validated) => validated,
        Err(errors) => return Ok(form::invalid(&post_form, &errors)),
    };
    if let Some(errors) = unknown_category_errors(&db, validated.category).await? {
        return Ok(form::invalid(&post_form, &errors));
    }

    let id = db
        .create_post(&CreatePost {
            title: validated.title,
            author: user.user_id(),
            category: validated.category,
            content: validated.content,
            published_at: UtcDateTime::now(),
        })
        .await?;

    Ok(Redirect::to(&PostPath { id }.to_string()).into_response())
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/edit", rejection(ServerError))]
pub(crate) struct EditPostPath {
    pub id: Id<PostMarker>,
}

async fn edit_post_form(
    EditPostPath { id }: EditPostPath,
    State(db): State<Arc<DbClient>>,
    _user: AuthenticatedUser,
) -> Result<Json<PostFormContext>> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;
    let categories = db.fetch_categories().await?;

    Ok(Json(PostFormContext {
        values: PostForm::from(&post),
        categories,
    }))
}

async fn update_post(
    EditPostPath { id }: EditPostPath,
    State(db): State<Arc<DbClient>>,
    _user: AuthenticatedUser,
    Form(post_form): Form<PostForm>,
) -> Result<Response> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    let validated = match post_form.validate() {
        Ok(validated) => validated,
        Err(errors) => return Ok(form::invalid(&post_form, &errors)),
    };
    if let Some(errors) = unknown_category_errors(&db, validated.category).await? {
        return Ok(form::invalid(&post_form, &errors));
    }

    let updated = db
        .update_post(
            post.id,
            &UpdatePost {
                title: validated.title,
                category: validated.category,
                content: validated.content,
            },
        )
        .await?;
    if !updated {
        return Err(ServerError::PostByIdNotFound(id));
    }

    Ok(Redirect::to(&PostPath { id }.to_string()).into_response())
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/delete", rejection(ServerError))]
pub(crate) struct DeletePostPath {
    pub id: Id<PostMarker>,
}

/// The confirmation step: show what is about to be deleted.
async fn confirm_delete_post(
    DeletePostPath { id }: DeletePostPath,
    State(db): State<Arc<DbClient>>,
    _user: AuthenticatedUser,
) -> Result<Json<Post>> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}

async fn delete_post(
    DeletePostPath { id }: DeletePostPath,
    State(db): State<Arc<DbClient>>,
    _user: AuthenticatedUser,
) -> Result<Redirect> {
    if !db.delete_post(id).await? {
        return Err(ServerError::PostByIdNotFound(id));
    }

    Ok(Redirect::to(&DashboardPath().to_string()))
}

async fn unknown_category_errors(
    db: &DbClient,
    category: Option<Id<CategoryMarker>>,
) -> Result<Option<FormErrors>> {
    match category {
        Some(category_id) if db.fetch_category(category_id).await?.is_none() => Ok(Some(
            FormErrors::single("category", "The selected category does not exist"),
        )),
        _ => Ok(None),
    }
}
