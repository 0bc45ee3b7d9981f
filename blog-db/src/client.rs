use crate::record::{CategoryRecord, CommentRecord, PostRecord, SessionRecord, to_primitive};
use blog_common::model::{
    Id, ModelValidationError,
    category::{Category, CategoryMarker},
    comment::{Comment, CommentMarker, CreateComment},
    post::{CreatePost, Post, PostMarker, UpdatePost},
    session::{Session, SessionTokenHash},
};
use blog_common::page::{Page, PageNumber, PageSize, paginate};
use sqlx::{PgPool, query, query_as, query_scalar};
use thiserror::Error;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(PgPool::connect(url).await?))
    }

    /// Builds the client without touching the database; connections are
    /// opened on first use.
    pub fn connect_lazy(url: &str) -> Result<Self> {
        Ok(Self::new(PgPool::connect_lazy(url)?))
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record = query_as::<_, PostRecord>(
            "
            SELECT
                posts.post_id,
                posts.title,
                posts.content,
                posts.published_at,
                posts.view_count,
                users.user_id AS author_id,
                users.handle AS author_handle,
                categories.category_id,
                categories.name AS category_name
            FROM
                blog.posts AS posts
                JOIN blog.users AS users ON users.user_id = posts.author_id
                LEFT JOIN blog.categories AS categories
                    ON categories.category_id = posts.category_id
            WHERE
                posts.post_id = $1
            ",
        )
        .bind(post_id.get().cast_signed())
        .fetch_optional(&self.pool)
        .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    /// Adds one detail view to the post's counter. Returns false when no such
    /// post exists.
    pub async fn bump_post_views(&self, post_id: Id<PostMarker>) -> Result<bool> {
        let result = query("UPDATE blog.posts SET view_count = view_count + 1 WHERE post_id = $1")
            .bind(post_id.get().cast_signed())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// One page of the reverse-chronological post index, or `None` when the
    /// requested page is past the end.
    pub async fn fetch_post_page(
        &self,
        number: PageNumber,
        size: PageSize,
    ) -> Result<Option<Page<Post>>> {
        let total_items = query_scalar::<_, i64>("SELECT COUNT(*) FROM blog.posts")
            .fetch_one(&self.pool)
            .await?;

        let Ok(bounds) = paginate(total_items.cast_unsigned(), size, number) else {
            return Ok(None);
        };

        let records = query_as::<_, PostRecord>(
            "
            SELECT
                posts.post_id,
                posts.title,
                posts.content,
                posts.published_at,
                posts.view_count,
                users.user_id AS author_id,
                users.handle AS author_handle,
                categories.category_id,
                categories.name AS category_name
            FROM
                blog.posts AS posts
                JOIN blog.users AS users ON users.user_id = posts.author_id
                LEFT JOIN blog.categories AS categories
                    ON categories.category_id = posts.category_id
            ORDER BY
                posts.published_at DESC,
                posts.post_id DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(bounds.limit.cast_signed())
        .bind(bounds.offset.cast_signed())
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<Vec<_>, ModelValidationError>>()?;

        Ok(Some(Page::new(posts, &bounds)))
    }

    pub async fn create_post(&self, post: &CreatePost) -> Result<Id<PostMarker>> {
        let post_id = query_scalar::<_, i64>(
            "
            INSERT INTO blog.posts (title, content, author_id, category_id, published_at, view_count)
            VALUES ($1, $2, $3, $4, $5, 0)
            RETURNING post_id
            ",
        )
        .bind(post.title.get())
        .bind(post.content.as_str())
        .bind(post.author.get().cast_signed())
        .bind(post.category.map(|category| category.get().cast_signed()))
        .bind(to_primitive(post.published_at))
        .fetch_one(&self.pool)
        .await?;

        Ok(post_id.cast_unsigned().into())
    }

    /// Rewrites title, content and category. The author column is never
    /// touched: posts cannot be reassigned.
    pub async fn update_post(&self, post_id: Id<PostMarker>, update: &UpdatePost) -> Result<bool> {
        let result = query(
            "UPDATE blog.posts SET title = $2, content = $3, category_id = $4 WHERE post_id = $1",
        )
        .bind(post_id.get().cast_signed())
        .bind(update.title.get())
        .bind(update.content.as_str())
        .bind(update.category.map(|category| category.get().cast_signed()))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes the post and its comments in one transaction. Returns false
    /// when no such post exists.
    pub async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        query("DELETE FROM blog.comments WHERE post_id = $1")
            .bind(post_id.get().cast_signed())
            .execute(&mut *tx)
            .await?;
        let result = query("DELETE FROM blog.posts WHERE post_id = $1")
            .bind(post_id.get().cast_signed())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// All comments on a post, oldest first.
    pub async fn fetch_post_comments(&self, post_id: Id<PostMarker>) -> Result<Vec<Comment>> {
        let records = query_as::<_, CommentRecord>(
            "
            SELECT
                comments.comment_id,
                comments.content,
                comments.created_at,
                users.user_id AS author_id,
                users.handle AS author_handle
            FROM
                blog.comments AS comments
                JOIN blog.users AS users ON users.user_id = comments.author_id
            WHERE
                comments.post_id = $1
            ORDER BY
                comments.comment_id
            ",
        )
        .bind(post_id.get().cast_signed())
        .fetch_all(&self.pool)
        .await?;

        let comments = records
            .into_iter()
            .map(Comment::try_from)
            .collect::<Result<Vec<_>, ModelValidationError>>()?;
        Ok(comments)
    }

    pub async fn create_comment(&self, comment: &CreateComment) -> Result<Id<CommentMarker>> {
        let comment_id = query_scalar::<_, i64>(
            "
            INSERT INTO blog.comments (post_id, author_id, content, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING comment_id
            ",
        )
        .bind(comment.post.get().cast_signed())
        .bind(comment.author.get().cast_signed())
        .bind(comment.body.get())
        .bind(to_primitive(comment.created_at))
        .fetch_one(&self.pool)
        .await?;

        Ok(comment_id.cast_unsigned().into())
    }

    pub async fn fetch_category(&self, category_id: Id<CategoryMarker>) -> Result<Option<Category>> {
        let record = query_as::<_, CategoryRecord>(
            "SELECT categories.category_id, categories.name FROM blog.categories AS categories WHERE categories.category_id = $1",
        )
        .bind(category_id.get().cast_signed())
        .fetch_optional(&self.pool)
        .await?;

        let category = record.map(Category::try_from).transpose()?;
        Ok(category)
    }

    /// Every category, for the authoring form's choice list.
    pub async fn fetch_categories(&self) -> Result<Vec<Category>> {
        let records = query_as::<_, CategoryRecord>(
            "SELECT categories.category_id, categories.name FROM blog.categories AS categories ORDER BY categories.name",
        )
        .fetch_all(&self.pool)
        .await?;

        let categories = records
            .into_iter()
            .map(Category::try_from)
            .collect::<Result<Vec<_>, ModelValidationError>>()?;
        Ok(categories)
    }

    /// Every post in a category, newest first and unpaginated. The caller is
    /// expected to have checked that the category exists.
    pub async fn fetch_posts_in_category(
        &self,
        category_id: Id<CategoryMarker>,
    ) -> Result<Vec<Post>> {
        let records = query_as::<_, PostRecord>(
            "
            SELECT
                posts.post_id,
                posts.title,
                posts.content,
                posts.published_at,
                posts.view_count,
                users.user_id AS author_id,
                users.handle AS author_handle,
                categories.category_id,
                categories.name AS category_name
            FROM
                blog.posts AS posts
                JOIN blog.users AS users ON users.user_id = posts.author_id
                JOIN blog.categories AS categories
                    ON categories.category_id = posts.category_id
            WHERE
                posts.category_id = $1
            ORDER BY
                posts.published_at DESC,
                posts.post_id DESC
            ",
        )
        .bind(category_id.get().cast_signed())
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<Vec<_>, ModelValidationError>>()?;
        Ok(posts)
    }

    pub async fn fetch_session(&self, token_hash: &SessionTokenHash) -> Result<Option<Session>> {
        let record = query_as::<_, SessionRecord>(
            "
            SELECT
                sessions.user_id,
                sessions.token_hash,
                sessions.created_at,
                sessions.expires_after_seconds
            FROM
                blog.sessions AS sessions
            WHERE
                sessions.token_hash = $1
            ",
        )
        .bind(&token_hash.0[..])
        .fetch_optional(&self.pool)
        .await?;

        let session = record.map(Session::try_from).transpose()?;
        Ok(session)
    }
}
