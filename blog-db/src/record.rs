//! Raw row shapes as they come off the wire, converted into model types with
//! validation at the boundary.

use blog_common::model::{
    ModelValidationError,
    category::{Category, CategoryName},
    comment::{Comment, CommentBody},
    post::{Post, PostTitle},
    session::Session,
    user::{User, UserHandle},
};
use sqlx::FromRow;
use time::{Duration, PrimitiveDateTime, UtcDateTime};

#[derive(Clone, Eq, PartialEq, Debug, FromRow)]
pub(crate) struct PostRecord {
    pub post_id: i64,
    pub title: String,
    pub content: String,
    pub published_at: PrimitiveDateTime,
    pub view_count: i64,
    pub author_id: i64,
    pub author_handle: String,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, FromRow)]
pub(crate) struct CommentRecord {
    pub comment_id: i64,
    pub content: String,
    pub created_at: PrimitiveDateTime,
    pub author_id: i64,
    pub author_handle: String,
}

#[derive(Clone, Eq, PartialEq, Debug, FromRow)]
pub(crate) struct CategoryRecord {
    pub category_id: i64,
    pub name: String,
}

#[derive(Clone, Eq, PartialEq, Debug, FromRow)]
pub(crate) struct SessionRecord {
    pub user_id: i64,
    pub token_hash: Vec<u8>,
    pub created_at: PrimitiveDateTime,
    pub expires_after_seconds: Option<i64>,
}

/// Timestamps are stored without offset; the whole schema is UTC.
pub(crate) fn to_primitive(value: UtcDateTime) -> PrimitiveDateTime {
    PrimitiveDateTime::new(value.date(), value.time())
}

impl TryFrom<PostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        let category = match (value.category_id, value.category_name) {
            (Some(category_id), Some(name)) => Some(Category {
                id: category_id.cast_unsigned().into(),
                name: CategoryName::new(name)?,
            }),
            _ => None,
        };

        Ok(Self {
            id: value.post_id.cast_unsigned().into(),
            title: PostTitle::new(value.title)?,
            author: User {
                id: value.author_id.cast_unsigned().into(),
                handle: UserHandle::new(value.author_handle)?,
            },
            category,
            content: value.content,
            published_at: value.published_at.as_utc(),
            view_count: value.view_count.cast_unsigned(),
        })
    }
}

impl TryFrom<CommentRecord> for Comment {
    type Error = ModelValidationError;

    fn try_from(value: CommentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.comment_id.cast_unsigned().into(),
            author: User {
                id: value.author_id.cast_unsigned().into(),
                handle: UserHandle::new(value.author_handle)?,
            },
            body: CommentBody::new(value.content)?,
            created_at: value.created_at.as_utc(),
        })
    }
}

impl TryFrom<CategoryRecord> for Category {
    type Error = ModelValidationError;

    fn try_from(value: CategoryRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.category_id.cast_unsigned().into(),
            name: CategoryName::new(value.name)?,
        })
    }
}

impl TryFrom<SessionRecord> for Session {
    type Error = ModelValidationError;

    fn try_from(value: SessionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            user: value.user_id.cast_unsigned().into(),
            token_hash: value.token_hash.try_into()?,
            created_at: value.created_at.as_utc(),
            expires_after: value
                .expires_after_seconds
                .map(|seconds| Duration::seconds(seconds).try_into())
                .transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::record::PostRecord;
    use blog_common::model::post::Post;
    use time::macros::datetime;

    fn record() -> PostRecord {
        PostRecord {
            post_id: 4,
            title: "Hello".to_owned(),
            content: "world".to_owned(),
            published_at: datetime!(2025-06-01 12:00),
            view_count: 7,
            author_id: 2,
            author_handle: "ada".to_owned(),
            category_id: Some(1),
            category_name: Some("rust".to_owned()),
        }
    }

    #[test]
    fn post_record_round_trip() {
        let post = Post::try_from(record()).unwrap();

        assert_eq!(post.id.get(), 4);
        assert_eq!(post.title.get(), "Hello");
        assert_eq!(post.author.handle.get(), "ada");
        assert_eq!(post.category.unwrap().name.get(), "rust");
        assert_eq!(post.view_count, 7);
    }

    #[test]
    fn uncategorized_post_record() {
        let post = Post::try_from(PostRecord {
            category_id: None,
            category_name: None,
            ..record()
        })
        .unwrap();

        assert_eq!(post.category, None);
    }

    #[test]
    fn invalid_title_is_rejected() {
        assert!(
            Post::try_from(PostRecord {
                title: String::new(),
                ..record()
            })
            .is_err()
        );
    }
}
