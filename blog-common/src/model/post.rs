use crate::model::{
    Id,
    category::{Category, CategoryMarker},
    user::{User, UserMarker},
};
use serde::Serialize;
use thiserror::Error;
use time::UtcDateTime;

pub const POST_TITLE_MAX_LEN: usize = 100;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

/// A blog article with its author and category resolved.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub title: PostTitle,
    pub author: User,
    pub category: Option<Category>,
    pub content: String,
    pub published_at: UtcDateTime,
    pub view_count: u64,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CreatePost {
    pub title: PostTitle,
    pub author: Id<UserMarker>,
    pub category: Option<Id<CategoryMarker>>,
    pub content: String,
    pub published_at: UtcDateTime,
}

/// The fields an update may touch. The author is deliberately absent: posts
/// cannot be reassigned.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct UpdatePost {
    pub title: PostTitle,
    pub category: Option<Id<CategoryMarker>>,
    pub content: String,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct PostTitle(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum InvalidPostTitleError {
    #[error("The post title is empty")]
    Empty,
    #[error("The post title is longer than {POST_TITLE_MAX_LEN} characters")]
    TooLong,
}

impl PostTitle {
    pub fn new(title: String) -> Result<Self, InvalidPostTitleError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(InvalidPostTitleError::Empty);
        }
        if trimmed.chars().count() > POST_TITLE_MAX_LEN {
            return Err(InvalidPostTitleError::TooLong);
        }

        if trimmed.len() == title.len() {
            Ok(PostTitle(title))
        } else {
            Ok(PostTitle(trimmed.to_owned()))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use crate::model::post::{InvalidPostTitleError, POST_TITLE_MAX_LEN, PostTitle};

    #[test]
    fn title_bounds() {
        assert_eq!(
            PostTitle::new("First post".to_owned()).map(PostTitle::into_inner),
            Ok("First post".to_owned())
        );
        assert!(PostTitle::new("a".repeat(POST_TITLE_MAX_LEN)).is_ok());

        assert_eq!(
            PostTitle::new(String::new()),
            Err(InvalidPostTitleError::Empty)
        );
        assert_eq!(
            PostTitle::new("   \t".to_owned()),
            Err(InvalidPostTitleError::Empty)
        );
        assert_eq!(
            PostTitle::new("a".repeat(POST_TITLE_MAX_LEN + 1)),
            Err(InvalidPostTitleError::TooLong)
        );
    }

    #[test]
    fn title_is_stored_trimmed() {
        assert_eq!(
            PostTitle::new("  Hello world \n".to_owned()).map(PostTitle::into_inner),
            Ok("Hello world".to_owned())
        );
    }
}
