use crate::model::{
    Id,
    post::PostMarker,
    user::{User, UserMarker},
};
use serde::Serialize;
use thiserror::Error;
use time::UtcDateTime;

pub const COMMENT_BODY_MAX_LEN: usize = 2000;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

/// A reply attached to a post. Comments are never edited or deleted on their
/// own; they disappear with their post.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct Comment {
    pub id: Id<CommentMarker>,
    pub author: User,
    pub body: CommentBody,
    pub created_at: UtcDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CreateComment {
    pub post: Id<PostMarker>,
    pub author: Id<UserMarker>,
    pub body: CommentBody,
    pub created_at: UtcDateTime,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct CommentBody(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum InvalidCommentBodyError {
    #[error("The comment is empty")]
    Empty,
    #[error("The comment is longer than {COMMENT_BODY_MAX_LEN} characters")]
    TooLong,
}

impl CommentBody {
    pub fn new(body: String) -> Result<Self, InvalidCommentBodyError> {
        if body.trim().is_empty() {
            return Err(InvalidCommentBodyError::Empty);
        }
        if body.chars().count() > COMMENT_BODY_MAX_LEN {
            return Err(InvalidCommentBodyError::TooLong);
        }

        Ok(CommentBody(body))
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
    use crate::model::comment::{COMMENT_BODY_MAX_LEN, CommentBody, InvalidCommentBodyError};

    #[test]
    fn body_bounds() {
        assert!(CommentBody::new("nice post".to_owned()).is_ok());
        assert!(CommentBody::new("a".repeat(COMMENT_BODY_MAX_LEN)).is_ok());

        assert_eq!(
            CommentBody::new("  \n ".to_owned()),
            Err(InvalidCommentBodyError::Empty)
        );
        assert_eq!(
            CommentBody::new("a".repeat(COMMENT_BODY_MAX_LEN + 1)),
            Err(InvalidCommentBodyError::TooLong)
        );
    }
}
