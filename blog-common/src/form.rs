//! Explicit form schemas for the two submission surfaces, replacing
//! framework-side dynamic form validation: each form deserializes from an
//! urlencoded body as plain strings, and `validate` either produces typed
//! values or a list of per-field errors for re-rendering.

use crate::model::{
    Id,
    category::CategoryMarker,
    comment::CommentBody,
    post::{Post, PostTitle},
};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use thiserror::Error;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A non-empty list of field errors from one failed submission.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Error, Serialize)]
#[error("The submitted form had invalid fields")]
#[serde(transparent)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    #[must_use]
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }

    #[must_use]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "empty_select_as_none")]
    pub category: Option<u64>,
    #[serde(default)]
    pub content: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct ValidatedPostForm {
    pub title: PostTitle,
    pub category: Option<Id<CategoryMarker>>,
    pub content: String,
}

impl PostForm {
    pub fn validate(&self) -> Result<ValidatedPostForm, FormErrors> {
        let mut errors = Vec::new();

        let title = PostTitle::new(self.title.clone())
            .map_err(|err| errors.push(FieldError::new("title", err.to_string())))
            .ok();
        let content = require_text("content", &self.content, &mut errors);

        match (title, content) {
            (Some(title), Some(content)) => Ok(ValidatedPostForm {
                title,
                category: self.category.map(Id::new),
                content,
            }),
            _ => Err(FormErrors::new(errors)),
        }
    }
}

impl From<&Post> for PostForm {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.get().to_owned(),
            category: post.category.as_ref().map(|category| category.id.get()),
            content: post.content.clone(),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub content: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<CommentBody, FormErrors> {
        CommentBody::new(self.content.clone())
            .map_err(|err| FormErrors::single("content", err.to_string()))
    }
}

fn require_text(
    field: &'static str,
    value: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "This field is required"));
        None
    } else {
        Some(value.to_owned())
    }
}

/// An unfilled `<select>` submits an empty string; treat it as no choice.
fn empty_select_as_none<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(D::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use crate::form::{CommentForm, PostForm};

    #[test]
    fn valid_post_form() {
        let form = PostForm {
            title: "Hello".to_owned(),
            category: Some(3),
            content: "world".to_owned(),
        };

        let validated = form.validate().unwrap();
        assert_eq!(validated.title.get(), "Hello");
        assert_eq!(validated.category.map(u64::from), Some(3));
        assert_eq!(validated.content, "world");
    }

    #[test]
    fn category_is_optional() {
        let form = PostForm {
            title: "Hello".to_owned(),
            category: None,
            content: "world".to_owned(),
        };

        assert_eq!(form.validate().unwrap().category, None);
    }

    #[test]
    fn empty_post_form_lists_every_missing_field() {
        let errors = PostForm::default().validate().unwrap_err();

        let fields: Vec<_> = errors.fields().iter().map(|error| error.field).collect();
        assert_eq!(fields, ["title", "content"]);
    }

    #[test]
    fn overlong_title_is_a_field_error() {
        let form = PostForm {
            title: "a".repeat(101),
            category: None,
            content: "body".to_owned(),
        };

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.fields().len(), 1);
        assert_eq!(errors.fields()[0].field, "title");
    }

    #[test]
    fn comment_form_requires_content() {
        assert!(
            CommentForm {
                content: "nice".to_owned(),
            }
            .validate()
            .is_ok()
        );

        let errors = CommentForm::default().validate().unwrap_err();
        assert_eq!(errors.fields()[0].field, "content");
    }

    #[test]
    fn empty_select_deserializes_as_none() {
        let form: PostForm =
            serde_json::from_str(r#"{"title":"t","category":"","content":"c"}"#).unwrap();
        assert_eq!(form.category, None);

        let form: PostForm =
            serde_json::from_str(r#"{"title":"t","category":"7","content":"c"}"#).unwrap();
        assert_eq!(form.category, Some(7));

        let form: PostForm = serde_json::from_str("{}").unwrap();
        assert_eq!(form, PostForm::default());
    }
}
