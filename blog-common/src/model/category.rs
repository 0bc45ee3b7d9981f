use crate::model::Id;
use serde::Serialize;
use thiserror::Error;

pub const CATEGORY_NAME_MAX_LEN: usize = 50;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CategoryMarker;

/// A grouping label referenced by zero or more posts.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Serialize)]
pub struct Category {
    pub id: Id<CategoryMarker>,
    pub name: CategoryName,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct CategoryName(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The category name is invalid: {0}")]
pub struct InvalidCategoryNameError(String);

impl CategoryName {
    pub fn new(name: String) -> Result<Self, InvalidCategoryNameError> {
        if !name.is_empty() && name.chars().count() <= CATEGORY_NAME_MAX_LEN {
            Ok(CategoryName(name))
        } else {
            Err(InvalidCategoryNameError(name))
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
    use crate::model::category::{CATEGORY_NAME_MAX_LEN, CategoryName};

    #[test]
    fn name_bounds() {
        assert!(CategoryName::new("rust".to_owned()).is_ok());
        assert!(CategoryName::new("a".repeat(CATEGORY_NAME_MAX_LEN)).is_ok());

        assert!(CategoryName::new(String::new()).is_err());
        assert!(CategoryName::new("a".repeat(CATEGORY_NAME_MAX_LEN + 1)).is_err());
    }
}
