//! Tags and ingredients.
//!
//! Both are owner-scoped named labels attached to recipes. They share one
//! entity type distinguished by [`AttributeKind`] so storage, reconciliation,
//! and the HTTP surface are written once.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UserId;

/// Maximum number of characters in an attribute name.
pub const ATTRIBUTE_NAME_MAX: usize = 255;

/// Which association an attribute belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Tag,
    Ingredient,
}

impl AttributeKind {
    /// Stable lower-case label used in storage and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Ingredient => "ingredient",
        }
    }

    /// Payload field carrying names of this kind on a recipe.
    pub fn recipe_field(self) -> &'static str {
        match self {
            Self::Tag => "tags",
            Self::Ingredient => "ingredients",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown attribute kind label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown attribute kind: {0}")]
pub struct UnknownAttributeKind(pub String);

impl FromStr for AttributeKind {
    type Err = UnknownAttributeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tag" => Ok(Self::Tag),
            "ingredient" => Ok(Self::Ingredient),
            other => Err(UnknownAttributeKind(other.to_owned())),
        }
    }
}

/// Store-assigned attribute identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeId(i64);

impl AttributeId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation failures for [`AttributeName`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeNameError {
    #[error("name must not be empty")]
    Empty,
    #[error("name must be at most {max} characters")]
    TooLong { max: usize },
}

impl AttributeNameError {
    /// Machine-readable code reported in error details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty => "empty_name",
            Self::TooLong { .. } => "name_too_long",
        }
    }
}

/// Trimmed, non-empty attribute name.
///
/// Comparison is exact and case-sensitive; `"Thai"` and `"thai"` are
/// different names.
///
/// # Examples
/// ```
/// use recipe_backend::domain::AttributeName;
///
/// let name = AttributeName::new("  Thai ").unwrap();
/// assert_eq!(name.as_ref(), "Thai");
/// assert_ne!(name, AttributeName::new("thai").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttributeName(String);

impl AttributeName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AttributeNameError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AttributeNameError::Empty);
        }
        if trimmed.chars().count() > ATTRIBUTE_NAME_MAX {
            return Err(AttributeNameError::TooLong {
                max: ATTRIBUTE_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for AttributeName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<AttributeName> for String {
    fn from(value: AttributeName) -> Self {
        value.0
    }
}

impl TryFrom<String> for AttributeName {
    type Error = AttributeNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A tag or ingredient owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub id: AttributeId,
    pub owner: UserId,
    pub kind: AttributeKind,
    pub name: AttributeName,
}

/// Listing order for attributes: name descending, then id descending.
pub fn listing_order(a: &Attribute, b: &Attribute) -> std::cmp::Ordering {
    b.name.cmp(&a.name).then_with(|| b.id.cmp(&a.id))
}
