//! Present/absent wrapper for partial updates.

use serde::{Deserialize, Deserializer};

/// A field in an update payload: either left alone or replaced.
///
/// Combine with `#[serde(default)]` so a missing key deserialises to
/// [`FieldUpdate::Unchanged`]. For optional fields wrap an `Option`, so an
/// explicit `null` becomes `Set(None)`.
///
/// # Examples
/// ```
/// use recipe_backend::domain::FieldUpdate;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Patch {
///     #[serde(default)]
///     link: FieldUpdate<Option<String>>,
/// }
///
/// let absent: Patch = serde_json::from_str("{}").unwrap();
/// assert_eq!(absent.link, FieldUpdate::Unchanged);
/// let cleared: Patch = serde_json::from_str(r#"{"link":null}"#).unwrap();
/// assert_eq!(cleared.link, FieldUpdate::Set(None));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    Unchanged,
    Set(T),
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        Self::Unchanged
    }
}

impl<T> FieldUpdate<T> {
    /// Borrow the new value, if any.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unchanged => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldUpdate<U> {
        match self {
            Self::Set(value) => FieldUpdate::Set(f(value)),
            Self::Unchanged => FieldUpdate::Unchanged,
        }
    }

    /// Validate or convert the carried value, keeping absence.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<FieldUpdate<U>, E> {
        match self {
            Self::Set(value) => f(value).map(FieldUpdate::Set),
            Self::Unchanged => Ok(FieldUpdate::Unchanged),
        }
    }

    /// Overwrite `target` when a value is present.
    pub fn apply_to(self, target: &mut T) {
        if let Self::Set(value) = self {
            *target = value;
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unchanged, Self::Set)
    }
}

impl<'de, T> Deserialize<'de> for FieldUpdate<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Self::Set)
    }
}
