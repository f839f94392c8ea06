//! Recipe aggregate and the value types it is built from.

use std::fmt;

use serde_json::json;
use url::Url;
use uuid::Uuid;

use super::{
    Attribute, AttributeId, AttributeKind, AttributeName, AttributeNameError, Error, FieldUpdate,
    Price, PriceError, UserId,
};

/// Maximum number of characters in a title or link.
pub const RECIPE_TEXT_MAX: usize = 255;

/// Store-assigned recipe identifier, strictly increasing per insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecipeId(i64);

impl RecipeId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Field-level validation failures for recipe payloads.
///
/// Each variant knows the payload field it belongs to so adapters can report
/// `{ "field", "code" }` details without re-deriving them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most 255 characters")]
    TitleTooLong,
    #[error("timeMinutes must be a non-negative integer")]
    InvalidTimeMinutes,
    #[error(transparent)]
    Price(#[from] PriceError),
    #[error("link must be an absolute http or https URL")]
    InvalidLink,
    #[error("link must be at most 255 characters")]
    LinkTooLong,
    #[error("{kind}: {source}")]
    AttributeName {
        kind: AttributeKind,
        source: AttributeNameError,
    },
}

impl RecipeValidationError {
    /// Payload field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong => "title",
            Self::InvalidTimeMinutes => "timeMinutes",
            Self::Price(_) => "price",
            Self::InvalidLink | Self::LinkTooLong => "link",
            Self::AttributeName { kind, .. } => kind.recipe_field(),
        }
    }

    /// Machine-readable failure code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "empty_title",
            Self::TitleTooLong => "title_too_long",
            Self::InvalidTimeMinutes => "invalid_time_minutes",
            Self::Price(err) => err.code(),
            Self::InvalidLink => "invalid_link",
            Self::LinkTooLong => "link_too_long",
            Self::AttributeName { source, .. } => source.code(),
        }
    }
}

impl From<RecipeValidationError> for Error {
    fn from(err: RecipeValidationError) -> Self {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": err.field(),
            "code": err.code(),
        }))
    }
}

/// Trimmed, non-empty recipe title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeTitle(String);

impl RecipeTitle {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RecipeValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RecipeValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > RECIPE_TEXT_MAX {
            return Err(RecipeValidationError::TitleTooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RecipeTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Preparation time in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeMinutes(i32);

impl TimeMinutes {
    /// Accepts `0..=i32::MAX` so the value always fits an `INTEGER` column.
    pub fn new(raw: i64) -> Result<Self, RecipeValidationError> {
        i32::try_from(raw)
            .ok()
            .filter(|minutes| *minutes >= 0)
            .map(Self)
            .ok_or(RecipeValidationError::InvalidTimeMinutes)
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

/// Absolute `http`/`https` link to the recipe source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeLink(String);

impl RecipeLink {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RecipeValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.chars().count() > RECIPE_TEXT_MAX {
            return Err(RecipeValidationError::LinkTooLong);
        }
        let url = Url::parse(trimmed).map_err(|_| RecipeValidationError::InvalidLink)?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(RecipeValidationError::InvalidLink);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Blank input means "no link".
    pub fn optional(raw: Option<String>) -> Result<Option<Self>, RecipeValidationError> {
        raw.filter(|value| !value.trim().is_empty())
            .map(Self::new)
            .transpose()
    }
}

impl AsRef<str> for RecipeLink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalise an optional description: blank text is stored as `None`.
pub fn normalise_description(raw: Option<String>) -> Option<String> {
    raw.filter(|text| !text.trim().is_empty())
}

/// Image formats accepted for recipe uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "png" => Some(Self::Png),
            "jpg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// Key prefix under which recipe images are stored.
pub const IMAGE_KEY_PREFIX: &str = "recipes";

/// Malformed stored image key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid image key: {0}")]
pub struct InvalidImageKey(pub String);

/// Store-relative image key of the form `recipes/<uuid>.<ext>`.
///
/// # Examples
/// ```
/// use recipe_backend::domain::{ImageFormat, ImageRef};
///
/// let image = ImageRef::fresh(ImageFormat::Png);
/// assert!(image.key().starts_with("recipes/"));
/// assert!(image.key().ends_with(".png"));
/// assert_eq!(ImageRef::parse(image.key()).unwrap(), image);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    key: String,
    format: ImageFormat,
}

impl ImageRef {
    /// Allocate a new unique key for an upload.
    pub fn fresh(format: ImageFormat) -> Self {
        Self {
            key: format!("{IMAGE_KEY_PREFIX}/{}.{}", Uuid::new_v4(), format.extension()),
            format,
        }
    }

    /// Parse a key read back from storage.
    pub fn parse(key: &str) -> Result<Self, InvalidImageKey> {
        let invalid = || InvalidImageKey(key.to_owned());
        let file = key
            .strip_prefix(IMAGE_KEY_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(invalid)?;
        let (stem, ext) = file.rsplit_once('.').ok_or_else(invalid)?;
        Uuid::parse_str(stem).map_err(|_| invalid())?;
        let format = ImageFormat::from_extension(ext).ok_or_else(invalid)?;
        Ok(Self {
            key: key.to_owned(),
            format,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// File name within the prefix directory.
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

/// A persisted recipe with its associations loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub owner: UserId,
    pub title: RecipeTitle,
    pub time_minutes: TimeMinutes,
    pub price: Price,
    pub description: Option<String>,
    pub link: Option<RecipeLink>,
    pub image: Option<ImageRef>,
    pub tags: Vec<Attribute>,
    pub ingredients: Vec<Attribute>,
}

impl Recipe {
    /// Attached attributes of one kind.
    pub fn attributes(&self, kind: AttributeKind) -> &[Attribute] {
        match kind {
            AttributeKind::Tag => &self.tags,
            AttributeKind::Ingredient => &self.ingredients,
        }
    }
}

/// Validated fields for a new recipe.
///
/// Tag and ingredient names are resolved against the owner's existing
/// attributes when the recipe is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub title: RecipeTitle,
    pub time_minutes: TimeMinutes,
    pub price: Price,
    pub description: Option<String>,
    pub link: Option<RecipeLink>,
    pub tags: Vec<AttributeName>,
    pub ingredients: Vec<AttributeName>,
}

impl NewRecipe {
    pub fn names(&self, kind: AttributeKind) -> &[AttributeName] {
        match kind {
            AttributeKind::Tag => &self.tags,
            AttributeKind::Ingredient => &self.ingredients,
        }
    }
}

/// Field changes applied to an existing recipe.
///
/// An association list that is `Set` replaces the attached set in full; an
/// empty list detaches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeChanges {
    pub title: FieldUpdate<RecipeTitle>,
    pub time_minutes: FieldUpdate<TimeMinutes>,
    pub price: FieldUpdate<Price>,
    pub description: FieldUpdate<Option<String>>,
    pub link: FieldUpdate<Option<RecipeLink>>,
    pub tags: FieldUpdate<Vec<AttributeName>>,
    pub ingredients: FieldUpdate<Vec<AttributeName>>,
}

impl RecipeChanges {
    pub fn names(&self, kind: AttributeKind) -> &FieldUpdate<Vec<AttributeName>> {
        match kind {
            AttributeKind::Tag => &self.tags,
            AttributeKind::Ingredient => &self.ingredients,
        }
    }

    /// Overwrite the scalar fields of `recipe` with any present values.
    pub fn apply_scalars(&self, recipe: &mut Recipe) {
        self.title.clone().apply_to(&mut recipe.title);
        self.time_minutes.clone().apply_to(&mut recipe.time_minutes);
        self.price.clone().apply_to(&mut recipe.price);
        self.description.clone().apply_to(&mut recipe.description);
        self.link.clone().apply_to(&mut recipe.link);
    }
}

/// Optional narrowing of a recipe listing.
///
/// A recipe matches when it carries any of the listed tags (if any are
/// listed) and any of the listed ingredients (if any are listed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tags: Vec<AttributeId>,
    pub ingredients: Vec<AttributeId>,
}

impl RecipeFilter {
    pub fn ids(&self, kind: AttributeKind) -> &[AttributeId] {
        match kind {
            AttributeKind::Tag => &self.tags,
            AttributeKind::Ingredient => &self.ingredients,
        }
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        [AttributeKind::Tag, AttributeKind::Ingredient]
            .into_iter()
            .all(|kind| {
                let wanted = self.ids(kind);
                wanted.is_empty()
                    || recipe
                        .attributes(kind)
                        .iter()
                        .any(|attribute| wanted.contains(&attribute.id))
            })
    }
}

/// Result of swapping a recipe's image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReplacement {
    pub recipe: Recipe,
    pub previous: Option<ImageRef>,
}
