//! Domain primitives, aggregates, services, and ports.
//!
//! Types here are transport agnostic: they validate on construction and carry
//! no HTTP or SQL concerns. Inbound adapters build them from payloads;
//! outbound adapters rebuild them from rows.

pub mod attribute;
pub mod attribute_service;
pub mod auth;
pub mod error;
pub mod field_update;
pub mod image_upload;
pub mod password_login;
pub mod ports;
pub mod price;
pub mod recipe;
pub mod recipe_service;
pub mod reconciliation;
pub mod trace_id;
pub mod user;

pub use self::attribute::{
    ATTRIBUTE_NAME_MAX, Attribute, AttributeId, AttributeKind, AttributeName, AttributeNameError,
    UnknownAttributeKind, listing_order,
};
pub use self::attribute_service::AttributeService;
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::field_update::FieldUpdate;
pub use self::image_upload::{DEFAULT_MAX_IMAGE_BYTES, ImageUploadError, ValidatedImage};
pub use self::password_login::{PasswordLoginService, hash_password, verify_password};
pub use self::price::{Price, PriceError};
pub use self::recipe::{
    IMAGE_KEY_PREFIX, ImageFormat, ImageRef, ImageReplacement, InvalidImageKey, NewRecipe,
    RECIPE_TEXT_MAX, Recipe, RecipeChanges, RecipeFilter, RecipeId, RecipeLink, RecipeTitle,
    RecipeValidationError, TimeMinutes, normalise_description,
};
pub use self::recipe_service::RecipeService;
pub use self::reconciliation::{PlanEntry, ReconciliationPlan};
pub use self::trace_id::TraceId;
pub use self::user::{EmailAddress, UserAccount, UserId, UserValidationError};
