//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`*Query`, `*Command`, [`LoginService`]) are called by
//! inbound adapters. Driven ports (`*Repository`, [`ImageStore`]) are
//! implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod attribute_command;
mod attribute_query;
mod attribute_repository;
mod image_store;
mod login_service;
mod recipe_command;
mod recipe_query;
mod recipe_repository;
mod user_repository;

#[cfg(test)]
pub use attribute_command::MockAttributeCommand;
pub use attribute_command::AttributeCommand;
#[cfg(test)]
pub use attribute_query::MockAttributeQuery;
pub use attribute_query::AttributeQuery;
#[cfg(test)]
pub use attribute_repository::MockAttributeRepository;
pub use attribute_repository::{AttributeRepository, AttributeRepositoryError};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use recipe_command::MockRecipeCommand;
pub use recipe_command::RecipeCommand;
#[cfg(test)]
pub use recipe_query::MockRecipeQuery;
pub use recipe_query::RecipeQuery;
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{RecipeRepository, RecipeRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
