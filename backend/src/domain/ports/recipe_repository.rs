//! Driven port for recipe persistence.
//!
//! Every operation is scoped to `owner`. Another owner's recipe behaves
//! exactly like a missing one.

use async_trait::async_trait;

use crate::domain::{
    ImageRef, ImageReplacement, NewRecipe, Recipe, RecipeChanges, RecipeFilter, RecipeId, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipe repository adapters.
    pub enum RecipeRepositoryError {
        /// The store could not be reached.
        Connection { message: String } => "recipe repository connection failed: {message}",
        /// A query or mutation failed.
        Query { message: String } => "recipe repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Owned recipes matching `filter`, newest first.
    async fn list(
        &self,
        owner: &UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeRepositoryError>;

    async fn find(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError>;

    /// Insert the recipe and attach its resolved tags and ingredients in one
    /// transaction.
    async fn create(
        &self,
        owner: &UserId,
        recipe: NewRecipe,
    ) -> Result<Recipe, RecipeRepositoryError>;

    /// Apply `changes` in one transaction.
    ///
    /// Returns `None`, having written nothing, when `owner` does not own the
    /// recipe.
    async fn update(
        &self,
        owner: &UserId,
        id: RecipeId,
        changes: RecipeChanges,
    ) -> Result<Option<Recipe>, RecipeRepositoryError>;

    /// Remove the recipe and its association rows, returning what was removed.
    async fn delete(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError>;

    /// Swap the stored image reference.
    async fn replace_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        image: Option<ImageRef>,
    ) -> Result<Option<ImageReplacement>, RecipeRepositoryError>;
}
