//! Driving port for recipe mutations.

use async_trait::async_trait;

use crate::domain::{Error, NewRecipe, Recipe, RecipeChanges, RecipeId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeCommand: Send + Sync {
    async fn create(&self, owner: &UserId, recipe: NewRecipe) -> Result<Recipe, Error>;

    async fn update(
        &self,
        owner: &UserId,
        id: RecipeId,
        changes: RecipeChanges,
    ) -> Result<Recipe, Error>;

    /// Delete the recipe, then release its stored image.
    async fn delete(&self, owner: &UserId, id: RecipeId) -> Result<(), Error>;

    /// Validate `bytes` as an image and make it the recipe's image.
    async fn upload_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        bytes: Vec<u8>,
    ) -> Result<Recipe, Error>;
}
