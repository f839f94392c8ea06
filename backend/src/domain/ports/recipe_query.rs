//! Driving port for reading recipes.

use async_trait::async_trait;

use crate::domain::{Error, Recipe, RecipeFilter, RecipeId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeQuery: Send + Sync {
    /// Owned recipes, newest first.
    async fn list(&self, owner: &UserId, filter: RecipeFilter) -> Result<Vec<Recipe>, Error>;

    /// A single owned recipe; anything else is `not_found`.
    async fn get(&self, owner: &UserId, id: RecipeId) -> Result<Recipe, Error>;
}
