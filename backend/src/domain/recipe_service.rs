//! Recipe domain service.
//!
//! Implements the recipe driving ports over the recipe repository and the
//! image store. Ownership is always checked by the repository before it writes
//! anything; a miss surfaces as `not_found`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{
    ImageStore, ImageStoreError, RecipeCommand, RecipeQuery, RecipeRepository,
    RecipeRepositoryError,
};
use crate::domain::{
    Error, ImageRef, NewRecipe, Recipe, RecipeChanges, RecipeFilter, RecipeId, UserId,
    ValidatedImage,
};

fn map_repository_error(error: RecipeRepositoryError) -> Error {
    match error {
        RecipeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("recipe repository unavailable: {message}"))
        }
        RecipeRepositoryError::Query { message } => {
            Error::internal(format!("recipe repository error: {message}"))
        }
    }
}

fn map_image_error(error: ImageStoreError) -> Error {
    Error::internal(error.to_string())
}

fn recipe_not_found(id: RecipeId) -> Error {
    Error::not_found(format!("recipe {id} not found"))
}

/// Recipe service implementing [`RecipeQuery`] and [`RecipeCommand`].
#[derive(Clone)]
pub struct RecipeService<R, S> {
    recipes: Arc<R>,
    images: Arc<S>,
    max_image_bytes: usize,
}

impl<R, S> RecipeService<R, S> {
    pub fn new(recipes: Arc<R>, images: Arc<S>, max_image_bytes: usize) -> Self {
        Self {
            recipes,
            images,
            max_image_bytes,
        }
    }
}

impl<R, S> RecipeService<R, S>
where
    S: ImageStore,
{
    /// Remove image bytes that are no longer referenced. Failures are logged.
    async fn release_image(&self, image: &ImageRef) {
        if let Err(err) = self.images.remove(image).await {
            warn!(key = image.key(), error = %err, "failed to release recipe image");
        }
    }
}

#[async_trait]
impl<R, S> RecipeQuery for RecipeService<R, S>
where
    R: RecipeRepository,
    S: ImageStore,
{
    async fn list(&self, owner: &UserId, filter: RecipeFilter) -> Result<Vec<Recipe>, Error> {
        self.recipes
            .list(owner, &filter)
            .await
            .map_err(map_repository_error)
    }

    async fn get(&self, owner: &UserId, id: RecipeId) -> Result<Recipe, Error> {
        self.recipes
            .find(owner, id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| recipe_not_found(id))
    }
}

#[async_trait]
impl<R, S> RecipeCommand for RecipeService<R, S>
where
    R: RecipeRepository,
    S: ImageStore,
{
    async fn create(&self, owner: &UserId, recipe: NewRecipe) -> Result<Recipe, Error> {
        let created = self
            .recipes
            .create(owner, recipe)
            .await
            .map_err(map_repository_error)?;
        debug!(
            recipe_id = %created.id,
            tags = created.tags.len(),
            ingredients = created.ingredients.len(),
            "recipe created"
        );
        Ok(created)
    }

    async fn update(
        &self,
        owner: &UserId,
        id: RecipeId,
        changes: RecipeChanges,
    ) -> Result<Recipe, Error> {
        let updated = self
            .recipes
            .update(owner, id, changes)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| recipe_not_found(id))?;
        debug!(
            recipe_id = %updated.id,
            tags = updated.tags.len(),
            ingredients = updated.ingredients.len(),
            "recipe updated"
        );
        Ok(updated)
    }

    async fn delete(&self, owner: &UserId, id: RecipeId) -> Result<(), Error> {
        let removed = self
            .recipes
            .delete(owner, id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| recipe_not_found(id))?;
        if let Some(image) = &removed.image {
            self.release_image(image).await;
        }
        Ok(())
    }

    async fn upload_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        bytes: Vec<u8>,
    ) -> Result<Recipe, Error> {
        // Ownership first so a foreign id is 404 even for a bad payload.
        self.get(owner, id).await?;

        let validated = ValidatedImage::decode(bytes, self.max_image_bytes)?;
        let image = ImageRef::fresh(validated.format());
        self.images
            .put(&image, validated.into_bytes())
            .await
            .map_err(map_image_error)?;

        let replaced = self
            .recipes
            .replace_image(owner, id, Some(image.clone()))
            .await
            .map_err(map_repository_error);
        let replacement = match replaced {
            Ok(Some(replacement)) => replacement,
            Ok(None) => {
                self.release_image(&image).await;
                return Err(recipe_not_found(id));
            }
            Err(err) => {
                self.release_image(&image).await;
                return Err(err);
            }
        };

        if let Some(previous) = &replacement.previous {
            self.release_image(previous).await;
        }
        debug!(recipe_id = %id, key = image.key(), "recipe image replaced");
        Ok(replacement.recipe)
    }
}

#[cfg(test)]
#[path = "recipe_service_tests.rs"]
mod tests;
