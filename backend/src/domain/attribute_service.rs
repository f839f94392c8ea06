//! Tag and ingredient domain service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    AttributeCommand, AttributeQuery, AttributeRepository, AttributeRepositoryError,
};
use crate::domain::{Attribute, AttributeId, AttributeKind, AttributeName, Error, UserId};

fn map_repository_error(error: AttributeRepositoryError) -> Error {
    match error {
        AttributeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("attribute repository unavailable: {message}"))
        }
        AttributeRepositoryError::Query { message } => {
            Error::internal(format!("attribute repository error: {message}"))
        }
    }
}

fn attribute_not_found(kind: AttributeKind, id: AttributeId) -> Error {
    Error::not_found(format!("{kind} {id} not found"))
}

/// Service implementing [`AttributeQuery`] and [`AttributeCommand`].
#[derive(Clone)]
pub struct AttributeService<R> {
    attributes: Arc<R>,
}

impl<R> AttributeService<R> {
    pub fn new(attributes: Arc<R>) -> Self {
        Self { attributes }
    }
}

#[async_trait]
impl<R> AttributeQuery for AttributeService<R>
where
    R: AttributeRepository,
{
    async fn list(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, Error> {
        self.attributes
            .list(owner, kind, assigned_only)
            .await
            .map_err(map_repository_error)
    }

    async fn get(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
    ) -> Result<Attribute, Error> {
        self.attributes
            .find(owner, kind, id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| attribute_not_found(kind, id))
    }
}

#[async_trait]
impl<R> AttributeCommand for AttributeService<R>
where
    R: AttributeRepository,
{
    async fn create(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        name: AttributeName,
    ) -> Result<Attribute, Error> {
        self.attributes
            .create(owner, kind, name)
            .await
            .map_err(map_repository_error)
    }

    async fn rename(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
        name: AttributeName,
    ) -> Result<Attribute, Error> {
        self.attributes
            .rename(owner, kind, id, name)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| attribute_not_found(kind, id))
    }

    async fn delete(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
    ) -> Result<(), Error> {
        let removed = self
            .attributes
            .delete(owner, kind, id)
            .await
            .map_err(map_repository_error)?;
        if removed {
            Ok(())
        } else {
            Err(attribute_not_found(kind, id))
        }
    }
}
