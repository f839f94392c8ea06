//! Driving port for tag and ingredient mutations.

use async_trait::async_trait;

use crate::domain::{Attribute, AttributeId, AttributeKind, AttributeName, Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttributeCommand: Send + Sync {
    async fn create(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        name: AttributeName,
    ) -> Result<Attribute, Error>;

    async fn rename(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
        name: AttributeName,
    ) -> Result<Attribute, Error>;

    async fn delete(&self, owner: &UserId, kind: AttributeKind, id: AttributeId)
    -> Result<(), Error>;
}
