//! Driving port for reading tags and ingredients.

use async_trait::async_trait;

use crate::domain::{Attribute, AttributeId, AttributeKind, Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttributeQuery: Send + Sync {
    async fn list(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, Error>;

    async fn get(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
    ) -> Result<Attribute, Error>;
}
