//! Driven port for tag and ingredient persistence.

use async_trait::async_trait;

use crate::domain::{Attribute, AttributeId, AttributeKind, AttributeName, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by attribute repository adapters.
    pub enum AttributeRepositoryError {
        /// The store could not be reached.
        Connection { message: String } => "attribute repository connection failed: {message}",
        /// A query or mutation failed.
        Query { message: String } => "attribute repository query failed: {message}",
    }
}

/// Owner-scoped storage for attributes of one kind per call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttributeRepository: Send + Sync {
    /// Ordered by name descending, then id descending. With `assigned_only`
    /// only attributes attached to at least one recipe are returned.
    async fn list(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, AttributeRepositoryError>;

    async fn find(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
    ) -> Result<Option<Attribute>, AttributeRepositoryError>;

    async fn create(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        name: AttributeName,
    ) -> Result<Attribute, AttributeRepositoryError>;

    async fn rename(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
        name: AttributeName,
    ) -> Result<Option<Attribute>, AttributeRepositoryError>;

    /// Delete the attribute and detach it from every recipe. Returns whether
    /// anything was removed.
    async fn delete(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
    ) -> Result<bool, AttributeRepositoryError>;
}
