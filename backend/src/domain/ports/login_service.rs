//! Driving port for authenticating a login attempt.
//!
//! Handlers depend on this trait rather than on the user store so tests can
//! substitute any implementation.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials and return the authenticated user id.
    ///
    /// Unknown emails and wrong passwords both fail with
    /// [`crate::domain::ErrorCode::Unauthorized`].
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
