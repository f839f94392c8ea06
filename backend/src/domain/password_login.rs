//! Login backed by stored Argon2 password hashes.

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{LoginService, UserRepository, UserRepositoryError};
use crate::domain::{Error, LoginCredentials, UserId};

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

/// Hash `password` with Argon2id and a random salt, in PHC string form.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
}

/// Check `password` against a PHC hash. A malformed hash is an internal error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| Error::internal(format!("stored password hash is invalid: {err}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(Error::internal(format!("password verification failed: {err}"))),
    }
}

/// [`LoginService`] that looks users up by email and verifies the hash.
#[derive(Clone)]
pub struct PasswordLoginService<U> {
    users: Arc<U>,
}

impl<U> PasswordLoginService<U> {
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<U> LoginService for PasswordLoginService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let account = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_repository_error)?;
        let Some(account) = account else {
            debug!("login rejected: unknown email");
            return Err(Error::unauthorized("invalid credentials"));
        };
        if verify_password(credentials.password(), &account.password_hash)? {
            Ok(account.id)
        } else {
            debug!(user_id = %account.id, "login rejected: wrong password");
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}
