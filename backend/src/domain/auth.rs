//! Login credentials accepted by the authentication port.

use zeroize::Zeroizing;

use super::{EmailAddress, UserValidationError};

/// Reasons a login payload is rejected before any lookup happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    #[error(transparent)]
    Email(#[from] UserValidationError),
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated email and password pair.
///
/// The password keeps caller whitespace and is zeroed on drop.
///
/// # Examples
/// ```
/// use recipe_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("cook@example.com", "pw").unwrap();
/// assert_eq!(creds.email().as_ref(), "cook@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Build credentials from raw payload strings.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
