//! Login and registration form input

use crate::error::ValidationError;
use serde::Deserialize;
use utoipa::ToSchema;

/// Email/password sign-in form
#[derive(Clone, Deserialize, ToSchema)]
pub struct LoginForm {
    /// Account email
    #[serde(default)]
    pub email: String,
    /// Account password
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// Both fields are required
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "email" });
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingField { field: "password" });
        }
        Ok(())
    }
}

/// Account creation form
#[derive(Clone, Deserialize, ToSchema)]
pub struct RegistrationForm {
    /// Account email
    #[serde(default)]
    pub email: String,
    /// Chosen password
    #[serde(default)]
    pub password: String,
    /// Password typed a second time
    #[serde(default)]
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Check the form before any provider call
    ///
    /// Order matters: a mismatch is reported even when the password is also
    /// too short. Length is counted in characters, not bytes.
    pub fn validate(&self, min_password_length: usize) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "email" });
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.password.chars().count() < min_password_length {
            return Err(ValidationError::PasswordTooShort {
                min: min_password_length,
            });
        }
        Ok(())
    }
}

// Passwords stay out of logs.
impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
