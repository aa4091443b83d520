//! Local credential checks that run before any auth request is sent.
//!
//! These are synchronous precondition checks; backend rejections are
//! reported separately by the client.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Sign-up form input, including the password confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Registration {
    /// Copy with the email and names trimmed, as sent to the backend.
    pub fn normalized(&self) -> Self {
        Self {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
        }
    }
}

/// Validate a sign-up form.
///
/// Checks, in order: email syntax, password confirmation, password
/// length, and non-blank first/last names.
pub fn validate_registration(form: &Registration) -> Result<(), CoreError> {
    validate_email(&form.email)?;

    if form.password != form.confirm_password {
        return Err(CoreError::Validation("Passwords do not match".to_string()));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    if form.first_name.trim().is_empty() || form.last_name.trim().is_empty() {
        return Err(CoreError::Validation(
            "First name and last name are required".to_string(),
        ));
    }
    Ok(())
}

/// Validate sign-in input: a non-blank email and a non-empty password.
pub fn validate_login(email: &str, password: &str) -> Result<(), CoreError> {
    if email.trim().is_empty() {
        return Err(CoreError::Validation("Email is required".to_string()));
    }
    if password.is_empty() {
        return Err(CoreError::Validation("Password is required".to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), CoreError> {
    let email = email.trim();
    if !email.validate_email() {
        return Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}
