use garde::Validate;

use crate::error::{AppError, Result};
use crate::models::api::{LoginRequest, RegisterRequest};
use crate::models::profile::ProfilePatch;

/// Turns the first garde failure into a message the user can act on.
fn first_failure(report: garde::Report, message_for: fn(&str) -> &'static str) -> AppError {
    let field = report
        .iter()
        .next()
        .map(|(path, _)| path.to_string())
        .unwrap_or_default();
    tracing::debug!("Validation failed: {}", report);
    AppError::Validation(message_for(&field).to_string())
}

fn field_message(field: &str) -> &'static str {
    match field {
        "email" => "Invalid email format",
        "username" => "Username must be between 3 and 50 characters",
        "first_name" => "First name is required (at most 50 characters)",
        "last_name" => "Last name is required (at most 50 characters)",
        "password" => "Password must be between 6 and 128 characters",
        _ => "Invalid input",
    }
}

fn login_field_message(field: &str) -> &'static str {
    match field {
        "password" => "Password is required",
        other => field_message(other),
    }
}

/// Validates a registration request.
///
/// # Arguments
///
/// * `request` - The request to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the request may be sent.
pub fn validate_registration(request: &RegisterRequest) -> Result<()> {
    request
        .validate()
        .map_err(|report| first_failure(report, field_message))
}

/// Validates a login request.
///
/// Only presence is checked for the password; the service owns the policy
/// for existing credentials.
pub fn validate_login(request: &LoginRequest) -> Result<()> {
    request
        .validate()
        .map_err(|report| first_failure(report, login_field_message))
}

/// Validates only the fields present in a profile patch.
pub fn validate_patch(patch: &ProfilePatch) -> Result<()> {
    if patch.is_empty() {
        return Err(AppError::Validation("Nothing to update".to_string()));
    }

    patch
        .validate()
        .map_err(|report| first_failure(report, field_message))
}
