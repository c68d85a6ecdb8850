use garde::Validate;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::models::profile::{null_as_empty, Profile, ProfilePatch};

/// The envelope every identity-service response is wrapped in.
///
/// `success: false` is an application error even when the HTTP status is 200.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// The request payload for user registration.
#[derive(Serialize, Validate, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[garde(length(chars, min = 3, max = 50))]
    pub username: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(chars, min = 6, max = 128))]
    pub password: String,
    #[garde(length(chars, min = 1, max = 50))]
    pub first_name: String,
    #[garde(length(chars, min = 1, max = 50))]
    pub last_name: String,
}

impl RegisterRequest {
    /// Builds a request from raw form input. Everything but the password is trimmed.
    pub fn new(
        first_name: &str,
        last_name: &str,
        username: &str,
        email: &str,
        password: &str,
    ) -> Self {
        Self {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
        }
    }
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// The request payload for user login.
#[derive(Serialize, Validate, Zeroize, ZeroizeOnDrop)]
pub struct LoginRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// `data` of a successful login response: the token plus the login-time profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    pub user_id: i64,
    pub email: String,
    pub username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl LoginData {
    /// Splits the response into the token and the profile snapshot.
    pub fn into_parts(self) -> (String, Profile) {
        let profile = Profile {
            user_id: self.user_id,
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            is_active: None,
            created_at: None,
            last_login: None,
        };
        (self.token, profile)
    }
}

/// The body of `PUT user/profile`. The service requires the user id alongside the patch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest<'a> {
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<&'a str>,
}

impl<'a> UpdateProfileRequest<'a> {
    pub fn new(user_id: i64, patch: &'a ProfilePatch) -> Self {
        Self {
            user_id,
            username: patch.username.as_deref(),
            first_name: patch.first_name.as_deref(),
            last_name: patch.last_name.as_deref(),
        }
    }
}
