//! The request/response contract with the remote identity service.

mod rest;

pub use rest::HttpAuthGateway;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::api::{LoginData, LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::models::profile::Profile;

/// Stateless adapter to the identity service. One request per call, no retries.
///
/// Implementations report a rejected bearer token as `AppError::Unauthorized`,
/// a request that never got an answer as `AppError::Network`, and any other
/// refusal (including `success: false`) as `AppError::Server`.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> Result<()>;

    async fn login(&self, request: &LoginRequest) -> Result<LoginData>;

    async fn fetch_profile(&self, token: &str) -> Result<Profile>;

    async fn update_profile(&self, token: &str, request: &UpdateProfileRequest<'_>) -> Result<Profile>;

    /// Asks the service to revoke the token.
    async fn logout(&self, token: &str) -> Result<()>;
}
