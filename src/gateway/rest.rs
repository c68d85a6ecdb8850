use async_trait::async_trait;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::StatusCode;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;

use crate::config::{normalize_base_url, Config};
use crate::error::{AppError, Result};
use crate::gateway::AuthGateway;
use crate::models::api::{ApiEnvelope, LoginData, LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::models::profile::Profile;

/// Whether a call carries a bearer token, which decides how 401/403 is read.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Auth {
    Anonymous,
    Bearer,
}

/// `AuthGateway` over HTTP + JSON.
#[derive(Clone)]
pub struct HttpAuthGateway {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthGateway {
    /// Creates a gateway for the configured service.
    ///
    /// # Arguments
    ///
    /// * `config` - The client's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `HttpAuthGateway`.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: normalize_base_url(&config.api_base_url),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn encode<B: Serialize>(body: &B) -> Result<Vec<u8>> {
        sonic_rs::to_vec(body)
            .map_err(|e| AppError::Validation(format!("Could not encode request: {}", e)))
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Sends the request and unwraps the response envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        auth: Auth,
    ) -> Result<Option<T>> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        tracing::debug!("Identity service answered {}", status);

        if auth == Auth::Bearer
            && (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN)
        {
            return Err(AppError::Unauthorized);
        }

        let envelope: ApiEnvelope<T> = match sonic_rs::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("Unreadable response body ({}): {}", status, e);
                let message = if status.is_success() {
                    "Malformed response from server".to_string()
                } else {
                    format!("Request failed with status {}", status.as_u16())
                };
                return Err(AppError::Server(message));
            }
        };

        if !envelope.success || !status.is_success() {
            tracing::warn!("Request rejected ({}): {}", status, envelope.message);
            return Err(AppError::Server(envelope.message));
        }

        Ok(envelope.data)
    }

    fn require<T>(data: Option<T>, what: &str) -> Result<T> {
        data.ok_or_else(|| AppError::Server(format!("Response did not include {}", what)))
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn register(&self, request: &RegisterRequest) -> Result<()> {
        tracing::debug!("📝 Registering: {}", request.username);
        let body = Self::encode(request)?;
        let call = self
            .http
            .post(self.endpoint("auth/register"))
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        self.send::<IgnoredAny>(call, Auth::Anonymous).await?;
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginData> {
        tracing::debug!("🔐 Logging in: {}", request.email);
        let body = Self::encode(request)?;
        let call = self
            .http
            .post(self.endpoint("auth/login"))
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        let data = self.send::<LoginData>(call, Auth::Anonymous).await?;
        Self::require(data, "login data")
    }

    async fn fetch_profile(&self, token: &str) -> Result<Profile> {
        let call = self
            .http
            .get(self.endpoint("user/me"))
            .header(AUTHORIZATION, Self::bearer(token));

        let data = self.send::<Profile>(call, Auth::Bearer).await?;
        Self::require(data, "a profile")
    }

    async fn update_profile(&self, token: &str, request: &UpdateProfileRequest<'_>) -> Result<Profile> {
        let body = Self::encode(request)?;
        let call = self
            .http
            .put(self.endpoint("user/profile"))
            .header(AUTHORIZATION, Self::bearer(token))
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        let data = self.send::<Profile>(call, Auth::Bearer).await?;
        Self::require(data, "the updated profile")
    }

    async fn logout(&self, token: &str) -> Result<()> {
        let call = self
            .http
            .post(self.endpoint("auth/logout"))
            .header(AUTHORIZATION, Self::bearer(token));

        self.send::<IgnoredAny>(call, Auth::Bearer).await?;
        Ok(())
    }
}
