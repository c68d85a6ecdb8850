use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::gateway::AuthGateway;
use crate::models::api::{LoginRequest, RegisterRequest};
use crate::models::profile::Profile;
use crate::services::session::SessionManager;
use crate::state::RequestGate;
use crate::validation::auth::{validate_login, validate_registration};

/// Registration, login and logout against the identity service.
#[derive(Clone)]
pub struct AuthService {
    session: Arc<SessionManager>,
    gateway: Arc<dyn AuthGateway>,
    gate: RequestGate,
}

impl AuthService {
    pub fn new(session: Arc<SessionManager>, gateway: Arc<dyn AuthGateway>, gate: RequestGate) -> Self {
        Self {
            session,
            gateway,
            gate,
        }
    }

    /// Creates an account. Does not sign in.
    ///
    /// # Arguments
    ///
    /// * `request` - The registration form.
    ///
    /// # Returns
    ///
    /// A `Result<()>`.
    pub async fn register(&self, request: RegisterRequest) -> Result<()> {
        validate_registration(&request)?;
        let _permit = self.gate.try_enter()?;

        self.gateway.register(&request).await?;
        tracing::info!("✅ Registered: {}", request.username);
        Ok(())
    }

    /// Creates an account and signs in with the same credentials.
    pub async fn register_and_login(&self, request: RegisterRequest) -> Result<Profile> {
        validate_registration(&request)?;
        let login = LoginRequest::new(&request.email, &request.password);
        let _permit = self.gate.try_enter()?;

        self.gateway.register(&request).await?;
        tracing::info!("✅ Registered: {}", request.username);
        drop(request);

        self.sign_in(&login).await
    }

    /// Signs in and persists the new session.
    ///
    /// Either the token and profile are both stored, or nothing is.
    pub async fn login(&self, request: LoginRequest) -> Result<Profile> {
        validate_login(&request)?;
        let _permit = self.gate.try_enter()?;

        self.sign_in(&request).await
    }

    async fn sign_in(&self, request: &LoginRequest) -> Result<Profile> {
        let data = self.gateway.login(request).await?;
        if data.token.is_empty() {
            return Err(AppError::Server("Login response did not include a token".to_string()));
        }

        let (token, profile) = data.into_parts();
        self.session.establish(token, profile.clone())?;

        tracing::info!("✅ User logged in: {}", profile.user_id);
        Ok(profile)
    }

    /// Signs out locally, asking the service to revoke the token first.
    ///
    /// The revoke call is best-effort; the local session is cleared even when
    /// the service cannot be reached.
    pub async fn logout(&self) -> Result<()> {
        if let Some(token) = self.session.current_token() {
            if let Err(e) = self.gateway.logout(&token).await {
                tracing::warn!("⚠️ Server-side logout failed, clearing locally: {}", e);
            }
        }

        self.session.clear()
    }
}
