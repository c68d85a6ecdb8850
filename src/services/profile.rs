use std::sync::Arc;

use crate::config::GuestPolicy;
use crate::error::{AppError, Result};
use crate::gateway::AuthGateway;
use crate::models::api::UpdateProfileRequest;
use crate::models::profile::{Profile, ProfilePatch};
use crate::services::session::SessionManager;
use crate::state::RequestGate;
use crate::validation::auth::validate_patch;

/// What a profile view resolved to.
///
/// Expired sessions and failures with nothing cached are reported through
/// `Err` instead: `AppError::Unauthorized` (session already cleared) or the
/// network/server error itself.
#[derive(Debug)]
pub enum ProfileView {
    /// Fetched from the service just now.
    Fresh(Profile),
    /// The fetch failed; this is the last cached copy.
    Stale { profile: Profile, cause: AppError },
    /// Signed out; read-only cached copy.
    Guest(Profile),
    /// Nothing to show.
    Empty,
}

impl ProfileView {
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            ProfileView::Fresh(p) | ProfileView::Guest(p) => Some(p),
            ProfileView::Stale { profile, .. } => Some(profile),
            ProfileView::Empty => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, ProfileView::Fresh(_))
    }
}

/// Decides per request whether to serve the cache or the service, and writes
/// results back through the session manager.
#[derive(Clone)]
pub struct ProfileSynchronizer {
    session: Arc<SessionManager>,
    gateway: Arc<dyn AuthGateway>,
    gate: RequestGate,
    guest_policy: GuestPolicy,
}

impl ProfileSynchronizer {
    pub fn new(
        session: Arc<SessionManager>,
        gateway: Arc<dyn AuthGateway>,
        gate: RequestGate,
        guest_policy: GuestPolicy,
    ) -> Self {
        Self {
            session,
            gateway,
            gate,
            guest_policy,
        }
    }

    fn guest_fallback(&self) -> ProfileView {
        match (self.guest_policy, self.session.current_profile()) {
            (GuestPolicy::AllowStale, Some(profile)) => {
                tracing::debug!("Signed out, serving cached profile read-only");
                ProfileView::Guest(profile)
            }
            _ => ProfileView::Empty,
        }
    }

    /// What a fetch answers with once the session it was issued for has been
    /// replaced: the newer session's cached profile, or nothing after a sign-out.
    fn superseded_view(&self) -> ProfileView {
        if !self.session.is_authenticated() {
            return ProfileView::Empty;
        }
        self.session
            .current_profile()
            .map(ProfileView::Fresh)
            .unwrap_or(ProfileView::Empty)
    }

    /// Resolves the profile for a "view profile" request.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `ProfileView`.
    pub async fn view_profile(&self) -> Result<ProfileView> {
        let Some(token) = self.session.current_token() else {
            return Ok(self.guest_fallback());
        };

        let ticket = self.session.begin_write();
        match self.gateway.fetch_profile(&token).await {
            Ok(profile) => {
                if self.session.store_profile(ticket, profile.clone())? {
                    return Ok(ProfileView::Fresh(profile));
                }
                Ok(self.superseded_view())
            }
            Err(AppError::Unauthorized) => {
                if self.session.invalidate(&token)? {
                    return Err(AppError::Unauthorized);
                }
                Ok(self.superseded_view())
            }
            Err(e @ (AppError::Network(_) | AppError::Server(_))) => {
                match self.session.current_profile() {
                    Some(profile) => {
                        tracing::warn!("⚠️ Profile fetch failed, serving cached copy: {}", e);
                        Ok(ProfileView::Stale { profile, cause: e })
                    }
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Sends a profile edit and caches the server's version of the result.
    ///
    /// Only the fields present in `patch` are validated and sent. On any
    /// failure other than an expired token the cached profile is left as it was.
    /// A rejection of a token that has since been replaced is a `Server` error,
    /// not an expiry.
    pub async fn submit_edit(&self, patch: ProfilePatch) -> Result<Profile> {
        validate_patch(&patch)?;

        let record = self.session.snapshot();
        let Some(token) = record.token.filter(|t| !t.is_empty()) else {
            return Err(AppError::Unauthorized);
        };
        let current = record.profile.ok_or_else(|| {
            AppError::Storage("Session has a token but no cached profile".to_string())
        })?;

        let _permit = self.gate.try_enter()?;
        let ticket = self.session.begin_write();
        let request = UpdateProfileRequest::new(current.user_id, &patch);

        match self.gateway.update_profile(&token, &request).await {
            Ok(updated) => {
                let updated = updated.backfilled_from(&current);
                self.session.store_profile(ticket, updated.clone())?;
                tracing::info!("✅ Profile updated for user: {}", updated.user_id);
                Ok(updated)
            }
            Err(AppError::Unauthorized) => {
                if self.session.invalidate(&token)? {
                    return Err(AppError::Unauthorized);
                }
                tracing::warn!("⚠️ Update rejected for a token that is no longer current");
                Err(AppError::Server(
                    "You signed in again while saving. Please retry the change.".to_string(),
                ))
            }
            Err(e) => {
                tracing::warn!("⚠️ Profile update failed: {}", e);
                Err(e)
            }
        }
    }
}
