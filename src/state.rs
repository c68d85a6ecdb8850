use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::gateway::{AuthGateway, HttpAuthGateway};
use crate::services::auth::AuthService;
use crate::services::profile::ProfileSynchronizer;
use crate::services::session::SessionManager;
use crate::store::{CredentialStore, FileCredentialStore};

/// Admits at most one login, registration or profile update at a time.
///
/// A second caller is turned away immediately rather than queued, the same
/// effect as disabling the button while a request is in flight.
#[derive(Clone)]
pub struct RequestGate {
    semaphore: Arc<Semaphore>,
}

impl RequestGate {
    /// Creates a new `RequestGate`.
    pub fn new() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
        }
    }

    /// Takes the slot, or fails with `RequestInFlight` if it is taken.
    pub fn try_enter(&self) -> Result<OwnedSemaphorePermit> {
        self.semaphore.clone().try_acquire_owned().map_err(|_| {
            tracing::debug!("Request rejected, another one is in flight");
            AppError::RequestInFlight
        })
    }

    /// Whether a request currently holds the slot.
    pub fn is_busy(&self) -> bool {
        self.semaphore.available_permits() == 0
    }
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a client front end needs, wired once at startup.
#[derive(Clone)]
pub struct ClientState {
    /// The client's configuration.
    pub config: Config,
    /// The session manager.
    pub session: Arc<SessionManager>,
    /// Register / login / logout.
    pub auth: AuthService,
    /// Profile view and edit.
    pub profiles: ProfileSynchronizer,
    /// The in-flight request gate shared by `auth` and `profiles`.
    pub gate: RequestGate,
}

impl ClientState {
    /// Creates a new `ClientState` backed by the credential file and the HTTP gateway.
    ///
    /// # Arguments
    ///
    /// * `config` - The client's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `ClientState`.
    pub fn new(config: &Config) -> Result<Self> {
        let store = Arc::new(FileCredentialStore::new(&config.credentials_path));
        tracing::info!("✅ Credential store at {}", config.credentials_path.display());

        let gateway = Arc::new(HttpAuthGateway::new(config)?);
        tracing::info!("✅ Identity service at {}", config.api_base_url);

        Self::with_parts(config, store, gateway)
    }

    /// Creates a new `ClientState` from explicit collaborators.
    pub fn with_parts(
        config: &Config,
        store: Arc<dyn CredentialStore>,
        gateway: Arc<dyn AuthGateway>,
    ) -> Result<Self> {
        let session = Arc::new(SessionManager::load(store)?);
        let gate = RequestGate::new();

        let auth = AuthService::new(session.clone(), gateway.clone(), gate.clone());
        let profiles = ProfileSynchronizer::new(
            session.clone(),
            gateway,
            gate.clone(),
            config.guest_policy,
        );

        Ok(ClientState {
            config: config.clone(),
            session,
            auth,
            profiles,
            gate,
        })
    }
}
