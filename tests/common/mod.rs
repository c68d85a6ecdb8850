#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use userauth_client::gateway::AuthGateway;
use userauth_client::models::api::{LoginData, LoginRequest, RegisterRequest, UpdateProfileRequest};
use userauth_client::models::profile::Profile;
use userauth_client::store::{CredentialStore, MemoryCredentialStore};
use userauth_client::{AppError, ClientState, Config, GuestPolicy, Result};

pub fn config(guest_policy: GuestPolicy) -> Config {
    Config {
        api_base_url: "http://127.0.0.1:9/api/".to_string(),
        credentials_path: PathBuf::from("unused.json"),
        http_timeout: Duration::from_secs(5),
        guest_policy,
    }
}

pub fn profile(username: &str) -> Profile {
    Profile {
        user_id: 1,
        username: username.to_string(),
        email: "a@b.com".to_string(),
        first_name: "A".to_string(),
        last_name: "B".to_string(),
        role: Some("user".to_string()),
        is_active: None,
        created_at: None,
        last_login: None,
    }
}

pub fn login_data(token: &str, username: &str) -> LoginData {
    LoginData {
        token: token.to_string(),
        user_id: 1,
        email: "a@b.com".to_string(),
        username: username.to_string(),
        first_name: "A".to_string(),
        last_name: "B".to_string(),
        role: Some("user".to_string()),
    }
}

/// The last update body the fake received, minus the borrowed lifetimes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentUpdate {
    pub token: String,
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A gateway that replays scripted results and counts calls.
///
/// `fetch_profile` can also be parked on a oneshot channel so a test decides
/// when (and in which order) responses arrive.
#[derive(Default)]
pub struct FakeGateway {
    pub calls: AtomicUsize,
    pub logins: Mutex<VecDeque<Result<LoginData>>>,
    pub registrations: Mutex<VecDeque<Result<()>>>,
    pub fetches: Mutex<VecDeque<Result<Profile>>>,
    pub parked_fetches: Mutex<VecDeque<oneshot::Receiver<Result<Profile>>>>,
    pub parked_count: AtomicUsize,
    pub updates: Mutex<VecDeque<Result<Profile>>>,
    pub parked_updates: Mutex<VecDeque<oneshot::Receiver<Result<Profile>>>>,
    pub logouts: Mutex<VecDeque<Result<()>>>,
    pub last_update: Mutex<Option<SentUpdate>>,
}

fn next<T>(queue: &Mutex<VecDeque<Result<T>>>) -> Result<T> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(AppError::Network("no scripted response".to_string())))
}

impl FakeGateway {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn script_login(&self, result: Result<LoginData>) {
        self.logins.lock().unwrap().push_back(result);
    }

    pub fn script_register(&self, result: Result<()>) {
        self.registrations.lock().unwrap().push_back(result);
    }

    pub fn script_fetch(&self, result: Result<Profile>) {
        self.fetches.lock().unwrap().push_back(result);
    }

    pub fn park_fetch(&self) -> oneshot::Sender<Result<Profile>> {
        let (tx, rx) = oneshot::channel();
        self.parked_fetches.lock().unwrap().push_back(rx);
        tx
    }

    pub fn park_update(&self) -> oneshot::Sender<Result<Profile>> {
        let (tx, rx) = oneshot::channel();
        self.parked_updates.lock().unwrap().push_back(rx);
        tx
    }

    /// Yields until `n` parked calls are waiting on their senders.
    pub async fn wait_parked(&self, n: usize) {
        while self.parked_count.load(Ordering::SeqCst) < n {
            tokio::task::yield_now().await;
        }
    }

    pub fn script_update(&self, result: Result<Profile>) {
        self.updates.lock().unwrap().push_back(result);
    }

    pub fn script_logout(&self, result: Result<()>) {
        self.logouts.lock().unwrap().push_back(result);
    }
}

#[async_trait]
impl AuthGateway for FakeGateway {
    async fn register(&self, _request: &RegisterRequest) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        next(&self.registrations)
    }

    async fn login(&self, _request: &LoginRequest) -> Result<LoginData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        next(&self.logins)
    }

    async fn fetch_profile(&self, _token: &str) -> Result<Profile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let parked = self.parked_fetches.lock().unwrap().pop_front();
        match parked {
            Some(rx) => {
                self.parked_count.fetch_add(1, Ordering::SeqCst);
                rx.await
                    .unwrap_or_else(|_| Err(AppError::Network("dropped".to_string())))
            }
            None => next(&self.fetches),
        }
    }

    async fn update_profile(&self, token: &str, request: &UpdateProfileRequest<'_>) -> Result<Profile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_update.lock().unwrap() = Some(SentUpdate {
            token: token.to_string(),
            user_id: request.user_id,
            username: request.username.map(str::to_string),
            first_name: request.first_name.map(str::to_string),
            last_name: request.last_name.map(str::to_string),
        });
        let parked = self.parked_updates.lock().unwrap().pop_front();
        match parked {
            Some(rx) => {
                self.parked_count.fetch_add(1, Ordering::SeqCst);
                rx.await
                    .unwrap_or_else(|_| Err(AppError::Network("dropped".to_string())))
            }
            None => next(&self.updates),
        }
    }

    async fn logout(&self, _token: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        next(&self.logouts)
    }
}

pub struct Harness {
    pub state: ClientState,
    pub gateway: Arc<FakeGateway>,
    pub store: Arc<MemoryCredentialStore>,
}

pub fn harness(guest_policy: GuestPolicy) -> Harness {
    harness_with_store(guest_policy, MemoryCredentialStore::new())
}

pub fn harness_with_store(guest_policy: GuestPolicy, store: MemoryCredentialStore) -> Harness {
    let gateway = Arc::new(FakeGateway::default());
    let store = Arc::new(store);
    let state = ClientState::with_parts(
        &config(guest_policy),
        store.clone() as Arc<dyn CredentialStore>,
        gateway.clone() as Arc<dyn AuthGateway>,
    )
    .unwrap();

    Harness {
        state,
        gateway,
        store,
    }
}

/// Signs the harness in as `ab` with token `T1`.
pub async fn signed_in(guest_policy: GuestPolicy) -> Harness {
    let h = harness(guest_policy);
    h.gateway.script_login(Ok(login_data("T1", "ab")));
    h.state
        .auth
        .login(LoginRequest::new("a@b.com", "secret"))
        .await
        .unwrap();
    h
}
