use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{AppError, Result};
use crate::models::profile::Profile;
use crate::models::session::CredentialRecord;
use crate::store::CredentialStore;

/// Issue-order position of a pending profile write.
///
/// Taken before a request goes out; the response may only be written back if
/// nothing issued later has been written first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WriteTicket(u64);

struct SessionState {
    record: CredentialRecord,
    /// Highest ticket whose write has landed. `establish` and `clear` move it
    /// past every ticket handed out so far.
    applied: u64,
}

/// Owns the token and the cached profile. The only writer of the credential store.
///
/// Never touches the network. Every mutation persists first and updates the
/// in-memory copy only after the store accepted the write, under one write
/// lock, so readers see either the old pair or the new pair.
///
/// Writes hold the lock across the store's fsync and rename and run on the
/// calling task's thread. The record is a few hundred bytes written once per
/// user action.
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    state: RwLock<SessionState>,
    issued: AtomicU64,
}

impl SessionManager {
    /// Loads the persisted session, if any.
    ///
    /// # Arguments
    ///
    /// * `store` - The credential store for this installation.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `SessionManager`.
    pub fn load(store: Arc<dyn CredentialStore>) -> Result<Self> {
        let mut record = store.load()?;

        if record.token.is_some() && !record.has_token() {
            record.token = None;
        }
        if record.has_token() && record.profile.is_none() {
            tracing::warn!("⚠️ Stored token has no profile, discarding it");
            record.token = None;
        }

        tracing::info!(
            authenticated = record.has_token(),
            cached_profile = record.profile.is_some(),
            "✅ Session loaded"
        );

        Ok(Self {
            store,
            state: RwLock::new(SessionState { record, applied: 0 }),
            issued: AtomicU64::new(0),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True iff a non-empty token is present.
    pub fn is_authenticated(&self) -> bool {
        self.read().record.has_token()
    }

    /// The last cached profile, possibly stale.
    pub fn current_profile(&self) -> Option<Profile> {
        self.read().record.profile.clone()
    }

    /// The bearer token, if signed in.
    pub fn current_token(&self) -> Option<String> {
        let state = self.read();
        if state.record.has_token() {
            state.record.token.clone()
        } else {
            None
        }
    }

    /// Token and profile read under one lock.
    pub fn snapshot(&self) -> CredentialRecord {
        self.read().record.clone()
    }

    /// Persists a new session, replacing any prior one.
    ///
    /// Outstanding profile writes issued before this call are discarded when
    /// they complete.
    pub fn establish(&self, token: String, profile: Profile) -> Result<()> {
        if token.is_empty() {
            return Err(AppError::Validation("Token must not be empty".to_string()));
        }

        let user_id = profile.user_id;
        let record = CredentialRecord::authenticated(token, profile);

        let mut state = self.write();
        self.store.save(&record)?;
        state.record = record;
        state.applied = self.next_ticket();

        tracing::info!("✅ Session established for user: {}", user_id);
        Ok(())
    }

    /// Erases token and cached profile. Clearing an empty session succeeds.
    pub fn clear(&self) -> Result<()> {
        let mut state = self.write();
        self.store.clear()?;
        state.record = CredentialRecord::default();
        state.applied = self.next_ticket();

        tracing::info!("👋 Session cleared");
        Ok(())
    }

    /// Clears the session only if `token` is still the current token.
    ///
    /// A late rejection of a replaced token leaves the newer session alone.
    /// Returns whether the session was cleared.
    pub fn invalidate(&self, token: &str) -> Result<bool> {
        let mut state = self.write();
        if state.record.token.as_deref() != Some(token) {
            tracing::debug!("Rejected token is no longer current, keeping session");
            return Ok(false);
        }

        self.store.clear()?;
        state.record = CredentialRecord::default();
        state.applied = self.next_ticket();

        tracing::warn!("⚠️ Token rejected by server, session cleared");
        Ok(true)
    }

    /// Reserves an issue-order slot for a profile write.
    pub fn begin_write(&self) -> WriteTicket {
        WriteTicket(self.next_ticket())
    }

    /// Overwrites the cached profile if `ticket` is newer than every write
    /// that has landed since it was issued.
    ///
    /// Returns `false` when the write was superseded and dropped.
    pub fn store_profile(&self, ticket: WriteTicket, profile: Profile) -> Result<bool> {
        let mut state = self.write();
        if ticket.0 <= state.applied || !state.record.has_token() {
            tracing::debug!("Profile write superseded, dropping it");
            return Ok(false);
        }

        let record = CredentialRecord {
            token: state.record.token.clone(),
            profile: Some(profile),
        };
        self.store.save(&record)?;
        state.record = record;
        state.applied = ticket.0;

        tracing::debug!("Cached profile updated");
        Ok(true)
    }
}
