use std::sync::{Mutex, PoisonError};

use crate::error::{AppError, Result};
use crate::models::session::CredentialRecord;
use crate::store::CredentialStore;

/// An in-process credential store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    record: Mutex<CredentialRecord>,
    fail_writes: Mutex<bool>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing record, e.g. a guest snapshot.
    pub fn with_record(record: CredentialRecord) -> Self {
        Self {
            record: Mutex::new(record),
            fail_writes: Mutex::new(false),
        }
    }

    /// Makes every subsequent `save`/`clear` fail with `StorageError`.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap_or_else(PoisonError::into_inner) = fail;
    }

    fn check_writable(&self) -> Result<()> {
        if *self.fail_writes.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(AppError::Storage("credential store is read-only".to_string()));
        }
        Ok(())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<CredentialRecord> {
        Ok(self
            .record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, record: &CredentialRecord) -> Result<()> {
        self.check_writable()?;
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = record.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.check_writable()?;
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = CredentialRecord::default();
        Ok(())
    }
}
