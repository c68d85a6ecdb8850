//! Installation-scoped persistence for the credential record.
//!
//! The record is always read and written as one unit, so a reader can never
//! see a token without its profile or the reverse.

mod file;
mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

use crate::error::Result;
use crate::models::session::CredentialRecord;

/// Durable key/value storage for `{token, profile}`.
pub trait CredentialStore: Send + Sync {
    /// Reads the stored record. A missing record is an empty one.
    fn load(&self) -> Result<CredentialRecord>;

    /// Replaces the stored record as a single atomic write.
    fn save(&self, record: &CredentialRecord) -> Result<()>;

    /// Removes the stored record. Removing an absent record succeeds.
    fn clear(&self) -> Result<()>;
}
