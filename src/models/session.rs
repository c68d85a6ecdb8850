use serde::{Deserialize, Serialize};

use crate::models::profile::Profile;

/// The persisted session: token and cached profile, always written together.
///
/// A profile without a token is a legal guest snapshot. A token without a
/// profile is never written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Bearer token issued at login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Last profile snapshot received from the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl CredentialRecord {
    /// A record for a freshly established session.
    pub fn authenticated(token: String, profile: Profile) -> Self {
        Self {
            token: Some(token),
            profile: Some(profile),
        }
    }

    /// True iff a non-empty token is present.
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}
