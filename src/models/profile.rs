use chrono::NaiveDateTime;
use garde::Validate;
use serde::{Deserialize, Deserializer, Serialize};

/// Reads an optional string field, turning an explicit `null` into `""`.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// The user's identity record, as returned by the identity service.
///
/// The service is the only authority for this record; a client copy is a
/// read-through cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Server-assigned identifier. Never changes.
    pub user_id: i64,
    /// The user's username.
    pub username: String,
    /// The user's email address.
    pub email: String,
    /// The user's first name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    /// The user's last name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    /// Role assigned by the service. Not every response carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Whether the account is active (web profile responses only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// When the account was created (web profile responses only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    /// When the user last signed in (web profile responses only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<NaiveDateTime>,
}

impl Profile {
    /// Full name if both parts are known, otherwise the username, otherwise `"User"`.
    pub fn display_name(&self) -> String {
        let first = self.first_name.trim();
        let last = self.last_name.trim();
        if !first.is_empty() && !last.is_empty() {
            format!("{} {}", first, last)
        } else if !self.username.trim().is_empty() {
            self.username.trim().to_string()
        } else {
            "User".to_string()
        }
    }

    /// Avatar letter: first letter of the first name, else of the username, else `'U'`.
    pub fn initial(&self) -> char {
        self.first_name
            .trim()
            .chars()
            .next()
            .or_else(|| self.username.trim().chars().next())
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('U')
    }

    /// Takes `self` as authoritative and fills only the optional fields the
    /// server left out from `previous`.
    ///
    /// Update responses omit `role` and the account metadata; those are kept
    /// from the prior snapshot rather than erased. Nothing is taken from the
    /// patch that produced this record.
    pub fn backfilled_from(self, previous: &Profile) -> Profile {
        if self.user_id != previous.user_id {
            return self;
        }
        Profile {
            role: self.role.or_else(|| previous.role.clone()),
            is_active: self.is_active.or(previous.is_active),
            created_at: self.created_at.or(previous.created_at),
            last_login: self.last_login.or(previous.last_login),
            ..self
        }
    }
}

/// A partial profile edit. Only the fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[garde(length(chars, min = 3, max = 50))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[garde(length(chars, min = 1, max = 50))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[garde(length(chars, min = 1, max = 50))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl ProfilePatch {
    /// Builds a patch, trimming every provided field.
    pub fn new(
        username: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Self {
        Self {
            username: username.map(|s| s.trim().to_string()),
            first_name: first_name.map(|s| s.trim().to_string()),
            last_name: last_name.map(|s| s.trim().to_string()),
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }
}
