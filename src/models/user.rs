/// User and identity-claim models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Internal user record, owned by the external user directory. This crate
/// treats `id` as an opaque immutable value and only refreshes the cached
/// profile fields on login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Stable subject identifier from the identity provider.
    pub subject: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Verified claim produced by the external identity verifier.
#[derive(Debug, Clone)]
pub struct IdentityClaim {
    pub subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl IdentityClaim {
    /// Display name resolution order: provider name, then email, then the
    /// subject identifier. Always yields a non-blank value.
    pub fn resolve_display_name(&self) -> String {
        if let Some(name) = non_blank(self.display_name.as_deref()) {
            return name;
        }
        if let Some(email) = non_blank(self.email.as_deref()) {
            return email;
        }
        self.subject.clone()
    }

    /// Avatar URL, trimmed, only when the provider supplied a non-blank value.
    pub fn resolve_avatar_url(&self) -> Option<String> {
        non_blank(self.avatar_url.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Profile view returned by `who_am_i`.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub subject: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}
