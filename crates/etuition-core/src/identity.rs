//! Authenticated user profile snapshot.

use serde::{Deserialize, Serialize};

use crate::types::Email;

/// The signed-in user's profile as reported by the identity provider.
///
/// A snapshot: profile edits replace the whole value through
/// [`SessionStore::login`](crate::SessionStore::login) rather than mutating it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Identity-provider user id.
    pub id: String,
    /// Name shown in the dashboard header.
    pub display_name: String,
    /// Email address; the key for role lookup.
    pub email: Email,
    /// Profile photo URL, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserIdentity {
    /// Create an identity with no avatar.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, email: Email) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            email,
            avatar_url: None,
        }
    }

    /// Set the avatar URL.
    pub fn with_avatar(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }
}
