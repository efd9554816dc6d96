//! Backend role lookup.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use etuition_core::{Error, Result, Role, RoleResolver, UserIdentity};

use crate::client::AuthenticatedClient;
use crate::endpoints;

/// The part of `GET /users/{email}` the role lookup needs.
#[derive(Debug, Deserialize)]
struct UserRoleResponse {
    #[serde(default)]
    role: Option<String>,
}

/// Resolves roles with `GET /users/{email}` through the authenticated client.
///
/// Because the lookup is an ordinary authenticated call, a 401/403 here logs
/// the session out just like any other request.
#[derive(Debug, Clone)]
pub struct HttpRoleResolver {
    client: AuthenticatedClient,
}

impl HttpRoleResolver {
    pub fn new(client: AuthenticatedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RoleResolver for HttpRoleResolver {
    #[instrument(skip(self, identity), fields(email = %identity.email))]
    async fn resolve(&self, identity: &UserIdentity) -> Result<Role> {
        // The backend answers `null` for an unknown email.
        let response: Option<UserRoleResponse> =
            self.client.get(&endpoints::user(&identity.email)).await?;

        let role = response
            .ok_or_else(|| Error::RoleLookup {
                reason: "no user record".to_string(),
            })?
            .role
            .ok_or_else(|| Error::RoleLookup {
                reason: "user record has no role".to_string(),
            })?;

        debug!(%role, "Role reported by backend");
        role.parse()
    }
}
