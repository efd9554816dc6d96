//! Role lookup trait.

use async_trait::async_trait;

use crate::identity::UserIdentity;
use crate::role::Role;
use crate::Result;

/// Resolves the role of an identity, typically from the backend.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    /// Look up the role for `identity`.
    ///
    /// An error means authorization cannot be proven; callers fail closed.
    async fn resolve(&self, identity: &UserIdentity) -> Result<Role>;
}
