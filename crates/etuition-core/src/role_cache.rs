//! Per-session role cache.

use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::role::RoleState;
use crate::session::Session;
use crate::traits::RoleResolver;
use crate::types::Email;

/// Caches the outcome of one role lookup per session epoch.
///
/// A login or logout starts a new epoch, which invalidates the cached role.
/// Concurrent [`resolve`](Self::resolve) calls for the same session share a
/// single lookup. A failed lookup stays failed for the epoch; call
/// [`invalidate`](Self::invalidate) to try again.
pub struct RoleCache<R> {
    resolver: R,
    entry: Mutex<Option<CachedRole>>,
}

#[derive(Debug, Clone)]
struct CachedRole {
    epoch: u64,
    email: Email,
    state: RoleState,
}

impl CachedRole {
    fn matches(&self, session: &Session) -> bool {
        self.epoch == session.epoch()
            && session.identity().is_some_and(|id| id.email == self.email)
    }
}

impl<R: RoleResolver> RoleCache<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            entry: Mutex::new(None),
        }
    }

    /// The wrapped resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Current role state for `session` without performing a lookup.
    ///
    /// Reports `Loading` while a lookup is in flight or has not started.
    pub fn peek(&self, session: &Session) -> RoleState {
        if let Some(state) = Self::without_lookup(session) {
            return state;
        }

        match self.entry.try_lock() {
            Ok(entry) => match entry.as_ref() {
                Some(cached) if cached.matches(session) => cached.state,
                _ => RoleState::Loading,
            },
            Err(_) => RoleState::Loading,
        }
    }

    /// Role state for `session`, looking it up if this epoch has none yet.
    ///
    /// Never returns `Loading` unless the identity itself is still loading.
    #[instrument(skip(self, session), fields(epoch = session.epoch()))]
    pub async fn resolve(&self, session: &Session) -> RoleState {
        if let Some(state) = Self::without_lookup(session) {
            return state;
        }
        let Some(identity) = session.identity() else {
            return RoleState::Failed;
        };

        let mut entry = self.entry.lock().await;
        if let Some(cached) = entry.as_ref().filter(|c| c.matches(session)) {
            debug!(email = %identity.email, state = ?cached.state, "Role cache hit");
            return cached.state;
        }

        let state = match self.resolver.resolve(identity).await {
            Ok(role) => {
                debug!(email = %identity.email, %role, "Role resolved");
                RoleState::Loaded(role)
            }
            Err(e) => {
                warn!(email = %identity.email, error = %e, "Role lookup failed");
                RoleState::Failed
            }
        };

        // A snapshot from an older epoch must not evict the current entry.
        if entry.as_ref().is_none_or(|c| c.epoch <= session.epoch()) {
            *entry = Some(CachedRole {
                epoch: session.epoch(),
                email: identity.email.clone(),
                state,
            });
        } else {
            debug!(email = %identity.email, "Stale session snapshot, not caching role");
        }
        state
    }

    /// Forget the cached role so the next [`resolve`](Self::resolve) looks it up again.
    pub async fn invalidate(&self) {
        self.entry.lock().await.take();
    }

    fn without_lookup(session: &Session) -> Option<RoleState> {
        if session.is_restoring() {
            Some(RoleState::Loading)
        } else if !session.is_authenticated() {
            Some(RoleState::Failed)
        } else {
            None
        }
    }
}

impl<R> std::fmt::Debug for RoleCache<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleCache").finish_non_exhaustive()
    }
}
