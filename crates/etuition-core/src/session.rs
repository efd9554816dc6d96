//! The shared session and its store.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::identity::UserIdentity;
use crate::tokens::AccessToken;
use crate::traits::AuthRejectionHandler;

/// The current identity and credential, or their absence.
///
/// A snapshot: readers get their own copy and never observe a half-updated
/// value. The credential is only exposed while an identity is present.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    identity: Option<UserIdentity>,
    credential: Option<AccessToken>,
    restoring: bool,
    epoch: u64,
}

impl Session {
    /// A signed-out session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session whose identity has not been reported yet.
    pub fn restoring() -> Self {
        Self {
            restoring: true,
            ..Self::default()
        }
    }

    /// A signed-in session.
    pub fn authenticated(identity: UserIdentity, credential: Option<AccessToken>) -> Self {
        Self {
            identity: Some(identity),
            credential,
            restoring: false,
            epoch: 0,
        }
    }

    /// The signed-in user, if any.
    pub fn identity(&self) -> Option<&UserIdentity> {
        self.identity.as_ref()
    }

    /// The credential to attach to outgoing requests.
    pub fn credential(&self) -> Option<&AccessToken> {
        self.identity.as_ref().and(self.credential.as_ref())
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// True until the identity provider has reported whether a user is signed in.
    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    /// Generation counter, bumped on every login and effective logout.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn is_cleared(&self) -> bool {
        self.identity.is_none() && self.credential.is_none() && !self.restoring
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("credential", &self.credential)
            .field("restoring", &self.restoring)
            .field("epoch", &self.epoch)
            .finish()
    }
}

/// Application-wide holder of the [`Session`].
///
/// Cheap to clone; every clone refers to the same session. Any number of
/// readers may take snapshots concurrently while login and logout replace
/// the value atomically.
///
/// # Example
///
/// ```
/// use etuition_core::{AccessToken, Email, SessionStore, UserIdentity};
///
/// let store = SessionStore::new();
/// let identity = UserIdentity::new("uid-1", "Ada", Email::new("a@x.com").unwrap());
/// store.login(identity, Some(AccessToken::new("tok123")));
/// assert!(store.snapshot().is_authenticated());
///
/// assert!(store.logout());
/// assert!(!store.logout());
/// ```
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Session>>,
}

impl SessionStore {
    /// Create a store holding a signed-out session.
    pub fn new() -> Self {
        Self::with_session(Session::anonymous())
    }

    /// Create a store that waits for the identity provider to report.
    pub fn restoring() -> Self {
        Self::with_session(Session::restoring())
    }

    fn with_session(session: Session) -> Self {
        let (tx, _rx) = watch::channel(session);
        Self { tx: Arc::new(tx) }
    }

    /// Returns a copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Returns the current session generation.
    pub fn epoch(&self) -> u64 {
        self.tx.borrow().epoch
    }

    /// Receive every subsequent session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Install a signed-in identity and its credential.
    ///
    /// Replaces any previous session wholesale and starts a new epoch.
    pub fn login(&self, identity: UserIdentity, credential: Option<AccessToken>) {
        info!(email = %identity.email, "Session established");
        self.tx.send_modify(|session| {
            session.identity = Some(identity);
            session.credential = credential;
            session.restoring = false;
            session.epoch += 1;
        });
    }

    /// Swap the credential of the signed-in user (e.g. after a token refresh
    /// by the identity provider). Keeps the epoch.
    ///
    /// Returns `false` when nobody is signed in.
    pub fn replace_credential(&self, credential: AccessToken) -> bool {
        self.tx.send_if_modified(|session| {
            if session.identity.is_none() {
                return false;
            }
            session.credential = Some(credential);
            true
        })
    }

    /// Mark the identity provider as having reported "nobody signed in".
    pub fn finish_restoring(&self) {
        self.tx.send_if_modified(|session| {
            let was_restoring = session.restoring;
            session.restoring = false;
            was_restoring
        });
    }

    /// Clear identity and credential.
    ///
    /// Idempotent: returns `true` only for the call that actually cleared a
    /// session. Later calls change nothing and wake no subscriber.
    pub fn logout(&self) -> bool {
        let cleared = self.tx.send_if_modified(|session| {
            if session.is_cleared() {
                return false;
            }
            session.identity = None;
            session.credential = None;
            session.restoring = false;
            session.epoch += 1;
            true
        });

        if cleared {
            info!("Session cleared");
        } else {
            debug!("Logout requested on an already cleared session");
        }
        cleared
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthRejectionHandler for SessionStore {
    fn on_auth_rejected(&self, status: u16) {
        if self.logout() {
            warn!(status, "Credential rejected by backend, logged out");
        }
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.tx.borrow())
            .finish()
    }
}
