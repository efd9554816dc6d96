//! etuition-core - session, role and access-gate primitives for the eTuition
//! marketplace client.
//!
//! The [`SessionStore`] is the single piece of shared state: the HTTP client
//! reads the credential from it and logs it out on rejection, and the
//! [`AccessGate`] reads the identity from it when a protected location is
//! entered.
//!
//! # Example
//!
//! ```
//! use etuition_core::{AccessDecision, AccessGate, Email, Role, RoleState, SessionStore, UserIdentity};
//!
//! let store = SessionStore::new();
//! let gate = AccessGate::default();
//! let required = Role::Tutor.into();
//!
//! store.login(UserIdentity::new("uid-1", "Ada", Email::new("a@x.com").unwrap()), None);
//! let session = store.snapshot();
//!
//! assert_eq!(gate.evaluate(&session, &RoleState::Loading, required), AccessDecision::Pending);
//! assert_eq!(gate.evaluate(&session, &RoleState::Loaded(Role::Tutor), required), AccessDecision::Allow);
//! ```

pub mod error;
pub mod gate;
pub mod identity;
pub mod role;
pub mod role_cache;
pub mod routes;
pub mod session;
pub mod tokens;
pub mod traits;
pub mod types;

pub use error::{ApiError, Error, InvalidInputError};
pub use gate::{AccessDecision, AccessGate};
pub use identity::UserIdentity;
pub use role::{Role, RoleSet, RoleState};
pub use role_cache::RoleCache;
pub use session::{Session, SessionStore};
pub use tokens::AccessToken;
pub use traits::{AuthRejectionHandler, RoleResolver};
pub use types::{ApiUrl, Email};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
