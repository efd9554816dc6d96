//! Route-entry access decisions.

use std::fmt;

use tracing::{debug, trace};

use crate::role::{RoleSet, RoleState};
use crate::routes;
use crate::session::Session;

/// Outcome of evaluating a protected location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Render the protected content.
    Allow,
    /// Navigate away to the given location.
    Redirect(String),
    /// Identity or role is still loading; show a neutral indicator, neither
    /// content nor redirect.
    Pending,
}

impl AccessDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AccessDecision::Pending)
    }

    /// Redirect destination, if this is a redirect.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            AccessDecision::Redirect(to) => Some(to),
            _ => None,
        }
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessDecision::Allow => f.write_str("allow"),
            AccessDecision::Redirect(to) => write!(f, "redirect {to}"),
            AccessDecision::Pending => f.write_str("pending"),
        }
    }
}

/// Guards protected locations by identity and role.
///
/// Holds no state between evaluations; every navigation evaluates afresh.
/// The gate never retries a failed role lookup and never trusts a role it
/// cannot see: failures redirect.
///
/// # Example
///
/// ```
/// use etuition_core::{AccessDecision, AccessGate, Email, Role, RoleState, Session, UserIdentity};
///
/// let gate = AccessGate::default();
/// let session = Session::authenticated(
///     UserIdentity::new("uid-1", "Ada", Email::new("a@x.com").unwrap()),
///     None,
/// );
///
/// let decision = gate.evaluate(&session, &RoleState::Loaded(Role::Student), Role::Tutor.into());
/// assert_eq!(decision, AccessDecision::Redirect("/".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGate {
    fallback: String,
}

impl AccessGate {
    /// Create a gate that redirects to `fallback`.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
        }
    }

    /// Where denied navigations are sent.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Decide whether `session` with role lookup `role` may enter a location
    /// requiring `required`.
    pub fn evaluate(&self, session: &Session, role: &RoleState, required: RoleSet) -> AccessDecision {
        if session.is_restoring() {
            trace!("Identity still loading");
            return AccessDecision::Pending;
        }

        if !role.is_settled() {
            trace!("Role still loading");
            return AccessDecision::Pending;
        }

        let Some(identity) = session.identity() else {
            debug!(%required, "No identity, redirecting");
            return self.redirect();
        };

        match role {
            RoleState::Loading => AccessDecision::Pending,
            RoleState::Failed => {
                debug!(email = %identity.email, "Role lookup failed, redirecting");
                self.redirect()
            }
            RoleState::Loaded(role) if required.contains(*role) => AccessDecision::Allow,
            RoleState::Loaded(role) => {
                debug!(email = %identity.email, %role, %required, "Role not admitted, redirecting");
                self.redirect()
            }
        }
    }

    /// Evaluate a location using the dashboard route table.
    ///
    /// Public locations are allowed without looking at the session.
    pub fn evaluate_route(&self, session: &Session, role: &RoleState, location: &str) -> AccessDecision {
        match routes::required_roles(location) {
            Some(required) => self.evaluate(session, role, required),
            None => AccessDecision::Allow,
        }
    }

    fn redirect(&self) -> AccessDecision {
        AccessDecision::Redirect(self.fallback.clone())
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(routes::LANDING)
    }
}
