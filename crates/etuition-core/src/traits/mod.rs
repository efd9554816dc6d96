//! Seams between the session core and its collaborators.

mod auth;
mod role;

pub use auth::AuthRejectionHandler;
pub use role::RoleResolver;
