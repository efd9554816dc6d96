//! Validated value types.
//!
//! These types enforce their invariants at construction time,
//! so request paths are never built from unchecked strings.

mod api_url;
mod email;

pub use api_url::ApiUrl;
pub use email::Email;
