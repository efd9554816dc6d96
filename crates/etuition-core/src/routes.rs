//! Dashboard route table: which roles may enter which location.

use crate::role::{Role, RoleSet};

/// Landing location for anyone turned away by the gate.
pub const LANDING: &str = "/";

/// Dashboard root; everything under it requires a signed-in user.
pub const DASHBOARD: &str = "/dashboard";

/// Role-specific dashboard areas. Longest prefix wins over [`DASHBOARD`].
const ROLE_AREAS: [(&str, Role); 3] = [
    ("/dashboard/student", Role::Student),
    ("/dashboard/tutor", Role::Tutor),
    ("/dashboard/admin", Role::Admin),
];

/// Roles admitted to `location`, or `None` for a public location.
///
/// Query strings, fragments and trailing slashes are ignored, and prefixes
/// match whole segments only (`/dashboardx` is public).
///
/// ```
/// use etuition_core::routes::required_roles;
/// use etuition_core::{Role, RoleSet};
///
/// assert_eq!(
///     required_roles("/dashboard/tutor/my-applications"),
///     Some(RoleSet::only(Role::Tutor))
/// );
/// assert_eq!(required_roles("/dashboard/profile"), Some(RoleSet::ANY));
/// assert_eq!(required_roles("/tuitions"), None);
/// ```
pub fn required_roles(location: &str) -> Option<RoleSet> {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');

    for (prefix, role) in ROLE_AREAS {
        if is_under(path, prefix) {
            return Some(RoleSet::only(role));
        }
    }

    is_under(path, DASHBOARD).then_some(RoleSet::ANY)
}

fn is_under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
