//! Roles, role sets, and the role lookup state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Authorization category deciding which dashboard a user may enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Posts tuition requests and pays tutors.
    Student,
    /// Applies to tuitions.
    Tutor,
    /// Moderates users and tuitions.
    Admin,
}

impl Role {
    /// All roles, in display order.
    pub const ALL: [Role; 3] = [Role::Student, Role::Tutor, Role::Admin];

    /// The wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Tutor => "tutor",
            Role::Admin => "admin",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Role::Student => 1,
            Role::Tutor => 1 << 1,
            Role::Admin => 1 << 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "tutor" => Ok(Role::Tutor),
            "admin" => Ok(Role::Admin),
            other => Err(Error::RoleLookup {
                reason: format!("unknown role '{other}'"),
            }),
        }
    }
}

/// The set of roles admitted to a location.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    /// Admits nobody.
    pub const NONE: RoleSet = RoleSet(0);

    /// Admits every role.
    pub const ANY: RoleSet = RoleSet(0b111);

    /// A set containing exactly `role`.
    pub const fn only(role: Role) -> Self {
        RoleSet(role.bit())
    }

    /// A set containing each of `roles`.
    pub fn of(roles: &[Role]) -> Self {
        roles.iter().fold(RoleSet::NONE, |set, role| set.with(*role))
    }

    /// This set plus `role`.
    pub const fn with(self, role: Role) -> Self {
        RoleSet(self.0 | role.bit())
    }

    /// Check membership.
    pub const fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    /// Iterate the roles in the set.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|r| self.contains(*r))
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        RoleSet::only(role)
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|r| r.as_str()).collect();
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

/// Progress of resolving the current identity's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleState {
    /// The lookup has not completed.
    Loading,
    /// The backend reported this role.
    Loaded(Role),
    /// The lookup failed; authorization cannot be proven.
    Failed,
}

impl RoleState {
    /// The loaded role, if any.
    pub fn role(&self) -> Option<Role> {
        match self {
            RoleState::Loaded(role) => Some(*role),
            _ => None,
        }
    }

    /// Check if the lookup has finished (successfully or not).
    pub fn is_settled(&self) -> bool {
        !matches!(self, RoleState::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_wire_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn unknown_role_is_lookup_error() {
        let err = "moderator".parse::<Role>().unwrap_err();
        assert!(matches!(err, Error::RoleLookup { .. }));
        assert!("Tutor".parse::<Role>().is_err());
    }

    #[test]
    fn role_set_membership() {
        let set = RoleSet::of(&[Role::Student, Role::Admin]);
        assert!(set.contains(Role::Student));
        assert!(!set.contains(Role::Tutor));
        assert!(set.contains(Role::Admin));
        assert_eq!(set.to_string(), "student|admin");

        assert!(Role::ALL.iter().all(|r| RoleSet::ANY.contains(*r)));
        assert!(Role::ALL.iter().all(|r| !RoleSet::NONE.contains(*r)));
        assert_eq!(RoleSet::from(Role::Tutor), RoleSet::only(Role::Tutor));
    }

    #[test]
    fn role_state_accessors() {
        assert_eq!(RoleState::Loaded(Role::Tutor).role(), Some(Role::Tutor));
        assert_eq!(RoleState::Failed.role(), None);
        assert!(!RoleState::Loading.is_settled());
        assert!(RoleState::Failed.is_settled());
    }
}
