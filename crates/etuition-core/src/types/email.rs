//! Email address type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A syntactically plausible email address.
///
/// Emails key most per-user backend routes (`/users/{email}`,
/// `/applications/my-applications/{email}`), so they are checked once at the
/// edge instead of being interpolated into paths unchecked.
///
/// # Example
///
/// ```
/// use etuition_core::Email;
///
/// let email = Email::new("a@x.com").unwrap();
/// assert_eq!(email.domain(), "x.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Create a new email from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a plausible email address.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the part before the `@`.
    pub fn local_part(&self) -> &str {
        // Validated at construction
        self.0.rsplit_once('@').map(|(l, _)| l).unwrap_or("")
    }

    /// Returns the part after the `@`.
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, d)| d).unwrap_or("")
    }

    /// Returns the full address.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::Email {
                value: s.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid("must not contain whitespace"));
        }

        let Some((local, domain)) = s.rsplit_once('@') else {
            return Err(invalid("must contain '@'"));
        };

        if local.is_empty() {
            return Err(invalid("local part must be non-empty"));
        }

        if domain.is_empty() || domain.starts_with('.') || domain.ends_with('.') {
            return Err(invalid("domain must be non-empty"));
        }

        if s.contains('/') || s.contains('?') || s.contains('#') {
            return Err(invalid("must not contain URL delimiters"));
        }

        Ok(())
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Email {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Email {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
