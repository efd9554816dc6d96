//! Backend base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated base URL for the marketplace REST backend.
///
/// Every request path resolves against this origin (and optional path
/// prefix). Must use HTTPS, or HTTP for localhost during development.
///
/// # Example
///
/// ```
/// use etuition_core::ApiUrl;
///
/// let api = ApiUrl::new("https://api.etuition.test/v1/").unwrap();
/// assert_eq!(
///     api.endpoint_url("/tuitions?page=1").unwrap(),
///     "https://api.etuition.test/v1/tuitions?page=1"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        let mut url = url;
        let trimmed = url.path().trim_end_matches('/').to_string();
        url.set_path(&trimmed);
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self(url))
    }

    /// Resolve a request path (which may carry a query string) against the base.
    ///
    /// # Errors
    ///
    /// Returns an error for absolute URLs or paths containing whitespace, so a
    /// caller can never redirect an authenticated request to another origin.
    pub fn endpoint_url(&self, path: &str) -> Result<String, Error> {
        if path.contains("://") || path.starts_with("//") {
            return Err(InvalidInputError::Path {
                value: path.to_string(),
                reason: "must be relative to the API base URL".to_string(),
            }
            .into());
        }
        if path.chars().any(char::is_whitespace) {
            return Err(InvalidInputError::Path {
                value: path.to_string(),
                reason: "must not contain whitespace".to_string(),
            }
            .into());
        }

        let base = self.0.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(format!("{}/{}", base, path))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        let scheme = url.scheme();
        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ApiUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let api = ApiUrl::new("https://api.etuition.test").unwrap();
        assert_eq!(api.host(), Some("api.etuition.test"));
    }

    #[test]
    fn valid_localhost_http() {
        let api = ApiUrl::new("http://localhost:5000").unwrap();
        assert_eq!(api.host(), Some("localhost"));
    }

    #[test]
    fn endpoint_url_joins_with_single_slash() {
        let api = ApiUrl::new("https://api.etuition.test/").unwrap();
        assert_eq!(
            api.endpoint_url("/users/a@x.com").unwrap(),
            "https://api.etuition.test/users/a@x.com"
        );
        assert_eq!(
            api.endpoint_url("admin-stats").unwrap(),
            "https://api.etuition.test/admin-stats"
        );
    }

    #[test]
    fn endpoint_url_keeps_path_prefix() {
        let api = ApiUrl::new("http://127.0.0.1:8080/api/").unwrap();
        assert_eq!(
            api.endpoint_url("/tuitions").unwrap(),
            "http://127.0.0.1:8080/api/tuitions"
        );
    }

    #[test]
    fn endpoint_url_rejects_other_origins() {
        let api = ApiUrl::new("https://api.etuition.test").unwrap();
        assert!(api.endpoint_url("https://evil.test/users").is_err());
        assert!(api.endpoint_url("//evil.test/users").is_err());
        assert!(api.endpoint_url("/users/a b").is_err());
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(ApiUrl::new("http://api.etuition.test").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiUrl::new("/users").is_err());
    }

    #[test]
    fn invalid_scheme() {
        assert!(ApiUrl::new("file:///tmp/api").is_err());
    }
}
