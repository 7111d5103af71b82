// Queue Domain Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{DomainError, Result};

/// Queue address (`<scheme>://<authority>/<name>`)
///
/// The scheme is normalized to lowercase on parse, so two addresses that only
/// differ in scheme casing compare and hash equal. Authority and path are kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QueueAddress {
    scheme: String,
    authority: String,
    path: String,
}

impl QueueAddress {
    /// Parse a queue URI
    ///
    /// # Errors
    /// `DomainError::InvalidAddress` if the URI is empty, has no scheme
    /// separator, has a malformed scheme, or names no queue.
    ///
    /// # Example
    /// ```text
    /// let addr = QueueAddress::parse("memory://./test-inbox-work")?;
    /// assert_eq!(addr.scheme(), "memory");
    /// assert_eq!(addr.name(), "test-inbox-work");
    /// ```
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(DomainError::InvalidAddress("uri is empty".to_string()));
        }

        let (scheme, rest) = uri.split_once("://").ok_or_else(|| {
            DomainError::InvalidAddress(format!("'{}' has no scheme separator", uri))
        })?;

        if !is_valid_scheme(scheme) {
            return Err(DomainError::InvalidAddress(format!(
                "'{}' has an invalid scheme",
                uri
            )));
        }

        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return Err(DomainError::InvalidAddress(format!(
                "'{}' does not name a queue",
                uri
            )));
        }

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            authority: authority.to_string(),
            path: path.to_string(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Case-insensitive scheme check
    pub fn has_scheme(&self, scheme: &str) -> bool {
        self.scheme.eq_ignore_ascii_case(scheme)
    }
}

// RFC 3986: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl fmt::Display for QueueAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.scheme, self.authority, self.path)
    }
}

impl FromStr for QueueAddress {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for QueueAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<QueueAddress> for String {
    fn from(address: QueueAddress) -> Self {
        address.to_string()
    }
}
