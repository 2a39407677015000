//! Bearer token wrapper that keeps session tokens out of logs.

use serde::Deserialize;
use std::fmt;

/// A session token that never prints its value.
///
/// `Debug` and `Display` both render `[REDACTED]`, so a `SessionIdentity`
/// can sit inside `tracing` fields and error messages safely. The value is
/// only reachable through [`SecretString::expose_secret`].
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Explicitly expose the token, e.g. to build the `Authorization` header.
    #[inline]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_redacted() {
        let secret = SecretString::new("session-token");
        assert_eq!(format!("{:?}", secret), "[REDACTED]");
        assert_eq!(format!("{}", secret), "[REDACTED]");
    }

    #[test]
    fn test_expose_secret() {
        let secret = SecretString::new("session-token");
        assert_eq!(secret.expose_secret(), "session-token");
    }

    #[test]
    fn test_blank_is_empty() {
        assert!(SecretString::new("   ").is_empty());
        assert!(!SecretString::new("t").is_empty());
    }

    #[test]
    fn test_deserialize() {
        let secret: SecretString = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(secret.expose_secret(), "abc");
    }
}
