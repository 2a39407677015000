//! Session identity
//!
//! The signed-in user's id and bearer token, as handed over by the web
//! layer for the duration of one session. Nothing here is persisted.

use crate::error::SessionError;
use crate::util::SecretString;
use serde::Deserialize;

/// Header carrying the session token on every API call
pub const AUTHORIZATION: &str = "Authorization";

/// A signed-in user: id plus bearer token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionIdentity {
    pub uid: u64,
    token: SecretString,
}

impl SessionIdentity {
    /// Create an identity, rejecting blank tokens
    pub fn new(uid: u64, token: impl Into<String>) -> Result<Self, SessionError> {
        let token = SecretString::new(token);
        if token.is_empty() {
            return Err(SessionError::BlankToken);
        }
        Ok(Self { uid, token })
    }

    /// Build an optional identity from optional session values.
    ///
    /// Both values must be present for a signed-in session; anything less
    /// is anonymous.
    pub fn from_parts(uid: Option<u64>, token: Option<String>) -> Result<Option<Self>, SessionError> {
        match (uid, token) {
            (Some(uid), Some(token)) => Self::new(uid, token).map(Some),
            (None, None) => Ok(None),
            _ => Err(SessionError::Incomplete),
        }
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_identity() {
        let identity = SessionIdentity::new(7, "tok").unwrap();
        assert_eq!(identity.uid, 7);
        assert_eq!(identity.bearer(), "Bearer tok");
    }

    #[test]
    fn test_blank_token_rejected() {
        assert!(matches!(
            SessionIdentity::new(7, ""),
            Err(SessionError::BlankToken)
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let identity = SessionIdentity::new(7, "very-secret").unwrap();
        let debug = format!("{:?}", identity);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_from_parts() {
        assert!(SessionIdentity::from_parts(None, None).unwrap().is_none());
        assert!(
            SessionIdentity::from_parts(Some(1), Some("t".into()))
                .unwrap()
                .is_some()
        );
        assert!(matches!(
            SessionIdentity::from_parts(Some(1), None),
            Err(SessionError::Incomplete)
        ));
    }
}
