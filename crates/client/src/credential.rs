//! Session credential and profile types.
//!
//! The engine treats the bearer credential as opaque: it is supplied by the
//! sign-in flow (or restored by the host application on resume) and attached
//! to every remote call. Absence of a credential means "no session" and the
//! coordinator skips remote calls entirely rather than attempting them.

use secrecy::{ExposeSecret, SecretString};

/// An opaque bearer credential for the order/cart service.
///
/// Implements `Debug` manually so the token never leaks into logs.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Wrap a raw bearer token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Expose the raw token for attaching to a request.
    #[must_use]
    pub fn token(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential").field(&"[REDACTED]").finish()
    }
}

/// The signed-in user's profile, as returned by the account service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Display name.
    pub name: String,
    /// Account email address.
    pub email: String,
}

/// An authenticated session: credential plus profile.
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer credential for remote calls.
    pub credential: Credential,
    /// Profile of the signed-in user.
    pub profile: Profile,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("super-secret-bearer-token");
        let debug_output = format!("{credential:?}");

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-bearer-token"));
    }

    #[test]
    fn test_token_roundtrip() {
        let credential = Credential::new("abc123");
        assert_eq!(credential.token(), "abc123");
    }
}
