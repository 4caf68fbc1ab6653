//! Bearer credentials and the issuers that hand them out.
//!
//! Credentials are short-lived and their expiry is unknown to the client: it
//! only learns a token is stale when the backend answers 403. Callers therefore
//! ask the issuer for a fresh token before every connection attempt and never
//! hold on to one.

use std::fmt;

use async_trait::async_trait;
use tracing::warn;

pub const BEARER_TOKEN_ENV: &str = "ASSISTANT_BEARER_TOKEN";

/// An opaque bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Source of fresh credentials, typically the identity provider session.
/// Returns `None` when the user is signed out or the provider cannot issue one.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn fetch(&self) -> Option<Credential>;
}

/// Always hands out the same token.
#[derive(Debug, Clone)]
pub struct StaticCredentialIssuer {
    credential: Credential,
}

impl StaticCredentialIssuer {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credential: Credential::new(token),
        }
    }
}

#[async_trait]
impl CredentialIssuer for StaticCredentialIssuer {
    async fn fetch(&self) -> Option<Credential> {
        Some(self.credential.clone())
    }
}

/// Reads `ASSISTANT_BEARER_TOKEN` on every fetch so an external refresher can
/// rotate the token underneath a running client.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialIssuer;

#[async_trait]
impl CredentialIssuer for EnvCredentialIssuer {
    async fn fetch(&self) -> Option<Credential> {
        match std::env::var(BEARER_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => Some(Credential::new(token.trim())),
            _ => {
                warn!("{BEARER_TOKEN_ENV} is not set; no credential available");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("secret-jwt");
        assert_eq!(format!("{credential:?}"), "Credential(<redacted>)");
        assert_eq!(credential.token(), "secret-jwt");
    }

    #[tokio::test]
    async fn test_static_issuer_returns_token() {
        let issuer = StaticCredentialIssuer::new("abc");
        assert_eq!(issuer.fetch().await, Some(Credential::new("abc")));
    }
}
