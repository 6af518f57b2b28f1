//! Bearer token issuance and verification
//!
//! Two token kinds coexist. Opaque tokens are random strings registered in a
//! shared in-process map and stay valid until revoked or the process exits.
//! Signed tokens are verified by [`JwtService`] without any lookup.
//! Verification always tries the map first, and only structurally signed
//! tokens ever reach signature parsing.

use rand::{Rng, distributions::Alphanumeric};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{AuthResult, TokenError};
use crate::jwt::JwtService;

/// Length of an opaque token
pub const OPAQUE_TOKEN_LEN: usize = 32;

/// Which kind of token the service hands out on signup and login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[default]
    Opaque,
    Signed,
}

/// A raw bearer token classified by its shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerToken<'a> {
    Opaque(&'a str),
    Signed(&'a str),
}

impl<'a> BearerToken<'a> {
    /// Classify a token: three non-empty dot-separated segments is a signed
    /// token, anything else is treated as opaque
    pub fn parse(raw: &'a str) -> Self {
        let mut segments = raw.split('.');
        let signed = (0..3).all(|_| segments.next().is_some_and(|s| !s.is_empty()))
            && segments.next().is_none();

        if signed {
            BearerToken::Signed(raw)
        } else {
            BearerToken::Opaque(raw)
        }
    }
}

/// Shared map from opaque token to user id
#[derive(Debug, Clone, Default)]
pub struct OpaqueTokenStore {
    tokens: Arc<RwLock<HashMap<String, i64>>>,
}

impl OpaqueTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh random token for `user_id` and register it
    pub async fn issue(&self, user_id: i64) -> String {
        let token = generate_opaque_token();
        self.tokens.write().await.insert(token.clone(), user_id);
        token
    }

    pub async fn lookup(&self, token: &str) -> Option<i64> {
        self.tokens.read().await.get(token).copied()
    }

    /// Forget a token; returns whether it was registered
    pub async fn revoke(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token).is_some()
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn generate_opaque_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(OPAQUE_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Issues and verifies both token kinds
#[derive(Clone)]
pub struct TokenService {
    kind: TokenKind,
    opaque: OpaqueTokenStore,
    jwt: JwtService,
}

impl TokenService {
    pub fn new(kind: TokenKind, jwt: JwtService) -> Self {
        Self {
            kind,
            opaque: OpaqueTokenStore::new(),
            jwt,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Issue a token of the configured kind
    pub async fn issue(&self, user_id: i64) -> AuthResult<String> {
        match self.kind {
            TokenKind::Opaque => Ok(self.issue_opaque(user_id).await),
            TokenKind::Signed => self.issue_signed(user_id),
        }
    }

    pub async fn issue_opaque(&self, user_id: i64) -> String {
        self.opaque.issue(user_id).await
    }

    pub fn issue_signed(&self, user_id: i64) -> AuthResult<String> {
        self.jwt.generate_token(user_id)
    }

    /// Resolve a bearer token to the user id it was issued for
    pub async fn verify(&self, raw: &str) -> Result<i64, TokenError> {
        if let Some(user_id) = self.opaque.lookup(raw).await {
            return Ok(user_id);
        }

        let result = match BearerToken::parse(raw) {
            BearerToken::Opaque(_) => Err(TokenError::Unknown),
            BearerToken::Signed(token) => self.jwt.validate_token(token),
        };

        if let Err(e) = &result {
            debug!("Token verification failed: {}", e);
        }
        result
    }

    /// Revoke an opaque token; signed tokens can only expire
    pub async fn revoke(&self, raw: &str) -> bool {
        self.opaque.revoke(raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::{DEFAULT_EXPIRY_SECONDS, JwtConfig};

    fn service(kind: TokenKind) -> TokenService {
        TokenService::new(
            kind,
            JwtService::new(JwtConfig {
                secret: "token-tests".to_string(),
                expiry_seconds: DEFAULT_EXPIRY_SECONDS,
            }),
        )
    }

    #[test]
    fn test_bearer_token_classification() {
        assert_eq!(
            BearerToken::parse("aGVhZA.Ym9keQ.c2ln"),
            BearerToken::Signed("aGVhZA.Ym9keQ.c2ln")
        );
        assert_eq!(BearerToken::parse("abcDEF123"), BearerToken::Opaque("abcDEF123"));
        assert_eq!(BearerToken::parse("a..c"), BearerToken::Opaque("a..c"));
        assert_eq!(BearerToken::parse("a.b"), BearerToken::Opaque("a.b"));
        assert_eq!(BearerToken::parse("a.b.c.d"), BearerToken::Opaque("a.b.c.d"));
        assert_eq!(BearerToken::parse(""), BearerToken::Opaque(""));
    }

    #[tokio::test]
    async fn test_opaque_token_shape() {
        let store = OpaqueTokenStore::new();
        let token = store.issue(1).await;
        assert_eq!(token.len(), OPAQUE_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_opaque_issue_verify_revoke() {
        let tokens = service(TokenKind::Opaque);
        assert_eq!(tokens.kind(), TokenKind::Opaque);

        let alice = tokens.issue(1).await.unwrap();
        let bob = tokens.issue(2).await.unwrap();
        assert_ne!(alice, bob);

        assert_eq!(tokens.verify(&alice).await, Ok(1));
        assert_eq!(tokens.verify(&bob).await, Ok(2));

        assert!(tokens.revoke(&alice).await);
        assert_eq!(tokens.verify(&alice).await, Err(TokenError::Unknown));
        assert!(!tokens.revoke(&alice).await);
    }

    #[tokio::test]
    async fn test_signed_kind_issues_verifiable_tokens() {
        let tokens = service(TokenKind::Signed);
        assert_eq!(tokens.kind(), TokenKind::Signed);

        let token = tokens.issue(9).await.unwrap();
        assert!(matches!(BearerToken::parse(&token), BearerToken::Signed(_)));
        assert_eq!(tokens.verify(&token).await, Ok(9));
        assert!(tokens.opaque.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_tokens_fail() {
        let tokens = service(TokenKind::Opaque);
        tokens.issue(1).await.unwrap();

        assert_eq!(tokens.verify("xyz").await, Err(TokenError::Unknown));
        assert_eq!(tokens.verify("").await, Err(TokenError::Unknown));
        assert_eq!(tokens.verify("x.y.z").await, Err(TokenError::Malformed));
    }

    #[tokio::test]
    async fn test_both_kinds_verify_side_by_side() {
        let tokens = service(TokenKind::Opaque);

        let opaque = tokens.issue_opaque(5).await;
        let signed = tokens.issue_signed(6).unwrap();

        assert_eq!(tokens.verify(&opaque).await, Ok(5));
        assert_eq!(tokens.verify(&signed).await, Ok(6));
    }

    #[tokio::test]
    async fn test_concurrent_issuance_keeps_every_token() {
        let tokens = service(TokenKind::Opaque);

        let handles: Vec<_> = (0..100)
            .map(|user_id| {
                let tokens = tokens.clone();
                tokio::spawn(async move { (user_id, tokens.issue_opaque(user_id).await) })
            })
            .collect();

        let mut issued = Vec::new();
        for handle in handles {
            issued.push(handle.await.unwrap());
        }

        assert_eq!(tokens.opaque.len().await, 100);
        for (user_id, token) in issued {
            assert_eq!(tokens.verify(&token).await, Ok(user_id));
        }
    }
}
