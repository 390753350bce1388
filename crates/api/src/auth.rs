//! Bearer-token authentication.
//!
//! The API never trusts a client-supplied user ID; every cart, checkout, and
//! token route resolves the caller from the `Authorization` header through an
//! [`IdentityVerifier`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use common::UserId;

use crate::error::ApiError;

/// Resolves a bearer token to the user it was issued to.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Returns the user the token belongs to, or `None` if the token is
    /// unknown, expired, or malformed.
    async fn verify(&self, token: &str) -> Option<UserId>;
}

/// Verifier backed by a static token table.
///
/// Suitable for tests and single-process deployments; tokens are seeded at
/// startup (see `AUTH_TOKENS` in the config).
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: Arc<RwLock<HashMap<String, UserId>>>,
}

impl StaticTokenVerifier {
    /// Creates an empty verifier. Every request is rejected until tokens
    /// are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token for a user.
    pub fn register(&self, token: impl Into<String>, user_id: UserId) {
        self.tokens.write().unwrap().insert(token.into(), user_id);
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Option<UserId> {
        self.tokens.read().unwrap().get(token).cloned()
    }
}

/// Extracts and verifies the bearer token from the request headers.
pub async fn authenticate(
    verifier: &dyn IdentityVerifier,
    headers: &HeaderMap,
) -> Result<UserId, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    let token = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;
    verifier.verify(token).await.ok_or(ApiError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[tokio::test]
    async fn test_known_token_resolves_user() {
        let verifier = StaticTokenVerifier::new();
        verifier.register("tok-1", UserId::new("u1"));

        let user = authenticate(&verifier, &headers_with("Bearer tok-1"))
            .await
            .unwrap();
        assert_eq!(user, UserId::new("u1"));
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let verifier = StaticTokenVerifier::new();
        let result = authenticate(&verifier, &headers_with("Bearer nope")).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let verifier = StaticTokenVerifier::new();
        let result = authenticate(&verifier, &HeaderMap::new()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_unauthorized() {
        let verifier = StaticTokenVerifier::new();
        verifier.register("tok-1", UserId::new("u1"));
        let result = authenticate(&verifier, &headers_with("Basic tok-1")).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }
}
