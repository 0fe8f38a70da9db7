//! Credential verification for UCP partner calls.
//!
//! Resolves an inbound request to a `{tenant, merchant, platform}` identity
//! from an opaque API key, without being told which merchant is calling.
//! Only the one-way SHA-256 digest of the presented key is ever compared or
//! logged about; ambiguity fails closed.

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::error;

use crate::errors::ServiceError;
use crate::storage::MerchantStore;

pub const API_KEY_HEADER: &str = "x-ucp-api-key";
pub const PLATFORM_HEADER: &str = "x-ucp-platform-id";
pub const DEFAULT_PLATFORM: &str = "google";

/// Ephemeral per-request identity. Never persisted; constructed fresh by the
/// verifier on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub tenant_id: String,
    pub merchant_id: String,
    pub platform_id: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing API key credential")]
    MissingCredential,
    #[error("merchant not found")]
    NotFound,
    #[error("UCP is not enabled for this merchant")]
    UcpDisabled,
    #[error("invalid API key")]
    InvalidKey,
    #[error("platform is not allowed for this merchant")]
    PlatformNotAllowed,
    #[error("API key conflict")]
    KeyConflict,
    #[error("merchant lookup failed: {0}")]
    Storage(String),
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential => ServiceError::MissingCredential,
            AuthError::NotFound => ServiceError::NotFound("merchant not found".into()),
            AuthError::UcpDisabled => ServiceError::UcpDisabled,
            AuthError::InvalidKey => ServiceError::InvalidKey,
            AuthError::PlatformNotAllowed => ServiceError::PlatformNotAllowed,
            AuthError::KeyConflict => ServiceError::KeyConflict,
            AuthError::Storage(msg) => ServiceError::Internal(msg),
        }
    }
}

#[derive(Clone)]
pub struct CredentialVerifier {
    merchants: Arc<dyn MerchantStore>,
}

impl CredentialVerifier {
    pub fn new(merchants: Arc<dyn MerchantStore>) -> Self {
        Self { merchants }
    }

    /// One-way digest of a presented API key. The raw key is never stored or
    /// compared directly.
    pub fn hash_api_key(key: &str) -> String {
        hex::encode(Sha256::digest(key.as_bytes()))
    }

    /// Resolve the caller's identity from the request headers.
    ///
    /// With a known merchant id (explicit argument or legacy query parameter)
    /// this performs direct verification against that merchant's configured
    /// hash. Without one it reverse-looks-up the hash across all UCP-enabled
    /// merchants; more than one match is a fatal security condition and the
    /// request is refused.
    pub async fn verify(
        &self,
        headers: &HeaderMap,
        explicit_merchant_id: Option<&str>,
    ) -> Result<AuthContext, AuthError> {
        let presented = headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .ok_or(AuthError::MissingCredential)?;
        let presented_hash = Self::hash_api_key(presented);
        let platform_id = platform_from_headers(headers);

        match explicit_merchant_id {
            Some(merchant_id) => {
                self.verify_direct(merchant_id, &presented_hash, &platform_id)
                    .await
            }
            None => self.verify_reverse(&presented_hash, &platform_id).await,
        }
    }

    async fn verify_direct(
        &self,
        merchant_id: &str,
        presented_hash: &str,
        platform_id: &str,
    ) -> Result<AuthContext, AuthError> {
        let merchant = self
            .merchants
            .get(merchant_id)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?
            .ok_or(AuthError::NotFound)?;

        let settings = merchant.ucp_settings().ok_or(AuthError::UcpDisabled)?;
        if !settings.enabled {
            return Err(AuthError::UcpDisabled);
        }
        if !constant_time_eq(&settings.api_key_hash, presented_hash) {
            return Err(AuthError::InvalidKey);
        }
        if !settings.platform_allowed(platform_id) {
            return Err(AuthError::PlatformNotAllowed);
        }

        Ok(AuthContext {
            tenant_id: merchant.tenant_id,
            merchant_id: merchant.id,
            platform_id: platform_id.to_string(),
        })
    }

    async fn verify_reverse(
        &self,
        presented_hash: &str,
        platform_id: &str,
    ) -> Result<AuthContext, AuthError> {
        let enabled = self
            .merchants
            .list_ucp_enabled()
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let matches: Vec<_> = enabled
            .into_iter()
            .filter(|m| {
                m.ucp_settings()
                    .map(|s| constant_time_eq(&s.api_key_hash, presented_hash))
                    .unwrap_or(false)
            })
            .collect();

        match matches.len() {
            0 => Err(AuthError::InvalidKey),
            1 => {
                let merchant = matches.into_iter().next().unwrap();
                let settings = merchant.ucp_settings().ok_or(AuthError::UcpDisabled)?;
                if !settings.platform_allowed(platform_id) {
                    return Err(AuthError::PlatformNotAllowed);
                }
                Ok(AuthContext {
                    tenant_id: merchant.tenant_id,
                    merchant_id: merchant.id,
                    platform_id: platform_id.to_string(),
                })
            }
            _ => {
                // Data corruption: one credential must never resolve to more
                // than one merchant. Refuse rather than pick a match. The
                // diagnostics name merchants, never the key or its hash.
                let colliding: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
                error!(
                    merchants = ?colliding,
                    "API key hash collision across enabled merchants; refusing request"
                );
                Err(AuthError::KeyConflict)
            }
        }
    }

    /// Lighter check for anonymous/public-data routes: the merchant must
    /// exist and have UCP enabled; no credential comparison.
    pub async fn verify_public(&self, merchant_id: &str) -> Result<AuthContext, AuthError> {
        let merchant = self
            .merchants
            .get(merchant_id)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?
            .ok_or(AuthError::NotFound)?;
        if !merchant.ucp_enabled() {
            return Err(AuthError::UcpDisabled);
        }
        Ok(AuthContext {
            tenant_id: merchant.tenant_id,
            merchant_id: merchant.id,
            platform_id: DEFAULT_PLATFORM.to_string(),
        })
    }
}

pub fn platform_from_headers(headers: &HeaderMap) -> String {
    headers
        .get(PLATFORM_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| DEFAULT_PLATFORM.to_string())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Merchant, UcpConfig, UcpSettings};
    use crate::storage::memory::MemoryMerchantStore;
    use axum::http::HeaderValue;
    use std::collections::HashSet;

    fn merchant(id: &str, key: &str, enabled: bool, platforms: &[&str]) -> Merchant {
        Merchant {
            id: id.into(),
            tenant_id: format!("tenant-{id}"),
            name: format!("Shop {id}"),
            hostname: None,
            ucp: UcpConfig::Configured(UcpSettings {
                enabled,
                api_key_hash: CredentialVerifier::hash_api_key(key),
                allowed_platforms: platforms.iter().map(|p| p.to_string()).collect(),
                payment_handlers: vec![],
                shipping_countries: vec![],
                supported_actions: HashSet::new(),
            }),
        }
    }

    fn verifier_with(merchants: Vec<Merchant>) -> CredentialVerifier {
        let store = MemoryMerchantStore::new();
        for m in merchants {
            store.insert_unchecked(m);
        }
        CredentialVerifier::new(Arc::new(store))
    }

    fn headers_with_key(key: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_str(key).unwrap());
        headers
    }

    #[tokio::test]
    async fn missing_credential_is_rejected() {
        let verifier = verifier_with(vec![merchant("m1", "k1", true, &[])]);
        let err = verifier.verify(&HeaderMap::new(), None).await.unwrap_err();
        assert_eq!(err, AuthError::MissingCredential);
    }

    #[tokio::test]
    async fn direct_and_reverse_resolve_the_same_context() {
        let verifier = verifier_with(vec![merchant("m1", "k1", true, &[])]);
        let headers = headers_with_key("k1");

        let direct = verifier.verify(&headers, Some("m1")).await.unwrap();
        let reverse = verifier.verify(&headers, None).await.unwrap();
        assert_eq!(direct, reverse);
        assert_eq!(direct.merchant_id, "m1");
        assert_eq!(direct.tenant_id, "tenant-m1");
    }

    #[tokio::test]
    async fn collision_fails_closed_for_both_merchants() {
        let verifier = verifier_with(vec![
            merchant("m1", "shared", true, &[]),
            merchant("m2", "shared", true, &[]),
        ]);
        let err = verifier
            .verify(&headers_with_key("shared"), None)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::KeyConflict);
    }

    #[tokio::test]
    async fn disabled_merchants_do_not_participate_in_reverse_lookup() {
        let verifier = verifier_with(vec![
            merchant("m1", "shared", true, &[]),
            merchant("m2", "shared", false, &[]),
        ]);
        let ctx = verifier
            .verify(&headers_with_key("shared"), None)
            .await
            .unwrap();
        assert_eq!(ctx.merchant_id, "m1");
    }

    #[tokio::test]
    async fn wrong_key_and_unknown_merchant_yield_specific_errors() {
        let verifier = verifier_with(vec![merchant("m1", "k1", true, &[])]);
        assert_eq!(
            verifier
                .verify(&headers_with_key("wrong"), Some("m1"))
                .await
                .unwrap_err(),
            AuthError::InvalidKey
        );
        assert_eq!(
            verifier
                .verify(&headers_with_key("k1"), Some("nope"))
                .await
                .unwrap_err(),
            AuthError::NotFound
        );
        assert_eq!(
            verifier
                .verify(&headers_with_key("wrong"), None)
                .await
                .unwrap_err(),
            AuthError::InvalidKey
        );
    }

    #[tokio::test]
    async fn platform_allow_list_is_enforced() {
        let verifier = verifier_with(vec![merchant("m1", "k1", true, &["partner-x"])]);
        let headers = headers_with_key("k1");

        // Default platform is not in the allow-list.
        assert_eq!(
            verifier.verify(&headers, Some("m1")).await.unwrap_err(),
            AuthError::PlatformNotAllowed
        );
        assert_eq!(
            verifier.verify(&headers, None).await.unwrap_err(),
            AuthError::PlatformNotAllowed
        );

        let mut allowed = headers_with_key("k1");
        allowed.insert(PLATFORM_HEADER, HeaderValue::from_static("partner-x"));
        let ctx = verifier.verify(&allowed, Some("m1")).await.unwrap();
        assert_eq!(ctx.platform_id, "partner-x");
    }

    #[tokio::test]
    async fn ucp_disabled_is_distinct_from_not_found() {
        let verifier = verifier_with(vec![merchant("m1", "k1", false, &[])]);
        assert_eq!(
            verifier
                .verify(&headers_with_key("k1"), Some("m1"))
                .await
                .unwrap_err(),
            AuthError::UcpDisabled
        );
        assert_eq!(
            verifier.verify_public("m1").await.unwrap_err(),
            AuthError::UcpDisabled
        );
        assert_eq!(
            verifier.verify_public("missing").await.unwrap_err(),
            AuthError::NotFound
        );
    }

    #[tokio::test]
    async fn verify_public_skips_credential_comparison() {
        let verifier = verifier_with(vec![merchant("m1", "k1", true, &[])]);
        let ctx = verifier.verify_public("m1").await.unwrap();
        assert_eq!(ctx.merchant_id, "m1");
        assert_eq!(ctx.platform_id, DEFAULT_PLATFORM);
    }

    #[test]
    fn constant_time_eq_basics() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "ab"));
    }
}
