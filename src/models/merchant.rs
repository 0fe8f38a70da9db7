use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// External view of a shop: the identity a commerce platform interacts with.
///
/// Read-only from the gateway's perspective; the merchant operator configures
/// the UCP block through the admin surface, and the storage collaborator
/// decodes it into a typed [`UcpConfig`] exactly once at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Merchant {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub hostname: Option<String>,
    pub ucp: UcpConfig,
}

/// Typed UCP configuration with an explicit "not configured" variant, so the
/// rest of the gateway never handles undefined/optional-chaining ambiguity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UcpConfig {
    NotConfigured,
    Configured(UcpSettings),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UcpSettings {
    pub enabled: bool,
    /// SHA-256 hex digest of the merchant's API key. Unique across all
    /// enabled merchants; a duplicate is data corruption, never a valid state.
    pub api_key_hash: String,
    /// Empty set means any platform may call.
    #[serde(default)]
    pub allowed_platforms: HashSet<String>,
    #[serde(default)]
    pub payment_handlers: Vec<String>,
    #[serde(default)]
    pub shipping_countries: Vec<String>,
    #[serde(default)]
    pub supported_actions: HashSet<String>,
}

impl Merchant {
    pub fn ucp_settings(&self) -> Option<&UcpSettings> {
        match &self.ucp {
            UcpConfig::Configured(settings) => Some(settings),
            UcpConfig::NotConfigured => None,
        }
    }

    pub fn ucp_enabled(&self) -> bool {
        self.ucp_settings().map(|s| s.enabled).unwrap_or(false)
    }
}

impl UcpSettings {
    pub fn platform_allowed(&self, platform_id: &str) -> bool {
        self.allowed_platforms.is_empty() || self.allowed_platforms.contains(platform_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(enabled: bool) -> UcpSettings {
        UcpSettings {
            enabled,
            api_key_hash: "ab".repeat(32),
            allowed_platforms: HashSet::new(),
            payment_handlers: vec!["credit_card".into()],
            shipping_countries: vec!["TW".into()],
            supported_actions: HashSet::new(),
        }
    }

    #[test]
    fn not_configured_is_not_enabled() {
        let merchant = Merchant {
            id: "m1".into(),
            tenant_id: "t1".into(),
            name: "Shop".into(),
            hostname: None,
            ucp: UcpConfig::NotConfigured,
        };
        assert!(!merchant.ucp_enabled());
        assert!(merchant.ucp_settings().is_none());
    }

    #[test]
    fn configured_but_disabled_is_not_enabled() {
        let merchant = Merchant {
            id: "m1".into(),
            tenant_id: "t1".into(),
            name: "Shop".into(),
            hostname: None,
            ucp: UcpConfig::Configured(settings(false)),
        };
        assert!(!merchant.ucp_enabled());
        assert!(merchant.ucp_settings().is_some());
    }

    #[test]
    fn empty_allow_list_admits_any_platform() {
        let s = settings(true);
        assert!(s.platform_allowed("google"));
        assert!(s.platform_allowed("anything"));

        let mut restricted = settings(true);
        restricted.allowed_platforms.insert("google".into());
        assert!(restricted.platform_allowed("google"));
        assert!(!restricted.platform_allowed("other"));
    }
}
