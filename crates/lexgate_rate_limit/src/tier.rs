//! Service tiers and identity classification.

use crate::ClientIdentity;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Service class governing a client's default quota policy.
///
/// A tier is determined once per request from the identity alone and never
/// mutated afterwards.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClientTier {
    /// Anonymous callers without credentials.
    Default,
    /// Credentialed callers without elevated privileges.
    Authenticated,
    /// Credentialed callers on a premium plan.
    Premium,
    /// Operator keys.
    Admin,
}

/// Maps derived identities to service tiers.
///
/// The key sets are read-mostly configuration, hashed into identity form at
/// construction so classification is a set lookup and raw keys never live in
/// the registry. The registry is immutable after construction and safe to
/// share across request threads.
#[derive(Debug, Clone, Default)]
pub struct TierRegistry {
    admin: HashSet<String>,
    premium: HashSet<String>,
}

impl TierRegistry {
    /// Build a registry from raw admin and premium API keys.
    pub fn new<I, J, S, T>(admin_keys: I, premium_keys: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let hash = |key: &str| ClientIdentity::from_api_key(key).as_str().to_string();
        Self {
            admin: admin_keys.into_iter().map(|k| hash(k.as_ref())).collect(),
            premium: premium_keys.into_iter().map(|k| hash(k.as_ref())).collect(),
        }
    }

    /// Classify an identity into a tier.
    ///
    /// Credentialed identities are looked up against the admin set, then the
    /// premium set, and otherwise classified `Authenticated`. Anonymous
    /// identities are always `Default`.
    pub fn classify(&self, identity: &ClientIdentity) -> ClientTier {
        if !identity.is_credentialed() {
            return ClientTier::Default;
        }
        if self.admin.contains(identity.as_str()) {
            ClientTier::Admin
        } else if self.premium.contains(identity.as_str()) {
            ClientTier::Premium
        } else {
            ClientTier::Authenticated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RequestMeta;

    #[test]
    fn test_anonymous_identity_is_default_tier() {
        let registry = TierRegistry::default();
        let identity = ClientIdentity::from_meta(&RequestMeta::default());
        assert_eq!(registry.classify(&identity), ClientTier::Default);
    }

    #[test]
    fn test_unknown_credential_is_authenticated() {
        let registry = TierRegistry::new(["root-key"], ["paid-key"]);
        let identity = ClientIdentity::from_api_key("some-other-key");
        assert_eq!(registry.classify(&identity), ClientTier::Authenticated);
    }

    #[test]
    fn test_configured_keys_classify_by_set() {
        let registry = TierRegistry::new(["root-key"], ["paid-key"]);
        assert_eq!(
            registry.classify(&ClientIdentity::from_api_key("root-key")),
            ClientTier::Admin
        );
        assert_eq!(
            registry.classify(&ClientIdentity::from_api_key("paid-key")),
            ClientTier::Premium
        );
    }

    #[test]
    fn test_admin_set_wins_over_premium() {
        let registry = TierRegistry::new(["both-key"], ["both-key"]);
        assert_eq!(
            registry.classify(&ClientIdentity::from_api_key("both-key")),
            ClientTier::Admin
        );
    }

    #[test]
    fn test_tier_display_is_lowercase() {
        assert_eq!(ClientTier::Default.to_string(), "default");
        assert_eq!(ClientTier::Authenticated.to_string(), "authenticated");
        assert_eq!(ClientTier::Premium.to_string(), "premium");
        assert_eq!(ClientTier::Admin.to_string(), "admin");
    }
}
