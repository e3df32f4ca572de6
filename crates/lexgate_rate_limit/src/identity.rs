//! Client identity derivation from request metadata.
//!
//! Identities are opaque hash-derived keys used for quota accounting.
//! Credentialed requests hash the credential itself; anonymous requests fall
//! back to a composite of client IP and user agent. The anonymous path is
//! best-effort: clients behind the same NAT with the same user agent share an
//! identity, which is documented behavior rather than a defect.

use sha2::{Digest, Sha256};

/// Prefix for identities derived from an API credential.
const API_PREFIX: &str = "api:";

/// Prefix for identities derived from the IP/user-agent fallback.
const ANON_PREFIX: &str = "anon:";

/// Request metadata consumed by identity derivation.
///
/// Captured at the HTTP boundary; the engine itself never touches a request
/// object. Missing fields are tolerated and fall back deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    /// Raw `Authorization` header value, if present.
    pub authorization: Option<String>,
    /// Raw `X-API-Key` header value, if present.
    pub api_key: Option<String>,
    /// Raw `User-Agent` header value, if present.
    pub user_agent: Option<String>,
    /// Raw `X-Forwarded-For` header value, if present.
    pub forwarded_for: Option<String>,
    /// Remote socket address as seen by the listener.
    pub remote_addr: Option<String>,
}

impl RequestMeta {
    /// Best-guess client IP: first `X-Forwarded-For` entry, then the socket
    /// address, then `"unknown"`.
    pub fn client_ip(&self) -> &str {
        if let Some(forwarded) = &self.forwarded_for {
            if let Some(first) = forwarded.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first;
                }
            }
        }
        self.remote_addr.as_deref().unwrap_or("unknown")
    }
}

/// Opaque per-caller key used for quota accounting.
///
/// Two requests carrying the same credential always map to the same identity.
///
/// # Examples
///
/// ```
/// use lexgate_rate_limit::{ClientIdentity, RequestMeta};
///
/// let meta = RequestMeta {
///     authorization: Some("Bearer secret-token".to_string()),
///     ..RequestMeta::default()
/// };
/// let identity = ClientIdentity::from_meta(&meta);
/// assert!(identity.is_credentialed());
/// assert_eq!(identity, ClientIdentity::from_meta(&meta));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    /// Derive an identity from request metadata.
    ///
    /// Priority: bearer token, then `X-API-Key`, then the anonymous
    /// IP/user-agent composite. Deterministic and free of side effects.
    pub fn from_meta(meta: &RequestMeta) -> Self {
        if let Some(auth) = &meta.authorization {
            if let Some(token) = auth.strip_prefix("Bearer ") {
                return Self(format!("{API_PREFIX}{}", digest16(token)));
            }
        }

        if let Some(key) = &meta.api_key {
            return Self::from_api_key(key);
        }

        let agent = meta.user_agent.as_deref().unwrap_or("unknown");
        let composite = format!("{}|{}", meta.client_ip(), agent);
        Self(format!("{ANON_PREFIX}{}", digest16(&composite)))
    }

    /// Derive the identity a raw API key maps to.
    ///
    /// Used both for `X-API-Key` requests and for hashing configured
    /// admin/premium keys into lookup form at startup.
    pub fn from_api_key(key: &str) -> Self {
        Self(format!("{API_PREFIX}{}", digest16(key)))
    }

    /// Whether this identity was derived from an API credential.
    pub fn is_credentialed(&self) -> bool {
        self.0.starts_with(API_PREFIX)
    }

    /// The identity as a string key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// First 16 hex characters of the SHA-256 digest of `input`.
fn digest16(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut out = String::with_capacity(16);
    for byte in &digest[..8] {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
