//! Storage-safe key derivation for tracked identity values.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use warden_common::LockoutKey;
use warden_common::constants::DEFAULT_KEY_NAMESPACE;

/// Derives fixed-length storage keys from raw identity values.
pub struct KeyDeriver {
    /// Namespace mixed into the digest so deployments sharing a store do not
    /// collide on the same raw value
    namespace: String,
}

impl KeyDeriver {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Derive the key for `value`.
    ///
    /// Returns `None` for an empty value: no field value, nothing to protect,
    /// so callers skip tracking entirely. Always returns a key for non-empty
    /// input.
    ///
    /// Whitespace and control characters are substituted with `_` before
    /// hashing. The substitution is lossy and not collision safe; distinct
    /// values may map to the same key.
    pub fn derive(&self, value: &str) -> Option<LockoutKey> {
        if value.is_empty() {
            return None;
        }

        let normalized: String = value
            .chars()
            .map(|c| {
                if c.is_whitespace() || c.is_control() {
                    '_'
                } else {
                    c
                }
            })
            .collect();

        let mut hasher = Sha256::new();
        hasher.update(self.namespace.as_bytes());
        hasher.update(b":");
        hasher.update(normalized.as_bytes());

        Some(LockoutKey::new(URL_SAFE_NO_PAD.encode(hasher.finalize())))
    }
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_NAMESPACE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let deriver = KeyDeriver::default();

        let a = deriver.derive("alice").unwrap();
        let b = deriver.derive("alice").unwrap();
        assert_eq!(a, b);

        // SHA-256 digest, base64url without padding
        assert_eq!(a.as_str().len(), 43);
    }

    #[test]
    fn test_distinct_values_and_namespaces() {
        let deriver = KeyDeriver::default();
        assert_ne!(deriver.derive("alice"), deriver.derive("bob"));

        let other = KeyDeriver::new("login-form");
        assert_ne!(deriver.derive("alice"), other.derive("alice"));
    }

    #[test]
    fn test_empty_value_is_not_tracked() {
        assert!(KeyDeriver::default().derive("").is_none());
    }

    #[test]
    fn test_substitution_is_lossy() {
        let deriver = KeyDeriver::default();

        // Whitespace variants collapse onto the same key. Accepted trade-off.
        assert_eq!(deriver.derive("a b"), deriver.derive("a\tb"));
        assert_eq!(deriver.derive("a b"), deriver.derive("a\nb"));
    }
}
