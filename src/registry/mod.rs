//! Trust-attribute registry and the authorization gate built on it.
//!
//! The registry is an external collaborator that maps `(address, key)` to an
//! integer value; an attribute is set when its value is non-zero. The gate
//! asks the registry on every call and never caches an answer.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::utils::crypto::{hex_serde, Address, Hash};

// ═══════════════════════════════════════════════════════════════════════════════
// ATTRIBUTE KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// Length of an attribute key
pub const ATTRIBUTE_KEY_LENGTH: usize = 32;

/// A 32-byte registry attribute key
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeKey([u8; ATTRIBUTE_KEY_LENGTH]);

hex_serde!(AttributeKey, ATTRIBUTE_KEY_LENGTH);

impl AttributeKey {
    /// Build a key from a name
    ///
    /// Names of up to 32 bytes are stored left-aligned and zero padded;
    /// longer names are replaced by their SHA256 digest.
    pub fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        if bytes.len() > ATTRIBUTE_KEY_LENGTH {
            return Self(*Hash::sha256(bytes).as_bytes());
        }
        let mut key = [0u8; ATTRIBUTE_KEY_LENGTH];
        key[..bytes.len()].copy_from_slice(bytes);
        Self(key)
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; ATTRIBUTE_KEY_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.0.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        match std::str::from_utf8(&self.0[..end]) {
            Ok(name) => write!(f, "AttributeKey({})", name),
            Err(_) => write!(f, "AttributeKey(0x{})", hex::encode(self.0)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Read access to a trust-attribute registry
pub trait AttributeRegistry {
    /// Raw attribute value, zero when unset
    fn attribute_value(&self, account: &Address, key: &AttributeKey) -> u64;

    /// Whether the attribute is set on `account`
    fn has_attribute(&self, account: &Address, key: &AttributeKey) -> bool {
        self.attribute_value(account, key) != 0
    }
}

impl<R: AttributeRegistry + ?Sized> AttributeRegistry for Arc<R> {
    fn attribute_value(&self, account: &Address, key: &AttributeKey) -> u64 {
        (**self).attribute_value(account, key)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IN-MEMORY REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory registry, shareable between the engine and whoever administers it
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    values: RwLock<HashMap<(Address, AttributeKey), u64>>,
}

impl InMemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute value; zero clears it
    pub fn set_attribute_value(&self, account: Address, key: AttributeKey, value: u64) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        if value == 0 {
            values.remove(&(account, key));
        } else {
            values.insert((account, key), value);
        }
    }

    /// Set an attribute by name to 1
    pub fn grant(&self, account: Address, name: &str) {
        self.set_attribute_value(account, AttributeKey::from_name(name), 1);
    }

    /// Clear an attribute by name
    pub fn revoke(&self, account: Address, name: &str) {
        self.set_attribute_value(account, AttributeKey::from_name(name), 0);
    }

    /// Number of set attributes
    pub fn len(&self) -> usize {
        self.values.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check if no attribute is set
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttributeRegistry for InMemoryRegistry {
    fn attribute_value(&self, account: &Address, key: &AttributeKey) -> u64 {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(&(*account, *key)).copied().unwrap_or(0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// AUTHORIZATION GATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Answers the two authorization questions the engine asks
#[derive(Debug, Clone)]
pub struct AuthorizationGate<R> {
    registry: R,
    validator_key: AttributeKey,
    beneficiary_key: AttributeKey,
}

impl<R: AttributeRegistry> AuthorizationGate<R> {
    /// Create a gate over `registry` using the given attribute names
    pub fn new(registry: R, validator_attribute: &str, beneficiary_attribute: &str) -> Self {
        Self {
            registry,
            validator_key: AttributeKey::from_name(validator_attribute),
            beneficiary_key: AttributeKey::from_name(beneficiary_attribute),
        }
    }

    /// Whether `address` may settle orders
    pub fn is_approved_validator(&self, address: &Address) -> bool {
        self.registry.has_attribute(address, &self.validator_key)
    }

    /// Whether `address` may receive reclaimed proceeds
    pub fn is_approved_beneficiary(&self, address: &Address) -> bool {
        self.registry.has_attribute(address, &self.beneficiary_key)
    }

    /// Underlying registry
    pub fn registry(&self) -> &R {
        &self.registry
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
