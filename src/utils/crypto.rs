//! Cryptographic primitives for the liquidation engine.
//!
//! This module provides the low-level operations the order verifier builds on:
//! - Hashes (SHA256, tagged SHA256)
//! - Addresses (20-byte identities derived from secp256k1 public keys)
//! - Private keys and key pairs producing recoverable ECDSA signatures
//! - Public key recovery from `(v, r, s)` signatures
//!
//! All curve operations use the secp256k1 library.

use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, PublicKey as Secp256k1PubKey, Secp256k1, SecretKey,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{Error, Result};
use crate::utils::constants::{
    ADDRESS_LENGTH, HASH_LENGTH, RECOVERY_V_OFFSET, SECP256K1_HALF_ORDER,
};

// ═══════════════════════════════════════════════════════════════════════════════
// SECP256K1 CONTEXT
// ═══════════════════════════════════════════════════════════════════════════════

thread_local! {
    static SECP: Secp256k1<secp256k1::All> = Secp256k1::new();
}

/// Execute a function with the secp256k1 context
fn with_secp<F, R>(f: F) -> R
where
    F: FnOnce(&Secp256k1<secp256k1::All>) -> R,
{
    SECP.with(|secp| f(secp))
}

/// Implements hex string serde for a fixed-size byte newtype
macro_rules! hex_serde {
    ($ty:ident, $len:expr) => {
        impl ::serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_str(&hex::encode(self.0))
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let s = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                let bytes = hex::decode(s.trim_start_matches("0x"))
                    .map_err(::serde::de::Error::custom)?;
                if bytes.len() != $len {
                    return Err(::serde::de::Error::custom(format!(
                        "expected {} bytes, got {}",
                        $len,
                        bytes.len()
                    )));
                }
                let mut arr = [0u8; $len];
                arr.copy_from_slice(&bytes);
                Ok($ty(arr))
            }
        }
    };
}

pub(crate) use hex_serde;

/// Decode a hex string (with or without `0x`) into a fixed-size array
pub(crate) fn decode_hex_array<const N: usize>(name: &str, s: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(s.trim_start_matches("0x")).map_err(|e| Error::InvalidParameter {
        name: name.into(),
        reason: e.to_string(),
    })?;
    if bytes.len() != N {
        return Err(Error::InvalidParameter {
            name: name.into(),
            reason: format!("expected {} bytes, got {}", N, bytes.len()),
        });
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

// ═══════════════════════════════════════════════════════════════════════════════
// HASH
// ═══════════════════════════════════════════════════════════════════════════════

/// A 32-byte cryptographic hash
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; HASH_LENGTH]);

hex_serde!(Hash, HASH_LENGTH);

impl Hash {
    /// Create a new hash from bytes
    pub fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Compute SHA256 hash of data
    pub fn sha256(data: &[u8]) -> Self {
        let result = Sha256::digest(data);
        let mut bytes = [0u8; HASH_LENGTH];
        bytes.copy_from_slice(&result);
        Self(bytes)
    }

    /// Get the hash as bytes
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        decode_hex_array("hash", s).map(Self)
    }

    /// Zero hash (all zeros)
    pub fn zero() -> Self {
        Self([0u8; HASH_LENGTH])
    }

    /// Check if hash is zero
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_LENGTH]
    }

    /// Convert to secp256k1 Message for signing
    pub fn to_message(&self) -> Message {
        Message::from_digest(self.0)
    }
}

impl Default for Hash {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Create a tagged hash (BIP-340 style)
pub fn tagged_hash(tag: &str, data: &[u8]) -> Hash {
    let tag_hash = Hash::sha256(tag.as_bytes());
    let mut hasher = Sha256::new();
    hasher.update(tag_hash.as_bytes());
    hasher.update(tag_hash.as_bytes());
    hasher.update(data);
    let result = hasher.finalize();
    let mut bytes = [0u8; HASH_LENGTH];
    bytes.copy_from_slice(&result);
    Hash::new(bytes)
}

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A 20-byte account identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

hex_serde!(Address, ADDRESS_LENGTH);

impl Address {
    /// The zero address, used for unset legs
    pub const ZERO: Self = Self([0u8; ADDRESS_LENGTH]);

    /// Create a new address from bytes
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Create from a slice (must be exactly 20 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        if slice.len() != ADDRESS_LENGTH {
            return Err(Error::InvalidParameter {
                name: "address".into(),
                reason: format!("expected {} bytes, got {}", ADDRESS_LENGTH, slice.len()),
            });
        }
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Derive the address of a secp256k1 public key
    ///
    /// The address is the trailing 20 bytes of SHA256 over the 64-byte
    /// uncompressed key body (the `0x04` prefix is dropped).
    pub fn from_public_key(pk: &Secp256k1PubKey) -> Self {
        let uncompressed = pk.serialize_uncompressed();
        let digest = Hash::sha256(&uncompressed[1..]);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest.as_bytes()[HASH_LENGTH - ADDRESS_LENGTH..]);
        Self(bytes)
    }

    /// Get the address as bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        decode_hex_array("address", s).map(Self)
    }

    /// Check if this is the zero address
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Short representation for display
    pub fn short(&self) -> String {
        let hex = self.to_hex();
        format!("0x{}...{}", &hex[..6], &hex[hex.len() - 4..])
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.short())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ECDSA SIGNATURE
// ═══════════════════════════════════════════════════════════════════════════════

/// A recoverable ECDSA signature split into `(v, r, s)`
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaSignature {
    /// Recovery byte, 27 or 28
    pub v: u8,
    /// `r` scalar, big-endian
    pub r: [u8; 32],
    /// `s` scalar, big-endian
    pub s: [u8; 32],
}

impl EcdsaSignature {
    /// Whether `s` lies in the lower half of the curve order
    pub fn is_low_s(&self) -> bool {
        self.s <= SECP256K1_HALF_ORDER
    }

    /// Concatenate `r || s`
    pub fn to_compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }
}

impl fmt::Debug for EcdsaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EcdsaSignature(v={}, r={}..., s={}...)",
            self.v,
            &hex::encode(self.r)[..8],
            &hex::encode(self.s)[..8]
        )
    }
}

/// Recover the address that produced `signature` over `message`
///
/// This performs no canonicality checks beyond what the curve library
/// requires; callers that need malleability protection must check `s` first.
pub fn recover_address(message: &Hash, signature: &EcdsaSignature) -> Result<Address> {
    let recid = signature
        .v
        .checked_sub(RECOVERY_V_OFFSET)
        .ok_or_else(|| Error::CryptoError {
            operation: "recovery_id".into(),
            details: format!("v = {}", signature.v),
        })?;
    let recid = RecoveryId::from_i32(i32::from(recid)).map_err(|e| Error::CryptoError {
        operation: "recovery_id".into(),
        details: e.to_string(),
    })?;
    let sig = RecoverableSignature::from_compact(&signature.to_compact(), recid).map_err(|e| {
        Error::CryptoError {
            operation: "signature_parse".into(),
            details: e.to_string(),
        }
    })?;
    let pk = with_secp(|secp| secp.recover_ecdsa(&message.to_message(), &sig)).map_err(|e| {
        Error::CryptoError {
            operation: "recover".into(),
            details: e.to_string(),
        }
    })?;
    Ok(Address::from_public_key(&pk))
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRIVATE KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// Private key length in bytes
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// A secp256k1 private key for signing orders
#[derive(Clone)]
pub struct PrivateKey {
    inner: SecretKey,
}

impl PrivateKey {
    /// Create a new private key from bytes
    pub fn from_bytes(bytes: &[u8; PRIVATE_KEY_LENGTH]) -> Result<Self> {
        let inner = SecretKey::from_slice(bytes).map_err(|e| Error::CryptoError {
            operation: "private_key_from_bytes".into(),
            details: e.to_string(),
        })?;
        Ok(Self { inner })
    }

    /// Generate a new random private key
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let inner = SecretKey::new(&mut rng);
        Self { inner }
    }

    /// Create from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = decode_hex_array::<PRIVATE_KEY_LENGTH>("private_key", s)?;
        Self::from_bytes(&bytes)
    }

    /// Convert to hex string (SECURITY: be careful with this)
    pub fn to_hex(&self) -> String {
        hex::encode(self.inner.secret_bytes())
    }

    /// Get the address controlled by this key
    pub fn address(&self) -> Address {
        with_secp(|secp| {
            let pk = Secp256k1PubKey::from_secret_key(secp, &self.inner);
            Address::from_public_key(&pk)
        })
    }

    /// Sign a message hash, producing a recoverable low-`s` signature
    pub fn sign(&self, message: &Hash) -> EcdsaSignature {
        with_secp(|secp| {
            let sig = secp.sign_ecdsa_recoverable(&message.to_message(), &self.inner);
            let (recid, compact) = sig.serialize_compact();
            let mut r = [0u8; 32];
            let mut s = [0u8; 32];
            r.copy_from_slice(&compact[..32]);
            s.copy_from_slice(&compact[32..]);
            // recovery ids produced by signing are always 0 or 1
            let v = RECOVERY_V_OFFSET + recid.to_i32() as u8;
            EcdsaSignature { v, r, s }
        })
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey([REDACTED])")
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// KEY PAIR
// ═══════════════════════════════════════════════════════════════════════════════

/// A private key together with its derived address
#[derive(Clone)]
pub struct KeyPair {
    private: PrivateKey,
    address: Address,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        Self::from_private(PrivateKey::generate())
    }

    /// Create from a private key
    pub fn from_private(private: PrivateKey) -> Self {
        let address = private.address();
        Self { private, address }
    }

    /// Create from private key hex
    pub fn from_hex(hex: &str) -> Result<Self> {
        Ok(Self::from_private(PrivateKey::from_hex(hex)?))
    }

    /// Get the private key
    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    /// Get the address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a message hash
    pub fn sign(&self, message: &Hash) -> EcdsaSignature {
        self.private.sign(message)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair {{ address: {:?} }}", self.address)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_sha256() {
        let hash = Hash::sha256(b"hello world");
        let expected =
            Hash::from_hex("b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9")
                .unwrap();
        assert_eq!(hash, expected);
    }

    #[test]
    fn test_tagged_hash_domain_separation() {
        let a = tagged_hash("Liquidator/Order", &[1, 2, 3]);
        let b = tagged_hash("Liquidator/Order", &[1, 2, 3]);
        let c = tagged_hash("Liquidator/TradeId", &[1, 2, 3]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sign_and_recover() {
        let keypair = KeyPair::generate();
        let message = Hash::sha256(b"order");

        let sig = keypair.sign(&message);
        assert!(sig.v == 27 || sig.v == 28);
        assert!(sig.is_low_s());

        let recovered = recover_address(&message, &sig).unwrap();
        assert_eq!(recovered, keypair.address());
    }

    #[test]
    fn test_recover_wrong_message_yields_other_address() {
        let keypair = KeyPair::generate();
        let sig = keypair.sign(&Hash::sha256(b"order"));

        match recover_address(&Hash::sha256(b"other"), &sig) {
            Ok(addr) => assert_ne!(addr, keypair.address()),
            Err(_) => {}
        }
    }

    #[test]
    fn test_recover_rejects_bad_v() {
        let keypair = KeyPair::generate();
        let message = Hash::sha256(b"order");
        let mut sig = keypair.sign(&message);
        sig.v = 3;
        assert!(matches!(
            recover_address(&message, &sig),
            Err(Error::CryptoError { .. })
        ));
    }

    #[test]
    fn test_addresses_are_distinct() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        assert_ne!(a.address(), b.address());
        assert!(!a.address().is_zero());
    }

    #[test]
    fn test_private_key_hex_roundtrip() {
        let original = PrivateKey::generate();
        let recovered = PrivateKey::from_hex(&original.to_hex()).unwrap();
        assert_eq!(original.address(), recovered.address());
    }

    #[test]
    fn test_address_serde_is_hex() {
        let addr = Address::new([0xab; ADDRESS_LENGTH]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(ADDRESS_LENGTH)));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_address_from_hex_accepts_prefix() {
        let addr = Address::from_hex("0x0000000000000000000000000000000000000001").unwrap();
        assert_eq!(addr.as_bytes()[19], 1);
        assert!(Address::from_hex("0x01").is_err());
    }
}
