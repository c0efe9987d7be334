//! Signed swap order types.
//!
//! An order is an off-chain statement by a signer: "I will give `signer.amount`
//! of `signer.token` in exchange for `sender.amount` of `sender.token`, settled
//! through `validator`, until `expiry`".

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::amount::Amount;
use crate::utils::constants::{
    ERC1155_KIND, ERC20_KIND, ERC721_KIND, KIND_LENGTH, SIGNATURE_VERSION_PERSONAL,
    SIGNATURE_VERSION_STRUCTURED, TRADE_ID_LENGTH,
};
use crate::utils::crypto::{decode_hex_array, hex_serde, Address, EcdsaSignature};
use crate::error::Result;

// ═══════════════════════════════════════════════════════════════════════════════
// KIND
// ═══════════════════════════════════════════════════════════════════════════════

/// Four-byte interface tag identifying how a leg's asset is transferred
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Kind([u8; KIND_LENGTH]);

hex_serde!(Kind, KIND_LENGTH);

impl Kind {
    /// Fungible token leg
    pub const ERC20: Self = Self(ERC20_KIND);
    /// Non-fungible token leg
    pub const ERC721: Self = Self(ERC721_KIND);
    /// Multi-token leg
    pub const ERC1155: Self = Self(ERC1155_KIND);

    /// Create from raw tag bytes
    pub const fn new(bytes: [u8; KIND_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Raw tag bytes
    pub fn as_bytes(&self) -> &[u8; KIND_LENGTH] {
        &self.0
    }

    /// Whether the tag names a fungible asset
    pub fn is_fungible(&self) -> bool {
        *self == Self::ERC20
    }

    /// Whether the tag is one of the known interface tags
    pub fn is_known(&self) -> bool {
        *self == Self::ERC20 || *self == Self::ERC721 || *self == Self::ERC1155
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kind(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARTY
// ═══════════════════════════════════════════════════════════════════════════════

/// One leg of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Transfer interface of the asset
    pub kind: Kind,
    /// Wallet that gives (signer, sender) or receives (affiliate) the asset
    pub wallet: Address,
    /// Asset contract
    pub token: Address,
    /// Amount in base units
    pub amount: Amount,
    /// Token id for non-fungible assets, zero otherwise
    pub id: u128,
}

impl Party {
    /// A fungible leg
    pub fn erc20(wallet: Address, token: Address, amount: Amount) -> Self {
        Self {
            kind: Kind::ERC20,
            wallet,
            token,
            amount,
            id: 0,
        }
    }

    /// An unused leg (fungible kind, zero addresses, zero amount)
    pub fn empty() -> Self {
        Self::erc20(Address::ZERO, Address::ZERO, Amount::ZERO)
    }

    /// Whether this leg is unused
    pub fn is_empty(&self) -> bool {
        self.wallet.is_zero() && self.token.is_zero() && self.amount.is_zero() && self.id == 0
    }
}

impl Default for Party {
    fn default() -> Self {
        Self::empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIGNATURE
// ═══════════════════════════════════════════════════════════════════════════════

/// How the canonical order hash was presented to the signer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureVersion {
    /// The canonical hash is signed directly
    Structured,
    /// The canonical hash is wrapped in the personal-sign prefix
    PersonalSign,
}

impl SignatureVersion {
    /// Wire byte for this version
    pub fn byte(&self) -> u8 {
        match self {
            SignatureVersion::Structured => SIGNATURE_VERSION_STRUCTURED,
            SignatureVersion::PersonalSign => SIGNATURE_VERSION_PERSONAL,
        }
    }

    /// Parse a wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SIGNATURE_VERSION_STRUCTURED => Some(SignatureVersion::Structured),
            SIGNATURE_VERSION_PERSONAL => Some(SignatureVersion::PersonalSign),
            _ => None,
        }
    }
}

/// Order signature as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Raw version byte (`0x01` structured, `0x45` personal-sign)
    pub version: u8,
    /// Recovery byte
    pub v: u8,
    /// `r` scalar
    pub r: [u8; 32],
    /// `s` scalar
    pub s: [u8; 32],
}

impl Signature {
    /// Build from a version and an ECDSA signature
    pub fn new(version: SignatureVersion, ecdsa: EcdsaSignature) -> Self {
        Self {
            version: version.byte(),
            v: ecdsa.v,
            r: ecdsa.r,
            s: ecdsa.s,
        }
    }

    /// The `(v, r, s)` part
    pub fn ecdsa(&self) -> EcdsaSignature {
        EcdsaSignature {
            v: self.v,
            r: self.r,
            s: self.s,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ORDER
// ═══════════════════════════════════════════════════════════════════════════════

/// The signed fields of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTerms {
    /// Signer-chosen nonce
    pub nonce: u64,
    /// Unix time after which the order is void
    pub expiry: u64,
    /// What the counterparty offers
    pub signer: Party,
    /// What the pool pays
    pub sender: Party,
    /// Optional fee leg
    pub affiliate: Party,
    /// Settlement venue that may execute the order
    pub validator: Address,
}

impl OrderTerms {
    /// Create terms without an affiliate leg
    pub fn new(nonce: u64, expiry: u64, validator: Address, signer: Party, sender: Party) -> Self {
        Self {
            nonce,
            expiry,
            signer,
            sender,
            affiliate: Party::empty(),
            validator,
        }
    }

    /// Attach an affiliate leg
    pub fn with_affiliate(mut self, affiliate: Party) -> Self {
        self.affiliate = affiliate;
        self
    }
}

/// A signed order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Signed terms
    pub terms: OrderTerms,
    /// Identity claiming to have signed the terms
    pub signatory: Address,
    /// Signature over the canonical hash of the terms
    pub signature: Signature,
}

impl Order {
    /// Nonce shortcut
    pub fn nonce(&self) -> u64 {
        self.terms.nonce
    }

    /// Expiry shortcut
    pub fn expiry(&self) -> u64 {
        self.terms.expiry
    }

    /// Whether the order has expired at `now`
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.terms.expiry
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRADE ID
// ═══════════════════════════════════════════════════════════════════════════════

/// Queue key derived from an order's terms
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TradeId([u8; TRADE_ID_LENGTH]);

hex_serde!(TradeId, TRADE_ID_LENGTH);

impl TradeId {
    /// Create from bytes
    pub fn new(bytes: [u8; TRADE_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; TRADE_ID_LENGTH] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        decode_hex_array("trade_id", s).map(Self)
    }

    /// Short representation for display
    pub fn short(&self) -> String {
        let hex = self.to_hex();
        format!("{}...{}", &hex[..8], &hex[hex.len() - 8..])
    }
}

impl fmt::Debug for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TradeId({})", self.short())
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
