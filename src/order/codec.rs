//! Order codec: canonical hashing and the fixed-position wire record.
//!
//! Every field is written to its own 32-byte word at a fixed position, so
//! two different sets of terms can never produce the same encoding. The
//! unused affiliate leg is encoded like any other leg.
//!
//! Wire layout of a signed order:
//!
//! | words  | content                                        |
//! |--------|------------------------------------------------|
//! | 0..2   | nonce, expiry                                  |
//! | 2..7   | signer leg: kind, wallet, token, amount, id    |
//! | 7..12  | sender leg                                     |
//! | 12..17 | affiliate leg                                  |
//! | 17     | validator                                      |
//! | 18     | signatory                                      |
//! | tail   | version (1), v (1), r (32), s (32)             |

use sha2::{Digest, Sha256};

use crate::core::amount::Amount;
use crate::error::{Error, Result};
use crate::order::types::{Kind, Order, OrderTerms, Party, Signature, SignatureVersion, TradeId};
use crate::utils::constants::*;
use crate::utils::crypto::{tagged_hash, Address, Hash};

/// Number of words in the canonical terms encoding
pub const TERMS_WORDS: usize = 18;

/// Length of the canonical terms encoding
pub const TERMS_LENGTH: usize = TERMS_WORDS * WORD_LENGTH;

/// Length of an encoded signed order
pub const ORDER_LENGTH: usize = TERMS_LENGTH + WORD_LENGTH + 1 + 1 + 32 + 32;

// ═══════════════════════════════════════════════════════════════════════════════
// WORD ENCODING
// ═══════════════════════════════════════════════════════════════════════════════

fn u64_word(value: u64) -> [u8; WORD_LENGTH] {
    let mut word = [0u8; WORD_LENGTH];
    word[WORD_LENGTH - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

fn u128_word(value: u128) -> [u8; WORD_LENGTH] {
    let mut word = [0u8; WORD_LENGTH];
    word[WORD_LENGTH - 16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn address_word(address: &Address) -> [u8; WORD_LENGTH] {
    let mut word = [0u8; WORD_LENGTH];
    word[WORD_LENGTH - ADDRESS_LENGTH..].copy_from_slice(address.as_bytes());
    word
}

fn kind_word(kind: &Kind) -> [u8; WORD_LENGTH] {
    let mut word = [0u8; WORD_LENGTH];
    word[..KIND_LENGTH].copy_from_slice(kind.as_bytes());
    word
}

fn encode_party(out: &mut Vec<u8>, party: &Party) {
    out.extend_from_slice(&kind_word(&party.kind));
    out.extend_from_slice(&address_word(&party.wallet));
    out.extend_from_slice(&address_word(&party.token));
    out.extend_from_slice(&party.amount.to_word());
    out.extend_from_slice(&u128_word(party.id));
}

// ═══════════════════════════════════════════════════════════════════════════════
// WORD DECODING
// ═══════════════════════════════════════════════════════════════════════════════

/// Cursor over an encoded record
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8]> {
        let end = self.pos + len;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or_else(|| Error::MalformedOrder(format!("truncated at {}", field)))?;
        self.pos = end;
        Ok(slice)
    }

    fn word(&mut self, field: &str) -> Result<&'a [u8]> {
        self.take(WORD_LENGTH, field)
    }

    /// Read a right-aligned value of `width` bytes; padding must be zero
    fn right_aligned(&mut self, width: usize, field: &str) -> Result<&'a [u8]> {
        let word = self.word(field)?;
        let (pad, value) = word.split_at(WORD_LENGTH - width);
        if pad.iter().any(|b| *b != 0) {
            return Err(Error::MalformedOrder(format!("{} exceeds {} bytes", field, width)));
        }
        Ok(value)
    }

    fn u64(&mut self, field: &str) -> Result<u64> {
        let value = self.right_aligned(8, field)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(value);
        Ok(u64::from_be_bytes(buf))
    }

    fn u128(&mut self, field: &str) -> Result<u128> {
        let value = self.right_aligned(16, field)?;
        let mut buf = [0u8; 16];
        buf.copy_from_slice(value);
        Ok(u128::from_be_bytes(buf))
    }

    fn address(&mut self, field: &str) -> Result<Address> {
        let value = self.right_aligned(ADDRESS_LENGTH, field)?;
        Address::from_slice(value)
    }

    fn kind(&mut self, field: &str) -> Result<Kind> {
        let word = self.word(field)?;
        let (tag, pad) = word.split_at(KIND_LENGTH);
        if pad.iter().any(|b| *b != 0) {
            return Err(Error::MalformedOrder(format!("{} has trailing bytes", field)));
        }
        let mut buf = [0u8; KIND_LENGTH];
        buf.copy_from_slice(tag);
        Ok(Kind::new(buf))
    }

    fn byte(&mut self, field: &str) -> Result<u8> {
        Ok(self.take(1, field)?[0])
    }

    fn bytes32(&mut self, field: &str) -> Result<[u8; 32]> {
        let mut buf = [0u8; 32];
        buf.copy_from_slice(self.take(32, field)?);
        Ok(buf)
    }

    fn party(&mut self, leg: &str) -> Result<Party> {
        Ok(Party {
            kind: self.kind(&format!("{}.kind", leg))?,
            wallet: self.address(&format!("{}.wallet", leg))?,
            token: self.address(&format!("{}.token", leg))?,
            amount: Amount::from_units(self.u128(&format!("{}.amount", leg))?),
            id: self.u128(&format!("{}.id", leg))?,
        })
    }

    fn finish(&self) -> Result<()> {
        if self.pos != self.bytes.len() {
            return Err(Error::MalformedOrder(format!(
                "{} trailing bytes",
                self.bytes.len() - self.pos
            )));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TERMS
// ═══════════════════════════════════════════════════════════════════════════════

impl OrderTerms {
    /// Fixed-position encoding of every signed field
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(TERMS_LENGTH);
        out.extend_from_slice(&u64_word(self.nonce));
        out.extend_from_slice(&u64_word(self.expiry));
        encode_party(&mut out, &self.signer);
        encode_party(&mut out, &self.sender);
        encode_party(&mut out, &self.affiliate);
        out.extend_from_slice(&address_word(&self.validator));
        out
    }

    /// Canonical hash of the terms
    pub fn canonical_hash(&self) -> Hash {
        tagged_hash(ORDER_HASH_TAG, &self.encode())
    }

    /// Digest the signer actually signs for a given signature version
    pub fn signing_digest(&self, version: SignatureVersion) -> Hash {
        let hash = self.canonical_hash();
        match version {
            SignatureVersion::Structured => hash,
            SignatureVersion::PersonalSign => {
                let mut hasher = Sha256::new();
                hasher.update(PERSONAL_SIGN_PREFIX);
                hasher.update(hash.as_bytes());
                let mut bytes = [0u8; HASH_LENGTH];
                bytes.copy_from_slice(&hasher.finalize());
                Hash::new(bytes)
            }
        }
    }

    /// Queue key for these terms
    pub fn trade_id(&self) -> TradeId {
        TradeId::new(*tagged_hash(TRADE_ID_TAG, self.canonical_hash().as_bytes()).as_bytes())
    }

    /// Check that every leg is a well-formed fungible leg
    pub fn validate_structure(&self) -> Result<()> {
        validate_party("signer", &self.signer, false)?;
        validate_party("sender", &self.sender, false)?;
        validate_party("affiliate", &self.affiliate, true)?;
        if self.validator.is_zero() {
            return Err(Error::MalformedOrder("validator is the zero address".into()));
        }
        Ok(())
    }
}

fn validate_party(leg: &str, party: &Party, optional: bool) -> Result<()> {
    if !party.kind.is_known() {
        return Err(Error::MalformedOrder(format!(
            "{} leg has unknown kind {}",
            leg, party.kind
        )));
    }
    if !party.kind.is_fungible() {
        return Err(Error::MalformedOrder(format!(
            "{} leg kind {} is not fungible",
            leg, party.kind
        )));
    }
    if party.id != 0 {
        return Err(Error::MalformedOrder(format!(
            "{} leg carries a token id on a fungible asset",
            leg
        )));
    }
    if optional && party.is_empty() {
        return Ok(());
    }
    if party.token.is_zero() {
        return Err(Error::MalformedOrder(format!("{} leg has no token", leg)));
    }
    if party.wallet.is_zero() {
        return Err(Error::MalformedOrder(format!("{} leg has no wallet", leg)));
    }
    if !optional && party.amount.is_zero() {
        return Err(Error::MalformedOrder(format!("{} leg has zero amount", leg)));
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIGNED ORDER
// ═══════════════════════════════════════════════════════════════════════════════

impl Order {
    /// Canonical hash of the signed terms
    pub fn canonical_hash(&self) -> Hash {
        self.terms.canonical_hash()
    }

    /// Queue key of this order
    pub fn trade_id(&self) -> TradeId {
        self.terms.trade_id()
    }

    /// Signature version, if the version byte is supported
    pub fn signature_version(&self) -> Result<SignatureVersion> {
        SignatureVersion::from_byte(self.signature.version).ok_or_else(|| {
            Error::MalformedOrder(format!(
                "unsupported signature version 0x{:02x}",
                self.signature.version
            ))
        })
    }

    /// Structural validation performed before any hashing or recovery
    pub fn validate_structure(&self) -> Result<()> {
        self.terms.validate_structure()?;
        self.signature_version()?;
        if self.signatory.is_zero() {
            return Err(Error::MalformedOrder("signatory is the zero address".into()));
        }
        Ok(())
    }

    /// Encode to the wire record
    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.terms.encode();
        out.reserve(ORDER_LENGTH - TERMS_LENGTH);
        out.extend_from_slice(&address_word(&self.signatory));
        out.push(self.signature.version);
        out.push(self.signature.v);
        out.extend_from_slice(&self.signature.r);
        out.extend_from_slice(&self.signature.s);
        out
    }

    /// Decode and structurally validate a wire record
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ORDER_LENGTH {
            return Err(Error::MalformedOrder(format!(
                "expected {} bytes, got {}",
                ORDER_LENGTH,
                bytes.len()
            )));
        }

        let mut reader = Reader::new(bytes);
        let nonce = reader.u64("nonce")?;
        let expiry = reader.u64("expiry")?;
        let signer = reader.party("signer")?;
        let sender = reader.party("sender")?;
        let affiliate = reader.party("affiliate")?;
        let validator = reader.address("validator")?;
        let signatory = reader.address("signatory")?;
        let signature = Signature {
            version: reader.byte("version")?,
            v: reader.byte("v")?,
            r: reader.bytes32("r")?,
            s: reader.bytes32("s")?,
        };
        reader.finish()?;

        let order = Order {
            terms: OrderTerms {
                nonce,
                expiry,
                signer,
                sender,
                affiliate,
                validator,
            },
            signatory,
            signature,
        };
        order.validate_structure()?;
        Ok(order)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
