//! Engine constants and magic numbers.
//!
//! All engine-wide constants are defined here for easy auditing and modification.

// ═══════════════════════════════════════════════════════════════════════════════
// ORDER KIND TAGS
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface tag for fungible (ERC-20 style) order legs
pub const ERC20_KIND: [u8; 4] = [0x36, 0x37, 0x2b, 0x07];

/// Interface tag for non-fungible (ERC-721 style) order legs
pub const ERC721_KIND: [u8; 4] = [0x80, 0xac, 0x58, 0xcd];

/// Interface tag for multi-token (ERC-1155 style) order legs
pub const ERC1155_KIND: [u8; 4] = [0xd9, 0xb6, 0x7a, 0x26];

// ═══════════════════════════════════════════════════════════════════════════════
// SIGNATURE CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Signature version: the canonical order hash is signed directly
pub const SIGNATURE_VERSION_STRUCTURED: u8 = 0x01;

/// Signature version: the canonical order hash is wrapped in a personal-sign prefix
pub const SIGNATURE_VERSION_PERSONAL: u8 = 0x45;

/// Prefix applied to personal-sign digests
pub const PERSONAL_SIGN_PREFIX: &[u8] = b"\x19Liquidator Signed Message:\n32";

/// Offset added to the recovery id to produce `v`
pub const RECOVERY_V_OFFSET: u8 = 27;

/// Half of the secp256k1 group order; canonical `s` values must not exceed it
pub const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b,
    0x20, 0xa0,
];

// ═══════════════════════════════════════════════════════════════════════════════
// DOMAIN TAGS
// ═══════════════════════════════════════════════════════════════════════════════

/// Domain tag for canonical order hashes
pub const ORDER_HASH_TAG: &str = "Liquidator/Order";

/// Domain tag for trade ids
pub const TRADE_ID_TAG: &str = "Liquidator/TradeId";

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY ATTRIBUTES
// ═══════════════════════════════════════════════════════════════════════════════

/// Registry attribute marking an approved order-matching validator
pub const IS_VALIDATOR_ATTRIBUTE: &str = "isAirswapValidator";

/// Registry attribute marking an approved beneficiary
pub const APPROVED_BENEFICIARY_ATTRIBUTE: &str = "approvedBeneficiary";

// ═══════════════════════════════════════════════════════════════════════════════
// AMOUNT CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Decimals used by both the stake and reward assets
pub const TOKEN_DECIMALS: u32 = 18;

/// Maximum events kept in the in-memory event log
pub const DEFAULT_MAX_EVENTS: usize = 1000;

// ═══════════════════════════════════════════════════════════════════════════════
// LENGTH CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Length of a hash in bytes (SHA256)
pub const HASH_LENGTH: usize = 32;

/// Length of an address in bytes
pub const ADDRESS_LENGTH: usize = 20;

/// Length of a trade id in bytes
pub const TRADE_ID_LENGTH: usize = 32;

/// Length of an order kind tag in bytes
pub const KIND_LENGTH: usize = 4;

/// Length of an encoded word in the order codec
pub const WORD_LENGTH: usize = 32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_distinct() {
        assert_ne!(ERC20_KIND, ERC721_KIND);
        assert_ne!(ERC20_KIND, ERC1155_KIND);
        assert_eq!(hex::encode(ERC20_KIND), "36372b07");
    }

    #[test]
    fn test_signature_versions_distinct() {
        assert_ne!(SIGNATURE_VERSION_STRUCTURED, SIGNATURE_VERSION_PERSONAL);
    }

    #[test]
    fn test_half_order_hex() {
        assert_eq!(
            hex::encode(SECP256K1_HALF_ORDER),
            "7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0"
        );
    }
}
