//! Order signature verification.
//!
//! A signature is accepted only when `v` is a recovery byte (27 or 28), `r`
//! and `s` are non-zero, `s` lies in the lower half of the curve order and the
//! recovered identity equals the order's signatory.

use tracing::debug;

use crate::error::{Error, Result};
use crate::order::types::{Order, OrderTerms, Signature, SignatureVersion};
use crate::utils::constants::RECOVERY_V_OFFSET;
use crate::utils::crypto::{recover_address, Address, EcdsaSignature, Hash, KeyPair};

// ═══════════════════════════════════════════════════════════════════════════════
// RECOVERY
// ═══════════════════════════════════════════════════════════════════════════════

/// Recover the identity that signed `hash`
pub fn recover_signer(hash: &Hash, v: u8, r: &[u8; 32], s: &[u8; 32]) -> Result<Address> {
    if v != RECOVERY_V_OFFSET && v != RECOVERY_V_OFFSET + 1 {
        return Err(Error::InvalidSignature(format!("v must be 27 or 28, got {}", v)));
    }
    if r.iter().all(|b| *b == 0) {
        return Err(Error::InvalidSignature("r is zero".into()));
    }
    if s.iter().all(|b| *b == 0) {
        return Err(Error::InvalidSignature("s is zero".into()));
    }

    let signature = EcdsaSignature { v, r: *r, s: *s };
    if !signature.is_low_s() {
        return Err(Error::InvalidSignature("s is not in the lower half order".into()));
    }

    recover_address(hash, &signature).map_err(|e| Error::InvalidSignature(e.to_string()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// VERIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Verify an order's signature, reporting why it fails
pub fn verify_order(order: &Order) -> Result<()> {
    let version = order.signature_version()?;
    let digest = order.terms.signing_digest(version);
    let sig = &order.signature;

    let recovered = recover_signer(&digest, sig.v, &sig.r, &sig.s)?;
    if recovered != order.signatory {
        debug!(
            expected = %order.signatory,
            recovered = %recovered,
            "Signature recovered a different identity"
        );
        return Err(Error::SignerMismatch {
            expected: order.signatory.to_string(),
            got: recovered.to_string(),
        });
    }
    Ok(())
}

/// Whether the order's signature recovers to its signatory
pub fn verify(order: &Order) -> bool {
    verify_order(order).is_ok()
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIGNING
// ═══════════════════════════════════════════════════════════════════════════════

/// Sign `terms` with `keypair`, producing an order whose signatory is the key's address
pub fn sign_order(terms: OrderTerms, keypair: &KeyPair, version: SignatureVersion) -> Order {
    let digest = terms.signing_digest(version);
    Order {
        terms,
        signatory: keypair.address(),
        signature: Signature::new(version, keypair.sign(&digest)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::amount::Amount;
    use crate::order::types::Party;
    use crate::utils::constants::SECP256K1_HALF_ORDER;

    fn terms_for(wallet: Address) -> OrderTerms {
        OrderTerms::new(
            7,
            10_000,
            Address::new([0xaa; 20]),
            Party::erc20(wallet, Address::new([2; 20]), Amount::from_units(100)),
            Party::erc20(Address::new([3; 20]), Address::new([4; 20]), Amount::from_units(200)),
        )
    }

    #[test]
    fn test_structured_signature_verifies() {
        let keypair = KeyPair::generate();
        let order = sign_order(terms_for(keypair.address()), &keypair, SignatureVersion::Structured);

        assert!(verify(&order));
        let sig = order.signature;
        let recovered =
            recover_signer(&order.canonical_hash(), sig.v, &sig.r, &sig.s).unwrap();
        assert_eq!(recovered, order.signatory);
    }

    #[test]
    fn test_personal_sign_signature_verifies() {
        let keypair = KeyPair::generate();
        let order =
            sign_order(terms_for(keypair.address()), &keypair, SignatureVersion::PersonalSign);
        assert!(verify_order(&order).is_ok());
    }

    #[test]
    fn test_version_byte_is_bound_to_digest() {
        let keypair = KeyPair::generate();
        let mut order =
            sign_order(terms_for(keypair.address()), &keypair, SignatureVersion::Structured);
        order.signature.version = SignatureVersion::PersonalSign.byte();
        assert!(!verify(&order));
    }

    #[test]
    fn test_tampered_terms_fail() {
        let keypair = KeyPair::generate();
        let mut order =
            sign_order(terms_for(keypair.address()), &keypair, SignatureVersion::Structured);
        order.terms.sender.amount = Amount::from_units(201);

        assert!(matches!(
            verify_order(&order),
            Err(Error::SignerMismatch { .. }) | Err(Error::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_claimed_signatory_must_match() {
        let keypair = KeyPair::generate();
        let mut order =
            sign_order(terms_for(keypair.address()), &keypair, SignatureVersion::Structured);
        order.signatory = KeyPair::generate().address();

        assert!(matches!(verify_order(&order), Err(Error::SignerMismatch { .. })));
    }

    #[test]
    fn test_rejects_bad_v_and_zero_scalars() {
        let hash = Hash::sha256(b"order");
        let one = [1u8; 32];
        let zero = [0u8; 32];

        assert!(matches!(recover_signer(&hash, 0, &one, &one), Err(Error::InvalidSignature(_))));
        assert!(matches!(recover_signer(&hash, 29, &one, &one), Err(Error::InvalidSignature(_))));
        assert!(matches!(recover_signer(&hash, 27, &zero, &one), Err(Error::InvalidSignature(_))));
        assert!(matches!(recover_signer(&hash, 27, &one, &zero), Err(Error::InvalidSignature(_))));
    }

    #[test]
    fn test_rejects_high_s() {
        let keypair = KeyPair::generate();
        let order = sign_order(terms_for(keypair.address()), &keypair, SignatureVersion::Structured);

        // any s above half the order is rejected before recovery
        let mut high_s = SECP256K1_HALF_ORDER;
        high_s[31] = high_s[31].wrapping_add(1);
        let err = recover_signer(&order.canonical_hash(), order.signature.v, &order.signature.r, &high_s)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSignature(ref m) if m.contains("lower half")));
    }
}
