//! Signature contract and the placeholder scheme.
//!
//! [`SignatureScheme`] is the seam the rest of the system signs through.
//! The contract is deliberately thin: signing is deterministic for fixed
//! inputs, and `verify(m, sign(m, seed), pk_of(seed))` holds. The concrete
//! algorithm is a stand-in pending a real post-quantum scheme — callers must
//! treat signatures as opaque.

use serde::{Deserialize, Serialize};

use crate::chain::{chain_step, chain_walk};
use crate::VaultError;

/// Binds the revealed chain link to the signed message.
const SIG_BIND_TAG: &str = "Palisade/SigBind";

/// An opaque signature. Internal layout is scheme-private.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    link: [u8; 32],
    binding: [u8; 32],
}

/// Sign/verify seam other components depend on.
pub trait SignatureScheme {
    /// Deterministically sign `message` with a record's secret seed.
    fn sign(&self, message: &[u8], seed: &[u8; 32]) -> Signature;

    /// Check `signature` over `message` against a public key. Boolean —
    /// a failed verification is a normal outcome, not an error.
    fn verify(&self, message: &[u8], signature: &Signature, public_key: &[u8; 32]) -> bool;
}

/// Placeholder scheme over the vault's hash chains.
///
/// Signing reveals the penultimate chain link (one step before the public
/// key) together with a tag binding that link to the message. Verification
/// walks the link one step and compares against the public key, then
/// recomputes the binding. Revealing the link burns the key — the scheme is
/// one-time by construction, matching the vault's single-use records.
#[derive(Debug, Clone, Copy)]
pub struct ChainLinkScheme {
    chain_length: u32,
}

impl ChainLinkScheme {
    pub fn new(chain_length: u32) -> Result<Self, VaultError> {
        if chain_length < 2 {
            return Err(VaultError::InvalidInput(format!(
                "chain length {} leaves no link to reveal (need at least 2)",
                chain_length
            )));
        }
        Ok(Self { chain_length })
    }

    pub fn chain_length(&self) -> u32 {
        self.chain_length
    }
}

impl SignatureScheme for ChainLinkScheme {
    fn sign(&self, message: &[u8], seed: &[u8; 32]) -> Signature {
        let link = chain_walk(seed, self.chain_length - 2);
        let binding = palisade_commit::tagged_hash(SIG_BIND_TAG, &[&link, message]);
        Signature { link, binding }
    }

    fn verify(&self, message: &[u8], signature: &Signature, public_key: &[u8; 32]) -> bool {
        if chain_step(&signature.link) != *public_key {
            return false;
        }
        let expected = palisade_commit::tagged_hash(SIG_BIND_TAG, &[&signature.link, message]);
        expected == signature.binding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::derive_public_key;

    const CHAIN_LENGTH: u32 = 16;

    fn test_seed(byte: u8) -> [u8; 32] {
        [byte; 32]
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let scheme = ChainLinkScheme::new(CHAIN_LENGTH).unwrap();
        let seed = test_seed(0x42);
        let pk = derive_public_key(&seed, CHAIN_LENGTH);

        let sig = scheme.sign(b"consolidate batch 7", &seed);
        assert!(scheme.verify(b"consolidate batch 7", &sig, &pk));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let scheme = ChainLinkScheme::new(CHAIN_LENGTH).unwrap();
        let seed = test_seed(0x42);

        let sig1 = scheme.sign(b"same message", &seed);
        let sig2 = scheme.sign(b"same message", &seed);
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_tampered_message_rejected() {
        let scheme = ChainLinkScheme::new(CHAIN_LENGTH).unwrap();
        let seed = test_seed(0x42);
        let pk = derive_public_key(&seed, CHAIN_LENGTH);

        let sig = scheme.sign(b"original", &seed);
        assert!(!scheme.verify(b"altered", &sig, &pk));
    }

    #[test]
    fn test_wrong_public_key_rejected() {
        let scheme = ChainLinkScheme::new(CHAIN_LENGTH).unwrap();
        let seed = test_seed(0x42);
        let other_pk = derive_public_key(&test_seed(0x43), CHAIN_LENGTH);

        let sig = scheme.sign(b"message", &seed);
        assert!(!scheme.verify(b"message", &sig, &other_pk));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let scheme = ChainLinkScheme::new(CHAIN_LENGTH).unwrap();
        let seed = test_seed(0x42);
        let pk = derive_public_key(&seed, CHAIN_LENGTH);

        let mut sig = scheme.sign(b"message", &seed);
        sig.link[0] ^= 0x01;
        assert!(!scheme.verify(b"message", &sig, &pk));
    }

    #[test]
    fn test_degenerate_chain_rejected() {
        assert!(matches!(
            ChainLinkScheme::new(1),
            Err(VaultError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_signature_serde_roundtrip() {
        let scheme = ChainLinkScheme::new(CHAIN_LENGTH).unwrap();
        let sig = scheme.sign(b"m", &test_seed(0x11));

        let json = serde_json::to_string(&sig).unwrap();
        let restored: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, restored);
    }
}
