//! Iterated one-way hash chains.
//!
//! A record's public key is `chain_length - 1` applications of the chain
//! step to its secret seed. Revealing any link back from the end burns the
//! positions after it, which is what makes the keys one-time.

use palisade_commit::tagged_hash;

const CHAIN_STEP_TAG: &str = "Palisade/ChainStep";
const KEY_HASH_TAG: &str = "Palisade/KeyHash";

/// One application of the one-way function.
pub fn chain_step(value: &[u8; 32]) -> [u8; 32] {
    tagged_hash(CHAIN_STEP_TAG, &[value])
}

/// Walk `steps` applications of the chain from `start`.
pub fn chain_walk(start: &[u8; 32], steps: u32) -> [u8; 32] {
    let mut value = *start;
    for _ in 0..steps {
        value = chain_step(&value);
    }
    value
}

/// Derive a record's public key: `chain_length - 1` steps from the seed.
pub fn derive_public_key(seed: &[u8; 32], chain_length: u32) -> [u8; 32] {
    chain_walk(seed, chain_length - 1)
}

/// The committed fingerprint of a public key — the vault's tree leaves.
pub fn public_key_hash(public_key: &[u8; 32]) -> [u8; 32] {
    tagged_hash(KEY_HASH_TAG, &[public_key])
}
