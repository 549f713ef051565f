//! Tagged-SHA256 hashing.
//!
//! All Palisade commitments use the BIP-340 tagged-hash construction:
//! `SHA256(SHA256(tag) || SHA256(tag) || data)`. The doubled tag prefix keeps
//! every domain's hashes disjoint from every other domain's.

use bitcoin::hashes::{sha256, Hash, HashEngine};

/// A 32-byte node in a commitment tree (leaf hash, branch hash, or root).
pub type NodeHash = [u8; 32];

/// Domain tag for hashing raw leaf bytes into the tree.
const LEAF_TAG: &str = "Palisade/Leaf";

/// Domain tag for combining two child nodes into a parent.
const BRANCH_TAG: &str = "Palisade/Branch";

/// Compute a tagged SHA256 over the concatenation of `parts`.
pub fn tagged_hash(tag: &str, parts: &[&[u8]]) -> NodeHash {
    let tag_hash = sha256::Hash::hash(tag.as_bytes());

    let mut engine = sha256::Hash::engine();
    engine.input(tag_hash.as_byte_array());
    engine.input(tag_hash.as_byte_array());
    for part in parts {
        engine.input(part);
    }
    sha256::Hash::from_engine(engine).to_byte_array()
}

/// Hash opaque leaf bytes into a tree node.
pub fn leaf_hash(leaf: &[u8]) -> NodeHash {
    tagged_hash(LEAF_TAG, &[leaf])
}

/// Combine two child nodes into their parent.
pub(crate) fn branch_hash(left: &NodeHash, right: &NodeHash) -> NodeHash {
    tagged_hash(BRANCH_TAG, &[left, right])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domains_are_disjoint() {
        // A leaf of 64 bytes must never collide with the branch of two nodes
        // carrying the same 64 bytes.
        let a = [0x11u8; 32];
        let b = [0x22u8; 32];
        let mut concat = Vec::new();
        concat.extend_from_slice(&a);
        concat.extend_from_slice(&b);

        assert_ne!(leaf_hash(&concat), branch_hash(&a, &b));
    }

    #[test]
    fn test_tagged_hash_deterministic() {
        let h1 = tagged_hash("Palisade/Test", &[b"hello", b"world"]);
        let h2 = tagged_hash("Palisade/Test", &[b"hello", b"world"]);
        assert_eq!(h1, h2);

        // Different tag, same data — different digest.
        let h3 = tagged_hash("Palisade/Other", &[b"hello", b"world"]);
        assert_ne!(h1, h3);
    }
}
