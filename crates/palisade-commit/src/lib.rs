//! Palisade Commitment Engine
//!
//! Builds Merkle trees over opaque leaf commitments and produces inclusion
//! proofs that re-derive the published root.
//!
//! # Structure
//!
//! - Leaves and branches are hashed with distinct tagged-SHA256 domains, so a
//!   branch node can never be reinterpreted as a leaf.
//! - An odd-sized level promotes its final node to the next level *unchanged*.
//!   Duplicating the node instead (as some Merkle variants do) lets an
//!   attacker forge a second leaf sequence with the same root.
//!
//! # Example
//!
//! ```
//! use palisade_commit::{verify_inclusion, CommitmentTree};
//!
//! let leaves: Vec<[u8; 32]> = (0u8..5).map(|i| [i; 32]).collect();
//! let tree = CommitmentTree::build(&leaves).unwrap();
//!
//! let proof = tree.proof(3).unwrap();
//! assert!(verify_inclusion(&leaves[3], &proof, &tree.root()));
//! ```

pub mod hash;
pub mod proof;
pub mod tree;

pub use hash::{leaf_hash, tagged_hash, NodeHash};
pub use proof::{Proof, ProofStep, Side};
pub use tree::{verify_inclusion, CommitmentTree};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommitError {
    /// Empty leaf sequence or out-of-range leaf index.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Proof structure that cannot belong to any tree of the stated size.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
}
