//! Inclusion proofs.
//!
//! A proof is the ordered list of sibling hashes from a leaf up to the root,
//! each annotated with the side the sibling sits on. Levels where the target
//! node was the promoted lone node contribute no step.

use serde::{Deserialize, Serialize};

use crate::hash::NodeHash;
use crate::CommitError;

/// Trees never exceed 2^64 leaves, so no honest proof is longer than this.
const MAX_PROOF_STEPS: usize = 64;

/// Which side of the pair the *sibling* occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// One level of an inclusion proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    /// The sibling hash at this level.
    pub sibling: NodeHash,
    /// Side the sibling occupies relative to the running node.
    pub side: Side,
}

/// An inclusion proof for one leaf.
///
/// Carries the leaf index for auditability; verification itself only folds
/// the steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub leaf_index: u32,
    steps: Vec<ProofStep>,
}

impl Proof {
    /// Assemble a proof from raw steps, rejecting structurally impossible
    /// shapes. Proofs received from outside (e.g. deserialized from a spend
    /// authorization) should re-enter through this constructor.
    pub fn from_steps(leaf_index: u32, steps: Vec<ProofStep>) -> Result<Self, CommitError> {
        if steps.len() > MAX_PROOF_STEPS {
            return Err(CommitError::MalformedProof(format!(
                "{} steps exceeds the maximum tree depth of {}",
                steps.len(),
                MAX_PROOF_STEPS
            )));
        }
        Ok(Self { leaf_index, steps })
    }

    /// Check this proof's shape against a tree of `leaf_count` leaves.
    ///
    /// A valid proof is never longer than `ceil(log2(leaf_count))`; promoted
    /// lone nodes only ever make it shorter.
    pub fn validate(&self, leaf_count: usize) -> Result<(), CommitError> {
        if leaf_count == 0 || self.leaf_index as usize >= leaf_count {
            return Err(CommitError::MalformedProof(format!(
                "leaf index {} out of range for {} leaves",
                self.leaf_index, leaf_count
            )));
        }
        let max_depth = ceil_log2(leaf_count);
        if self.steps.len() > max_depth {
            return Err(CommitError::MalformedProof(format!(
                "{} steps but a {}-leaf tree is at most {} levels deep",
                self.steps.len(),
                leaf_count,
                max_depth
            )));
        }
        Ok(())
    }

    pub fn steps(&self) -> &[ProofStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Serialized weight of the sibling hashes, the dominant proof cost.
    pub fn sibling_bytes(&self) -> usize {
        self.steps.len() * 32
    }
}

/// `ceil(log2(n))` for `n >= 1` — the depth bound of an `n`-leaf tree.
pub(crate) fn ceil_log2(n: usize) -> usize {
    n.next_power_of_two().trailing_zeros() as usize
}
