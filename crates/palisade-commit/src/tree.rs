//! Merkle tree construction and verification.

use crate::hash::{branch_hash, leaf_hash, NodeHash};
use crate::proof::{ceil_log2, Proof, ProofStep, Side};
use crate::CommitError;

/// A Merkle tree over opaque leaf commitments.
///
/// All intermediate levels are retained so proofs are a lookup, not a
/// recomputation. Level 0 holds the leaf hashes; the last level is the root.
#[derive(Debug, Clone)]
pub struct CommitmentTree {
    levels: Vec<Vec<NodeHash>>,
}

impl CommitmentTree {
    /// Build a tree over a nonempty ordered leaf sequence.
    ///
    /// Each leaf is hashed, then adjacent nodes are paired left-to-right.
    /// The final node of an odd-sized level is promoted to the next level
    /// unchanged — never duplicated (see crate docs).
    pub fn build<L: AsRef<[u8]>>(leaves: &[L]) -> Result<Self, CommitError> {
        if leaves.is_empty() {
            return Err(CommitError::InvalidInput(
                "cannot commit to an empty leaf sequence".into(),
            ));
        }

        let mut levels = vec![leaves
            .iter()
            .map(|leaf| leaf_hash(leaf.as_ref()))
            .collect::<Vec<_>>()];

        while levels.last().expect("at least the leaf level").len() > 1 {
            let current = levels.last().expect("at least the leaf level");
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            for pair in current.chunks(2) {
                if let [left, right] = pair {
                    next.push(branch_hash(left, right));
                } else {
                    // Odd level: promote the lone node unchanged.
                    next.push(pair[0]);
                }
            }
            levels.push(next);
        }

        Ok(Self { levels })
    }

    /// The committed root — the single value published externally.
    pub fn root(&self) -> NodeHash {
        self.levels.last().expect("built trees have a root level")[0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of levels above the leaves.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Produce the inclusion proof for the leaf at `index`.
    ///
    /// Walks level by level collecting the required sibling; when the target
    /// is the promoted lone node of an odd level, that level contributes no
    /// step.
    pub fn proof(&self, index: usize) -> Result<Proof, CommitError> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(CommitError::InvalidInput(format!(
                "leaf index {} out of range ({} leaves)",
                index, leaf_count
            )));
        }

        let mut steps = Vec::with_capacity(ceil_log2(leaf_count));
        let mut pos = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = pos ^ 1;
            if sibling < level.len() {
                let side = if sibling > pos { Side::Right } else { Side::Left };
                steps.push(ProofStep {
                    sibling: level[sibling],
                    side,
                });
            }
            pos /= 2;
        }

        Proof::from_steps(index as u32, steps)
    }
}

/// Verify that `leaf` is committed under `root` via `proof`.
///
/// Recomputes the root by hashing the leaf and folding each step on its
/// recorded side. Returns a boolean — a failed verification is an expected,
/// non-exceptional outcome.
pub fn verify_inclusion(leaf: &[u8], proof: &Proof, root: &NodeHash) -> bool {
    let mut node = leaf_hash(leaf);
    for step in proof.steps() {
        node = match step.side {
            Side::Right => branch_hash(&node, &step.sibling),
            Side::Left => branch_hash(&step.sibling, &node),
        };
    }
    node == *root
}
