//! Descriptor construction and path selection.

use bitcoin::key::Parity;
use bitcoin::secp256k1::{Scalar, Secp256k1};
use bitcoin::XOnlyPublicKey;

use palisade_commit::{tagged_hash, NodeHash};

use crate::leaf::{LeafKind, ScriptLeaf};
use crate::{internal_key, DescriptorError};

const TREE_BRANCH_TAG: &str = "Palisade/TreeBranch";
const OUTPUT_TWEAK_TAG: &str = "Palisade/OutputTweak";

/// Builder for a forced-script-path descriptor.
///
/// # Example
/// ```ignore
/// let descriptor = DescriptorBuilder::new()
///     .dual_key(owner_key, cosigner_key)?
///     .timelock_recovery(recovery_key, 4320)?
///     .vault_commitment(vault_root)?
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct DescriptorBuilder {
    leaves: Vec<ScriptLeaf>,
}

impl DescriptorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leaf, validating its payload.
    pub fn add_leaf(mut self, leaf: ScriptLeaf) -> Result<Self, DescriptorError> {
        if let ScriptLeaf::TimelockRecovery { delay_blocks: 0, .. } = leaf {
            return Err(DescriptorError::InvalidInput(
                "recovery delay must be at least one block".into(),
            ));
        }
        self.leaves.push(leaf);
        Ok(self)
    }

    /// Add a dual-key immediate-spend leaf. Key order carries no meaning.
    pub fn dual_key(
        self,
        key_a: XOnlyPublicKey,
        key_b: XOnlyPublicKey,
    ) -> Result<Self, DescriptorError> {
        self.add_leaf(ScriptLeaf::DualKey { key_a, key_b })
    }

    /// Add a time-delayed recovery leaf.
    pub fn timelock_recovery(
        self,
        key: XOnlyPublicKey,
        delay_blocks: u16,
    ) -> Result<Self, DescriptorError> {
        self.add_leaf(ScriptLeaf::TimelockRecovery { key, delay_blocks })
    }

    /// Embed a previously computed commitment-tree root as a spend condition
    /// (reserved — see [`ScriptLeaf::VaultCommitment`]).
    pub fn vault_commitment(self, root: NodeHash) -> Result<Self, DescriptorError> {
        self.add_leaf(ScriptLeaf::VaultCommitment { root })
    }

    /// Hash the leaves, fold the tree, and derive the output key.
    ///
    /// The fold orders every pair numerically-smaller-hash-first and sorts
    /// the leaf hashes up front, so the root — and therefore the output key —
    /// is identical no matter what order the leaves were added in. The tweak
    /// is applied with genuine curve arithmetic:
    /// `output = internal + tweak * G`.
    pub fn build(self) -> Result<Descriptor, DescriptorError> {
        if self.leaves.is_empty() {
            return Err(DescriptorError::InvalidInput(
                "a descriptor needs at least one script leaf".into(),
            ));
        }

        let hashed: Vec<(NodeHash, ())> = self
            .leaves
            .iter()
            .map(|leaf| (leaf.leaf_hash(), ()))
            .collect();
        let (tree_root, ()) = fold_canonical(hashed, &|_, _| ());

        let internal = internal_key();
        let tweak = tagged_hash(OUTPUT_TWEAK_TAG, &[&internal.serialize(), &tree_root]);

        let scalar =
            Scalar::from_be_bytes(tweak).map_err(|_| DescriptorError::InvalidScalar)?;
        let secp = Secp256k1::new();
        let (output_key, parity) = internal
            .add_tweak(&secp, &scalar)
            .map_err(|_| DescriptorError::TweakFailed)?;

        Ok(Descriptor {
            internal_key: internal,
            leaves: self.leaves,
            tree_root,
            output_key,
            parity,
        })
    }
}

/// A built descriptor: fixed internal key, committed leaves, derived output.
#[derive(Debug, Clone)]
pub struct Descriptor {
    internal_key: XOnlyPublicKey,
    /// Leaves in insertion order (the committed tree is order-independent).
    leaves: Vec<ScriptLeaf>,
    tree_root: NodeHash,
    output_key: XOnlyPublicKey,
    parity: Parity,
}

/// Which committed condition a spender wants to reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendRequest {
    DualKey,
    /// The caller must assert that the on-chain delay condition holds —
    /// this core has no chain view of its own.
    Recovery { delay_asserted: bool },
    Vault,
}

impl Descriptor {
    pub fn internal_key(&self) -> XOnlyPublicKey {
        self.internal_key
    }

    pub fn leaves(&self) -> &[ScriptLeaf] {
        &self.leaves
    }

    pub fn tree_root(&self) -> NodeHash {
        self.tree_root
    }

    pub fn output_key(&self) -> XOnlyPublicKey {
        self.output_key
    }

    pub fn output_key_parity(&self) -> Parity {
        self.parity
    }

    /// Return the leaf matching a spend request.
    ///
    /// Recovery requires the caller to assert the delay; a request for a
    /// leaf kind the tree never committed fails with
    /// [`DescriptorError::NoMatchingPath`].
    pub fn select_path(&self, request: SpendRequest) -> Result<&ScriptLeaf, DescriptorError> {
        let kind = match request {
            SpendRequest::DualKey => LeafKind::DualKey,
            SpendRequest::Recovery { delay_asserted } => {
                if !delay_asserted {
                    return Err(DescriptorError::InvalidInput(
                        "recovery path requested without asserting the delay has elapsed"
                            .into(),
                    ));
                }
                LeafKind::Recovery
            }
            SpendRequest::Vault => LeafKind::Vault,
        };

        self.leaves
            .iter()
            .find(|leaf| leaf.kind() == kind)
            .ok_or(DescriptorError::NoMatchingPath(kind))
    }
}

/// Fold `(hash, payload)` nodes into a single root, smaller hash first at
/// every combine and a promoted lone node on odd levels.
///
/// Shared by the key derivation and the textual form so the two can never
/// disagree about tree shape.
pub(crate) fn fold_canonical<T: Clone>(
    mut nodes: Vec<(NodeHash, T)>,
    combine: &dyn Fn(&T, &T) -> T,
) -> (NodeHash, T) {
    nodes.sort_by(|a, b| a.0.cmp(&b.0));
    while nodes.len() > 1 {
        let mut next = Vec::with_capacity(nodes.len().div_ceil(2));
        for pair in nodes.chunks(2) {
            if let [left, right] = pair {
                let (first, second) = if left.0 <= right.0 {
                    (left, right)
                } else {
                    (right, left)
                };
                next.push((
                    tagged_hash(TREE_BRANCH_TAG, &[&first.0, &second.0]),
                    combine(&first.1, &second.1),
                ));
            } else {
                next.push(pair[0].clone());
            }
        }
        nodes = next;
    }
    nodes.into_iter().next().expect("fold over nonempty nodes")
}
