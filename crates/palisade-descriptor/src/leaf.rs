//! Script leaves — the committed spend conditions.

use std::fmt;

use bitcoin::opcodes::all::*;
use bitcoin::script::Builder as ScriptBuilder;
use bitcoin::{ScriptBuf, XOnlyPublicKey};
use serde::{Deserialize, Serialize};

use palisade_commit::{tagged_hash, NodeHash};

const DUAL_KEY_TAG: &str = "Palisade/DualKey";
const RECOVERY_TAG: &str = "Palisade/Recovery";
const VAULT_ROOT_TAG: &str = "Palisade/VaultRoot";

/// One committed spend condition.
///
/// Each kind hashes under its own tag, so a recovery leaf can never be
/// replayed as a dual-key leaf with crafted bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptLeaf {
    /// Both keys must sign; key order carries no meaning.
    DualKey {
        key_a: XOnlyPublicKey,
        key_b: XOnlyPublicKey,
    },
    /// `key` may sign once `delay_blocks` have elapsed since the output
    /// was created (relative, CSV-style).
    TimelockRecovery {
        key: XOnlyPublicKey,
        delay_blocks: u16,
    },
    /// A commitment-tree root embedded as a spend condition.
    ///
    /// Reserved: no current script semantics can verify an inclusion proof
    /// on chain, so this leaf is committed and selectable but renders as a
    /// provably-unspendable commitment.
    VaultCommitment { root: NodeHash },
}

/// Leaf discriminant, used for path selection and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeafKind {
    DualKey,
    Recovery,
    Vault,
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafKind::DualKey => write!(f, "dual-key"),
            LeafKind::Recovery => write!(f, "recovery"),
            LeafKind::Vault => write!(f, "vault"),
        }
    }
}

impl ScriptLeaf {
    pub fn kind(&self) -> LeafKind {
        match self {
            ScriptLeaf::DualKey { .. } => LeafKind::DualKey,
            ScriptLeaf::TimelockRecovery { .. } => LeafKind::Recovery,
            ScriptLeaf::VaultCommitment { .. } => LeafKind::Vault,
        }
    }

    /// The dual keys in canonical (serialized-byte) order.
    pub(crate) fn ordered_dual_keys(
        key_a: &XOnlyPublicKey,
        key_b: &XOnlyPublicKey,
    ) -> (XOnlyPublicKey, XOnlyPublicKey) {
        if key_a.serialize() <= key_b.serialize() {
            (*key_a, *key_b)
        } else {
            (*key_b, *key_a)
        }
    }

    /// Domain-separated commitment hash of this leaf.
    pub fn leaf_hash(&self) -> NodeHash {
        match self {
            ScriptLeaf::DualKey { key_a, key_b } => {
                let (first, second) = Self::ordered_dual_keys(key_a, key_b);
                tagged_hash(DUAL_KEY_TAG, &[&first.serialize(), &second.serialize()])
            }
            ScriptLeaf::TimelockRecovery { key, delay_blocks } => tagged_hash(
                RECOVERY_TAG,
                &[&key.serialize(), &delay_blocks.to_be_bytes()],
            ),
            ScriptLeaf::VaultCommitment { root } => tagged_hash(VAULT_ROOT_TAG, &[root]),
        }
    }

    /// Render the leaf as a tapscript.
    ///
    /// Dual-key and recovery leaves are executable scripts; the vault leaf
    /// renders its root as an OP_RETURN commitment (see the variant docs).
    pub fn render_script(&self) -> ScriptBuf {
        match self {
            ScriptLeaf::DualKey { key_a, key_b } => {
                let (first, second) = Self::ordered_dual_keys(key_a, key_b);
                ScriptBuilder::new()
                    .push_x_only_key(&first)
                    .push_opcode(OP_CHECKSIGVERIFY)
                    .push_x_only_key(&second)
                    .push_opcode(OP_CHECKSIG)
                    .into_script()
            }
            ScriptLeaf::TimelockRecovery { key, delay_blocks } => ScriptBuilder::new()
                .push_x_only_key(key)
                .push_opcode(OP_CHECKSIGVERIFY)
                .push_int(*delay_blocks as i64)
                .push_opcode(OP_CSV)
                .into_script(),
            ScriptLeaf::VaultCommitment { root } => ScriptBuilder::new()
                .push_opcode(OP_RETURN)
                .push_slice(*root)
                .into_script(),
        }
    }
}
