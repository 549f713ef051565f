//! Textual descriptor form.
//!
//! `tree(<internalKey>,<scriptTree>)` where the script tree is a bracketed
//! structure of leaves and `{left,right}` branches mirroring the committed
//! fold. The form is emitted unchecksummed; checksum computation belongs to
//! the external node collaborator and is appended verbatim.

use crate::builder::{fold_canonical, Descriptor};
use crate::leaf::ScriptLeaf;

impl Descriptor {
    /// Emit the unchecksummed descriptor string.
    ///
    /// Branch nesting reproduces the canonical fold, so two descriptors with
    /// the same leaves render identically regardless of insertion order.
    pub fn to_descriptor_string(&self) -> String {
        let nodes: Vec<([u8; 32], String)> = self
            .leaves()
            .iter()
            .map(|leaf| (leaf.leaf_hash(), leaf_text(leaf)))
            .collect();
        let (_, script_tree) =
            fold_canonical(nodes, &|left, right| format!("{{{left},{right}}}"));

        format!("tree({},{})", self.internal_key(), script_tree)
    }

    /// Append an externally computed checksum.
    pub fn with_checksum(&self, checksum: &str) -> String {
        format!("{}#{}", self.to_descriptor_string(), checksum)
    }
}

fn leaf_text(leaf: &ScriptLeaf) -> String {
    match leaf {
        ScriptLeaf::DualKey { key_a, key_b } => {
            let (first, second) = ScriptLeaf::ordered_dual_keys(key_a, key_b);
            format!("dual({first},{second})")
        }
        ScriptLeaf::TimelockRecovery { key, delay_blocks } => {
            format!("recover({key},{delay_blocks})")
        }
        ScriptLeaf::VaultCommitment { root } => {
            format!("vaultroot({})", hex::encode(root))
        }
    }
}
