//! UTXO records as the planner sees them.

use bitcoin::hashes::Hash;
use bitcoin::{Amount, OutPoint};
use serde::{Deserialize, Serialize};

use palisade_commit::{tagged_hash, NodeHash};

const UTXO_FP_TAG: &str = "Palisade/UtxoFp";

/// How an output will be spent — drives the per-input size estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpendClass {
    /// Direct key-path spend (single signature in the witness).
    KeyPath,
    /// Script-path spend with a classical signature.
    ScriptClassical,
    /// Script-path spend carrying a vault membership proof.
    ScriptVaultProof,
}

impl SpendClass {
    fn tag_byte(self) -> u8 {
        match self {
            SpendClass::KeyPath => 0,
            SpendClass::ScriptClassical => 1,
            SpendClass::ScriptVaultProof => 2,
        }
    }
}

/// One unspent output under the planner's consideration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub outpoint: OutPoint,
    pub value: Amount,
    pub spend_class: SpendClass,
}

impl Utxo {
    pub fn new(outpoint: OutPoint, value: Amount, spend_class: SpendClass) -> Self {
        Self {
            outpoint,
            value,
            spend_class,
        }
    }

    /// 32-byte fingerprint of reference + amount + spend condition, suitable
    /// as a commitment-tree leaf.
    pub fn fingerprint(&self) -> NodeHash {
        tagged_hash(
            UTXO_FP_TAG,
            &[
                &self.outpoint.txid.to_byte_array(),
                &self.outpoint.vout.to_be_bytes(),
                &self.value.to_sat().to_be_bytes(),
                &[self.spend_class.tag_byte()],
            ],
        )
    }
}
