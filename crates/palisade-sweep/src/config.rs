//! Planner configuration — serde sections with per-field defaults.
//!
//! Defaults are derived from Taproot witness-weight arithmetic:
//! a key-path input is ~230 WU (58 vB); a script-path input adds the script
//! and control block (~107 vB for a one-signature tapscript); an input whose
//! witness carries a vault membership proof adds ~10 sibling hashes on top
//! (~192 vB). Callers with different script shapes override the table.

use bitcoin::Amount;
use serde::{Deserialize, Serialize};

use crate::utxo::SpendClass;
use crate::SweepError;

/// Caps and thresholds for consolidation batching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Upper bound on a batch's estimated size.
    #[serde(default = "default_max_batch_bytes")]
    pub max_batch_bytes: usize,

    /// Upper bound on inputs per batch.
    #[serde(default = "default_max_inputs_per_batch")]
    pub max_inputs_per_batch: usize,

    /// Flat per-input size estimate used for batch sizing.
    #[serde(default = "default_bytes_per_input")]
    pub bytes_per_input: usize,

    /// Inputs at or below this value are not worth sweeping.
    #[serde(default = "default_dust_threshold")]
    pub dust_threshold: Amount,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_batch_bytes: default_max_batch_bytes(),
            max_inputs_per_batch: default_max_inputs_per_batch(),
            bytes_per_input: default_bytes_per_input(),
            dust_threshold: default_dust_threshold(),
        }
    }
}

impl SweepConfig {
    /// Reject configurations under which no batch could ever close legally.
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.max_inputs_per_batch == 0 {
            return Err(SweepError::InvalidInput(
                "max_inputs_per_batch must be at least 1".into(),
            ));
        }
        if self.bytes_per_input == 0 {
            return Err(SweepError::InvalidInput(
                "bytes_per_input must be nonzero".into(),
            ));
        }
        if self.bytes_per_input > self.max_batch_bytes {
            return Err(SweepError::InvalidInput(format!(
                "a single {}-byte input exceeds the {}-byte batch cap",
                self.bytes_per_input, self.max_batch_bytes
            )));
        }
        Ok(())
    }
}

// ~100 kvB keeps batches comfortably under relay standardness.
fn default_max_batch_bytes() -> usize {
    100_000
}

fn default_max_inputs_per_batch() -> usize {
    400
}

fn default_bytes_per_input() -> usize {
    default_script_classical_vbytes()
}

fn default_dust_threshold() -> Amount {
    Amount::from_sat(546)
}

/// Per-input size estimates by spend class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTable {
    #[serde(default = "default_key_path_vbytes")]
    pub key_path_vbytes: usize,

    #[serde(default = "default_script_classical_vbytes")]
    pub script_classical_vbytes: usize,

    #[serde(default = "default_script_vault_proof_vbytes")]
    pub script_vault_proof_vbytes: usize,
}

impl Default for FeeTable {
    fn default() -> Self {
        Self {
            key_path_vbytes: default_key_path_vbytes(),
            script_classical_vbytes: default_script_classical_vbytes(),
            script_vault_proof_vbytes: default_script_vault_proof_vbytes(),
        }
    }
}

impl FeeTable {
    pub fn per_input_vbytes(&self, class: SpendClass) -> usize {
        match class {
            SpendClass::KeyPath => self.key_path_vbytes,
            SpendClass::ScriptClassical => self.script_classical_vbytes,
            SpendClass::ScriptVaultProof => self.script_vault_proof_vbytes,
        }
    }

    /// Weight-based estimate: `input_count × per_input[class] × fee_rate`.
    pub fn estimate_fee(
        &self,
        input_count: usize,
        class: SpendClass,
        fee_rate: u64,
    ) -> Amount {
        Amount::from_sat((input_count * self.per_input_vbytes(class)) as u64 * fee_rate)
    }
}

fn default_key_path_vbytes() -> usize {
    58
}

fn default_script_classical_vbytes() -> usize {
    107
}

fn default_script_vault_proof_vbytes() -> usize {
    192
}
