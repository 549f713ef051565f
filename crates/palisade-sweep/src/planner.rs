//! Batch planning and target selection.

use bitcoin::Amount;
use serde::{Deserialize, Serialize};

use crate::config::{FeeTable, SweepConfig};
use crate::utxo::Utxo;
use crate::SweepError;

/// One consolidation batch, sized and summed for the construction layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepBatch {
    pub inputs: Vec<Utxo>,
    /// `inputs.len() × bytes_per_input` under the planning config.
    pub estimated_bytes: usize,
    pub total_value: Amount,
}

/// Partition `utxos` into consolidation batches.
///
/// Dust (value at or below the threshold) is dropped up front. Remaining
/// inputs accumulate greedily in order; a batch closes whenever admitting the
/// next input would break either the input cap or the byte cap. Every emitted
/// batch therefore satisfies both caps by construction. An empty plan (all
/// dust) is a valid outcome, not an error.
pub fn plan_batches(
    utxos: &[Utxo],
    config: &SweepConfig,
) -> Result<Vec<SweepBatch>, SweepError> {
    config.validate()?;

    let spendable: Vec<&Utxo> = utxos
        .iter()
        .filter(|utxo| utxo.value > config.dust_threshold)
        .collect();
    let dropped = utxos.len() - spendable.len();
    if dropped > 0 {
        log::warn!(
            "dropping {} dust input(s) at or below {} sat",
            dropped,
            config.dust_threshold.to_sat()
        );
    }

    let mut batches = Vec::new();
    let mut current: Vec<Utxo> = Vec::new();
    for utxo in spendable {
        let next_count = current.len() + 1;
        let closes_batch = !current.is_empty()
            && (next_count > config.max_inputs_per_batch
                || next_count * config.bytes_per_input > config.max_batch_bytes);
        if closes_batch {
            batches.push(close_batch(std::mem::take(&mut current), config)?);
        }
        current.push(utxo.clone());
    }
    if !current.is_empty() {
        batches.push(close_batch(current, config)?);
    }

    Ok(batches)
}

fn close_batch(inputs: Vec<Utxo>, config: &SweepConfig) -> Result<SweepBatch, SweepError> {
    let mut total_value = Amount::ZERO;
    for utxo in &inputs {
        total_value = total_value
            .checked_add(utxo.value)
            .ok_or_else(|| SweepError::InvalidInput("batch value overflow".into()))?;
    }
    Ok(SweepBatch {
        estimated_bytes: inputs.len() * config.bytes_per_input,
        total_value,
        inputs,
    })
}

/// Select inputs covering `target` plus the fee they themselves incur.
///
/// UTXOs are taken largest-first (ties broken by outpoint for determinism).
/// After each addition the fee is re-estimated from the running input count
/// and each input's own spend-path size class; selection stops as soon as
/// the accumulated value covers target + fee. Fails with
/// [`SweepError::InsufficientFunds`] when even the full set never satisfies
/// the condition.
pub fn optimize_for_target(
    utxos: &[Utxo],
    target: Amount,
    fee_rate: u64,
    fee_table: &FeeTable,
) -> Result<Vec<Utxo>, SweepError> {
    let mut candidates: Vec<&Utxo> = utxos.iter().collect();
    candidates.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then_with(|| a.outpoint.cmp(&b.outpoint))
    });

    let mut selected: Vec<Utxo> = Vec::new();
    let mut accumulated = Amount::ZERO;
    let mut fee_vbytes: usize = 0;
    let mut required = target;

    for utxo in candidates {
        accumulated = accumulated
            .checked_add(utxo.value)
            .ok_or_else(|| SweepError::InvalidInput("selection value overflow".into()))?;
        fee_vbytes += fee_table.per_input_vbytes(utxo.spend_class);
        selected.push(utxo.clone());

        let fee = Amount::from_sat(fee_vbytes as u64 * fee_rate);
        required = target
            .checked_add(fee)
            .ok_or_else(|| SweepError::InvalidInput("target + fee overflow".into()))?;
        if accumulated >= required {
            return Ok(selected);
        }
    }

    Err(SweepError::InsufficientFunds {
        available: accumulated.to_sat(),
        required: required.to_sat(),
    })
}
