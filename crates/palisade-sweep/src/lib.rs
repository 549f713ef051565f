//! Palisade Sweep Planner
//!
//! Partitions and selects UTXOs into fee- and size-bounded batches for
//! consolidation. Pure planning — the resulting batches are handed to a
//! separate transaction-construction/signing layer, and fee rates come from
//! the external node collaborator.
//!
//! # Size classes
//!
//! Per-input weight depends on how the output will be spent: a key-path
//! input is smallest, a script-path input with a classical signature is
//! larger (script + control block in the witness), and a script-path input
//! carrying a vault membership proof is the largest. The concrete figures
//! live in [`FeeTable`] — configuration, not constants.

pub mod config;
pub mod planner;
pub mod utxo;

pub use config::{FeeTable, SweepConfig};
pub use planner::{optimize_for_target, plan_batches, SweepBatch};
pub use utxo::{SpendClass, Utxo};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    /// Degenerate configuration or value overflow.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Exhausting all spendable UTXOs never covered target plus fees.
    #[error("insufficient funds: {available} sat available, {required} sat required")]
    InsufficientFunds { available: u64, required: u64 },
}
