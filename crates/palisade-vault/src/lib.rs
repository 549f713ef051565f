//! Palisade One-Time Key Vault
//!
//! A fixed-size pool of single-use signature keys. Each record's public key
//! is the end of an iterated one-way hash chain over a CSPRNG seed; the
//! hashes of all public keys are committed in a Merkle tree
//! (`palisade-commit`), and the root is the only value published externally.
//!
//! # Single-use contract
//!
//! A record's `used` flag flips exactly once, at first spend preparation.
//! `prepare_spend` checks and marks in one step behind `&mut self`, so two
//! callers can never both observe "unused" — callers sharing a vault across
//! threads wrap it in a `Mutex`. Records are never deleted (audit trail),
//! but a used record's seed is never handed out again.
//!
//! # Signature seam
//!
//! Signing goes through the [`SignatureScheme`] trait. The bundled
//! [`ChainLinkScheme`] is a deterministic placeholder pending a real
//! post-quantum algorithm; nothing outside the scheme may assume anything
//! about a signature's internal structure.

pub mod chain;
pub mod export;
pub mod signature;
pub mod vault;

pub use export::{EncryptedMaterial, VaultExport};
pub use signature::{ChainLinkScheme, Signature, SignatureScheme};
pub use vault::{OneTimeKeyVault, SpendAuthorization, VaultStats};

use palisade_commit::CommitError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    /// Zero pool size, degenerate chain length, or an out-of-range index.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Attempted reuse of a one-time key.
    #[error("one-time key {index} has already been used")]
    KeyAlreadyUsed { index: u32 },

    #[error("commitment error: {0}")]
    Commit(#[from] CommitError),

    /// Key-derivation or cipher failure while sealing/opening export material.
    #[error("export crypto failed: {0}")]
    ExportCrypto(String),

    /// An export record that contradicts itself (root mismatch, bad lengths).
    #[error("corrupt export: {0}")]
    CorruptExport(String),
}
