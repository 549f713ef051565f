//! Palisade Output Descriptors
//!
//! Builds script-tree output descriptors anchored to a fixed internal key
//! with no discoverable private key, so a direct key-path spend is
//! permanently impossible: every legitimate spend must reveal one committed
//! [`ScriptLeaf`].
//!
//! # Structure
//!
//! ```text
//! output_key = internal_key + tagged_hash(internal_key || tree_root) * G
//!   Script path: dual(A, B)             <- two-key immediate spend
//!   Script path: recover(K, delay)      <- time-delayed recovery
//!   Script path: vaultroot(R)           <- commitment-tree spend (reserved)
//! ```
//!
//! The internal key is the BIP-341 NUMS point (`lift_x(H(encode(G)))`), a
//! point constructed so that nobody knows a discrete log for it. The tweak is
//! a genuine curve operation (scalar multiplication plus point addition) —
//! never a bitwise combination, which would commit to nothing.

pub mod builder;
pub mod leaf;
pub mod text;

pub use builder::{Descriptor, DescriptorBuilder, SpendRequest};
pub use leaf::{LeafKind, ScriptLeaf};

use bitcoin::XOnlyPublicKey;
use thiserror::Error;

/// The BIP-341 NUMS point: `lift_x(sha256(encode(G)))`.
///
/// Provably not-a-key — the x coordinate is a hash output, so deriving its
/// private key would require breaking the discrete log of a random point.
pub const INTERNAL_KEY_BYTES: [u8; 32] = [
    0x50, 0x92, 0x9b, 0x74, 0xc1, 0xa0, 0x49, 0x54, 0xb7, 0x8b, 0x4b, 0x60, 0x35, 0xe9, 0x7a,
    0x5e, 0x07, 0x8a, 0x5a, 0x0f, 0x28, 0xec, 0x96, 0xd5, 0x47, 0xbf, 0xee, 0x9a, 0xce, 0x80,
    0x3a, 0xc0,
];

/// The fixed internal key shared by every Palisade descriptor.
pub fn internal_key() -> XOnlyPublicKey {
    XOnlyPublicKey::from_slice(&INTERNAL_KEY_BYTES)
        .expect("the BIP-341 NUMS point is a valid x coordinate")
}

#[derive(Error, Debug)]
pub enum DescriptorError {
    /// Empty tree, zero recovery delay, or an unasserted timelock.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The tree lacks the requested leaf kind.
    #[error("no script leaf matches the requested {0} spend path")]
    NoMatchingPath(LeafKind),

    #[error("invalid scalar value for tweak")]
    InvalidScalar,

    #[error("failed to apply tweak to internal key")]
    TweakFailed,
}
