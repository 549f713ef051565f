//! The one-time key vault.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use palisade_commit::{verify_inclusion, CommitmentTree, NodeHash, Proof};

use crate::chain::{derive_public_key, public_key_hash};
use crate::signature::{ChainLinkScheme, Signature, SignatureScheme};
use crate::VaultError;

/// One single-use key record. Created at initialization, never deleted.
#[derive(Debug)]
pub struct KeyRecord {
    index: u32,
    /// Secret seed — exclusively owned here, zeroized on drop.
    seed: Zeroizing<[u8; 32]>,
    public_key: [u8; 32],
    public_key_hash: [u8; 32],
    used: bool,
}

impl KeyRecord {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    pub fn public_key_hash(&self) -> &[u8; 32] {
        &self.public_key_hash
    }

    pub fn is_used(&self) -> bool {
        self.used
    }
}

/// Everything a spender needs to authorize against the published root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendAuthorization {
    pub index: u32,
    pub public_key: [u8; 32],
    pub proof: Proof,
    pub root: NodeHash,
}

impl SpendAuthorization {
    /// Recheck that the public key is committed under the carried root.
    pub fn verify(&self) -> bool {
        verify_inclusion(&public_key_hash(&self.public_key), &self.proof, &self.root)
    }
}

/// Pool counters plus the expected proof weight per spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultStats {
    pub total: u32,
    pub used: u32,
    pub remaining: u32,
    /// `ceil(log2(total)) * 32` — sibling hashes dominate proof size.
    pub estimated_proof_bytes: usize,
}

/// A fixed pool of one-time keys with their public-key hashes committed in a
/// Merkle tree.
#[derive(Debug)]
pub struct OneTimeKeyVault {
    records: Vec<KeyRecord>,
    chain_length: u32,
    tree: CommitmentTree,
    scheme: ChainLinkScheme,
}

impl OneTimeKeyVault {
    /// Create a vault of `pool_size` independent records.
    ///
    /// Each record gets a fresh CSPRNG seed; its public key is the end of a
    /// `chain_length - 1`-step hash chain. All public-key hashes are
    /// committed at once and the root is fixed for the vault's lifetime.
    pub fn initialize(pool_size: u32, chain_length: u32) -> Result<Self, VaultError> {
        if pool_size == 0 {
            return Err(VaultError::InvalidInput(
                "pool size must be at least 1".into(),
            ));
        }
        let scheme = ChainLinkScheme::new(chain_length)?;

        let mut seeds = Vec::with_capacity(pool_size as usize);
        for _ in 0..pool_size {
            let mut seed = Zeroizing::new([0u8; 32]);
            OsRng.fill_bytes(seed.as_mut());
            seeds.push(seed);
        }

        Self::from_seeds(seeds, chain_length, &[], scheme)
    }

    /// Assemble a vault from known seeds (initialization and import).
    pub(crate) fn from_seeds(
        seeds: Vec<Zeroizing<[u8; 32]>>,
        chain_length: u32,
        used_indices: &[u32],
        scheme: ChainLinkScheme,
    ) -> Result<Self, VaultError> {
        let records: Vec<KeyRecord> = seeds
            .into_iter()
            .enumerate()
            .map(|(i, seed)| {
                let public_key = derive_public_key(&seed, chain_length);
                KeyRecord {
                    index: i as u32,
                    seed,
                    public_key_hash: public_key_hash(&public_key),
                    public_key,
                    used: used_indices.contains(&(i as u32)),
                }
            })
            .collect();

        let leaves: Vec<[u8; 32]> = records.iter().map(|r| r.public_key_hash).collect();
        let tree = CommitmentTree::build(&leaves)?;

        Ok(Self {
            records,
            chain_length,
            tree,
            scheme,
        })
    }

    /// The committed root over all public-key hashes.
    pub fn root(&self) -> NodeHash {
        self.tree.root()
    }

    pub fn chain_length(&self) -> u32 {
        self.chain_length
    }

    pub fn records(&self) -> &[KeyRecord] {
        &self.records
    }

    /// Mark the record at `index` used and return its spend authorization.
    ///
    /// Check-then-mark is one serialized step: this method takes `&mut self`,
    /// so no two callers can both observe the record as unused. A second call
    /// for the same index fails with [`VaultError::KeyAlreadyUsed`].
    pub fn prepare_spend(&mut self, index: u32) -> Result<SpendAuthorization, VaultError> {
        let total = self.records.len();
        let record = self
            .records
            .get_mut(index as usize)
            .ok_or_else(|| {
                VaultError::InvalidInput(format!(
                    "record index {} out of range ({} records)",
                    index, total
                ))
            })?;

        if record.used {
            return Err(VaultError::KeyAlreadyUsed { index });
        }
        record.used = true;

        Ok(SpendAuthorization {
            index,
            public_key: record.public_key,
            proof: self.tree.proof(index as usize)?,
            root: self.tree.root(),
        })
    }

    /// Prepare a spend and sign `message` with the record's seed in the same
    /// serialized step. The only path by which seed material is ever used.
    pub fn sign_with(
        &mut self,
        index: u32,
        message: &[u8],
    ) -> Result<(SpendAuthorization, Signature), VaultError> {
        let authorization = self.prepare_spend(index)?;
        let seed = &self.records[index as usize].seed;
        let signature = self.scheme.sign(message, seed);
        Ok((authorization, signature))
    }

    /// Verify a signature produced by this vault's scheme.
    pub fn verify_signature(
        &self,
        message: &[u8],
        signature: &Signature,
        public_key: &[u8; 32],
    ) -> bool {
        self.scheme.verify(message, signature, public_key)
    }

    pub fn stats(&self) -> VaultStats {
        let total = self.records.len() as u32;
        let used = self.records.iter().filter(|r| r.used).count() as u32;
        let depth = (total as usize).next_power_of_two().trailing_zeros() as usize;
        VaultStats {
            total,
            used,
            remaining: total - used,
            estimated_proof_bytes: depth * 32,
        }
    }

    pub(crate) fn used_indices(&self) -> Vec<u32> {
        self.records
            .iter()
            .filter(|r| r.used)
            .map(|r| r.index)
            .collect()
    }

    pub(crate) fn seeds(&self) -> impl Iterator<Item = &[u8; 32]> {
        self.records.iter().map(|r| &*r.seed)
    }
}
