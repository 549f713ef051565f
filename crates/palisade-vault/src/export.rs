//! Vault export / import.
//!
//! The export record carries the pool geometry, the committed root, and the
//! used-index set. Seed material is optional and only ever leaves the vault
//! sealed under Argon2id + AES-256-GCM — there is no code path that
//! serializes plaintext seeds.
//!
//! # Security Notes
//!
//! - Argon2id is memory-hard (resistant to GPU/ASIC attacks)
//! - AES-256-GCM provides authenticated encryption
//! - Each export uses a fresh random salt and nonce
//! - The password is never stored

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use palisade_commit::NodeHash;

use crate::signature::ChainLinkScheme;
use crate::vault::OneTimeKeyVault;
use crate::VaultError;

/// Argon2id parameters (OWASP recommendations for 2024+)
const ARGON2_M_COST: u32 = 65536; // 64 MiB
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 4;
const ARGON2_OUTPUT_LEN: usize = 32; // 256 bits for AES-256

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// Sealed seed material: salt ‖ nonce ‖ ciphertext-with-tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedMaterial {
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

/// The backup/restore record consumed by external tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultExport {
    pub pool_size: u32,
    pub chain_length: u32,
    pub root: NodeHash,
    pub used_indices: Vec<u32>,
    /// Present only when the caller supplied an encryption password.
    pub material: Option<EncryptedMaterial>,
}

impl OneTimeKeyVault {
    /// Export the vault for backup.
    ///
    /// With a password, seed material is sealed and included. Without one:
    /// - `require_encryption = true` fails — the caller demanded that
    ///   private material never travel unprotected;
    /// - `require_encryption = false` omits the material entirely and logs a
    ///   warning (the export is then watch-only: root and used set, no keys).
    pub fn export(
        &self,
        password: Option<&str>,
        require_encryption: bool,
    ) -> Result<VaultExport, VaultError> {
        let material = match password {
            Some(pw) => Some(seal_seeds(self, pw)?),
            None if require_encryption => {
                return Err(VaultError::InvalidInput(
                    "encryption required but no password supplied".into(),
                ));
            }
            None => {
                log::warn!(
                    "exporting vault without private material; \
                     restore from this record is not possible"
                );
                None
            }
        };

        Ok(VaultExport {
            pool_size: self.records().len() as u32,
            chain_length: self.chain_length(),
            root: self.root(),
            used_indices: self.used_indices(),
            material,
        })
    }

    /// Restore a vault from an export record.
    ///
    /// Re-derives every public key from the unsealed seeds, rebuilds the
    /// commitment tree, and restores the used flags. The rebuilt root must
    /// equal the recorded root — any disagreement means the record was
    /// tampered with or assembled from mismatched parts.
    pub fn import(export: &VaultExport, password: &str) -> Result<Self, VaultError> {
        let material = export.material.as_ref().ok_or_else(|| {
            VaultError::InvalidInput("export carries no private material".into())
        })?;

        let seeds = open_seeds(material, password, export.pool_size)?;

        for &index in &export.used_indices {
            if index >= export.pool_size {
                return Err(VaultError::CorruptExport(format!(
                    "used index {} out of range for pool of {}",
                    index, export.pool_size
                )));
            }
        }

        let scheme = ChainLinkScheme::new(export.chain_length)?;
        let vault =
            Self::from_seeds(seeds, export.chain_length, &export.used_indices, scheme)?;

        if vault.root() != export.root {
            return Err(VaultError::CorruptExport(
                "rebuilt root does not match the recorded root".into(),
            ));
        }
        Ok(vault)
    }
}

/// Derive the AES key from a password with Argon2id.
fn derive_key(password: &str, salt: &[u8; SALT_LEN]) -> Result<Zeroizing<[u8; 32]>, VaultError> {
    let params = Params::new(
        ARGON2_M_COST,
        ARGON2_T_COST,
        ARGON2_P_COST,
        Some(ARGON2_OUTPUT_LEN),
    )
    .map_err(|e| VaultError::ExportCrypto(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; ARGON2_OUTPUT_LEN]);
    argon2
        .hash_password_into(password.as_bytes(), salt, key.as_mut())
        .map_err(|e| VaultError::ExportCrypto(e.to_string()))?;
    Ok(key)
}

/// Seal all seeds (concatenated, pool order) under the password.
fn seal_seeds(vault: &OneTimeKeyVault, password: &str) -> Result<EncryptedMaterial, VaultError> {
    let mut plaintext = Zeroizing::new(Vec::with_capacity(vault.records().len() * 32));
    for seed in vault.seeds() {
        plaintext.extend_from_slice(seed);
    }

    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);

    let nonce_arr = Aes256Gcm::generate_nonce(&mut OsRng);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&nonce_arr);

    let key = derive_key(password, &salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_ref()));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_slice())
        .map_err(|e| VaultError::ExportCrypto(e.to_string()))?;

    Ok(EncryptedMaterial {
        salt,
        nonce,
        ciphertext,
    })
}

/// Open sealed material and split it back into per-record seeds.
fn open_seeds(
    material: &EncryptedMaterial,
    password: &str,
    pool_size: u32,
) -> Result<Vec<Zeroizing<[u8; 32]>>, VaultError> {
    let key = derive_key(password, &material.salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_ref()));
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(
                Nonce::from_slice(&material.nonce),
                material.ciphertext.as_slice(),
            )
            .map_err(|_| {
                VaultError::ExportCrypto("invalid password or corrupted material".into())
            })?,
    );

    if plaintext.len() != pool_size as usize * 32 {
        return Err(VaultError::CorruptExport(format!(
            "material holds {} bytes, expected {} for a pool of {}",
            plaintext.len(),
            pool_size as usize * 32,
            pool_size
        )));
    }

    Ok(plaintext
        .chunks_exact(32)
        .map(|chunk| {
            let mut seed = Zeroizing::new([0u8; 32]);
            seed.copy_from_slice(chunk);
            seed
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN_LENGTH: u32 = 16;

    #[test]
    fn test_export_import_roundtrip() {
        let mut vault = OneTimeKeyVault::initialize(8, CHAIN_LENGTH).unwrap();
        vault.prepare_spend(1).unwrap();
        vault.prepare_spend(6).unwrap();

        let export = vault.export(Some("hunter2 but longer"), true).unwrap();
        let restored = OneTimeKeyVault::import(&export, "hunter2 but longer").unwrap();

        assert_eq!(restored.root(), vault.root());
        assert_eq!(restored.stats(), vault.stats());

        // Used flags survived: index 1 is burned, index 2 is not.
        let mut restored = restored;
        assert!(matches!(
            restored.prepare_spend(1),
            Err(VaultError::KeyAlreadyUsed { index: 1 })
        ));
        assert!(restored.prepare_spend(2).is_ok());
    }

    #[test]
    fn test_unencrypted_export_omits_material() {
        let vault = OneTimeKeyVault::initialize(4, CHAIN_LENGTH).unwrap();
        let export = vault.export(None, false).unwrap();

        assert!(export.material.is_none());
        assert_eq!(export.pool_size, 4);
        assert_eq!(export.root, vault.root());

        // And a watch-only record cannot be imported.
        assert!(matches!(
            OneTimeKeyVault::import(&export, "any"),
            Err(VaultError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_require_encryption_without_password_fails() {
        let vault = OneTimeKeyVault::initialize(4, CHAIN_LENGTH).unwrap();
        assert!(matches!(
            vault.export(None, true),
            Err(VaultError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let vault = OneTimeKeyVault::initialize(4, CHAIN_LENGTH).unwrap();
        let export = vault.export(Some("right password"), true).unwrap();

        assert!(matches!(
            OneTimeKeyVault::import(&export, "wrong password"),
            Err(VaultError::ExportCrypto(_))
        ));
    }

    #[test]
    fn test_tampered_material_rejected() {
        let vault = OneTimeKeyVault::initialize(4, CHAIN_LENGTH).unwrap();
        let mut export = vault.export(Some("pw"), true).unwrap();

        let material = export.material.as_mut().unwrap();
        let last = material.ciphertext.len() - 1;
        material.ciphertext[last] ^= 0xFF;

        // GCM authentication catches the flip.
        assert!(matches!(
            OneTimeKeyVault::import(&export, "pw"),
            Err(VaultError::ExportCrypto(_))
        ));
    }

    #[test]
    fn test_tampered_root_rejected() {
        let vault = OneTimeKeyVault::initialize(4, CHAIN_LENGTH).unwrap();
        let mut export = vault.export(Some("pw"), true).unwrap();
        export.root[0] ^= 0x01;

        assert!(matches!(
            OneTimeKeyVault::import(&export, "pw"),
            Err(VaultError::CorruptExport(_))
        ));
    }

    #[test]
    fn test_export_record_serde_roundtrip() {
        let mut vault = OneTimeKeyVault::initialize(8, CHAIN_LENGTH).unwrap();
        vault.prepare_spend(0).unwrap();

        let export = vault.export(Some("pw"), true).unwrap();
        let json = serde_json::to_string(&export).unwrap();
        let restored_record: VaultExport = serde_json::from_str(&json).unwrap();

        let restored = OneTimeKeyVault::import(&restored_record, "pw").unwrap();
        assert_eq!(restored.root(), vault.root());
    }
}
