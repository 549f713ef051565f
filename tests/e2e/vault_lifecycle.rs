//! End-to-end test for the full vault lifecycle.
//!
//! Proves the crates compose:
//!
//! 1. Initialize a one-time key vault (commitment root published)
//! 2. Build a descriptor embedding the vault root next to dual-key and
//!    recovery leaves
//! 3. Plan a consolidation sweep over the vault's UTXOs
//! 4. Prepare a spend: one-time key, inclusion proof, placeholder signature
//! 5. Verify everything against the published root and output key

use std::sync::{Arc, Mutex};
use std::thread;

use bitcoin::hashes::Hash;
use bitcoin::{Amount, OutPoint, Txid, XOnlyPublicKey};

use palisade_commit::verify_inclusion;
use palisade_descriptor::{DescriptorBuilder, ScriptLeaf, SpendRequest};
use palisade_sweep::{optimize_for_target, plan_batches, FeeTable, SpendClass, SweepConfig, Utxo};
use palisade_vault::{OneTimeKeyVault, VaultError};

fn test_key(byte: u8) -> XOnlyPublicKey {
    let secp = bitcoin::secp256k1::Secp256k1::new();
    let mut bytes = [0u8; 32];
    bytes[31] = byte;
    bytes[0] = 0x01;
    let sk = bitcoin::secp256k1::SecretKey::from_slice(&bytes).unwrap();
    sk.x_only_public_key(&secp).0
}

fn test_utxo(n: u32, sats: u64, class: SpendClass) -> Utxo {
    let mut txid_bytes = [0u8; 32];
    txid_bytes[..4].copy_from_slice(&n.to_be_bytes());
    Utxo::new(
        OutPoint {
            txid: Txid::from_byte_array(txid_bytes),
            vout: n,
        },
        Amount::from_sat(sats),
        class,
    )
}

#[test]
fn test_full_vault_lifecycle() {
    // 1. Vault: 64 one-time keys on 16-step chains.
    let mut vault = OneTimeKeyVault::initialize(64, 16).unwrap();
    let vault_root = vault.root();

    // 2. Descriptor committing to the vault root alongside the usual leaves.
    let descriptor = DescriptorBuilder::new()
        .dual_key(test_key(1), test_key(2))
        .unwrap()
        .timelock_recovery(test_key(3), 4320)
        .unwrap()
        .vault_commitment(vault_root)
        .unwrap()
        .build()
        .unwrap();

    assert_ne!(descriptor.output_key(), descriptor.internal_key());

    // The textual form carries the root for the external node collaborator.
    let text = descriptor.to_descriptor_string();
    assert!(text.contains(&format!("vaultroot({})", hex::encode(vault_root))));

    // The vault spend path is selectable and carries the same root.
    let leaf = descriptor.select_path(SpendRequest::Vault).unwrap();
    let embedded_root = match leaf {
        ScriptLeaf::VaultCommitment { root } => *root,
        other => panic!("expected vault leaf, got {other:?}"),
    };
    assert_eq!(embedded_root, vault_root);

    // 3. Sweep planning over outputs paying the descriptor.
    let utxos: Vec<Utxo> = (0..900)
        .map(|n| test_utxo(n, 2_000, SpendClass::ScriptVaultProof))
        .collect();
    let config = SweepConfig::default();
    let batches = plan_batches(&utxos, &config).unwrap();
    assert_eq!(batches.len(), 3); // 400 + 400 + 100
    for batch in &batches {
        assert!(batch.inputs.len() <= config.max_inputs_per_batch);
        assert!(batch.estimated_bytes <= config.max_batch_bytes);
    }

    let selected = optimize_for_target(
        &utxos,
        Amount::from_sat(5_000),
        2,
        &FeeTable::default(),
    )
    .unwrap();
    assert!(!selected.is_empty());

    // 4. Authorize the first batch with a one-time key. The signed message
    //    binds the batch to the descriptor's output key.
    let mut message = descriptor.output_key().serialize().to_vec();
    message.extend_from_slice(&batches[0].total_value.to_sat().to_be_bytes());

    let (auth, signature) = vault.sign_with(0, &message).unwrap();

    // 5. A verifier holding only public data accepts the spend…
    assert!(auth.verify());
    assert_eq!(auth.root, embedded_root);
    assert!(vault.verify_signature(&message, &signature, &auth.public_key));

    // …and the key is burned.
    assert!(matches!(
        vault.sign_with(0, &message),
        Err(VaultError::KeyAlreadyUsed { index: 0 })
    ));
}

#[test]
fn test_concurrent_prepare_spend_issues_once() {
    // The used flag is the one shared-mutable hazard: racing callers on the
    // same index must never both observe "unused". Exclusive access comes
    // from &mut self; sharing goes through a Mutex.
    let vault = Arc::new(Mutex::new(OneTimeKeyVault::initialize(8, 16).unwrap()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let vault = Arc::clone(&vault);
            thread::spawn(move || vault.lock().unwrap().prepare_spend(3).is_ok())
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|&ok| ok)
        .count();
    assert_eq!(successes, 1, "exactly one caller may win index 3");
}

#[test]
fn test_export_import_preserves_descriptor_binding() {
    let mut vault = OneTimeKeyVault::initialize(32, 16).unwrap();
    vault.prepare_spend(5).unwrap();
    vault.prepare_spend(17).unwrap();

    let export = vault.export(Some("correct horse battery staple"), true).unwrap();

    // The record survives a serialization boundary.
    let json = serde_json::to_string(&export).unwrap();
    let restored_export = serde_json::from_str(&json).unwrap();

    let restored = OneTimeKeyVault::import(&restored_export, "correct horse battery staple")
        .unwrap();
    assert_eq!(restored.root(), vault.root());
    assert_eq!(restored.stats(), vault.stats());

    // A descriptor rebuilt around the restored vault derives the same
    // output key as one built before the backup.
    let build = |root| {
        DescriptorBuilder::new()
            .dual_key(test_key(1), test_key(2))
            .unwrap()
            .vault_commitment(root)
            .unwrap()
            .build()
            .unwrap()
    };
    assert_eq!(
        build(vault.root()).output_key(),
        build(restored.root()).output_key()
    );
}

#[test]
fn test_spend_authorization_verifies_across_serialization() {
    // A spend authorization is plain data at the collaborator boundary: it
    // must verify after a JSON round-trip with no access to the vault.
    let mut vault = OneTimeKeyVault::initialize(16, 16).unwrap();
    let auth = vault.prepare_spend(9).unwrap();

    let json = serde_json::to_string(&auth).unwrap();
    let restored: palisade_vault::SpendAuthorization = serde_json::from_str(&json).unwrap();

    assert!(restored.verify());

    // The underlying commit primitive agrees.
    let leaf = palisade_vault::chain::public_key_hash(&restored.public_key);
    assert!(verify_inclusion(&leaf, &restored.proof, &restored.root));
}
