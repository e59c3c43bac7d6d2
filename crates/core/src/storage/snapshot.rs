use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use std::path::Path;

use crate::errors::CoreError;
use crate::storage::ledger::{LedgerSnapshot, LedgerStore};

/// Magic bytes identifying a PaperTrade snapshot file.
const MAGIC: &[u8; 4] = b"PTSN";

/// Current snapshot format version.
const CURRENT_VERSION: u16 = 1;

/// Header size in bytes:
/// magic(4) + version(2) + kdf_params(12) + salt(16) + nonce(12) = 46.
/// The ciphertext (with its 16-byte GCM tag) runs to the end of the buffer.
const HEADER_SIZE: usize = 46;

/// Argon2id parameters for the passphrase KDF.
/// Stored in the header so they can be raised in future versions.
#[derive(Debug, Clone, Copy)]
struct KdfParams {
    /// Memory cost in KiB
    memory_cost: u32,
    /// Number of iterations
    time_cost: u32,
    /// Degree of parallelism
    parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65_536, // 64 MB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// Encrypted at-rest persistence for the ledger.
///
/// Flow: LedgerSnapshot -> bincode -> AES-256-GCM(Argon2id(passphrase)) ->
/// PTSN container. The GCM tag covers both confidentiality and integrity, so
/// a wrong passphrase and a tampered file are indistinguishable and both
/// surface as `CoreError::Decryption`.
pub struct SnapshotStore;

impl SnapshotStore {
    /// Serialize and encrypt the ledger to raw bytes.
    pub fn save_to_bytes(ledger: &LedgerStore, passphrase: &str) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(&ledger.snapshot())?;

        let salt = random_bytes::<16>()?;
        let nonce = random_bytes::<12>()?;
        let kdf = KdfParams::default();
        let key = derive_key(passphrase, &salt, &kdf)?;

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_slice())
            .map_err(|e| CoreError::Encryption(format!("Encryption failed: {e}")))?;

        let mut buf = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&CURRENT_VERSION.to_le_bytes());
        buf.extend_from_slice(&kdf.memory_cost.to_le_bytes());
        buf.extend_from_slice(&kdf.time_cost.to_le_bytes());
        buf.extend_from_slice(&kdf.parallelism.to_le_bytes());
        buf.extend_from_slice(&salt);
        buf.extend_from_slice(&nonce);
        buf.extend_from_slice(&ciphertext);
        Ok(buf)
    }

    /// Decrypt and deserialize a ledger from raw bytes.
    pub fn load_from_bytes(data: &[u8], passphrase: &str) -> Result<LedgerStore, CoreError> {
        let (kdf, salt, nonce, ciphertext) = parse_container(data)?;

        let key = derive_key(passphrase, &salt, &kdf)?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext)
            .map_err(|_| CoreError::Decryption)?;

        let snapshot: LedgerSnapshot = bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Serialization(format!("Failed to decode snapshot: {e}")))?;
        Ok(LedgerStore::from_snapshot(snapshot))
    }

    /// Save the ledger to an encrypted file on disk.
    pub fn save_to_file(
        ledger: &LedgerStore,
        path: impl AsRef<Path>,
        passphrase: &str,
    ) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(ledger, passphrase)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load the ledger from an encrypted file on disk.
    pub fn load_from_file(
        path: impl AsRef<Path>,
        passphrase: &str,
    ) -> Result<LedgerStore, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(&bytes, passphrase)
    }
}

/// Validate the container header and split it from the ciphertext.
fn parse_container(data: &[u8]) -> Result<(KdfParams, [u8; 16], [u8; 12], &[u8]), CoreError> {
    if data.len() < HEADER_SIZE {
        return Err(CoreError::InvalidFileFormat(
            "File too small to be a PaperTrade snapshot".into(),
        ));
    }
    if &data[0..4] != MAGIC {
        return Err(CoreError::InvalidFileFormat(
            "Invalid magic bytes: not a PaperTrade snapshot".into(),
        ));
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let read_u32 = |offset: usize| -> u32 {
        u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ])
    };
    let kdf = KdfParams {
        memory_cost: read_u32(6),
        time_cost: read_u32(10),
        parallelism: read_u32(14),
    };

    // Bounds-check KDF params so a crafted header cannot exhaust memory.
    if !(8..=1_048_576).contains(&kdf.memory_cost) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF memory_cost out of safe range: {} KiB",
            kdf.memory_cost
        )));
    }
    if !(1..=20).contains(&kdf.time_cost) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF time_cost out of safe range: {}",
            kdf.time_cost
        )));
    }
    if !(1..=16).contains(&kdf.parallelism) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF parallelism out of safe range: {}",
            kdf.parallelism
        )));
    }

    let mut salt = [0u8; 16];
    salt.copy_from_slice(&data[18..34]);
    let mut nonce = [0u8; 12];
    nonce.copy_from_slice(&data[34..46]);

    Ok((kdf, salt, nonce, &data[HEADER_SIZE..]))
}

/// Derive a 256-bit key from the passphrase using Argon2id.
/// The salt must be random and unique per save.
fn derive_key(passphrase: &str, salt: &[u8; 16], params: &KdfParams) -> Result<[u8; 32], CoreError> {
    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| CoreError::Encryption(format!("Invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = [0u8; 32];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|e| CoreError::Encryption(format!("Key derivation failed: {e}")))?;
    Ok(key)
}

/// Cryptographically secure random bytes for salts and nonces.
fn random_bytes<const N: usize>() -> Result<[u8; N], CoreError> {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf)
        .map_err(|e| CoreError::Encryption(format!("Failed to generate random bytes: {e}")))?;
    Ok(buf)
}
