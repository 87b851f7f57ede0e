use aes_gcm::aead::{Aead, KeyInit, OsRng as AeadOsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use scrypt::Params;
use thiserror::Error;

use ledger_core::constants::{SCRYPT_DK_LEN, SCRYPT_P, SCRYPT_R, VAULT_NONCE_LEN, VAULT_SALT_LEN};

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("bad passphrase")]
    BadPassphrase,
    #[error("corrupt ciphertext")]
    Corrupt,
    #[error("key derivation failed: {0}")]
    Kdf(String),
}

fn derive_key(password: &[u8], salt: &[u8], n: u32) -> Result<[u8; 32], VaultError> {
    let log_n = (u32::BITS - n.leading_zeros() - 1) as u8;
    let params = Params::new(log_n, SCRYPT_R, SCRYPT_P, SCRYPT_DK_LEN)
        .map_err(|e| VaultError::Kdf(e.to_string()))?;
    let mut key = [0u8; 32];
    scrypt::scrypt(password, salt, &params, &mut key).map_err(|e| VaultError::Kdf(e.to_string()))?;
    Ok(key)
}

/// Seal `plaintext` under `password`. Layout: `nonce || gcm_seal(plaintext) || salt`.
pub fn seal(password: &[u8], plaintext: &[u8], scrypt_n: u32) -> Result<Vec<u8>, VaultError> {
    let mut salt = [0u8; VAULT_SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let key = derive_key(password, &salt, scrypt_n)?;
    let cipher = Aes256Gcm::new_from_slice(&key).expect("key is 32 bytes");

    let mut nonce_bytes = [0u8; VAULT_NONCE_LEN];
    AeadOsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| VaultError::Corrupt)?;

    let mut out = Vec::with_capacity(VAULT_NONCE_LEN + ciphertext.len() + VAULT_SALT_LEN);
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    out.extend_from_slice(&salt);
    Ok(out)
}

/// Open a blob produced by [`seal`]. Returns `BadPassphrase` if the AEAD
/// tag does not verify (wrong key), `Corrupt` if the blob is malformed.
pub fn open(password: &[u8], blob: &[u8], scrypt_n: u32) -> Result<Vec<u8>, VaultError> {
    if blob.len() < VAULT_NONCE_LEN + VAULT_SALT_LEN + 16 {
        return Err(VaultError::Corrupt);
    }
    let (head, salt) = blob.split_at(blob.len() - VAULT_SALT_LEN);
    let (nonce_bytes, ciphertext) = head.split_at(VAULT_NONCE_LEN);

    let key = derive_key(password, salt, scrypt_n)?;
    let cipher = Aes256Gcm::new_from_slice(&key).expect("key is 32 bytes");
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| VaultError::BadPassphrase)
}
