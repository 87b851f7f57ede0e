use sha2::{Digest, Sha256};

/// `hex(SHA-256(data))`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Raw SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// `address = hex(SHA-256(SPKI(publicKey)))`.
pub fn address_from_public_key_der(der: &[u8]) -> String {
    sha256_hex(der)
}
