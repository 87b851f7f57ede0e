pub mod ecdsa;
pub mod hash;
pub mod keypair;
pub mod pow;
pub mod vault;

pub use ecdsa::{sign, verify, SignatureError};
pub use hash::{address_from_public_key_der, sha256, sha256_hex};
pub use keypair::{EcKeyPair, KeyPairError};
pub use pow::{mine_block_header, satisfies_difficulty};
pub use vault::{open as vault_open, seal as vault_seal, VaultError};
