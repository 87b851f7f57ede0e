//! Named, passphrase-protected key holder with a semantic balance.
//!
//! Owned by exactly one process at a time while unlocked; owned by nobody
//! at rest. `encrypted ⇔ vault==None ⇔ ciphertext is Some`.

mod error;
mod passphrase;
mod pending;
mod vault;

pub use error::WalletError;
pub use passphrase::{generate_random_password, is_strong};
pub use pending::PendingPool;
pub use vault::{Vault, VaultSnapshot};

use ledger_core::constants::{SCRYPT_N_PRODUCTION, SCRYPT_N_TEST, VAULT_NONCE_LEN, VAULT_SALT_LEN};
use ledger_core::{derive_transaction_id, Puid, Timestamp, Transaction, TransactionStatus, TransactionVariant};
use ledger_crypto::EcKeyPair;
use ledger_store::{Store, StoreKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// On-disk shape, always encrypted.
#[derive(Serialize, Deserialize)]
pub struct PersistedWallet {
    pub id: Puid,
    pub address: String,
    pub encrypted: bool,
    pub salt_size: usize,
    pub nonce_size: usize,
    pub ciphertext_hex: Option<String>,
}

pub struct Wallet {
    pub id: Puid,
    address: Option<String>,
    encrypted: bool,
    ciphertext: Option<Vec<u8>>,
    vault: Option<Vault>,
    /// Reduced scrypt cost for tests; production uses `SCRYPT_N_PRODUCTION`.
    scrypt_n: u32,
}

impl Wallet {
    /// Requires a strong passphrase. Created unlocked with a new keypair.
    pub fn new(id: Puid, passphrase: &str) -> Result<Self, WalletError> {
        if !is_strong(passphrase) {
            return Err(WalletError::WeakPassphrase);
        }
        let keypair = EcKeyPair::generate()?;
        let mut vault = Vault::new(keypair);
        vault.set_data("balance", Value::from(0.0));
        vault.set_data("tags", Value::Array(vec![]));
        Ok(Self {
            id,
            address: None,
            encrypted: false,
            ciphertext: None,
            vault: Some(vault),
            scrypt_n: SCRYPT_N_PRODUCTION,
        })
    }

    /// Reduce the scrypt work factor so tests don't burn minutes on KDF.
    pub fn with_test_kdf(mut self) -> Self {
        self.scrypt_n = SCRYPT_N_TEST;
        self
    }

    /// `hex(SHA-256(SPKI(publicKey)))`, computed on first access and cached.
    pub fn get_address(&mut self) -> Result<String, WalletError> {
        if let Some(addr) = &self.address {
            return Ok(addr.clone());
        }
        let der = self
            .vault
            .as_ref()
            .expect("address is only requested while unlocked")
            .keypair
            .public_key_der()?;
        let addr = ledger_crypto::address_from_public_key_der(&der);
        self.address = Some(addr.clone());
        Ok(addr)
    }

    pub fn get_balance(&self) -> Result<f64, WalletError> {
        Ok(self.vault.as_ref().ok_or(WalletError::Locked)?.balance())
    }

    pub fn get_wallet_name(&self) -> Option<String> {
        self.vault
            .as_ref()?
            .get_data("name")
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    pub fn get_tags(&self) -> Vec<String> {
        self.vault
            .as_ref()
            .and_then(|v| v.get_data("tags"))
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default()
    }

    pub fn set_data(&mut self, key: impl Into<String>, value: Value) -> Result<(), WalletError> {
        self.vault.as_mut().ok_or(WalletError::Locked)?.set_data(key, value);
        Ok(())
    }

    pub fn get_data(&self, key: &str) -> Result<Option<Value>, WalletError> {
        Ok(self.vault.as_ref().ok_or(WalletError::Locked)?.get_data(key).cloned())
    }

    pub fn public_key_der(&self) -> Result<Vec<u8>, WalletError> {
        Ok(self.vault.as_ref().ok_or(WalletError::Locked)?.keypair.public_key_der()?)
    }

    /// Fails if encrypted.
    pub fn keypair(&self) -> Result<&EcKeyPair, WalletError> {
        Ok(&self.vault.as_ref().ok_or(WalletError::Locked)?.keypair)
    }

    pub fn is_locked(&self) -> bool {
        self.encrypted
    }

    pub fn lock(&mut self, passphrase: &str) -> Result<(), WalletError> {
        let vault = self.vault.take().ok_or(WalletError::AlreadyUnlocked)?;
        let snapshot = vault.to_snapshot()?;
        let plaintext = serde_json::to_vec(&snapshot).map_err(|e| WalletError::CorruptVault(e.to_string()))?;
        let sealed = ledger_crypto::vault_seal(passphrase.as_bytes(), &plaintext, self.scrypt_n)?;
        self.ciphertext = Some(sealed);
        self.encrypted = true;
        Ok(())
    }

    pub fn unlock(&mut self, passphrase: &str) -> Result<(), WalletError> {
        let ciphertext = self.ciphertext.clone().ok_or(WalletError::Locked)?;
        let plaintext = ledger_crypto::vault_open(passphrase.as_bytes(), &ciphertext, self.scrypt_n)?;
        let snapshot: VaultSnapshot =
            serde_json::from_slice(&plaintext).map_err(|e| WalletError::CorruptVault(e.to_string()))?;
        self.vault = Some(Vault::from_snapshot(snapshot)?);
        self.ciphertext = None;
        self.encrypted = false;
        Ok(())
    }

    /// Lock, then persist to `store`.
    pub fn close(&mut self, passphrase: &str, store: &Store) -> Result<(), WalletError> {
        let address = self.get_address()?;
        self.lock(passphrase)?;
        store.set(&StoreKey::Wallet(address.clone()), &self.to_persisted(&address))?;
        info!(%address, "wallet closed and persisted");
        Ok(())
    }

    /// Builds, signs, and hands a transaction to `pool`. The wallet's own
    /// recorded balance is debited immediately (amount + fee for a Bank
    /// send, fee alone otherwise) — an optimistic local view that the
    /// Chain Engine's own balance query does not depend on.
    pub fn send_transaction(
        &mut self,
        to: impl Into<String>,
        variant: TransactionVariant,
        fee: f64,
        now: Timestamp,
        pool: &dyn PendingPool,
    ) -> Result<Transaction, WalletError> {
        if fee < 0.0 {
            return Err(WalletError::InsufficientFunds { balance: self.get_balance()?, amount: 0.0, fee });
        }
        let amount = match &variant {
            TransactionVariant::Bank { amount } => *amount,
            _ => 0.0,
        };
        let balance = self.get_balance()?;
        if balance < amount + fee {
            return Err(WalletError::InsufficientFunds { balance, amount, fee });
        }

        let from = self.get_address()?;
        let to = to.into();
        let mut tx = Transaction {
            id: String::new(),
            version: ledger_core::constants::PROTOCOL_VERSION.to_string(),
            from: from.clone(),
            to,
            fee,
            signature: Vec::new(),
            status: TransactionStatus::Pending,
            created_at: now,
            validated_at: None,
            variant,
        };
        tx.id = derive_transaction_id(&tx.canonical_body(), &tx.from, &tx.to);
        let digest = tx.signing_digest();
        tx.signature = ledger_crypto::sign(self.keypair()?, &digest);

        self.set_data("balance", Value::from(balance - amount - fee))?;
        pool.add_transaction(tx.clone());
        Ok(tx)
    }

    /// Load from `store` and unlock.
    pub fn open(address: &str, passphrase: &str, store: &Store) -> Result<Self, WalletError> {
        let persisted: PersistedWallet = store.get(&StoreKey::Wallet(address.to_string()))?;
        let mut wallet = Self::from_persisted(persisted);
        wallet.unlock(passphrase)?;
        Ok(wallet)
    }

    fn to_persisted(&self, address: &str) -> PersistedWallet {
        PersistedWallet {
            id: self.id,
            address: address.to_string(),
            encrypted: true,
            salt_size: VAULT_SALT_LEN,
            nonce_size: VAULT_NONCE_LEN,
            ciphertext_hex: self.ciphertext.as_ref().map(hex::encode),
        }
    }

    fn from_persisted(persisted: PersistedWallet) -> Self {
        Self {
            id: persisted.id,
            address: Some(persisted.address),
            encrypted: persisted.encrypted,
            ciphertext: persisted.ciphertext_hex.and_then(|h| hex::decode(h).ok()),
            vault: None,
            scrypt_n: SCRYPT_N_PRODUCTION,
        }
    }
}
