use std::collections::BTreeMap;

use ledger_crypto::EcKeyPair;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A map `string -> any` (`name`, `tags`, `balance` are recognised keys),
/// plus the EC private key. On disk the key travels as PEM; in memory it is
/// reconstructed on load.
pub struct Vault {
    pub data: BTreeMap<String, Value>,
    pub keypair: EcKeyPair,
}

/// The JSON shape written inside the AEAD-sealed blob.
#[derive(Serialize, Deserialize)]
pub struct VaultSnapshot {
    pub data: BTreeMap<String, Value>,
    pub private_key_pem: String,
}

impl Vault {
    pub fn new(keypair: EcKeyPair) -> Self {
        Self {
            data: BTreeMap::new(),
            keypair,
        }
    }

    pub fn set_data(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let value = if key == "balance" {
            // balance values are normalised to 64-bit float
            value
                .as_f64()
                .or_else(|| value.as_i64().map(|v| v as f64))
                .map(|f| Value::from(f))
                .unwrap_or(value)
        } else {
            value
        };
        self.data.insert(key, value);
    }

    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn balance(&self) -> f64 {
        self.get_data("balance").and_then(|v| v.as_f64()).unwrap_or(0.0)
    }

    pub fn to_snapshot(&self) -> Result<VaultSnapshot, ledger_crypto::KeyPairError> {
        Ok(VaultSnapshot {
            data: self.data.clone(),
            private_key_pem: self.keypair.private_pem()?.to_string(),
        })
    }

    pub fn from_snapshot(snapshot: VaultSnapshot) -> Result<Self, ledger_crypto::KeyPairError> {
        let keypair = EcKeyPair::restore_from_pem(&snapshot.private_key_pem)?;
        Ok(Self {
            data: snapshot.data,
            keypair,
        })
    }
}
