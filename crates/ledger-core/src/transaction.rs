use serde::{Deserialize, Serialize};

use crate::types::{Hash32, Timestamp};

/// Hex-encoded SHA-256(SPKI(publicKey)) — a wallet's address.
pub type Address = String;

// ── Status ───────────────────────────────────────────────────────────────────

/// `Pending → Validated → (Confirmed | RolledUp)`; any state may transition
/// to `Failed`. Once `Confirmed` or `RolledUp` a transaction is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Validated,
    Confirmed,
    Failed,
    RolledUp,
}

impl TransactionStatus {
    /// Whether moving from `self` to `next` is a legal status transition.
    pub fn can_transition_to(self, next: TransactionStatus) -> bool {
        use TransactionStatus::*;
        if next == Failed {
            return !matches!(self, Confirmed | RolledUp);
        }
        matches!(
            (self, next),
            (Pending, Validated) | (Validated, Confirmed) | (Validated, RolledUp)
        )
    }
}

// ── Coinbase chain parameters ────────────────────────────────────────────────

/// Parameters carried by the single genesis Coinbase transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainParams {
    pub name: String,
    pub symbol: String,
    pub block_time_secs: u64,
    pub difficulty: u8,
    pub transaction_fee: f64,
    pub min_transaction_fee: f64,
    pub miner_reward_pct: f64,
    pub dev_reward_pct: f64,
    pub token_count: u64,
    pub token_price: f64,
    pub allow_new_tokens: bool,
    pub dev_address: Address,
    pub miner_address: Address,
}

// ── Variant payloads ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "protocol")]
pub enum TransactionVariant {
    /// Exists only in the genesis block. Effect: `from.balance = tokenCount`.
    #[serde(rename = "COINBASE")]
    Coinbase { params: ChainParams },

    /// Effect: `from.balance -= amount; to.balance += amount`.
    #[serde(rename = "BANK")]
    Bank { amount: f64 },

    /// Effect: observable log only.
    #[serde(rename = "MESSAGE")]
    Message { message: String },

    /// Effect: status becomes `"processed"`.
    #[serde(rename = "PERSIST")]
    Persist { data: std::collections::BTreeMap<String, String> },

    /// Node-registration payload; used only over the peer layer.
    #[serde(rename = "CHAIN")]
    Chain { node_id: String, address: String },
}

impl TransactionVariant {
    pub fn protocol(&self) -> &'static str {
        match self {
            TransactionVariant::Coinbase { .. } => "COINBASE",
            TransactionVariant::Bank { .. } => "BANK",
            TransactionVariant::Message { .. } => "MESSAGE",
            TransactionVariant::Persist { .. } => "PERSIST",
            TransactionVariant::Chain { .. } => "CHAIN",
        }
    }
}

// ── Transaction envelope ─────────────────────────────────────────────────────

/// A fully-formed transaction: the common envelope plus a tagged variant
/// payload. `Sign`/`Verify` operate on the envelope (see `ledger-crypto`);
/// `Process` is a method of the variant (applied by the chain engine, which
/// owns wallet balances).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub version: String,
    pub from: Address,
    pub to: Address,
    pub fee: f64,
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
    pub status: TransactionStatus,
    pub created_at: Timestamp,
    pub validated_at: Option<Timestamp>,
    #[serde(flatten)]
    pub variant: TransactionVariant,
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

impl Transaction {
    /// Canonical body used for both `id` derivation (router-assigned
    /// transactions use the opaque `data` field as `payload` instead; see
    /// `RouteTransaction`) and signing, excluding `signature`.
    pub fn canonical_body(&self) -> Vec<u8> {
        #[derive(Serialize)]
        struct Body<'a> {
            version: &'a str,
            from: &'a str,
            to: &'a str,
            fee: f64,
            created_at: Timestamp,
            variant: &'a TransactionVariant,
        }
        let body = Body {
            version: &self.version,
            from: &self.from,
            to: &self.to,
            fee: self.fee,
            created_at: self.created_at,
            variant: &self.variant,
        };
        serde_json::to_vec(&body).expect("transaction body is serialisable")
    }

    /// `hex(SHA-256(canonical_serialisation_including_protocol))`.
    pub fn compute_hash(&self) -> Hash32 {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.variant.protocol().as_bytes());
        hasher.update(self.canonical_body());
        let digest: [u8; 32] = hasher.finalize().into();
        Hash32::from_bytes(digest)
    }

    pub fn protocol(&self) -> &'static str {
        self.variant.protocol()
    }

    /// Message to actually sign: `SHA-256(string(tx_without_signature))`.
    pub fn signing_digest(&self) -> [u8; 32] {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_body());
        hasher.finalize().into()
    }
}

/// `id = hex(SHA-256(payload || ":" || senderAddress || ":" || recipientAddress))`.
pub fn derive_transaction_id(payload: &[u8], sender_address: &str, recipient_address: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hasher.update(b":");
    hasher.update(sender_address.as_bytes());
    hasher.update(b":");
    hasher.update(recipient_address.as_bytes());
    hex::encode(hasher.finalize())
}
