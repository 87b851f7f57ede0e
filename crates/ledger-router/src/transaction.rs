use std::fmt;

use ledger_core::{derive_transaction_id, TransactionStatus};
use serde::{Deserialize, Serialize};

/// The two protocols the router accepts. Distinct from the chain's richer
/// `TransactionVariant` tag set (C4) — the router only ever sees an opaque
/// payload string, never a typed one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    Bank,
    Message,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Bank => "BANK",
            Protocol::Message => "MESSAGE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BANK" => Some(Protocol::Bank),
            "MESSAGE" => Some(Protocol::Message),
            _ => None,
        }
    }

    pub const ALL: [Protocol; 2] = [Protocol::Bank, Protocol::Message];
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transaction as it lives inside the router: an opaque `data` payload
/// plus sender/recipient, with its own status lifecycle. Never touches a
/// wallet balance directly — that's the Chain Engine's concern.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolTransaction {
    pub id: String,
    pub protocol: Protocol,
    pub data: String,
    pub sender: String,
    pub recipient: String,
    pub status: TransactionStatus,
    pub created_at: i64,
    pub validated_at: Option<i64>,
}

impl ProtocolTransaction {
    pub fn new(protocol: Protocol, data: String, sender: String, recipient: String, now: i64) -> Self {
        let id = derive_transaction_id(data.as_bytes(), &sender, &recipient);
        Self {
            id,
            protocol,
            data,
            sender,
            recipient,
            status: TransactionStatus::Pending,
            created_at: now,
            validated_at: None,
        }
    }
}

/// An internal commitment batching validated protocol transactions; not a
/// chain block. `transactions` holds this crate's `ProtocolTransaction`,
/// not the chain engine's `Transaction` envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RollupBlock {
    pub id: String,
    pub protocol: String,
    pub transactions: Vec<ProtocolTransaction>,
    pub merkle_root: String,
    pub created_at: i64,
    pub block_number: u64,
}
