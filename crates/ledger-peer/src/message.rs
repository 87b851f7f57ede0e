use ledger_core::Transaction;
use serde::{Deserialize, Serialize};

use crate::registry::NodeRecord;

/// The five inbound actions `ProcessP2PTransaction` dispatches on. Carried
/// as a plain JSON POST body over whichever `PeerTransport` is wired in,
/// standing in for the teacher's libp2p gossip frames. `register`'s
/// rebroadcast to the rest of the network reuses this same `Register`
/// variant, carrying the new node's record onward.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PeerMessage {
    Validate {
        transaction: Transaction,
        #[serde(with = "hex_bytes")]
        sender_public_key_der: Vec<u8>,
    },
    Status {
        id: String,
    },
    Add {
        transaction: Transaction,
    },
    Remove {
        id: String,
    },
    Register {
        node: NodeRecord,
    },
}

mod hex_bytes {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

impl PeerMessage {
    pub fn action(&self) -> &'static str {
        match self {
            PeerMessage::Validate { .. } => "validate",
            PeerMessage::Status { .. } => "status",
            PeerMessage::Add { .. } => "add",
            PeerMessage::Remove { .. } => "remove",
            PeerMessage::Register { .. } => "register",
        }
    }
}

/// Reply to a `PeerMessage`, acknowledging receipt or carrying the result
/// of a `status` query.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeerAck {
    pub ok: bool,
    pub detail: Option<String>,
}

impl PeerAck {
    pub fn ok() -> Self {
        Self { ok: true, detail: None }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self { ok: false, detail: Some(detail.into()) }
    }
}
