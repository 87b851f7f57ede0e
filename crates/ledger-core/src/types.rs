use serde::{Deserialize, Serialize};
use std::fmt;

/// A token amount. Carried as a float to match the reference node's
/// decimal-fee arithmetic (e.g. `0.05` minimum fees); callers that need
/// integer supply counts (`tokenCount`) still fit comfortably.
pub type Amount = f64;

/// Unix timestamp, seconds, UTC.
pub type Timestamp = i64;

/// Monotonically assigned block index.
pub type BlockIndex = u64;

// ── PUID ─────────────────────────────────────────────────────────────────────

/// Composite identifier `(organizationID, appID, userID, assetID)`.
///
/// Stable key for wallets and accounts; never used as a transaction ID.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Puid {
    pub organization_id: i64,
    pub app_id: i64,
    pub user_id: i64,
    pub asset_id: i64,
}

impl Puid {
    pub const ZERO: Puid = Puid {
        organization_id: 0,
        app_id: 0,
        user_id: 0,
        asset_id: 0,
    };

    pub fn new(organization_id: i64, app_id: i64, user_id: i64, asset_id: i64) -> Self {
        Self {
            organization_id,
            app_id,
            user_id,
            asset_id,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Big-endian 32-byte encoding: four 8-byte signed integers in field order.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[0..8].copy_from_slice(&self.organization_id.to_be_bytes());
        out[8..16].copy_from_slice(&self.app_id.to_be_bytes());
        out[16..24].copy_from_slice(&self.user_id.to_be_bytes());
        out[24..32].copy_from_slice(&self.asset_id.to_be_bytes());
        out
    }

    pub fn from_bytes(b: &[u8; 32]) -> Self {
        Self {
            organization_id: i64::from_be_bytes(b[0..8].try_into().unwrap()),
            app_id: i64::from_be_bytes(b[8..16].try_into().unwrap()),
            user_id: i64::from_be_bytes(b[16..24].try_into().unwrap()),
            asset_id: i64::from_be_bytes(b[24..32].try_into().unwrap()),
        }
    }

    /// Colon-joined decimal string form, e.g. `"1:2:3:4"`.
    pub fn to_colon_string(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.organization_id, self.app_id, self.user_id, self.asset_id
        )
    }

    pub fn from_colon_string(s: &str) -> Option<Self> {
        let mut parts = s.split(':');
        let organization_id = parts.next()?.parse().ok()?;
        let app_id = parts.next()?.parse().ok()?;
        let user_id = parts.next()?.parse().ok()?;
        let asset_id = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            organization_id,
            app_id,
            user_id,
            asset_id,
        })
    }

    /// Base64 alternative string form.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(self.to_bytes())
    }

    pub fn from_base64(s: &str) -> Option<Self> {
        use base64::Engine;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(s)
            .ok()?;
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Some(Self::from_bytes(&arr))
    }
}

impl fmt::Display for Puid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_colon_string())
    }
}

impl fmt::Debug for Puid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Puid({})", self.to_colon_string())
    }
}

// ── TxId / BlockHash ─────────────────────────────────────────────────────────

/// Hex-encoded SHA-256 digest used for transaction IDs, transaction hashes,
/// and block hashes alike.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }

    /// Number of leading hexadecimal `'0'` characters.
    pub fn leading_hex_zeros(&self) -> usize {
        self.to_hex().chars().take_while(|c| *c == '0').count()
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({}…)", &self.to_hex()[..16])
    }
}
