//! ─── Protocol constants ─────────────────────────────────────────────────────
//!
//! Authoritative configuration defaults (overridable by environment variable
//! and then by CLI flag — see `ledger-node`'s `Config`).

// ── Chain timing ─────────────────────────────────────────────────────────────

/// Seconds between mining ticks.
pub const BLOCK_TIME_SECS: u64 = 5;

/// Genesis PoW difficulty, in leading hex-zero characters.
pub const DIFFICULTY: u8 = 4;

pub const POW_MIN_DIFFICULTY: u8 = 1;

/// Upper bound on mining-loop nonce iterations before a round is abandoned.
pub const MAX_NONCE: u64 = 50_000_000;

// ── Fees & rewards ───────────────────────────────────────────────────────────

pub const TRANSACTION_FEE: f64 = 0.05;
pub const MIN_TRANSACTION_FEE: f64 = 0.01;
pub const MINER_REWARD_PCT: f64 = 50.0;
pub const DEV_REWARD_PCT: f64 = 50.0;

// ── Supply ───────────────────────────────────────────────────────────────────

pub const TOKEN_COUNT: u64 = 33_554_432;
pub const FUND_WALLET_AMOUNT: f64 = 100.0;
pub const TOKEN_PRICE: f64 = 0.0;
pub const ALLOW_NEW_TOKENS: bool = false;

// ── Block / rollup sizing ────────────────────────────────────────────────────

pub const MAX_BLOCK_SIZE_BYTES: u64 = 1_000_000;
pub const ROLLUP_INTERVAL_SECS: u64 = 20;

/// Nominal per-transaction validation delay in the sidechain router.
pub const VALIDATION_DELAY_MS: u64 = 100;

/// Capacity of the tx-lookup FIFO index.
pub const TX_LOOKUP_CAPACITY: usize = 65_536;

// ── Networking ───────────────────────────────────────────────────────────────

pub const API_HOST: &str = ":8100";
pub const P2P_HOST: &str = ":8101";

// ── Vault / KDF ──────────────────────────────────────────────────────────────

pub const SCRYPT_N_PRODUCTION: u32 = 1_048_576;
pub const SCRYPT_N_TEST: u32 = 16_384;
pub const SCRYPT_R: u32 = 8;
pub const SCRYPT_P: u32 = 1;
pub const SCRYPT_DK_LEN: usize = 32;
pub const VAULT_SALT_LEN: usize = 32;
pub const VAULT_NONCE_LEN: usize = 12;

// ── Passphrase policy ────────────────────────────────────────────────────────

pub const PASSPHRASE_MIN_LEN: usize = 12;
pub const PASSPHRASE_MAX_LEN: usize = 24;
pub const PASSPHRASE_MIN_CLASS_COUNT: usize = 2;
pub const PASSPHRASE_SPECIAL_CHARS: &str = "~!@#$%^&*()=+[]{}|\\/?<>";
pub const PASSPHRASE_GEN_MAX_ATTEMPTS: usize = 100;

// ── Build info ───────────────────────────────────────────────────────────────

pub const PROTOCOL_VERSION: &str = "1.0";
pub const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");
