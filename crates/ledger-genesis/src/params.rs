use ledger_core::constants::{
    ALLOW_NEW_TOKENS, BLOCK_TIME_SECS, DEV_REWARD_PCT, FUND_WALLET_AMOUNT, MINER_REWARD_PCT,
    MIN_TRANSACTION_FEE, POW_MIN_DIFFICULTY, TOKEN_COUNT, TOKEN_PRICE, TRANSACTION_FEE,
};

/// Chain parameters carried by the genesis Coinbase transaction. Defaults
/// match the configuration defaults; a node may override any of them at
/// first run.
#[derive(Clone, Debug)]
pub struct GenesisParams {
    pub name: String,
    pub symbol: String,
    pub block_time_secs: u64,
    pub transaction_fee: f64,
    pub min_transaction_fee: f64,
    pub miner_reward_pct: f64,
    pub dev_reward_pct: f64,
    pub token_count: u64,
    pub token_price: f64,
    pub allow_new_tokens: bool,
    pub fund_wallet_amount: f64,
    /// Reduce the dev/miner wallets' scrypt work factor. Production nodes
    /// must leave this `false`; test harnesses set it to keep genesis fast.
    pub test_kdf: bool,
}

impl Default for GenesisParams {
    fn default() -> Self {
        Self {
            name: "ledgercraft".to_string(),
            symbol: "LDG".to_string(),
            block_time_secs: BLOCK_TIME_SECS,
            transaction_fee: TRANSACTION_FEE,
            min_transaction_fee: MIN_TRANSACTION_FEE,
            miner_reward_pct: MINER_REWARD_PCT,
            dev_reward_pct: DEV_REWARD_PCT,
            token_count: TOKEN_COUNT,
            token_price: TOKEN_PRICE,
            allow_new_tokens: ALLOW_NEW_TOKENS,
            fund_wallet_amount: FUND_WALLET_AMOUNT,
            test_kdf: false,
        }
    }
}

/// Genesis always mines at the minimum difficulty, regardless of the
/// chain's steady-state `difficulty` default.
pub const GENESIS_DIFFICULTY: u8 = POW_MIN_DIFFICULTY;
