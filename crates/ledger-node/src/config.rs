use std::path::PathBuf;

use ledger_core::constants::{
    ALLOW_NEW_TOKENS, API_HOST, DIFFICULTY, FUND_WALLET_AMOUNT, MAX_BLOCK_SIZE_BYTES,
    MINER_REWARD_PCT, DEV_REWARD_PCT, MIN_TRANSACTION_FEE, P2P_HOST, TOKEN_COUNT, TOKEN_PRICE,
    TRANSACTION_FEE,
};

use crate::error::NodeError;

/// The recognised environment-variable surface from spec §6, read once at
/// startup. CLI flags (see `main.rs`) override these; these override the
/// constants-table defaults.
#[derive(Clone, Debug)]
pub struct Config {
    pub name: String,
    pub symbol: String,
    pub block_time_secs: u64,
    pub difficulty: u8,
    pub transaction_fee: f64,
    pub min_transaction_fee: f64,
    pub miner_reward_pct: f64,
    pub miner_address: Option<String>,
    pub dev_reward_pct: f64,
    pub dev_address: Option<String>,
    pub api_host: String,
    pub p2p_host: String,
    pub enable_api: bool,
    pub fund_wallet_amount: f64,
    pub token_count: u64,
    pub token_price: f64,
    pub allow_new_tokens: bool,
    pub data_path: PathBuf,
    pub max_block_size: u64,
    pub gmail_email: Option<String>,
    pub gmail_password: Option<String>,
    pub domain: Option<String>,
    pub testing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "ledgercraft".to_string(),
            symbol: "LDG".to_string(),
            block_time_secs: ledger_core::constants::BLOCK_TIME_SECS,
            difficulty: DIFFICULTY,
            transaction_fee: TRANSACTION_FEE,
            min_transaction_fee: MIN_TRANSACTION_FEE,
            miner_reward_pct: MINER_REWARD_PCT,
            miner_address: None,
            dev_reward_pct: DEV_REWARD_PCT,
            dev_address: None,
            api_host: API_HOST.to_string(),
            p2p_host: P2P_HOST.to_string(),
            enable_api: true,
            fund_wallet_amount: FUND_WALLET_AMOUNT,
            token_count: TOKEN_COUNT,
            token_price: TOKEN_PRICE,
            allow_new_tokens: ALLOW_NEW_TOKENS,
            data_path: PathBuf::from("./data"),
            max_block_size: MAX_BLOCK_SIZE_BYTES,
            gmail_email: None,
            gmail_password: None,
            domain: None,
            testing: false,
        }
    }
}

impl Config {
    /// Loads `ENV_FILE` (if set) into the process environment as plain
    /// `KEY=VALUE` lines, then reads the rest of the recognised set over
    /// the constants-table defaults.
    pub fn from_env() -> Self {
        if let Ok(path) = std::env::var("ENV_FILE") {
            load_env_file(&path);
        }

        let mut cfg = Config::default();
        env_string(&mut cfg.name, "BLOCKCHAIN_NAME");
        env_string(&mut cfg.symbol, "BLOCKCHAIN_SYMBOL");
        env_parsed(&mut cfg.block_time_secs, "BLOCK_TIME");
        env_parsed(&mut cfg.difficulty, "DIFFICULTY");
        env_parsed(&mut cfg.transaction_fee, "TRANSACTION_FEE");
        env_parsed(&mut cfg.min_transaction_fee, "MIN_TRANSACTION_FEE");
        env_parsed(&mut cfg.miner_reward_pct, "MINER_REWARD_PCT");
        cfg.miner_address = std::env::var("MINER_ADDRESS").ok().or(cfg.miner_address);
        env_parsed(&mut cfg.dev_reward_pct, "DEV_REWARD_PCT");
        cfg.dev_address = std::env::var("DEV_ADDRESS").ok().or(cfg.dev_address);
        env_string(&mut cfg.api_host, "API_HOSTNAME");
        env_string(&mut cfg.p2p_host, "P2P_HOSTNAME");
        env_parsed(&mut cfg.enable_api, "ENABLE_API");
        env_parsed(&mut cfg.fund_wallet_amount, "FUND_WALLET_AMOUNT");
        env_parsed(&mut cfg.token_count, "TOKEN_COUNT");
        env_parsed(&mut cfg.token_price, "TOKEN_PRICE");
        env_parsed(&mut cfg.allow_new_tokens, "ALLOW_NEW_TOKENS");
        if let Ok(v) = std::env::var("DATA_PATH") {
            cfg.data_path = PathBuf::from(v);
        }
        env_parsed(&mut cfg.max_block_size, "MAX_BLOCK_SIZE");
        cfg.gmail_email = std::env::var("GMAIL_EMAIL").ok().or(cfg.gmail_email);
        cfg.gmail_password = std::env::var("GMAIL_PASSWORD").ok().or(cfg.gmail_password);
        cfg.domain = std::env::var("DOMAIN").ok().or(cfg.domain);
        env_parsed(&mut cfg.testing, "TESTING");
        cfg
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        if self.difficulty < 1 {
            return Err(NodeError::InvalidConfig("difficulty must be at least 1".to_string()));
        }
        if self.block_time_secs == 0 {
            return Err(NodeError::InvalidConfig("block_time_secs must be greater than 0".to_string()));
        }
        Ok(())
    }
}

fn env_string(target: &mut String, key: &str) {
    if let Ok(v) = std::env::var(key) {
        *target = v;
    }
}

fn env_parsed<T: std::str::FromStr>(target: &mut T, key: &str) {
    if let Ok(v) = std::env::var(key) {
        if let Ok(parsed) = v.parse() {
            *target = parsed;
        }
    }
}

fn load_env_file(path: &str) {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            if std::env::var(key).is_err() {
                std::env::set_var(key.trim(), value.trim());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_constants_table() {
        let cfg = Config::default();
        assert_eq!(cfg.difficulty, DIFFICULTY);
        assert_eq!(cfg.token_count, TOKEN_COUNT);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_difficulty_is_rejected() {
        let mut cfg = Config::default();
        cfg.difficulty = 0;
        assert!(cfg.validate().is_err());
    }
}
