//! Builds the genesis block from scratch: a dev wallet funded with the
//! full token supply, a miner wallet seeded with a starting balance, and
//! the single block that carries the Coinbase and Bank transactions
//! recording that allocation. This is the one place balances are set
//! directly rather than through the normal pending-pool/mining pipeline —
//! genesis transactions have no predecessor block to be mined against.

pub mod params;

pub use params::{GenesisParams, GENESIS_DIFFICULTY};

use std::time::{SystemTime, UNIX_EPOCH};

use ledger_core::constants::{DIFFICULTY, MAX_NONCE};
use ledger_core::{
    derive_transaction_id, rollup::leaf_hash, rollup::merkle_root, Block, BlockHeader, ChainHead, ChainParams,
    Puid, Transaction, TransactionStatus, TransactionVariant, TxLookupEntry,
};
use ledger_crypto::EcKeyPair;
use ledger_store::{Store, StoreKey};
use ledger_wallet::{generate_random_password, Wallet};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("wallet error: {0}")]
    Wallet(#[from] ledger_wallet::WalletError),
    #[error("store error: {0}")]
    Store(#[from] ledger_store::StoreError),
    #[error("mining exhausted max nonce before meeting genesis difficulty")]
    MiningExhausted,
}

/// Everything produced by a first-run genesis bootstrap. The dev and miner
/// wallets are returned unlocked (already also closed+persisted to
/// `store`) so the caller — normally the Chain Engine — can read their
/// addresses and balances without an extra `Wallet::open` round trip.
pub struct GenesisOutput {
    pub block: Block,
    pub dev_wallet: Wallet,
    pub miner_wallet: Wallet,
    pub dev_passphrase: String,
    pub miner_passphrase: String,
}

/// Applies the genesis allocation to `store`: creates the dev and miner
/// wallets, mints `params.token_count` to the dev wallet via a Coinbase
/// transaction, funds the miner wallet with `params.fund_wallet_amount`
/// via a Bank transaction, assembles and mines the genesis block at
/// [`GENESIS_DIFFICULTY`], and persists block, tx-lookup index, and chain
/// head. Callers are responsible for checking whether genesis has already
/// run (e.g. `store.get::<ChainHead>(&StoreKey::ChainHead)` succeeding) —
/// this function always creates fresh wallets and will not detect reruns.
pub fn apply_genesis(store: &Store, params: &GenesisParams) -> Result<GenesisOutput, GenesisError> {
    info!("applying genesis state");

    let dev_passphrase = generate_random_password();
    let miner_passphrase = generate_random_password();

    let mut dev_wallet = Wallet::new(Puid::new(0, 0, 1, 0), &dev_passphrase)?;
    let mut miner_wallet = Wallet::new(Puid::new(0, 0, 2, 0), &miner_passphrase)?;
    if params.test_kdf {
        dev_wallet = dev_wallet.with_test_kdf();
        miner_wallet = miner_wallet.with_test_kdf();
    }

    let dev_address = dev_wallet.get_address()?;
    let miner_address = miner_wallet.get_address()?;

    let now = unix_timestamp();

    let coinbase = build_coinbase(params, &dev_address, &miner_address, now, dev_wallet.keypair()?)?;
    dev_wallet.set_data("balance", serde_json::Value::from(params.token_count as f64))?;

    let bank = build_bank(
        params.fund_wallet_amount,
        params.min_transaction_fee,
        &dev_address,
        &miner_address,
        now,
        dev_wallet.keypair()?,
    )?;
    miner_wallet.set_data("balance", serde_json::Value::from(params.fund_wallet_amount))?;

    let transactions = vec![coinbase, bank];
    let leaves: Vec<[u8; 32]> = transactions
        .iter()
        .map(|tx| leaf_hash(&tx.id, tx.protocol(), &tx.compute_hash().to_hex()))
        .collect();

    let mut header = BlockHeader {
        version: 1,
        previous_hash: String::new(),
        timestamp: now,
        merkle_root: merkle_root(&leaves),
        difficulty: GENESIS_DIFFICULTY,
        nonce: 0,
    };
    let hash = ledger_crypto::mine_block_header(&mut header, GENESIS_DIFFICULTY, MAX_NONCE)
        .ok_or(GenesisError::MiningExhausted)?;

    let block = Block {
        index: 0,
        header,
        transactions: transactions.clone(),
        hash,
    };
    store.set(&StoreKey::Block(0), &block)?;
    info!(hash = %block.hash, "genesis block mined and persisted");

    let tx_lookup: Vec<TxLookupEntry> = transactions
        .iter()
        .map(|tx| TxLookupEntry {
            block_index: 0,
            tx_id: tx.id.clone(),
            tx_hash: tx.compute_hash().to_hex(),
        })
        .collect();
    let chain_head = ChainHead {
        height: 0,
        tip_hash: block.hash.clone(),
        difficulty: DIFFICULTY,
        tx_lookup,
    };
    store.set(&StoreKey::ChainHead, &chain_head)?;

    dev_wallet.close(&dev_passphrase, store)?;
    miner_wallet.close(&miner_passphrase, store)?;
    dev_wallet.unlock(&dev_passphrase)?;
    miner_wallet.unlock(&miner_passphrase)?;

    Ok(GenesisOutput {
        block,
        dev_wallet,
        miner_wallet,
        dev_passphrase,
        miner_passphrase,
    })
}

fn build_coinbase(
    params: &GenesisParams,
    dev_address: &str,
    miner_address: &str,
    now: i64,
    dev_key: &EcKeyPair,
) -> Result<Transaction, GenesisError> {
    let variant = TransactionVariant::Coinbase {
        params: ChainParams {
            name: params.name.clone(),
            symbol: params.symbol.clone(),
            block_time_secs: params.block_time_secs,
            difficulty: DIFFICULTY,
            transaction_fee: params.transaction_fee,
            min_transaction_fee: params.min_transaction_fee,
            miner_reward_pct: params.miner_reward_pct,
            dev_reward_pct: params.dev_reward_pct,
            token_count: params.token_count,
            token_price: params.token_price,
            allow_new_tokens: params.allow_new_tokens,
            dev_address: dev_address.to_string(),
            miner_address: miner_address.to_string(),
        },
    };
    sign_transaction(variant, dev_address, dev_address, 0.0, now, dev_key)
}

fn build_bank(
    amount: f64,
    fee: f64,
    from: &str,
    to: &str,
    now: i64,
    dev_key: &EcKeyPair,
) -> Result<Transaction, GenesisError> {
    let variant = TransactionVariant::Bank { amount };
    sign_transaction(variant, from, to, fee, now, dev_key)
}

fn sign_transaction(
    variant: TransactionVariant,
    from: &str,
    to: &str,
    fee: f64,
    now: i64,
    signer: &EcKeyPair,
) -> Result<Transaction, GenesisError> {
    let mut tx = Transaction {
        id: String::new(),
        version: ledger_core::constants::PROTOCOL_VERSION.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        fee,
        signature: Vec::new(),
        status: TransactionStatus::Pending,
        created_at: now,
        validated_at: None,
        variant,
    };
    tx.id = derive_transaction_id(&tx.canonical_body(), &tx.from, &tx.to);
    let digest = tx.signing_digest();
    tx.signature = ledger_crypto::sign(signer, &digest);
    Ok(tx)
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the epoch")
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_produces_single_block_with_expected_balances() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let params = GenesisParams {
            test_kdf: true,
            ..GenesisParams::default()
        };

        let output = apply_genesis(&store, &params).expect("genesis must succeed");

        assert_eq!(output.block.index, 0);
        assert_eq!(output.block.header.previous_hash, "");
        assert!(output.block.satisfies_difficulty());
        assert_eq!(output.block.transactions.len(), 2);

        assert_eq!(output.dev_wallet.get_balance().unwrap(), params.token_count as f64);
        assert_eq!(output.miner_wallet.get_balance().unwrap(), params.fund_wallet_amount);

        let coinbase_count = output
            .block
            .transactions
            .iter()
            .filter(|tx| matches!(tx.variant, TransactionVariant::Coinbase { .. }))
            .count();
        let bank_count = output
            .block
            .transactions
            .iter()
            .filter(|tx| matches!(tx.variant, TransactionVariant::Bank { .. }))
            .count();
        assert_eq!(coinbase_count, 1);
        assert_eq!(bank_count, 1);
    }

    #[test]
    fn genesis_block_is_persisted_and_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let params = GenesisParams {
            test_kdf: true,
            ..GenesisParams::default()
        };
        let output = apply_genesis(&store, &params).unwrap();

        let loaded: Block = store.get(&StoreKey::Block(0)).unwrap();
        assert_eq!(loaded.hash, output.block.hash);

        let head: ChainHead = store.get(&StoreKey::ChainHead).unwrap();
        assert_eq!(head.height, 0);
        assert_eq!(head.tip_hash, output.block.hash);
        assert_eq!(head.tx_lookup.len(), 2);
    }

    #[test]
    fn coinbase_transaction_is_signed_by_the_dev_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let params = GenesisParams {
            test_kdf: true,
            ..GenesisParams::default()
        };
        let output = apply_genesis(&store, &params).unwrap();

        let der = output.dev_wallet.public_key_der().unwrap();
        for tx in &output.block.transactions {
            let digest = tx.signing_digest();
            assert!(ledger_crypto::verify(&der, &digest, &tx.signature).is_ok());
        }
    }
}
