//! The Chain Engine: pending-transaction pool, mining loop, chain
//! validation, and balance queries, all behind one mutex — exactly one
//! mining round or pool mutation runs at a time, mirroring the reference's
//! single chain-wide lock.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ledger_core::constants::MAX_NONCE;
use ledger_core::rollup::{leaf_hash, merkle_root};
use ledger_core::{
    Block, BlockHeader, ChainHead, Transaction, TxLookupEntry, TxLookupIndex,
};
use ledger_genesis::GenesisParams;
use ledger_store::{Store, StoreKey};
use tracing::{info, warn};

use crate::balance::balance_of;
use crate::difficulty::retarget;
use crate::error::ChainError;

struct ChainState {
    blocks: Vec<Block>,
    pending: VecDeque<Transaction>,
    tx_lookup: TxLookupIndex,
    chain_head: ChainHead,
}

/// Owns the entire linear chain. Constructed once per node and shared
/// behind an `Arc` with the mining loop and any API/peer handlers.
pub struct ChainEngine {
    store: Arc<Store>,
    block_time_secs: u64,
    state: Mutex<ChainState>,
}

impl ChainEngine {
    /// Loads an existing chain from `store`, or — on a fresh store — runs
    /// genesis bootstrap via `ledger_genesis::apply_genesis` and starts
    /// from the resulting single block.
    pub fn bootstrap(store: Arc<Store>, genesis_params: &GenesisParams) -> Result<Arc<Self>, ChainError> {
        let block_time_secs = genesis_params.block_time_secs;
        let state = match store.get::<ChainHead>(&StoreKey::ChainHead) {
            Ok(chain_head) => {
                let mut blocks = Vec::with_capacity((chain_head.height + 1) as usize);
                for index in 0..=chain_head.height {
                    blocks.push(store.get(&StoreKey::Block(index))?);
                }
                let tx_lookup = chain_head.to_index();
                ChainState {
                    blocks,
                    pending: VecDeque::new(),
                    tx_lookup,
                    chain_head,
                }
            }
            Err(ledger_store::StoreError::NotFound(_)) => {
                info!("no chain head on disk, running genesis bootstrap");
                let output = ledger_genesis::apply_genesis(&store, genesis_params)?;
                let chain_head: ChainHead = store.get(&StoreKey::ChainHead)?;
                let tx_lookup = chain_head.to_index();
                ChainState {
                    blocks: vec![output.block],
                    pending: VecDeque::new(),
                    tx_lookup,
                    chain_head,
                }
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Arc::new(Self {
            store,
            block_time_secs,
            state: Mutex::new(state),
        }))
    }

    /// Appends `tx` to the pending pool unless a transaction with the same
    /// id is already pending. Returns whether it was added.
    pub fn add_transaction(&self, tx: Transaction) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        if state.pending.iter().any(|p| p.id == tx.id) {
            return false;
        }
        state.pending.push_back(tx);
        true
    }

    /// Removes the first pending transaction with the given id. Returns
    /// whether one was found.
    pub fn remove_transaction(&self, id: &str) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(pos) = state.pending.iter().position(|tx| tx.id == id) {
            state.pending.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().unwrap_or_else(|p| p.into_inner()).pending.len()
    }

    pub fn height(&self) -> u64 {
        self.state.lock().unwrap_or_else(|p| p.into_inner()).chain_head.height
    }

    pub fn tip_hash(&self) -> String {
        self.state.lock().unwrap_or_else(|p| p.into_inner()).chain_head.tip_hash.clone()
    }

    pub fn difficulty(&self) -> u8 {
        self.state.lock().unwrap_or_else(|p| p.into_inner()).chain_head.difficulty
    }

    pub fn get_balance(&self, address: &str) -> f64 {
        let state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        balance_of(&state.blocks, address)
    }

    pub fn blocks_len(&self) -> usize {
        self.state.lock().unwrap_or_else(|p| p.into_inner()).blocks.len()
    }

    pub fn block_at(&self, index: u64) -> Option<Block> {
        let state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        state.blocks.get(index as usize).cloned()
    }

    /// A page of blocks, newest-last, per the `?page&limit` admin route.
    /// `page` is 1-indexed; out-of-range pages return an empty slice.
    pub fn blocks_page(&self, page: usize, limit: usize) -> Vec<Block> {
        let state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        let page = page.max(1);
        let start = (page - 1).saturating_mul(limit);
        state.blocks.iter().skip(start).take(limit).cloned().collect()
    }

    pub fn find_tx_lookup(&self, query: ledger_core::LookupQuery<'_>) -> Option<TxLookupEntry> {
        let state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        state.tx_lookup.find(query).cloned()
    }

    /// One mining round: skips if the pending pool is empty, otherwise
    /// snapshots it, mines a block at the chain's current difficulty, and
    /// on success persists the block, updates the tx-lookup FIFO, retargets
    /// difficulty for the next round, and saves the new chain head.
    ///
    /// On `MAX_NONCE` exhaustion the snapshot is returned to the front of
    /// the pending pool so no transaction is lost, and `None` is returned.
    pub fn mine_once(&self) -> Result<Option<Block>, ChainError> {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        if state.pending.is_empty() {
            return Ok(None);
        }

        let snapshot: Vec<Transaction> = state.pending.drain(..).collect();
        let now = unix_timestamp();
        let previous_hash = state.chain_head.tip_hash.clone();
        let difficulty = state.chain_head.difficulty;
        let previous_timestamp = state
            .blocks
            .last()
            .map(|b| b.header.timestamp)
            .unwrap_or(now);

        let leaves: Vec<[u8; 32]> = snapshot
            .iter()
            .map(|tx| leaf_hash(&tx.id, tx.protocol(), &tx.compute_hash().to_hex()))
            .collect();

        let mut header = BlockHeader {
            version: 1,
            previous_hash,
            timestamp: now,
            merkle_root: merkle_root(&leaves),
            difficulty,
            nonce: 0,
        };

        let Some(hash) = ledger_crypto::mine_block_header(&mut header, difficulty, MAX_NONCE) else {
            warn!(pending = snapshot.len(), "mining exhausted max nonce, requeuing pool");
            for tx in snapshot.into_iter().rev() {
                state.pending.push_front(tx);
            }
            return Ok(None);
        };

        let index = state.chain_head.height + 1;
        let block = Block {
            index,
            header,
            transactions: snapshot,
            hash,
        };
        self.store.set(&StoreKey::Block(index), &block)?;

        for tx in &block.transactions {
            state.tx_lookup.insert(TxLookupEntry {
                block_index: index,
                tx_id: tx.id.clone(),
                tx_hash: tx.compute_hash().to_hex(),
            });
        }

        let elapsed = now - previous_timestamp;
        let next_difficulty = retarget(difficulty, elapsed, self.block_time_secs);

        state.chain_head = ChainHead {
            height: index,
            tip_hash: block.hash.clone(),
            difficulty: next_difficulty,
            tx_lookup: state.tx_lookup.entries().cloned().collect(),
        };
        self.store.set(&StoreKey::ChainHead, &state.chain_head)?;

        info!(index, hash = %block.hash, difficulty = next_difficulty, "mined block");
        state.blocks.push(block.clone());
        Ok(Some(block))
    }

    /// Drives `mine_once` every `block_time_secs` until the process exits.
    pub fn spawn_mining_loop(self: &Arc<Self>) {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(engine.block_time_secs));
            loop {
                ticker.tick().await;
                if let Err(e) = engine.mine_once() {
                    warn!(error = %e, "mining round failed");
                }
            }
        });
    }

    /// Walks the chain verifying the previous-hash link, the recomputed
    /// header hash, difficulty satisfaction, and that no block's timestamp
    /// is in the future relative to now (allowing a small clock-skew
    /// tolerance).
    pub fn validate_chain(&self) -> Result<(), ChainError> {
        const CLOCK_TOLERANCE_SECS: i64 = 5;
        let state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        let now = unix_timestamp();

        for (i, block) in state.blocks.iter().enumerate() {
            if i == 0 {
                if block.index != 0 || !block.header.previous_hash.is_empty() {
                    return Err(ChainError::InvalidChain("genesis block malformed".into()));
                }
            } else {
                let previous = &state.blocks[i - 1];
                if block.header.previous_hash != previous.hash {
                    return Err(ChainError::InvalidChain(format!(
                        "block {} previous_hash does not match block {}'s hash",
                        block.index, previous.index
                    )));
                }
            }

            if block.header.hash() != block.hash {
                return Err(ChainError::InvalidChain(format!("block {} hash mismatch", block.index)));
            }
            if !block.satisfies_difficulty() {
                return Err(ChainError::InvalidChain(format!(
                    "block {} does not satisfy its declared difficulty",
                    block.index
                )));
            }
            if block.header.timestamp > now + CLOCK_TOLERANCE_SECS {
                return Err(ChainError::InvalidChain(format!("block {} timestamp is in the future", block.index)));
            }
            for tx in &block.transactions {
                if tx.fee < 0.0 {
                    return Err(ChainError::InvalidChain(format!("transaction {} has a negative fee", tx.id)));
                }
            }
        }
        Ok(())
    }
}

/// Lets `Wallet::send_transaction` reach the pool without `ledger-wallet`
/// depending on `ledger-chain` directly (that dependency already runs the
/// other way, through `ledger-genesis`).
impl ledger_wallet::PendingPool for ChainEngine {
    fn add_transaction(&self, tx: Transaction) -> bool {
        ChainEngine::add_transaction(self, tx)
    }
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

    fn params() -> GenesisParams {
        GenesisParams {
            test_kdf: true,
            ..GenesisParams::default()
        }
    }

    #[test]
    fn bootstrap_runs_genesis_on_a_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let engine = ChainEngine::bootstrap(store, &params()).unwrap();
        assert_eq!(engine.height(), 0);
        assert_eq!(engine.pending_len(), 0);
        engine.validate_chain().unwrap();
    }

    #[test]
    fn bootstrap_loads_existing_chain_without_rerunning_genesis() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let first = ChainEngine::bootstrap(Arc::clone(&store), &params()).unwrap();
        let tip = first.tip_hash();

        let second = ChainEngine::bootstrap(store, &params()).unwrap();
        assert_eq!(second.height(), 0);
        assert_eq!(second.tip_hash(), tip);
    }

    #[test]
    fn add_transaction_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let engine = ChainEngine::bootstrap(store, &params()).unwrap();

        let tx = sample_tx("a");
        assert!(engine.add_transaction(tx.clone()));
        assert!(!engine.add_transaction(tx));
        assert_eq!(engine.pending_len(), 1);
    }

    #[test]
    fn remove_transaction_drops_a_pending_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let engine = ChainEngine::bootstrap(store, &params()).unwrap();

        let tx = sample_tx("a");
        engine.add_transaction(tx.clone());
        assert!(engine.remove_transaction(&tx.id));
        assert_eq!(engine.pending_len(), 0);
        assert!(!engine.remove_transaction(&tx.id));
    }

    #[test]
    fn mine_once_is_a_no_op_on_an_empty_pool() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let engine = ChainEngine::bootstrap(store, &params()).unwrap();
        assert!(engine.mine_once().unwrap().is_none());
        assert_eq!(engine.height(), 0);
    }

    #[test]
    fn mine_once_produces_a_block_satisfying_difficulty_and_clears_the_pool() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let mut p = params();
        p.block_time_secs = 5;
        let engine = ChainEngine::bootstrap(store, &p).unwrap();

        engine.add_transaction(sample_tx("a"));
        let block = engine.mine_once().unwrap().expect("pool was non-empty");

        assert_eq!(block.index, 1);
        assert!(block.satisfies_difficulty());
        assert_eq!(engine.pending_len(), 0);
        assert_eq!(engine.height(), 1);
        engine.validate_chain().unwrap();
    }

    #[test]
    fn tampered_previous_hash_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let engine = ChainEngine::bootstrap(store, &params()).unwrap();
        engine.add_transaction(sample_tx("a"));
        engine.mine_once().unwrap();

        {
            let mut state = engine.state.lock().unwrap();
            state.blocks[1].header.previous_hash = "tampered".to_string();
        }
        assert!(engine.validate_chain().is_err());
    }

    fn sample_tx(seed: &str) -> Transaction {
        use ledger_core::{TransactionStatus, TransactionVariant};
        Transaction {
            id: format!("tx-{seed}"),
            version: "1.0".into(),
            from: "dev".into(),
            to: "miner".into(),
            fee: 0.01,
            signature: Vec::new(),
            status: TransactionStatus::Pending,
            created_at: 0,
            validated_at: None,
            variant: TransactionVariant::Bank { amount: 1.0 },
        }
    }
}
