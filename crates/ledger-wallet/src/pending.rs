use ledger_core::Transaction;

/// The pending-pool half of the Chain Engine, as seen from a wallet.
/// Defined here (rather than depending on `ledger-chain` directly) because
/// the dependency already runs the other way — `ledger-chain` depends on
/// `ledger-genesis` which depends on `ledger-wallet` — so a wallet can
/// only ever see the pool through a trait it owns, implemented elsewhere.
pub trait PendingPool {
    fn add_transaction(&self, tx: Transaction) -> bool;
}
