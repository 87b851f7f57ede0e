pub mod block;
pub mod chain_head;
pub mod constants;
pub mod error;
pub mod node;
pub mod rollup;
pub mod transaction;
pub mod tx_lookup;
pub mod types;

pub use block::*;
pub use chain_head::*;
pub use constants::*;
pub use error::CoreError;
pub use node::*;
pub use rollup::*;
pub use transaction::*;
pub use tx_lookup::*;
pub use types::*;
