use serde::{Deserialize, Serialize};

use crate::block_hash::BlockHash;

pub mod fixture;
pub mod in_memory;

/// What a chain reports about its runtime at one block.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeState {
    /// The spec version as reported, not yet validated.
    pub spec_version: String,
    /// Names of the pallets that expose storage at this block.
    pub pallets: Vec<String>,
}

/// Read access to a chain's history.
///
/// `Ok(None)` means the chain has no answer (a pruned or future block, a stale
/// hash); `Err` means the backend itself failed.
pub trait ChainSource {
    type Error: std::fmt::Display;

    fn block_hash(&self, number: u64) -> Result<Option<BlockHash>, Self::Error>;

    fn runtime_at(&self, hash: BlockHash) -> Result<Option<RuntimeState>, Self::Error>;
}
