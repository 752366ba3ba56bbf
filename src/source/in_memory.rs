use std::{collections::BTreeMap, convert::Infallible};

use crate::block_hash::BlockHash;

use super::{ChainSource, RuntimeState};

/// A chain held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChain {
    blocks: BTreeMap<u64, BlockHash>,
    runtimes: BTreeMap<BlockHash, RuntimeState>,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `number` as resolving to `hash`.
    pub fn insert_block(&mut self, number: u64, hash: BlockHash) {
        self.blocks.insert(number, hash);
    }

    /// Records the runtime readable at `hash`.
    pub fn insert_runtime(&mut self, hash: BlockHash, state: RuntimeState) {
        self.runtimes.insert(hash, state);
    }

    /// Records both the block and its runtime in one go.
    pub fn insert_upgrade<S: Into<String>>(
        &mut self,
        number: u64,
        hash: BlockHash,
        spec_version: &str,
        pallets: impl IntoIterator<Item = S>,
    ) {
        self.insert_block(number, hash);
        self.insert_runtime(
            hash,
            RuntimeState {
                spec_version: String::from(spec_version),
                pallets: pallets.into_iter().map(Into::into).collect(),
            },
        );
    }
}

impl ChainSource for InMemoryChain {
    type Error = Infallible;

    fn block_hash(&self, number: u64) -> Result<Option<BlockHash>, Self::Error> {
        Ok(self.blocks.get(&number).copied())
    }

    fn runtime_at(&self, hash: BlockHash) -> Result<Option<RuntimeState>, Self::Error> {
        Ok(self.runtimes.get(&hash).cloned())
    }
}

#[test]
fn test_in_memory_chain() {
    let mut chain = InMemoryChain::new();
    let hash = BlockHash::from([1u8; 32]);
    chain.insert_upgrade(29231, hash, "1", ["System", "Babe"]);
    assert_eq!(chain.block_hash(29231).unwrap(), Some(hash));
    assert_eq!(chain.block_hash(29232).unwrap(), None);
    let state = chain.runtime_at(hash).unwrap().unwrap();
    assert_eq!(state.spec_version, "1");
    assert_eq!(state.pallets, vec!["System", "Babe"]);
    assert_eq!(chain.runtime_at(BlockHash::from([2u8; 32])).unwrap(), None);
}
