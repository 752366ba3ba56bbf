use std::{collections::BTreeMap, fs::File, path::Path};

use serde::{Deserialize, Serialize};

use crate::{block_hash::BlockHash, error::Error};

use super::{ChainSource, RuntimeState};

/// A recorded chain history read from a JSON document:
///
/// ```json
/// {
///   "blocks": { "29231": "0x…" },
///   "runtimes": { "0x…": { "spec_version": "1", "pallets": ["System"] } }
/// }
/// ```
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureChain {
    #[serde(default)]
    blocks: BTreeMap<u64, BlockHash>,
    #[serde(default)]
    runtimes: BTreeMap<BlockHash, RuntimeState>,
}

impl FixtureChain {
    pub fn open(path: &Path) -> Result<Self, Error> {
        log::info!("loading chain fixture from {:?}", path);
        let chain: FixtureChain =
            serde_json::from_reader(File::options().read(true).open(path)?)?;
        log::debug!(
            "fixture has {} blocks and {} runtimes",
            chain.blocks.len(),
            chain.runtimes.len()
        );
        Ok(chain)
    }
}

impl ChainSource for FixtureChain {
    type Error = Error;

    fn block_hash(&self, number: u64) -> Result<Option<BlockHash>, Self::Error> {
        Ok(self.blocks.get(&number).copied())
    }

    fn runtime_at(&self, hash: BlockHash) -> Result<Option<RuntimeState>, Self::Error> {
        Ok(self.runtimes.get(&hash).cloned())
    }
}

#[test]
fn test_fixture_chain_open() {
    use std::io::Write;

    let hash = "0x91b171bb158e2d3848fa23a9f1c25182fb8e20313b2c1eb49219da7a70ce90c3";
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("chain.json");
    let mut f = File::create(&path).unwrap();
    write!(
        f,
        r#"{{
            "blocks": {{ "29231": "{hash}" }},
            "runtimes": {{ "{hash}": {{ "spec_version": "1", "pallets": ["System", "Babe"] }} }}
        }}"#
    )
    .unwrap();

    let chain = FixtureChain::open(&path).unwrap();
    let resolved = chain.block_hash(29231).unwrap().unwrap();
    assert_eq!(resolved.to_string(), hash);
    assert_eq!(chain.block_hash(1).unwrap(), None);
    let state = chain.runtime_at(resolved).unwrap().unwrap();
    assert_eq!(state.pallets, vec!["System", "Babe"]);
}

#[test]
fn test_fixture_chain_rejects_bad_hash() {
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("chain.json");
    std::fs::write(&path, r#"{ "blocks": { "1": "0x1234" } }"#).unwrap();
    assert!(matches!(FixtureChain::open(&path), Err(Error::Serde(_))));
}

#[test]
fn test_fixture_chain_missing_file() {
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("nope.json");
    assert!(matches!(FixtureChain::open(&path), Err(Error::IO(_))));
}
