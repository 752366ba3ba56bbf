use std::thread;

use crate::{
    block_hash::BlockHash,
    error::Error,
    snapshot::RuntimeSnapshot,
    source::ChainSource,
    upgrades::UpgradePoint,
};

/// Takes one [`RuntimeSnapshot`] per upgrade point, in list order.
///
/// Block hashes are resolved concurrently and reassembled in list order. The
/// runtimes are then read one at a time, and `on_snapshot` sees each snapshot
/// as soon as it is read. The first failure aborts the whole collection.
pub fn collect<S, F>(
    source: &S,
    upgrades: &[UpgradePoint],
    mut on_snapshot: F,
) -> Result<Vec<RuntimeSnapshot>, Error>
where
    S: ChainSource + Sync,
    S::Error: Send,
    F: FnMut(&RuntimeSnapshot),
{
    log::info!("resolving {} upgrade blocks", upgrades.len());
    let hashes = resolve_all(source, upgrades)?;

    let mut snapshots = Vec::with_capacity(upgrades.len());
    for (upgrade, hash) in upgrades.iter().zip(hashes) {
        let snapshot = snapshot_at(source, upgrade, hash)?;
        if let Some(expected) = label_mismatch(upgrade, &snapshot.version) {
            log::warn!(
                "block {} is labelled as version {} but reports {}",
                upgrade.block,
                expected,
                snapshot.version
            );
        }
        on_snapshot(&snapshot);
        snapshots.push(snapshot);
    }
    Ok(snapshots)
}

/// The version `upgrade` is labelled with, if it disagrees with `version`.
fn label_mismatch(upgrade: &UpgradePoint, version: &str) -> Option<u64> {
    upgrade
        .expected_version()
        .filter(|expected| expected.to_string() != version)
}

fn resolve_all<S>(source: &S, upgrades: &[UpgradePoint]) -> Result<Vec<BlockHash>, Error>
where
    S: ChainSource + Sync,
    S::Error: Send,
{
    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = upgrades
            .iter()
            .map(|upgrade| scope.spawn(move || source.block_hash(upgrade.block)))
            .collect();
        handles.into_iter().map(|handle| handle.join()).collect()
    });

    upgrades
        .iter()
        .zip(results)
        .map(|(upgrade, result)| {
            let block = upgrade.block;
            match result {
                Ok(Ok(Some(hash))) => {
                    log::debug!("block {} resolved to {}", block, hash);
                    Ok(hash)
                }
                Ok(Ok(None)) => Err(Error::Resolution {
                    block,
                    reason: String::from("no block at this height"),
                }),
                Ok(Err(err)) => Err(Error::Resolution {
                    block,
                    reason: err.to_string(),
                }),
                Err(_) => Err(Error::Resolution {
                    block,
                    reason: String::from("lookup panicked"),
                }),
            }
        })
        .collect()
}

fn snapshot_at<S: ChainSource>(
    source: &S,
    upgrade: &UpgradePoint,
    hash: BlockHash,
) -> Result<RuntimeSnapshot, Error> {
    let query_error = |reason: String| Error::Query {
        block: upgrade.block,
        hash,
        reason,
    };
    let state = source
        .runtime_at(hash)
        .map_err(|err| query_error(err.to_string()))?
        .ok_or_else(|| query_error(String::from("no runtime state at this block")))?;
    Ok(RuntimeSnapshot {
        version: state.spec_version,
        block: upgrade.block,
        block_hash: hash,
        modules: state.pallets.into_iter().collect(),
    })
}

#[cfg(test)]
use crate::source::{in_memory::InMemoryChain, RuntimeState};

#[cfg(test)]
fn chain() -> InMemoryChain {
    let mut chain = InMemoryChain::new();
    chain.insert_upgrade(10, BlockHash::from([1u8; 32]), "2", ["System", "Staking"]);
    chain.insert_upgrade(20, BlockHash::from([2u8; 32]), "1", ["System"]);
    chain.insert_upgrade(30, BlockHash::from([3u8; 32]), "3", ["System", "Xcm"]);
    chain
}

#[test]
fn test_collect_keeps_list_order() {
    let upgrades = vec![
        UpgradePoint::new(30, 3),
        UpgradePoint::new(10, 2),
        UpgradePoint::new(20, 1),
    ];
    let mut seen = Vec::new();
    let snapshots = collect(&chain(), &upgrades, |s| seen.push(s.block)).unwrap();
    assert_eq!(seen, vec![30, 10, 20]);
    let versions: Vec<&str> = snapshots.iter().map(|s| s.version.as_str()).collect();
    assert_eq!(versions, vec!["3", "2", "1"]);
    assert_eq!(snapshots[1].block_hash, BlockHash::from([1u8; 32]));
    assert!(snapshots[1].modules.contains("Staking"));
}

#[test]
fn test_collect_unresolvable_block() {
    let upgrades = vec![UpgradePoint::new(10, 2), UpgradePoint::new(99, 9)];
    let mut seen = 0;
    let err = collect(&chain(), &upgrades, |_| seen += 1).unwrap_err();
    assert!(matches!(err, Error::Resolution { block: 99, .. }));
    // resolution fails before any runtime is read
    assert_eq!(seen, 0);
}

#[test]
fn test_collect_missing_runtime() {
    let mut chain = chain();
    chain.insert_block(40, BlockHash::from([4u8; 32]));
    let upgrades = vec![UpgradePoint::new(10, 2), UpgradePoint::new(40, 4)];
    let mut seen = Vec::new();
    let err = collect(&chain, &upgrades, |s| seen.push(s.block)).unwrap_err();
    match err {
        Error::Query { block, hash, .. } => {
            assert_eq!(block, 40);
            assert_eq!(hash, BlockHash::from([4u8; 32]));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(seen, vec![10]);
}

#[test]
fn test_collect_passes_versions_through_unvalidated() {
    let mut chain = InMemoryChain::new();
    let hash = BlockHash::from([5u8; 32]);
    chain.insert_block(50, hash);
    chain.insert_runtime(
        hash,
        RuntimeState {
            spec_version: String::from("v2"),
            pallets: vec![String::from("System")],
        },
    );
    let snapshots = collect(&chain, &[UpgradePoint::new(50, "v2")], |_| {}).unwrap();
    assert_eq!(snapshots[0].version, "v2");
}

#[test]
fn test_collect_nothing() {
    let snapshots = collect(&chain(), &[], |_| {}).unwrap();
    assert!(snapshots.is_empty());
}

/// Wraps a chain and fails one block lookup and one runtime read.
#[cfg(test)]
struct FailingChain {
    inner: InMemoryChain,
    bad_block: Option<u64>,
    bad_hash: Option<BlockHash>,
}

#[cfg(test)]
impl ChainSource for FailingChain {
    type Error = String;

    fn block_hash(&self, number: u64) -> Result<Option<BlockHash>, Self::Error> {
        if self.bad_block == Some(number) {
            return Err(format!("rpc timeout fetching block {}", number));
        }
        Ok(self.inner.block_hash(number).unwrap_or_else(|e| match e {}))
    }

    fn runtime_at(&self, hash: BlockHash) -> Result<Option<RuntimeState>, Self::Error> {
        if self.bad_hash == Some(hash) {
            return Err(String::from("state discarded by node"));
        }
        Ok(self.inner.runtime_at(hash).unwrap_or_else(|e| match e {}))
    }
}

#[test]
fn test_collect_backend_resolution_failure() {
    let source = FailingChain {
        inner: chain(),
        bad_block: Some(20),
        bad_hash: None,
    };
    let upgrades = vec![
        UpgradePoint::new(10, 2),
        UpgradePoint::new(20, 1),
        UpgradePoint::new(30, 3),
    ];
    let mut seen = 0;
    let err = collect(&source, &upgrades, |_| seen += 1).unwrap_err();
    match err {
        Error::Resolution { block, reason } => {
            assert_eq!(block, 20);
            assert_eq!(reason, "rpc timeout fetching block 20");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(seen, 0);
}

#[test]
fn test_collect_backend_query_failure() {
    let source = FailingChain {
        inner: chain(),
        bad_block: None,
        bad_hash: Some(BlockHash::from([2u8; 32])),
    };
    let upgrades = vec![
        UpgradePoint::new(10, 2),
        UpgradePoint::new(20, 1),
        UpgradePoint::new(30, 3),
    ];
    let mut seen = Vec::new();
    let err = collect(&source, &upgrades, |s| seen.push(s.block)).unwrap_err();
    match err {
        Error::Query {
            block,
            hash,
            reason,
        } => {
            assert_eq!(block, 20);
            assert_eq!(hash, BlockHash::from([2u8; 32]));
            assert_eq!(reason, "state discarded by node");
        }
        other => panic!("unexpected error: {}", other),
    }
    // block 30 is never read once block 20 fails
    assert_eq!(seen, vec![10]);
}

#[test]
fn test_collect_label_mismatch_is_not_fatal() {
    // block 10 reports version "2"; both labels disagree with it
    let upgrades = vec![UpgradePoint::new(10, 7), UpgradePoint::new(20, "8")];
    let mut seen = Vec::new();
    let snapshots = collect(&chain(), &upgrades, |s| seen.push(s.version.clone())).unwrap();
    assert_eq!(seen, vec!["2", "1"]);
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].version, "2");

    assert_eq!(label_mismatch(&upgrades[0], "2"), Some(7));
    assert_eq!(label_mismatch(&upgrades[1], "1"), Some(8));
    assert_eq!(label_mismatch(&UpgradePoint::new(10, 2), "2"), None);
    assert_eq!(label_mismatch(&UpgradePoint::new(10, "genesis"), "2"), None);
}
