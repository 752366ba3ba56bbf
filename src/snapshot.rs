use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{block_hash::BlockHash, error::Error, module_set::ModuleSet};

/// The pallets observed at one upgrade point.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeSnapshot {
    /// The runtime version exactly as the chain reported it.
    pub version: String,
    /// The upgrade block number this snapshot was taken for.
    pub block: u64,
    /// The hash the upgrade block resolved to.
    pub block_hash: BlockHash,
    /// Every pallet installed in the runtime at that block.
    pub modules: ModuleSet,
}

/// Snapshots ordered by ascending integer runtime version.
///
/// Built once from a complete collection and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSeries {
    entries: Vec<(u64, RuntimeSnapshot)>,
}

impl SnapshotSeries {
    /// Validates and orders `snapshots`.
    ///
    /// Every version must be an unsigned integer written without sign, padding
    /// or leading zeros, and no two snapshots may share a version.
    pub fn build(snapshots: Vec<RuntimeSnapshot>) -> Result<Self, Error> {
        let mut by_version: BTreeMap<u64, RuntimeSnapshot> = BTreeMap::new();
        for snapshot in snapshots {
            let version = parse_version(&snapshot.version).ok_or_else(|| {
                Error::MalformedVersion {
                    block: snapshot.block,
                    version: snapshot.version.clone(),
                }
            })?;
            if let Some(existing) = by_version.get(&version) {
                return Err(Error::DuplicateVersion {
                    version,
                    first: existing.block,
                    second: snapshot.block,
                });
            }
            by_version.insert(version, snapshot);
        }
        log::debug!("built series of {} runtime versions", by_version.len());
        Ok(SnapshotSeries {
            entries: by_version.into_iter().collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(version, snapshot)` in ascending version order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &RuntimeSnapshot)> {
        self.entries.iter().map(|(v, s)| (*v, s))
    }

    pub fn versions(&self) -> Vec<u64> {
        self.entries.iter().map(|(v, _)| *v).collect()
    }
}

/// Only the canonical decimal form is a version, so the raw text and the
/// ordering key always print the same.
fn parse_version(raw: &str) -> Option<u64> {
    let version: u64 = raw.parse().ok()?;
    (version.to_string() == raw).then_some(version)
}

#[cfg(test)]
pub(crate) fn snapshot(version: &str, block: u64, modules: &[&str]) -> RuntimeSnapshot {
    RuntimeSnapshot {
        version: String::from(version),
        block,
        block_hash: BlockHash::from([block as u8; 32]),
        modules: modules.iter().copied().collect(),
    }
}

#[test]
fn test_build_sorts_numerically() {
    let series = SnapshotSeries::build(vec![
        snapshot("9100", 3, &["A"]),
        snapshot("30", 2, &["A"]),
        snapshot("1000001", 4, &["A"]),
        snapshot("9", 1, &["A"]),
    ])
    .unwrap();
    assert_eq!(series.versions(), vec![9, 30, 9100, 1000001]);
    let blocks: Vec<u64> = series.iter().map(|(_, s)| s.block).collect();
    assert_eq!(blocks, vec![1, 2, 3, 4]);
}

#[test]
fn test_build_is_idempotent() {
    let input = vec![
        snapshot("2", 20, &["A", "B"]),
        snapshot("1", 10, &["A"]),
    ];
    let first = SnapshotSeries::build(input.clone()).unwrap();
    let second = SnapshotSeries::build(input).unwrap();
    assert!(first.iter().eq(second.iter()));
}

#[test]
fn test_build_rejects_malformed_version() {
    let err = SnapshotSeries::build(vec![snapshot("1", 10, &[]), snapshot("v2", 20, &[])])
        .unwrap_err();
    match err {
        Error::MalformedVersion { block, version } => {
            assert_eq!(block, 20);
            assert_eq!(version, "v2");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_build_rejects_signed_and_padded_versions() {
    for raw in ["+5", "-1", " 5", "", "5.0", "0009"] {
        let err = SnapshotSeries::build(vec![snapshot(raw, 10, &["A"])]).unwrap_err();
        assert!(
            matches!(err, Error::MalformedVersion { ref version, .. } if version == raw),
            "{:?} accepted",
            raw
        );
    }
    let series = SnapshotSeries::build(vec![snapshot("0", 10, &["A"])]).unwrap();
    assert_eq!(series.versions(), vec![0]);
}

#[test]
fn test_build_rejects_duplicate_version() {
    let err = SnapshotSeries::build(vec![snapshot("7", 10, &["A"]), snapshot("7", 20, &["B"])])
        .unwrap_err();
    assert!(matches!(
        err,
        Error::DuplicateVersion {
            version: 7,
            first: 10,
            second: 20
        }
    ));
}

#[test]
fn test_build_empty() {
    let series = SnapshotSeries::build(Vec::new()).unwrap();
    assert!(series.is_empty());
    assert_eq!(series.len(), 0);
}
