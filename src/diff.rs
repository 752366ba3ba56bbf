use std::collections::BTreeSet;

use serde::Serialize;

use crate::snapshot::SnapshotSeries;

/// How the pallet set changed between two consecutive runtime versions.
///
/// Names are held in [`BTreeSet`]s so every listing comes out sorted.
#[derive(PartialEq, Eq, Debug, Clone, Serialize)]
pub struct PairwiseDiff {
    pub from_version: u64,
    pub to_version: u64,
    /// In `from_version` but gone in `to_version`.
    pub removed: BTreeSet<String>,
    /// New in `to_version`.
    pub added: BTreeSet<String>,
    /// Present in both.
    pub retained: BTreeSet<String>,
}

/// Diffs every adjacent pair in `series`. Fewer than two snapshots yields no diffs.
pub fn diff_adjacent(series: &SnapshotSeries) -> Vec<PairwiseDiff> {
    let snapshots: Vec<_> = series.iter().collect();
    snapshots
        .windows(2)
        .map(|pair| {
            let (from_version, prev) = pair[0];
            let (to_version, curr) = pair[1];
            PairwiseDiff {
                from_version,
                to_version,
                removed: prev.modules.difference(&curr.modules),
                added: curr.modules.difference(&prev.modules),
                retained: prev.modules.intersection(&curr.modules),
            }
        })
        .collect()
}

/// Pallets present in every snapshot of `series`; empty for an empty series.
pub fn persistent_modules(series: &SnapshotSeries) -> BTreeSet<String> {
    let mut snapshots = series.iter().map(|(_, s)| &s.modules);
    let first = match snapshots.next() {
        Some(modules) => modules.names().clone(),
        None => return BTreeSet::new(),
    };
    snapshots.fold(first, |acc, modules| {
        acc.into_iter().filter(|name| modules.contains(name)).collect()
    })
}

#[cfg(test)]
use crate::snapshot::snapshot;

#[cfg(test)]
fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| String::from(*s)).collect()
}

#[test]
fn test_two_versions() {
    let series = SnapshotSeries::build(vec![
        snapshot("100", 1, &["A", "B", "C"]),
        snapshot("101", 2, &["B", "C", "D"]),
    ])
    .unwrap();
    let diffs = diff_adjacent(&series);
    assert_eq!(
        diffs,
        vec![PairwiseDiff {
            from_version: 100,
            to_version: 101,
            removed: names(&["A"]),
            added: names(&["D"]),
            retained: names(&["B", "C"]),
        }]
    );
    assert_eq!(persistent_modules(&series), names(&["B", "C"]));
}

#[test]
fn test_diff_partitions_both_sides() {
    let series = SnapshotSeries::build(vec![
        snapshot("3", 3, &["Staking", "Claims", "System", "Xcm"]),
        snapshot("1", 1, &["System", "Claims", "Balances"]),
        snapshot("2", 2, &["System", "Balances", "Staking"]),
    ])
    .unwrap();
    let by_version: Vec<_> = series.iter().collect();
    for (i, diff) in diff_adjacent(&series).iter().enumerate() {
        let prev = by_version[i].1.modules.names();
        let curr = by_version[i + 1].1.modules.names();
        let from_side: BTreeSet<String> = diff.removed.union(&diff.retained).cloned().collect();
        let to_side: BTreeSet<String> = diff.added.union(&diff.retained).cloned().collect();
        assert_eq!(&from_side, prev);
        assert_eq!(&to_side, curr);
        assert!(diff.removed.is_disjoint(&diff.added));
    }
}

#[test]
fn test_persistent_excludes_middle_only_module() {
    let series = SnapshotSeries::build(vec![
        snapshot("1", 1, &["A", "B"]),
        snapshot("2", 2, &["A", "B", "X"]),
        snapshot("3", 3, &["A", "X"]),
    ])
    .unwrap();
    let diffs = diff_adjacent(&series);
    assert!(diffs[1].retained.contains("X"));
    assert_eq!(persistent_modules(&series), names(&["A"]));

    let chained = diffs
        .iter()
        .map(|d| d.retained.clone())
        .reduce(|acc, r| acc.intersection(&r).cloned().collect())
        .unwrap();
    assert_eq!(persistent_modules(&series), chained);
}

#[test]
fn test_empty_and_single() {
    let empty = SnapshotSeries::build(Vec::new()).unwrap();
    assert!(diff_adjacent(&empty).is_empty());
    assert!(persistent_modules(&empty).is_empty());

    let single = SnapshotSeries::build(vec![snapshot("5", 1, &["B", "A"])]).unwrap();
    assert!(diff_adjacent(&single).is_empty());
    assert_eq!(persistent_modules(&single), names(&["A", "B"]));
}

#[test]
fn test_diff_follows_version_order_not_input_order() {
    let series = SnapshotSeries::build(vec![
        snapshot("20", 2, &["New"]),
        snapshot("10", 1, &["Old"]),
    ])
    .unwrap();
    let diffs = diff_adjacent(&series);
    assert_eq!(diffs[0].from_version, 10);
    assert_eq!(diffs[0].removed, names(&["Old"]));
    assert_eq!(diffs[0].added, names(&["New"]));
    assert!(diffs[0].retained.is_empty());
}
