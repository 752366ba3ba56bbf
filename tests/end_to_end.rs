use std::path::Path;

use drift::{
    block_hash::BlockHash,
    collector,
    diff::persistent_modules,
    report::{progress_line, Report, DEFAULT_RETAINED_CAP},
    snapshot::SnapshotSeries,
    source::{fixture::FixtureChain, in_memory::InMemoryChain},
    upgrades::{self, UpgradePoint},
    Error,
};

fn hash(n: u8) -> BlockHash {
    BlockHash::from([n; 32])
}

#[test]
fn test_in_memory_chain_report() {
    let mut chain = InMemoryChain::new();
    chain.insert_upgrade(300, hash(3), "102", ["B", "C", "E"]);
    chain.insert_upgrade(100, hash(1), "100", ["A", "B", "C"]);
    chain.insert_upgrade(200, hash(2), "101", ["B", "C", "D"]);
    let upgrades = vec![
        UpgradePoint::new(100, 100),
        UpgradePoint::new(300, 102),
        UpgradePoint::new(200, 101),
    ];

    let mut progress = Vec::new();
    let snapshots =
        collector::collect(&chain, &upgrades, |s| progress.push(progress_line(s))).unwrap();
    assert_eq!(
        progress,
        vec![
            "Runtime 100 at block 100 has 3 pallets",
            "Runtime 102 at block 300 has 3 pallets",
            "Runtime 101 at block 200 has 3 pallets",
        ]
    );

    let series = SnapshotSeries::build(snapshots).unwrap();
    let text = Report::new(&series).render_text(DEFAULT_RETAINED_CAP);
    assert_eq!(
        text,
        "\nChanges from runtime 100 to 101:\n\
         Removed pallets (1): A\n\
         Added pallets (1): D\n\
         Retained pallets (2): B, C\n\
         \nChanges from runtime 101 to 102:\n\
         Removed pallets (1): D\n\
         Added pallets (1): E\n\
         Retained pallets (2): B, C\n\
         \nPallets present in all 3 runtime versions (2):\n\
         B, C\n"
    );
}

#[test]
fn test_duplicate_versions_abort_before_report() {
    let mut chain = InMemoryChain::new();
    chain.insert_upgrade(100, hash(1), "7", ["A"]);
    chain.insert_upgrade(200, hash(2), "7", ["B"]);
    let upgrades = vec![UpgradePoint::new(100, 7), UpgradePoint::new(200, 7)];
    let snapshots = collector::collect(&chain, &upgrades, |_| {}).unwrap();
    let err = SnapshotSeries::build(snapshots).unwrap_err();
    assert_eq!(err.exit_code(), 6);
}

#[test]
fn test_malformed_version_aborts_before_report() {
    let mut chain = InMemoryChain::new();
    chain.insert_upgrade(100, hash(1), "1", ["A"]);
    chain.insert_upgrade(200, hash(2), "v2", ["A"]);
    let upgrades = vec![UpgradePoint::new(100, 1), UpgradePoint::new(200, 2)];
    let snapshots = collector::collect(&chain, &upgrades, |_| {}).unwrap();
    let err = SnapshotSeries::build(snapshots).unwrap_err();
    assert!(matches!(err, Error::MalformedVersion { block: 200, .. }));
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn test_demo_fixture() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    let chain = FixtureChain::open(&root.join("polkadot-chain.json")).unwrap();
    let upgrades = upgrades::load(&root.join("polkadot-upgrades.json")).unwrap();

    let snapshots = collector::collect(&chain, &upgrades, |_| {}).unwrap();
    let series = SnapshotSeries::build(snapshots).unwrap();
    assert_eq!(series.versions(), vec![1, 5, 6, 9050]);

    let persistent = persistent_modules(&series);
    assert!(persistent.contains("System"));
    assert!(persistent.contains("Claims"));
    assert!(!persistent.contains("Sudo"));
    for (_, snapshot) in series.iter() {
        assert!(persistent.iter().all(|p| snapshot.modules.contains(p)));
    }

    let report = Report::new(&series);
    let text = report.render_text(DEFAULT_RETAINED_CAP);
    assert!(text.contains("\nChanges from runtime 1 to 5:\nNo pallets were removed\nAdded pallets (1): Sudo\n"));
    assert!(text.contains("Removed pallets (5): Attestations, Parachains, Registrar, Slots, Sudo\n"));
    assert!(text.contains(" ...and 2 more\n"));

    let json: serde_json::Value = serde_json::from_str(&report.render_json().unwrap()).unwrap();
    assert_eq!(json["runtimes"].as_array().unwrap().len(), 4);
    assert_eq!(json["diffs"].as_array().unwrap().len(), 3);
}
