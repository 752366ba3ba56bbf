use std::{fs::File, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A block at which a new runtime became active, with an opaque label.
///
/// Serialized as a `[number, label]` pair, the shape of the well-known
/// upgrade tables, where the label is usually the expected spec version.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(from = "(u64, serde_json::Value)", into = "(u64, serde_json::Value)")]
pub struct UpgradePoint {
    pub block: u64,
    pub label: serde_json::Value,
}

impl UpgradePoint {
    pub fn new(block: u64, label: impl Into<serde_json::Value>) -> Self {
        UpgradePoint {
            block,
            label: label.into(),
        }
    }

    /// The spec version the label announces, when it is an integer.
    pub fn expected_version(&self) -> Option<u64> {
        match &self.label {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl From<(u64, serde_json::Value)> for UpgradePoint {
    fn from((block, label): (u64, serde_json::Value)) -> Self {
        UpgradePoint { block, label }
    }
}

impl From<UpgradePoint> for (u64, serde_json::Value) {
    fn from(point: UpgradePoint) -> Self {
        (point.block, point.label)
    }
}

/// Reads an ordered upgrade list from a JSON file.
pub fn load(path: &Path) -> Result<Vec<UpgradePoint>, Error> {
    log::info!("loading upgrade list from {:?}", path);
    let upgrades: Vec<UpgradePoint> =
        serde_json::from_reader(File::options().read(true).open(path)?)?;
    log::debug!("{} upgrade points configured", upgrades.len());
    Ok(upgrades)
}

#[test]
fn test_upgrade_pairs() {
    let upgrades: Vec<UpgradePoint> =
        serde_json::from_str(r#"[[29231, 1], [188836, "5"], [199405, null]]"#).unwrap();
    assert_eq!(upgrades[0], UpgradePoint::new(29231, 1));
    assert_eq!(upgrades[0].expected_version(), Some(1));
    assert_eq!(upgrades[1].expected_version(), Some(5));
    assert_eq!(upgrades[2].expected_version(), None);
    assert_eq!(
        serde_json::to_string(&upgrades[0]).unwrap(),
        "[29231,1]"
    );
}

#[test]
fn test_load() {
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("upgrades.json");
    std::fs::write(&path, "[[10, 1], [20, 2]]").unwrap();
    let upgrades = load(&path).unwrap();
    assert_eq!(
        upgrades.iter().map(|u| u.block).collect::<Vec<_>>(),
        vec![10, 20]
    );

    std::fs::write(&path, r#"{"not": "a list"}"#).unwrap();
    assert!(matches!(load(&path), Err(Error::Serde(_))));
}
