use std::collections::BTreeSet;

use serde::Serialize;

use crate::{
    block_hash::BlockHash,
    diff::{diff_adjacent, persistent_modules, PairwiseDiff},
    module_set::Fingerprint,
    snapshot::{RuntimeSnapshot, SnapshotSeries},
};

/// How many retained pallets a diff block lists before eliding the rest.
pub const DEFAULT_RETAINED_CAP: usize = 20;

/// One row of the runtime table in the structured output.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeSummary {
    pub version: u64,
    pub block: u64,
    pub block_hash: BlockHash,
    pub pallet_count: usize,
    pub fingerprint: Fingerprint,
}

/// Everything derived from a [`SnapshotSeries`], ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub runtimes: Vec<RuntimeSummary>,
    pub diffs: Vec<PairwiseDiff>,
    pub persistent: BTreeSet<String>,
}

impl Report {
    pub fn new(series: &SnapshotSeries) -> Self {
        let runtimes = series
            .iter()
            .map(|(version, snapshot)| RuntimeSummary {
                version,
                block: snapshot.block,
                block_hash: snapshot.block_hash,
                pallet_count: snapshot.modules.len(),
                fingerprint: snapshot.modules.fingerprint(),
            })
            .collect();
        Report {
            runtimes,
            diffs: diff_adjacent(series),
            persistent: persistent_modules(series),
        }
    }

    /// Renders the diff blocks and the closing summary as plain text.
    pub fn render_text(&self, retained_cap: usize) -> String {
        let mut out = String::new();
        for diff in &self.diffs {
            out.push_str(&render_diff(diff, retained_cap));
        }
        out.push_str(&format!(
            "\nPallets present in all {} runtime versions ({}):\n",
            self.runtimes.len(),
            self.persistent.len()
        ));
        out.push_str(&join(self.persistent.iter()));
        out.push('\n');
        out
    }

    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// The line printed as each snapshot is collected.
pub fn progress_line(snapshot: &RuntimeSnapshot) -> String {
    format!(
        "Runtime {} at block {} has {} pallets",
        snapshot.version,
        snapshot.block,
        snapshot.modules.len()
    )
}

fn render_diff(diff: &PairwiseDiff, retained_cap: usize) -> String {
    let mut out = format!(
        "\nChanges from runtime {} to {}:\n",
        diff.from_version, diff.to_version
    );

    if diff.removed.is_empty() {
        out.push_str("No pallets were removed\n");
    } else {
        out.push_str(&format!(
            "Removed pallets ({}): {}\n",
            diff.removed.len(),
            join(diff.removed.iter())
        ));
    }

    if diff.added.is_empty() {
        out.push_str("No pallets were added\n");
    } else {
        out.push_str(&format!(
            "Added pallets ({}): {}\n",
            diff.added.len(),
            join(diff.added.iter())
        ));
    }

    out.push_str(&format!(
        "Retained pallets ({}): {}",
        diff.retained.len(),
        join(diff.retained.iter().take(retained_cap))
    ));
    if diff.retained.len() > retained_cap {
        out.push_str(&format!(
            " ...and {} more",
            diff.retained.len() - retained_cap
        ));
    }
    out.push('\n');
    out
}

fn join<'a>(names: impl Iterator<Item = &'a String>) -> String {
    names.map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
use crate::snapshot::snapshot;

#[test]
fn test_render_two_versions() {
    let series = SnapshotSeries::build(vec![
        snapshot("101", 2, &["D", "C", "B"]),
        snapshot("100", 1, &["C", "B", "A"]),
    ])
    .unwrap();
    let text = Report::new(&series).render_text(DEFAULT_RETAINED_CAP);
    assert_eq!(
        text,
        "\nChanges from runtime 100 to 101:\n\
         Removed pallets (1): A\n\
         Added pallets (1): D\n\
         Retained pallets (2): B, C\n\
         \nPallets present in all 2 runtime versions (2):\n\
         B, C\n"
    );
}

#[test]
fn test_render_none_markers() {
    let series = SnapshotSeries::build(vec![
        snapshot("1", 1, &["System"]),
        snapshot("2", 2, &["System"]),
    ])
    .unwrap();
    let text = Report::new(&series).render_text(DEFAULT_RETAINED_CAP);
    assert!(text.contains("No pallets were removed\n"));
    assert!(text.contains("No pallets were added\n"));
    assert!(text.contains("Retained pallets (1): System\n"));
}

#[test]
fn test_render_truncates_retained() {
    let many: Vec<String> = (0..25).map(|i| format!("Pallet{:02}", i)).collect();
    let many: Vec<&str> = many.iter().map(String::as_str).collect();
    let series =
        SnapshotSeries::build(vec![snapshot("1", 1, &many), snapshot("2", 2, &many)]).unwrap();
    let report = Report::new(&series);

    let text = report.render_text(DEFAULT_RETAINED_CAP);
    let line = text
        .lines()
        .find(|l| l.starts_with("Retained"))
        .unwrap();
    assert!(line.starts_with("Retained pallets (25): Pallet00, Pallet01,"));
    assert!(line.ends_with("Pallet19 ...and 5 more"));
    assert!(!line.contains("Pallet20"));

    let text = report.render_text(30);
    assert!(!text.contains("more"));
    assert!(text.contains("Pallet24\n"));
}

#[test]
fn test_render_empty_series() {
    let series = SnapshotSeries::build(Vec::new()).unwrap();
    let text = Report::new(&series).render_text(DEFAULT_RETAINED_CAP);
    assert_eq!(text, "\nPallets present in all 0 runtime versions (0):\n\n");
}

#[test]
fn test_render_json() {
    let series = SnapshotSeries::build(vec![
        snapshot("100", 1, &["A", "B", "C"]),
        snapshot("101", 2, &["B", "C", "D"]),
    ])
    .unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&Report::new(&series).render_json().unwrap()).unwrap();
    assert_eq!(json["runtimes"][1]["version"], 101);
    assert_eq!(json["runtimes"][0]["pallet_count"], 3);
    assert_eq!(json["diffs"][0]["removed"], serde_json::json!(["A"]));
    assert_eq!(json["diffs"][0]["retained"], serde_json::json!(["B", "C"]));
    assert_eq!(json["persistent"], serde_json::json!(["B", "C"]));
}

#[test]
fn test_progress_line() {
    let s = snapshot("9050", 5661442, &["System", "Babe"]);
    assert_eq!(
        progress_line(&s),
        "Runtime 9050 at block 5661442 has 2 pallets"
    );
}
