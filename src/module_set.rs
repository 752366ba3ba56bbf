use std::{collections::BTreeSet, fmt::Display};

use serde::{Deserialize, Serialize};

use crate::hex::Hex;

/// The names of every pallet installed in one runtime, kept sorted.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleSet(BTreeSet<String>);

impl ModuleSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn names(&self) -> &BTreeSet<String> {
        &self.0
    }

    /// Names in `self` but not in `other`.
    pub fn difference(&self, other: &ModuleSet) -> BTreeSet<String> {
        self.0.difference(&other.0).cloned().collect()
    }

    /// Names in both `self` and `other`.
    pub fn intersection(&self, other: &ModuleSet) -> BTreeSet<String> {
        self.0.intersection(&other.0).cloned().collect()
    }

    /// A digest of the sorted names, equal for equal sets.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = blake3::Hasher::new();
        for name in &self.0 {
            // each name is length-prefixed
            hasher.update(&(name.len() as u64).to_le_bytes());
            hasher.update(name.as_bytes());
        }
        Fingerprint(hasher.finalize())
    }
}

impl<S: Into<String>> FromIterator<S> for ModuleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ModuleSet(iter.into_iter().map(Into::into).collect())
    }
}

/// A [`blake3`] digest of a [`ModuleSet`], displayed in hexadecimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint(blake3::Hash);

impl Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let b: &[u8] = self.0.as_bytes();
        write!(f, "{}", Hex::from(b))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

#[test]
fn test_fingerprint_ignores_insertion_order() {
    let a: ModuleSet = ["System", "Balances", "Staking"].into_iter().collect();
    let b: ModuleSet = ["Staking", "System", "Balances"].into_iter().collect();
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_eq!(a.fingerprint().to_string().len(), 64);
}

#[test]
fn test_fingerprint_separates_names() {
    // "ab" + "c" must not collide with "a" + "bc"
    let a: ModuleSet = ["ab", "c"].into_iter().collect();
    let b: ModuleSet = ["a", "bc"].into_iter().collect();
    assert_ne!(a.fingerprint(), b.fingerprint());
}

#[test]
fn test_fingerprint_embedded_newline() {
    let joined: ModuleSet = ["a\nb"].into_iter().collect();
    let split: ModuleSet = ["a", "b"].into_iter().collect();
    assert_ne!(joined.fingerprint(), split.fingerprint());
}

#[test]
fn test_set_operations() {
    let prev: ModuleSet = ["A", "B", "C"].into_iter().collect();
    let curr: ModuleSet = ["B", "C", "D"].into_iter().collect();
    assert_eq!(prev.difference(&curr), BTreeSet::from([String::from("A")]));
    assert_eq!(
        prev.intersection(&curr),
        BTreeSet::from([String::from("B"), String::from("C")])
    );
    assert!(prev.contains("A") && !curr.contains("A"));
}
