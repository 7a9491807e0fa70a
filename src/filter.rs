use std::collections::BTreeMap;

use serde::Serialize;

/// Where a name in a regeneration filter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Provenance {
    /// Asked for on this run.
    Requested,
    /// Already present in the file being regenerated.
    Discovered,
    Both,
}

/// Requested ∪ discovered names, ordered ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSet {
    names: BTreeMap<String, Provenance>,
}

impl FilterSet {
    pub fn union<R, D>(requested: R, discovered: D) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        let mut names = BTreeMap::new();
        for name in requested {
            names.insert(name.into(), Provenance::Requested);
        }
        for name in discovered {
            names
                .entry(name.into())
                .and_modify(|p| {
                    if *p == Provenance::Requested {
                        *p = Provenance::Both;
                    }
                })
                .or_insert(Provenance::Discovered);
        }
        Self { names }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn provenance(&self, name: &str) -> Option<Provenance> {
        self.names.get(name).copied()
    }

    /// Names that were not in the file before this run.
    pub fn added(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .filter(|(_, p)| **p == Provenance::Requested)
            .map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
