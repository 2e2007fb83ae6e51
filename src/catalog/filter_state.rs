//! Which input tables currently hold caller data.
//!
//! The loader owns [`FilterState`]; the compiler only reads it, through
//! [`TableFilter`] snapshots of the namespaces it cares about.

use std::collections::{BTreeMap, BTreeSet};

use super::namespace::{Namespace, TableRef};

/// Row counts of input tables, per namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    counts: BTreeMap<Namespace, BTreeMap<String, u64>>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_count(&mut self, namespace: Namespace, table: impl Into<String>, rows: u64) {
        self.counts
            .entry(namespace)
            .or_default()
            .insert(table.into(), rows);
    }

    /// Builder-style `set_count(.., 1)`.
    pub fn with_live(mut self, namespace: Namespace, table: &str) -> Self {
        self.set_count(namespace, table, 1);
        self
    }

    pub fn count(&self, namespace: Namespace, table: &str) -> u64 {
        self.counts
            .get(&namespace)
            .and_then(|tables| tables.get(table))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_live(&self, namespace: Namespace, table: &str) -> bool {
        self.count(namespace, table) > 0
    }

    /// Live tables of the given namespaces.
    pub fn table_filter(&self, namespaces: &[Namespace]) -> TableFilter {
        let mut filter = TableFilter::new();
        for namespace in namespaces {
            if let Some(tables) = self.counts.get(namespace) {
                for (table, rows) in tables {
                    if *rows > 0 {
                        filter.insert(*namespace, table);
                    }
                }
            }
        }
        filter
    }
}

/// A set of live `(namespace, table)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFilter {
    live: BTreeMap<Namespace, BTreeSet<String>>,
}

impl TableFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, namespace: Namespace, table: &str) {
        self.live
            .entry(namespace)
            .or_default()
            .insert(table.to_string());
    }

    pub fn remove(&mut self, namespace: Namespace, table: &str) {
        if let Some(tables) = self.live.get_mut(&namespace) {
            tables.remove(table);
        }
    }

    pub fn with(mut self, namespace: Namespace, table: &str) -> Self {
        self.insert(namespace, table);
        self
    }

    pub fn is_live(&self, namespace: Namespace, table: &str) -> bool {
        self.live
            .get(&namespace)
            .is_some_and(|tables| tables.contains(table))
    }

    /// Liveness of the table an alias stands for, zone tables counting as
    /// their region table.
    pub fn qualifies(&self, table: &TableRef) -> bool {
        self.is_live(table.namespace, table.qualifying_table())
    }
}
