//! Consumer-side cache for row-list snapshots.
//!
//! Samplers publish full row lists and do not track identity across cycles.
//! A display that keeps per-row state (widgets, selection) feeds each new list
//! through a [`RowCache`] to learn which keys appeared, changed or vanished.

use std::collections::HashMap;
use std::hash::Hash;

use super::metrics::{ConnectionRow, DiskRow, ProcessRow};

/// A row with a stable identity within a snapshot list.
pub trait KeyedRow {
    type Key: Eq + Hash + Clone;

    fn key(&self) -> Self::Key;
}

impl KeyedRow for ProcessRow {
    type Key = u32;

    fn key(&self) -> u32 {
        self.pid
    }
}

impl KeyedRow for DiskRow {
    type Key = String;

    fn key(&self) -> String {
        self.name.clone()
    }
}

impl KeyedRow for ConnectionRow {
    type Key = (String, u32);

    fn key(&self) -> (String, u32) {
        (self.remote_addr.clone(), self.pid)
    }
}

/// Keys touched by one [`RowCache::apply`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDiff<K> {
    pub added: Vec<K>,
    pub updated: Vec<K>,
    pub removed: Vec<K>,
}

impl<K> Default for RowDiff<K> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            updated: Vec::new(),
            removed: Vec::new(),
        }
    }
}

pub struct RowCache<R: KeyedRow> {
    rows: HashMap<R::Key, R>,
}

impl<R: KeyedRow + PartialEq> RowCache<R> {
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }

    /// Replace the cache contents with `rows`, pruning keys absent from it.
    ///
    /// If a key repeats within `rows`, the first occurrence wins.
    pub fn apply(&mut self, rows: impl IntoIterator<Item = R>) -> RowDiff<R::Key> {
        let mut diff = RowDiff::default();
        let mut next: HashMap<R::Key, R> = HashMap::new();

        for row in rows {
            let key = row.key();
            if next.contains_key(&key) {
                continue;
            }
            match self.rows.get(&key) {
                None => diff.added.push(key.clone()),
                Some(old) if *old != row => diff.updated.push(key.clone()),
                Some(_) => {}
            }
            next.insert(key, row);
        }

        diff.removed = self
            .rows
            .keys()
            .filter(|key| !next.contains_key(*key))
            .cloned()
            .collect();

        self.rows = next;
        diff
    }

    pub fn get(&self, key: &R::Key) -> Option<&R> {
        self.rows.get(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &R> {
        self.rows.values()
    }
}

impl<R: KeyedRow + PartialEq> Default for RowCache<R> {
    fn default() -> Self {
        Self::new()
    }
}
