//! Ordered row directory.
//!
//! Maps row keys to per-row storage. Backed by `crossbeam_skiplist::SkipMap`
//! so lookups, inserts, and range scans run without a directory-wide lock.
//! Each stored key carries the directory's injected comparator, which is how
//! the skiplist orders entries by collation rather than raw bytes.
//!
//! Rows are created lazily on first mutation and never removed; a row whose
//! families hold only tombstones stays in the directory (range scans filter
//! it out by visibility, not by presence).

use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::Bound;
use std::sync::Arc;

use crossbeam_skiplist::SkipMap;
use parking_lot::RwLock;

use crate::collation::KeyComparator;
use crate::family::ColumnFamilyStore;
use crate::util::Slice;

/// Per-row storage: the row's column family stores, guarded by one lock.
///
/// All mutation of a row happens under the write lock, which is what makes
/// each read-modify-write merge atomic. Queries take the read lock.
pub struct Row {
    pub(crate) families: RwLock<HashMap<String, ColumnFamilyStore>>,
}

impl Row {
    pub(crate) fn new() -> Self {
        Row {
            families: RwLock::new(HashMap::new()),
        }
    }
}

/// Skiplist key: raw bytes plus the comparator that orders them.
struct DirectoryKey {
    raw: Slice,
    comparator: Arc<dyn KeyComparator>,
}

impl PartialEq for DirectoryKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DirectoryKey {}

impl PartialOrd for DirectoryKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DirectoryKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.comparator.compare(self.raw.data(), other.raw.data())
    }
}

/// Ordered index of row keys to rows.
pub struct RowDirectory {
    rows: SkipMap<DirectoryKey, Arc<Row>>,
    comparator: Arc<dyn KeyComparator>,
}

impl RowDirectory {
    pub fn new(comparator: Arc<dyn KeyComparator>) -> Self {
        RowDirectory {
            rows: SkipMap::new(),
            comparator,
        }
    }

    fn directory_key(&self, raw: &Slice) -> DirectoryKey {
        DirectoryKey {
            raw: raw.clone(),
            comparator: Arc::clone(&self.comparator),
        }
    }

    /// Row for `key`, created if absent. Idempotent: concurrent callers for
    /// the same key all receive the same row.
    pub fn ensure(&self, key: &Slice) -> Arc<Row> {
        let dk = self.directory_key(key);
        if let Some(entry) = self.rows.get(&dk) {
            return Arc::clone(entry.value());
        }
        Arc::clone(self.rows.get_or_insert(dk, Arc::new(Row::new())).value())
    }

    pub fn get(&self, key: &Slice) -> Option<Arc<Row>> {
        self.rows
            .get(&self.directory_key(key))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Keys and rows in collation order over `[start, end]`, both bounds
    /// inclusive; an empty bound is unbounded in that direction.
    pub fn range<'a>(
        &'a self,
        start: &Slice,
        end: &Slice,
    ) -> impl Iterator<Item = (Slice, Arc<Row>)> + 'a {
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(self.directory_key(start))
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(self.directory_key(end))
        };
        self.rows
            .range((lower, upper))
            .map(|entry| (entry.key().raw.clone(), Arc::clone(entry.value())))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
