//! Per-row column family storage.
//!
//! A `ColumnFamilyStore` holds one family's state for one row: a flat
//! column map (Simple) or a group → column map (Super), plus tombstone
//! timestamps at family and group scope.
//!
//! Every leaf coordinate is a last-write-wins register. Inserts and leaf
//! deletes merge into the register with a commutative, idempotent rule:
//! greater timestamp wins; on a timestamp tie a deletion marker beats a live
//! cell, and between two live cells the greater value bytes win. Losing
//! entries are never stored, winning entries are never removed, so replaying
//! or reordering the same mutations converges to the same state.
//!
//! Visibility is derived, not stored: a cell is visible iff it is not a
//! deletion marker and its timestamp is greater than every tombstone of its
//! enclosing scopes. Raising a tombstone hides cells without touching them;
//! a later-timestamped insert makes the coordinate visible again.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::schema::FamilyKind;
use crate::util::Slice;

/// A visible column as surfaced by queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: Slice,
    pub value: Slice,
    pub timestamp: i64,
}

impl Column {
    pub fn new(name: Slice, value: Slice, timestamp: i64) -> Self {
        Column {
            name,
            value,
            timestamp,
        }
    }
}

/// A visible group of a super family, with its visible columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperGroup {
    pub name: Slice,
    pub columns: Vec<Column>,
}

impl SuperGroup {
    pub fn new(name: Slice, columns: Vec<Column>) -> Self {
        SuperGroup { name, columns }
    }
}

/// Stored state of one leaf coordinate: the LWW register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cell {
    pub value: Slice,
    pub timestamp: i64,
    pub deleted: bool,
}

impl Cell {
    pub(crate) fn live(value: Slice, timestamp: i64) -> Self {
        Cell {
            value,
            timestamp,
            deleted: false,
        }
    }

    pub(crate) fn tombstone(timestamp: i64) -> Self {
        Cell {
            value: Slice::empty(),
            timestamp,
            deleted: true,
        }
    }

    /// Does this cell win the register against `current`?
    fn supersedes(&self, current: &Cell) -> bool {
        if self.timestamp != current.timestamp {
            return self.timestamp > current.timestamp;
        }
        match (self.deleted, current.deleted) {
            (true, false) => true,
            (false, true) => false,
            _ => self.value.data() > current.value.data(),
        }
    }

    fn visible_above(&self, floor: Option<i64>) -> bool {
        !self.deleted && !shadows(floor, self.timestamp)
    }
}

/// Is a write at `timestamp` covered by the tombstone?
fn shadows(tombstone: Option<i64>, timestamp: i64) -> bool {
    tombstone.is_some_and(|t| timestamp <= t)
}

/// Raise a tombstone slot; older-or-equal timestamps are a no-op.
fn raise(slot: &mut Option<i64>, timestamp: i64) {
    if slot.is_none_or(|current| timestamp > current) {
        *slot = Some(timestamp);
    }
}

fn merged_floor(a: Option<i64>, b: Option<i64>) -> Option<i64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

fn merge_cell(cells: &mut BTreeMap<Slice, Cell>, name: Slice, incoming: Cell) {
    match cells.entry(name) {
        Entry::Vacant(slot) => {
            slot.insert(incoming);
        }
        Entry::Occupied(mut slot) => {
            if incoming.supersedes(slot.get()) {
                slot.insert(incoming);
            }
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Group {
    tombstone: Option<i64>,
    cells: BTreeMap<Slice, Cell>,
}

impl Group {
    fn floor(&self, family_tombstone: Option<i64>) -> Option<i64> {
        merged_floor(self.tombstone, family_tombstone)
    }

    fn visible_columns(&self, family_tombstone: Option<i64>) -> Vec<Column> {
        let floor = self.floor(family_tombstone);
        self.cells
            .iter()
            .filter(|(_, cell)| cell.visible_above(floor))
            .map(|(name, cell)| Column::new(name.clone(), cell.value.clone(), cell.timestamp))
            .collect()
    }

    fn has_visible(&self, family_tombstone: Option<i64>) -> bool {
        let floor = self.floor(family_tombstone);
        self.cells.values().any(|cell| cell.visible_above(floor))
    }
}

#[derive(Debug)]
enum FamilyCells {
    Simple(BTreeMap<Slice, Cell>),
    Super(BTreeMap<Slice, Group>),
}

/// One column family's storage for one row.
#[derive(Debug)]
pub struct ColumnFamilyStore {
    tombstone: Option<i64>,
    cells: FamilyCells,
}

impl ColumnFamilyStore {
    pub fn new(kind: FamilyKind) -> Self {
        let cells = match kind {
            FamilyKind::Simple => FamilyCells::Simple(BTreeMap::new()),
            FamilyKind::Super => FamilyCells::Super(BTreeMap::new()),
        };
        ColumnFamilyStore {
            tombstone: None,
            cells,
        }
    }

    pub fn kind(&self) -> FamilyKind {
        match self.cells {
            FamilyCells::Simple(_) => FamilyKind::Simple,
            FamilyCells::Super(_) => FamilyKind::Super,
        }
    }

    fn simple_cells(&self) -> &BTreeMap<Slice, Cell> {
        match &self.cells {
            FamilyCells::Simple(cells) => cells,
            FamilyCells::Super(_) => unreachable!("simple access on a super family"),
        }
    }

    fn simple_cells_mut(&mut self) -> &mut BTreeMap<Slice, Cell> {
        match &mut self.cells {
            FamilyCells::Simple(cells) => cells,
            FamilyCells::Super(_) => unreachable!("simple access on a super family"),
        }
    }

    fn groups(&self) -> &BTreeMap<Slice, Group> {
        match &self.cells {
            FamilyCells::Super(groups) => groups,
            FamilyCells::Simple(_) => unreachable!("group access on a simple family"),
        }
    }

    fn groups_mut(&mut self) -> &mut BTreeMap<Slice, Group> {
        match &mut self.cells {
            FamilyCells::Super(groups) => groups,
            FamilyCells::Simple(_) => unreachable!("group access on a simple family"),
        }
    }

    pub(crate) fn merge_simple(&mut self, name: Slice, cell: Cell) {
        merge_cell(self.simple_cells_mut(), name, cell);
    }

    pub(crate) fn merge_super(&mut self, group: Slice, name: Slice, cell: Cell) {
        let group = self.groups_mut().entry(group).or_default();
        merge_cell(&mut group.cells, name, cell);
    }

    pub fn raise_family_tombstone(&mut self, timestamp: i64) {
        raise(&mut self.tombstone, timestamp);
    }

    /// Group entries are created on first delete as well as first insert, so
    /// the tombstone survives even if the group never held data.
    pub fn raise_group_tombstone(&mut self, group: Slice, timestamp: i64) {
        let group = self.groups_mut().entry(group).or_default();
        raise(&mut group.tombstone, timestamp);
    }

    pub fn leaf_simple(&self, name: &Slice) -> Option<Column> {
        let cell = self.simple_cells().get(name)?;
        cell.visible_above(self.tombstone)
            .then(|| Column::new(name.clone(), cell.value.clone(), cell.timestamp))
    }

    pub fn leaf_super(&self, group: &Slice, name: &Slice) -> Option<Column> {
        let group = self.groups().get(group)?;
        let cell = group.cells.get(name)?;
        cell.visible_above(group.floor(self.tombstone))
            .then(|| Column::new(name.clone(), cell.value.clone(), cell.timestamp))
    }

    /// Visible columns of a Simple family, in name byte order.
    pub fn visible_simple_columns(&self) -> Vec<Column> {
        self.simple_cells()
            .iter()
            .filter(|(_, cell)| cell.visible_above(self.tombstone))
            .map(|(name, cell)| Column::new(name.clone(), cell.value.clone(), cell.timestamp))
            .collect()
    }

    /// Visible columns of one group, in name byte order.
    pub fn visible_group_columns(&self, group: &Slice) -> Vec<Column> {
        match self.groups().get(group) {
            Some(g) => g.visible_columns(self.tombstone),
            None => Vec::new(),
        }
    }

    /// Visible groups of a Super family, in group-name byte order. Groups
    /// with no visible column are omitted.
    pub fn visible_groups(&self) -> Vec<SuperGroup> {
        self.groups()
            .iter()
            .filter_map(|(name, group)| {
                let columns = group.visible_columns(self.tombstone);
                (!columns.is_empty()).then(|| SuperGroup::new(name.clone(), columns))
            })
            .collect()
    }

    /// Visible immediate entries at family scope: columns for a Simple
    /// family, groups for a Super family.
    pub fn count_family_scope(&self) -> usize {
        match &self.cells {
            FamilyCells::Simple(cells) => cells
                .values()
                .filter(|cell| cell.visible_above(self.tombstone))
                .count(),
            FamilyCells::Super(groups) => groups
                .values()
                .filter(|group| group.has_visible(self.tombstone))
                .count(),
        }
    }

    pub fn count_group_scope(&self, group: &Slice) -> usize {
        match self.groups().get(group) {
            Some(g) => {
                let floor = g.floor(self.tombstone);
                g.cells
                    .values()
                    .filter(|cell| cell.visible_above(floor))
                    .count()
            }
            None => 0,
        }
    }

    /// Does this family hold at least one visible leaf for its row?
    pub fn has_visible(&self) -> bool {
        match &self.cells {
            FamilyCells::Simple(cells) => cells
                .values()
                .any(|cell| cell.visible_above(self.tombstone)),
            FamilyCells::Super(groups) => {
                groups.values().any(|group| group.has_visible(self.tombstone))
            }
        }
    }
}
