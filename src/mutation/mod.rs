//! Mutation resolution.
//!
//! A `RowMutation` is a validated, self-contained description of one write:
//! the row key plus the operation. Resolution locks the addressed row,
//! creates family/group structures on demand, and merges each leaf through
//! the LWW rule (or raises the addressed tombstone).
//!
//! Because every leaf merge is commutative and idempotent, applying a
//! mutation is independent of arrival order; the same `RowMutation` value
//! can be applied inline by a durable caller or later by the applier thread
//! with identical results. Batch operations apply each column independently:
//! there is no cross-column atomicity, only per-leaf convergence.

use std::collections::HashMap;

use crate::db::Table;
use crate::family::{Cell, Column, ColumnFamilyStore, SuperGroup};
use crate::path::{DeletePath, PointPath};
use crate::util::{Result, Slice};

/// One validated write operation against a single row.
#[derive(Debug, Clone)]
pub enum MutationOp {
    Insert {
        path: PointPath,
        value: Slice,
        timestamp: i64,
    },
    /// Per-family ordered column lists for simple families.
    BatchInsert {
        families: Vec<(String, Vec<Column>)>,
    },
    /// Per-family group lists for super families.
    BatchInsertSuper {
        families: Vec<(String, Vec<SuperGroup>)>,
    },
    Remove {
        path: DeletePath,
        timestamp: i64,
    },
}

#[derive(Debug, Clone)]
pub struct RowMutation {
    pub key: Slice,
    pub op: MutationOp,
}

impl RowMutation {
    pub fn new(key: Slice, op: MutationOp) -> Self {
        RowMutation { key, op }
    }
}

fn store_for<'a>(
    families: &'a mut HashMap<String, ColumnFamilyStore>,
    table: &Table,
    family: &str,
) -> Result<&'a mut ColumnFamilyStore> {
    let kind = table.def().family_kind(family)?;
    Ok(families
        .entry(family.to_string())
        .or_insert_with(|| ColumnFamilyStore::new(kind)))
}

/// Apply one mutation to its row, under the row's write lock.
///
/// Paths are validated at the store boundary, so failures here only occur
/// for mutations constructed outside it.
pub fn apply(table: &Table, mutation: &RowMutation) -> Result<()> {
    let row = table.directory().ensure(&mutation.key);
    let mut families = row.families.write();

    match &mutation.op {
        MutationOp::Insert {
            path,
            value,
            timestamp,
        } => match path {
            PointPath::Simple { family, column } => {
                store_for(&mut families, table, family)?
                    .merge_simple(column.clone(), Cell::live(value.clone(), *timestamp));
            }
            PointPath::Super {
                family,
                group,
                column,
            } => {
                store_for(&mut families, table, family)?.merge_super(
                    group.clone(),
                    column.clone(),
                    Cell::live(value.clone(), *timestamp),
                );
            }
        },
        MutationOp::BatchInsert { families: batch } => {
            for (family, columns) in batch {
                let store = store_for(&mut families, table, family)?;
                for column in columns {
                    store.merge_simple(
                        column.name.clone(),
                        Cell::live(column.value.clone(), column.timestamp),
                    );
                }
            }
        }
        MutationOp::BatchInsertSuper { families: batch } => {
            for (family, groups) in batch {
                let store = store_for(&mut families, table, family)?;
                for group in groups {
                    for column in &group.columns {
                        store.merge_super(
                            group.name.clone(),
                            column.name.clone(),
                            Cell::live(column.value.clone(), column.timestamp),
                        );
                    }
                }
            }
        }
        MutationOp::Remove { path, timestamp } => match path {
            DeletePath::Family { family } => {
                store_for(&mut families, table, family)?.raise_family_tombstone(*timestamp);
            }
            DeletePath::Group { family, group } => {
                store_for(&mut families, table, family)?
                    .raise_group_tombstone(group.clone(), *timestamp);
            }
            DeletePath::SimpleColumn { family, column } => {
                store_for(&mut families, table, family)?
                    .merge_simple(column.clone(), Cell::tombstone(*timestamp));
            }
            DeletePath::SuperColumn {
                family,
                group,
                column,
            } => {
                store_for(&mut families, table, family)?.merge_super(
                    group.clone(),
                    column.clone(),
                    Cell::tombstone(*timestamp),
                );
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::collation::CollatedComparator;
    use crate::schema::{FamilyDef, TableDef};

    fn table() -> Table {
        let def = TableDef::new(
            "Table1",
            vec![
                FamilyDef::simple("Standard1"),
                FamilyDef::super_family("Super1"),
            ],
        );
        Table::new(def, Arc::new(CollatedComparator))
    }

    fn insert(table: &Table, key: &str, column: &str, value: &str, timestamp: i64) {
        let mutation = RowMutation::new(
            Slice::from(key),
            MutationOp::Insert {
                path: PointPath::Simple {
                    family: "Standard1".to_string(),
                    column: Slice::from(column),
                },
                value: Slice::from(value),
                timestamp,
            },
        );
        apply(table, &mutation).unwrap();
    }

    #[test]
    fn test_insert_creates_row_and_family() {
        let table = table();
        insert(&table, "key1", "c1", "value1", 0);

        let row = table.directory().get(&Slice::from("key1")).unwrap();
        let families = row.families.read();
        let store = families.get("Standard1").unwrap();
        assert_eq!(store.leaf_simple(&Slice::from("c1")).unwrap().timestamp, 0);
    }

    #[test]
    fn test_replayed_mutation_is_idempotent() {
        let table = table();
        let mutation = RowMutation::new(
            Slice::from("key1"),
            MutationOp::Insert {
                path: PointPath::Simple {
                    family: "Standard1".to_string(),
                    column: Slice::from("c1"),
                },
                value: Slice::from("value1"),
                timestamp: 3,
            },
        );
        apply(&table, &mutation).unwrap();
        apply(&table, &mutation).unwrap();

        let row = table.directory().get(&Slice::from("key1")).unwrap();
        let families = row.families.read();
        let visible = families.get("Standard1").unwrap().visible_simple_columns();
        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn test_batch_insert_applies_each_column() {
        let table = table();
        let mutation = RowMutation::new(
            Slice::from("key1"),
            MutationOp::BatchInsert {
                families: vec![(
                    "Standard1".to_string(),
                    vec![
                        Column::new(Slice::from("c1"), Slice::from("value1"), 0),
                        Column::new(Slice::from("c2"), Slice::from("value2"), 0),
                    ],
                )],
            },
        );
        apply(&table, &mutation).unwrap();

        let row = table.directory().get(&Slice::from("key1")).unwrap();
        let families = row.families.read();
        assert_eq!(families.get("Standard1").unwrap().count_family_scope(), 2);
    }

    #[test]
    fn test_remove_family_tombstones_existing_columns() {
        let table = table();
        insert(&table, "key1", "c1", "value1", 0);

        let remove = RowMutation::new(
            Slice::from("key1"),
            MutationOp::Remove {
                path: DeletePath::Family {
                    family: "Standard1".to_string(),
                },
                timestamp: 1,
            },
        );
        apply(&table, &remove).unwrap();

        let row = table.directory().get(&Slice::from("key1")).unwrap();
        let families = row.families.read();
        assert!(!families.get("Standard1").unwrap().has_visible());
    }

    #[test]
    fn test_group_delete_before_any_insert_is_remembered() {
        let table = table();
        let remove = RowMutation::new(
            Slice::from("key1"),
            MutationOp::Remove {
                path: DeletePath::Group {
                    family: "Super1".to_string(),
                    group: Slice::from("sc1"),
                },
                timestamp: 5,
            },
        );
        apply(&table, &remove).unwrap();

        // a later covered insert stays invisible
        let covered = RowMutation::new(
            Slice::from("key1"),
            MutationOp::Insert {
                path: PointPath::Super {
                    family: "Super1".to_string(),
                    group: Slice::from("sc1"),
                    column: Slice::from("c1"),
                },
                value: Slice::from("v"),
                timestamp: 2,
            },
        );
        apply(&table, &covered).unwrap();

        let row = table.directory().get(&Slice::from("key1")).unwrap();
        let families = row.families.read();
        assert!(!families.get("Super1").unwrap().has_visible());
    }
}
