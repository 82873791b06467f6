//! Query evaluation over merged row state.
//!
//! All functions here take already-validated paths (see `path`); they lock
//! the addressed row shared and read through the visibility rule. Absence is
//! an empty result everywhere except point lookups, which report `NotFound`.

use crate::db::Table;
use crate::family::{Column, SuperGroup};
use crate::path::{PointPath, ScopePath};
use crate::util::{Result, Slice, Status};

/// Is `name` inside the inclusive `[start, end]` byte-order window?
/// An empty bound is unbounded in that direction.
fn in_bounds(name: &Slice, start: &Slice, end: &Slice) -> bool {
    (start.is_empty() || name >= start) && (end.is_empty() || name <= end)
}

fn order_and_truncate<T>(mut items: Vec<T>, ascending: bool, limit: usize) -> Vec<T> {
    if !ascending {
        items.reverse();
    }
    items.truncate(limit);
    items
}

/// Point lookup: the visible column at a fully-qualified coordinate.
pub fn get_column(table: &Table, key: &Slice, path: &PointPath) -> Result<Column> {
    let missing = || Status::not_found(format!("{}: no visible column", path.family_name()));

    let row = table.directory().get(key).ok_or_else(missing)?;
    let families = row.families.read();
    let column = match path {
        PointPath::Simple { family, column } => families
            .get(family)
            .and_then(|store| store.leaf_simple(column)),
        PointPath::Super {
            family,
            group,
            column,
        } => families
            .get(family)
            .and_then(|store| store.leaf_super(group, column)),
    };
    column.ok_or_else(missing)
}

/// Visible leaves of a scope with name in `[start, end]`, in leaf-name byte
/// order, direction per `ascending`, truncated to `limit`.
pub fn get_slice(
    table: &Table,
    key: &Slice,
    scope: &ScopePath,
    start: &Slice,
    end: &Slice,
    ascending: bool,
    limit: usize,
) -> Vec<Column> {
    let Some(row) = table.directory().get(key) else {
        return Vec::new();
    };
    let families = row.families.read();
    let mut columns = match scope {
        ScopePath::Family { family } => families
            .get(family)
            .map(|store| store.visible_simple_columns())
            .unwrap_or_default(),
        ScopePath::Group { family, group } => families
            .get(family)
            .map(|store| store.visible_group_columns(group))
            .unwrap_or_default(),
    };
    columns.retain(|column| in_bounds(&column.name, start, end));
    order_and_truncate(columns, ascending, limit)
}

/// Visible leaves matching `names`, in the order the names were given;
/// absent or tombstoned names are silently omitted.
pub fn get_slice_by_names(
    table: &Table,
    key: &Slice,
    scope: &ScopePath,
    names: &[Slice],
) -> Vec<Column> {
    let Some(row) = table.directory().get(key) else {
        return Vec::new();
    };
    let families = row.families.read();
    names
        .iter()
        .filter_map(|name| match scope {
            ScopePath::Family { family } => families
                .get(family)
                .and_then(|store| store.leaf_simple(name)),
            ScopePath::Group { family, group } => families
                .get(family)
                .and_then(|store| store.leaf_super(group, name)),
        })
        .collect()
}

/// Visible groups of a super family (with their visible columns), group
/// name in `[start, end]`, in group-name byte order, direction, limit.
pub fn get_slice_super(
    table: &Table,
    key: &Slice,
    family: &str,
    start: &Slice,
    end: &Slice,
    ascending: bool,
    limit: usize,
) -> Vec<SuperGroup> {
    let Some(row) = table.directory().get(key) else {
        return Vec::new();
    };
    let families = row.families.read();
    let mut groups = families
        .get(family)
        .map(|store| store.visible_groups())
        .unwrap_or_default();
    groups.retain(|group| in_bounds(&group.name, start, end));
    order_and_truncate(groups, ascending, limit)
}

/// Number of visible immediate entries of the addressed scope.
pub fn get_column_count(table: &Table, key: &Slice, scope: &ScopePath) -> usize {
    let Some(row) = table.directory().get(key) else {
        return 0;
    };
    let families = row.families.read();
    match scope {
        ScopePath::Family { family } => families
            .get(family)
            .map(|store| store.count_family_scope())
            .unwrap_or(0),
        ScopePath::Group { family, group } => families
            .get(family)
            .map(|store| store.count_group_scope(group))
            .unwrap_or(0),
    }
}

/// Keys in collation order over `[start, end]` that hold at least one
/// visible leaf in `family`, stopping after `limit` matches.
pub fn get_key_range(
    table: &Table,
    family: &str,
    start: &Slice,
    end: &Slice,
    limit: usize,
) -> Vec<Slice> {
    let mut keys = Vec::new();
    for (key, row) in table.directory().range(start, end) {
        if keys.len() >= limit {
            break;
        }
        let families = row.families.read();
        if families.get(family).is_some_and(|store| store.has_visible()) {
            keys.push(key);
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::collation::CollatedComparator;
    use crate::mutation::{self, MutationOp, RowMutation};
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
        mutation::apply(table, &mutation).unwrap();
    }

    fn standard1_scope() -> ScopePath {
        ScopePath::Family {
            family: "Standard1".to_string(),
        }
    }

    #[test]
    fn test_point_lookup_absent_row_is_not_found() {
        let table = table();
        let path = PointPath::Simple {
            family: "Standard1".to_string(),
            column: Slice::from("c1"),
        };
        let err = get_column(&table, &Slice::from("key1"), &path).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_slice_window_and_limit() {
        let table = table();
        insert(&table, "key1", "c1", "value1", 0);
        insert(&table, "key1", "c2", "value2", 0);
        insert(&table, "key1", "c3", "value3", 0);

        let all = get_slice(
            &table,
            &Slice::from("key1"),
            &standard1_scope(),
            &Slice::empty(),
            &Slice::empty(),
            true,
            1000,
        );
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, Slice::from("c1"));

        let window = get_slice(
            &table,
            &Slice::from("key1"),
            &standard1_scope(),
            &Slice::from("c1"),
            &Slice::from("c2"),
            true,
            1000,
        );
        assert_eq!(window.len(), 2);

        let limited = get_slice(
            &table,
            &Slice::from("key1"),
            &standard1_scope(),
            &Slice::from("a"),
            &Slice::from("z"),
            true,
            2,
        );
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn test_slice_descending() {
        let table = table();
        insert(&table, "key1", "c1", "value1", 0);
        insert(&table, "key1", "c2", "value2", 0);
        insert(&table, "key1", "c3", "value3", 0);

        let desc = get_slice(
            &table,
            &Slice::from("key1"),
            &standard1_scope(),
            &Slice::empty(),
            &Slice::empty(),
            false,
            2,
        );
        assert_eq!(desc.len(), 2);
        assert_eq!(desc[0].name, Slice::from("c3"));
        assert_eq!(desc[1].name, Slice::from("c2"));
    }

    #[test]
    fn test_slice_by_names_preserves_request_order() {
        let table = table();
        insert(&table, "key1", "c1", "value1", 0);
        insert(&table, "key1", "c2", "value2", 0);

        let result = get_slice_by_names(
            &table,
            &Slice::from("key1"),
            &standard1_scope(),
            &[Slice::from("c2"), Slice::from("c1"), Slice::from("c9")],
        );
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, Slice::from("c2"));
        assert_eq!(result[1].name, Slice::from("c1"));
    }

    #[test]
    fn test_key_range_skips_rows_without_visible_leaves() {
        let table = table();
        insert(&table, "key1", "c1", "value1", 0);
        insert(&table, "key2", "c1", "value1", 0);

        // tombstone key1's only column
        let remove = RowMutation::new(
            Slice::from("key1"),
            MutationOp::Remove {
                path: crate::path::DeletePath::SimpleColumn {
                    family: "Standard1".to_string(),
                    column: Slice::from("c1"),
                },
                timestamp: 1,
            },
        );
        mutation::apply(&table, &remove).unwrap();

        let keys = get_key_range(&table, "Standard1", &Slice::empty(), &Slice::empty(), 1000);
        assert_eq!(keys, vec![Slice::from("key2")]);
    }

    #[test]
    fn test_key_range_limit() {
        let table = table();
        for i in 0..20 {
            insert(&table, &format!("key{i:02}"), "c1", "v", 0);
        }
        let keys = get_key_range(&table, "Standard1", &Slice::from("key05"), &Slice::empty(), 5);
        assert_eq!(keys.len(), 5);
        assert_eq!(keys[0], Slice::from("key05"));
        assert_eq!(keys[4], Slice::from("key09"));
    }
}
