use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::applier::{WriteApplier, WriteReceipt};
use crate::collation::{CollatedComparator, KeyComparator};
use crate::db::Table;
use crate::family::{Column, SuperGroup};
use crate::mutation::{self, MutationOp, RowMutation};
use crate::path::{DeletePath, PointPath, RawPath, ScopePath};
use crate::query;
use crate::schema::{self, FamilyKind, TableDef};
use crate::statistics::Statistics;
use crate::util::{Result, Slice, Status};

/// Per-mutation write options.
#[derive(Clone)]
pub struct WriteOptions {
    /// `true`: the mutation is applied before the call returns.
    /// `false`: the mutation is queued; visibility is eventual, observable
    /// deterministically through the returned receipt.
    pub durable: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions { durable: true }
    }
}

impl WriteOptions {
    pub fn eventual() -> Self {
        WriteOptions { durable: false }
    }
}

/// Store-wide options.
#[derive(Clone)]
pub struct StoreOptions {
    /// Row-key ordering used by every table's directory.
    pub comparator: Arc<dyn KeyComparator>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            comparator: Arc::new(CollatedComparator),
        }
    }
}

/// The engine facade: declared tables, their row directories, the applier
/// thread, and statistics.
///
/// All operations are keyed by table name and validated against the schema
/// at this boundary; resolution and query code below it only ever sees
/// well-formed paths.
pub struct Store {
    tables: HashMap<String, Arc<Table>>,
    applier: WriteApplier,
    statistics: Arc<Statistics>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("tables", &self.tables.len())
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Open a store over the given table schemas.
    pub fn open(defs: Vec<TableDef>, options: StoreOptions) -> Result<Self> {
        let mut tables = HashMap::new();
        for def in defs {
            for (i, family) in def.families.iter().enumerate() {
                if def.families[..i].iter().any(|f| f.name == family.name) {
                    return Err(Status::invalid_request(format!(
                        "duplicate family {} in table {}",
                        family.name, def.name
                    )));
                }
            }
            let name = def.name.clone();
            let table = Arc::new(Table::new(def, Arc::clone(&options.comparator)));
            if tables.insert(name.clone(), table).is_some() {
                return Err(Status::invalid_request(format!("duplicate table: {name}")));
            }
        }

        let statistics = Arc::new(Statistics::new());
        let applier = WriteApplier::start(Arc::clone(&statistics))?;
        debug!(tables = tables.len(), "store opened");

        Ok(Store {
            tables,
            applier,
            statistics,
        })
    }

    /// Open a store from a JSON schema document (an array of table defs).
    pub fn from_json_schema(json: &str, options: StoreOptions) -> Result<Self> {
        Self::open(schema::tables_from_json(json)?, options)
    }

    /// Open a store from a JSON schema file.
    pub fn from_schema_file(
        path: impl AsRef<std::path::Path>,
        options: StoreOptions,
    ) -> Result<Self> {
        Self::open(schema::tables_from_json_file(path)?, options)
    }

    fn table(&self, name: &str) -> Result<&Arc<Table>> {
        self.tables
            .get(name)
            .ok_or_else(|| Status::invalid_request(format!("no such table: {name}")))
    }

    fn dispatch(
        &self,
        table: &Arc<Table>,
        mutation: RowMutation,
        options: &WriteOptions,
    ) -> Result<WriteReceipt> {
        if options.durable {
            mutation::apply(table, &mutation)?;
            Ok(WriteReceipt::applied())
        } else {
            self.statistics.record_queued();
            Ok(self.applier.submit(Arc::clone(table), mutation))
        }
    }

    /// Insert one column at a fully-qualified leaf coordinate.
    pub fn insert(
        &self,
        table: &str,
        key: Slice,
        path: &RawPath,
        value: Slice,
        timestamp: i64,
        options: &WriteOptions,
    ) -> Result<WriteReceipt> {
        let table = self.table(table)?;
        let point = PointPath::resolve(table.def(), path)?;
        self.statistics.record_insert(value.size() as u64);
        let mutation = RowMutation::new(
            key,
            MutationOp::Insert {
                path: point,
                value,
                timestamp,
            },
        );
        self.dispatch(table, mutation, options)
    }

    /// Insert column lists into one or more simple families of a row. Each
    /// column resolves through its own merge; there is no cross-column
    /// atomicity.
    pub fn batch_insert(
        &self,
        table: &str,
        key: Slice,
        families: Vec<(String, Vec<Column>)>,
        options: &WriteOptions,
    ) -> Result<WriteReceipt> {
        let table = self.table(table)?;
        let mut bytes = 0u64;
        for (family, columns) in &families {
            if table.def().family_kind(family)? != FamilyKind::Simple {
                return Err(Status::invalid_request(format!(
                    "{family} is not a simple family"
                )));
            }
            bytes += columns
                .iter()
                .map(|c| (c.name.size() + c.value.size()) as u64)
                .sum::<u64>();
        }
        self.statistics.record_batch_insert(bytes);
        let mutation = RowMutation::new(key, MutationOp::BatchInsert { families });
        self.dispatch(table, mutation, options)
    }

    /// Insert group lists into one or more super families of a row.
    pub fn batch_insert_super(
        &self,
        table: &str,
        key: Slice,
        families: Vec<(String, Vec<SuperGroup>)>,
        options: &WriteOptions,
    ) -> Result<WriteReceipt> {
        let table = self.table(table)?;
        let mut bytes = 0u64;
        for (family, groups) in &families {
            if table.def().family_kind(family)? != FamilyKind::Super {
                return Err(Status::invalid_request(format!(
                    "{family} is not a super family"
                )));
            }
            bytes += groups
                .iter()
                .flat_map(|g| g.columns.iter())
                .map(|c| (c.name.size() + c.value.size()) as u64)
                .sum::<u64>();
        }
        self.statistics.record_batch_insert(bytes);
        let mutation = RowMutation::new(key, MutationOp::BatchInsertSuper { families });
        self.dispatch(table, mutation, options)
    }

    /// Delete at the granularity implied by the path: whole family, whole
    /// group, or single column.
    pub fn remove(
        &self,
        table: &str,
        key: Slice,
        path: &RawPath,
        timestamp: i64,
        options: &WriteOptions,
    ) -> Result<WriteReceipt> {
        let table = self.table(table)?;
        let delete = DeletePath::resolve(table.def(), path)?;
        self.statistics.record_remove();
        let mutation = RowMutation::new(
            key,
            MutationOp::Remove {
                path: delete,
                timestamp,
            },
        );
        self.dispatch(table, mutation, options)
    }

    /// Point lookup of one column.
    pub fn get_column(&self, table: &str, key: &Slice, path: &RawPath) -> Result<Column> {
        let table = self.table(table)?;
        let point = PointPath::resolve(table.def(), path)?;
        let result = query::get_column(table, key, &point);
        self.statistics.record_point_read(result.is_ok());
        result
    }

    /// Visible columns of a scope, name in `[start, end]`, ordered and
    /// truncated.
    pub fn get_slice(
        &self,
        table: &str,
        key: &Slice,
        parent: &RawPath,
        start: &Slice,
        end: &Slice,
        ascending: bool,
        limit: usize,
    ) -> Result<Vec<Column>> {
        let table = self.table(table)?;
        let scope = ScopePath::resolve_slice(table.def(), parent)?;
        self.statistics.record_slice();
        Ok(query::get_slice(
            table, key, &scope, start, end, ascending, limit,
        ))
    }

    /// Visible columns matching `names`, in the order given.
    pub fn get_slice_by_names(
        &self,
        table: &str,
        key: &Slice,
        parent: &RawPath,
        names: &[Slice],
    ) -> Result<Vec<Column>> {
        let table = self.table(table)?;
        let scope = ScopePath::resolve_slice(table.def(), parent)?;
        self.statistics.record_slice();
        Ok(query::get_slice_by_names(table, key, &scope, names))
    }

    /// Visible groups of a super family, with their visible columns.
    pub fn get_slice_super(
        &self,
        table: &str,
        key: &Slice,
        family: &str,
        start: &Slice,
        end: &Slice,
        ascending: bool,
        limit: usize,
    ) -> Result<Vec<SuperGroup>> {
        let table = self.table(table)?;
        if table.def().family_kind(family)? != FamilyKind::Super {
            return Err(Status::invalid_request(format!(
                "{family} is not a super family"
            )));
        }
        self.statistics.record_slice();
        Ok(query::get_slice_super(
            table, key, family, start, end, ascending, limit,
        ))
    }

    /// Number of visible immediate entries of a scope.
    pub fn get_column_count(&self, table: &str, key: &Slice, parent: &RawPath) -> Result<usize> {
        let table = self.table(table)?;
        let scope = ScopePath::resolve_count(table.def(), parent)?;
        self.statistics.record_count();
        Ok(query::get_column_count(table, key, &scope))
    }

    /// Keys in collation order over `[start, end]` holding at least one
    /// visible leaf in `family`, up to `limit`.
    pub fn get_key_range(
        &self,
        table: &str,
        family: &str,
        start: &Slice,
        end: &Slice,
        limit: usize,
    ) -> Result<Vec<Slice>> {
        let table = self.table(table)?;
        table.def().family_kind(family)?;
        self.statistics.record_range_scan();
        Ok(query::get_key_range(table, family, start, end, limit))
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Shut down: close the applier queue, apply everything still pending,
    /// and join the worker.
    pub fn close(self) -> Result<()> {
        self.applier.shutdown();
        debug!("store closed");
        Ok(())
    }
}
