use std::sync::Arc;

use crate::collation::KeyComparator;
use crate::directory::RowDirectory;
use crate::schema::TableDef;

/// One declared table: its schema plus its ordered row directory.
pub struct Table {
    def: TableDef,
    directory: RowDirectory,
}

impl Table {
    pub fn new(def: TableDef, comparator: Arc<dyn KeyComparator>) -> Self {
        Table {
            directory: RowDirectory::new(comparator),
            def,
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn def(&self) -> &TableDef {
        &self.def
    }

    pub fn directory(&self) -> &RowDirectory {
        &self.directory
    }
}
