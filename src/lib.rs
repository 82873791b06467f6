//! colfam: an embedded wide-column storage engine.
//!
//! Rows are addressed by byte keys and hold declared column families: Simple
//! (flat column map) or Super (group → column map). Writes carry
//! client-supplied timestamps and merge through a last-write-wins rule;
//! deletes are tombstones at family, group, or leaf granularity; range scans
//! traverse keys under an injectable collation. Mutations are applied
//! synchronously or queued to a background applier, per request.

pub mod applier;
pub mod collation;
pub mod db;
pub mod directory;
pub mod family;
pub mod mutation;
pub mod path;
pub mod query;
pub mod schema;
pub mod statistics;
pub mod util;

pub use applier::WriteReceipt;
pub use collation::{BytewiseComparator, CollatedComparator, KeyComparator};
pub use db::{Store, StoreOptions, Table, WriteOptions};
pub use family::{Column, SuperGroup};
pub use path::RawPath;
pub use schema::{FamilyDef, FamilyKind, TableDef};
pub use statistics::Statistics;
pub use util::{Code, Result, Slice, Status};
