mod store;
mod table;

pub use store::{Store, StoreOptions, WriteOptions};
pub use table::Table;
