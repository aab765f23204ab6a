pub mod kv_store;

pub use crate::kv_store::SqliteKvStore;
