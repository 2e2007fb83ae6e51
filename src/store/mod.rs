//! SQLite-backed knowledge store.
//!
//! One connection carries every namespace: the input set in `main`, the
//! alternate, candidate and user sets attached in memory, and the reference
//! knowledge database attached as `db`. Compiled plans run here through
//! [`ResultExecutor`].

mod connection;
mod errors;
mod executor;
pub mod schema;

pub use connection::KnowledgeStore;
pub use errors::StoreError;
pub use executor::{DedupPolicy, ExplainStep, IdentityKey, ResultExecutor, RowDeduplicator};
