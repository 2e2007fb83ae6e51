//! Annograph - join-graph query compiler for a genomic knowledge store
//!
//! Callers name the output columns they want and the conditions those rows
//! must meet. The crate decides which tables to read, how to connect them
//! and which predicates apply, then renders one SQLite query:
//! - Alias, condition and column catalog ([`catalog`])
//! - Join graph search and plan assembly ([`query_planner`])
//! - Deterministic SQL rendering ([`sql_generator`])
//! - Knowledge store, result streaming and de-duplication ([`store`])
//! - Zone tables for interval overlap joins ([`zone_index`])

pub mod catalog;
pub mod config;
pub mod errors;
pub mod query_planner;
pub mod sql_generator;
pub mod store;
pub mod zone_index;

pub use errors::AnnographError;
