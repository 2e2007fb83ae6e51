//! Integration tests - compiled plans run against a SQLite knowledge store
//!
//! Every test builds its own in-memory store, so they run in parallel.

mod join_scenario_tests;
mod knowledge_store_tests;
