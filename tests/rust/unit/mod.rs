//! Unit tests - no populated knowledge database required
//!
//! These tests exercise catalogs and compiled plans directly.

mod catalog_yaml_tests;
mod knowledge_base_tests;
