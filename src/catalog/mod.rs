//! # Alias, Condition and Column Catalog
//!
//! Static description of the knowledge store as the query compiler sees it.
//!
//! ## Architecture
//!
//! - **Aliases** bind a short symbolic name to one `(namespace, table)` pair.
//!   Several aliases may share a table under different roles (the left and
//!   right side of a pairwise model).
//! - **Conditions** are predicate templates: single-alias constraints, join
//!   rules (the edges of the join graph) and pair rules (applied between
//!   included aliases, never used for connectivity).
//! - **Columns** map each logical output column to its sources, most
//!   preferred first.
//!
//! Templates are parsed when the catalog is built; see [`template`].
//! [`FilterState`] is the dynamic half: which input tables hold data.

pub mod config;
pub mod errors;
pub mod filter_state;
mod knowledge_base;
pub mod namespace;
mod registry;
pub mod template;

pub use config::CatalogConfig;
pub use errors::CatalogError;
pub use filter_state::{FilterState, TableFilter};
pub use knowledge_base::knowledge_base_config;
pub use namespace::{Namespace, TableRef, REGION_ZONE_TABLE};
pub use registry::{AliasBinding, Catalog, ColumnSource, ConditionGroup, JoinRule};
pub use template::{MissingParameter, Placeholder, Template, TemplateParams};
