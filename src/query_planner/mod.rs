//! # Query Compiler
//!
//! Turns a [`CompileRequest`] into a [`QueryPlan`].
//!
//! ## Architecture
//!
//! 1. Every catalog alias whose table can currently take part becomes a node
//!    of a [`JoinGraph`]; join rules become its edges.
//! 2. The aliases a query must read (condition targets, plus the focus input
//!    tables that hold data) seed FROM and are connected through the fewest
//!    extra aliases.
//! 3. Output columns not yet provided are reached from that set: by hard
//!    joins in filter modes, by LEFT JOINs in annotate mode.
//! 4. Constraint, join and pair templates whose aliases are all included
//!    are rendered into WHERE or the ON clause of the latest LEFT JOIN they
//!    touch.
//!
//! Compilation reads the catalog and filter state without changing them.

mod compiler;
mod errors;
pub mod join_graph;
mod params;
mod plan;
mod types;

pub use compiler::QueryCompiler;
pub use errors::PlanError;
pub use join_graph::{BitSet, JoinGraph};
pub use params::QueryParameters;
pub use plan::{LeftJoin, LeftJoinItems, QueryPlan, RowIdentity, SelectItem};
pub use types::{CompileRequest, HavingCondition, Mode, WhereCondition};
