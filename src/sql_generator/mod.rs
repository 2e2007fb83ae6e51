//! SQL text for compiled query plans.
//!
//! Rendering is a pure function of the plan and [`RenderOptions`]: WHERE,
//! HAVING and ON conditions are emitted in sorted order and FROM aliases
//! sorted by name, so the same plan always yields byte-identical SQL.

use crate::query_planner::QueryPlan;

mod to_sql;

pub use to_sql::ToSql;

/// Name of the synthesized identity column; always the last column.
pub const ROW_ID_COLUMN: &str = "_rowid";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Leave out the `_rowid` identity column.
    pub omit_row_id: bool,
    /// Order rows lacking an identity part last.
    pub sort_row_ids: bool,
    /// Add one `_rowid_<n>` column per identity part, for debugging.
    pub split_row_ids: bool,
}

impl RenderOptions {
    pub fn with_sort_row_ids(mut self, sort: bool) -> Self {
        self.sort_row_ids = sort;
        self
    }

    pub fn with_split_row_ids(mut self, split: bool) -> Self {
        self.split_row_ids = split;
        self
    }

    pub fn without_row_id(mut self) -> Self {
        self.omit_row_id = true;
        self
    }
}

pub fn generate_sql(plan: &QueryPlan, options: &RenderOptions) -> String {
    to_sql::render_plan_to_sql(plan, options)
}
