use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::PlanError;
use crate::catalog::{Namespace, TableFilter};

/// Purpose of a query; decides how FROM is seeded and how missing columns
/// are joined in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Filter,
    Annotate,
    /// Gene side of a model; group and source tables are not seeded.
    ModelGene,
    /// Group side of a model; only group and source tables are seeded.
    ModelGroup,
    Model,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Filter => "filter",
            Mode::Annotate => "annotate",
            Mode::ModelGene => "modelgene",
            Mode::ModelGroup => "modelgroup",
            Mode::Model => "model",
        }
    }

    /// Whether a table of this name may seed FROM in this mode.
    pub fn seeds_table(&self, table: &str) -> bool {
        let group_side = matches!(table, "group" | "source");
        match self {
            Mode::ModelGene => !group_side,
            Mode::ModelGroup => group_side,
            _ => true,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "filter" => Ok(Mode::Filter),
            "annotate" => Ok(Mode::Annotate),
            "modelgene" => Ok(Mode::ModelGene),
            "modelgroup" => Ok(Mode::ModelGroup),
            "model" => Ok(Mode::Model),
            _ => Err(PlanError::UnknownMode {
                mode: s.to_string(),
            }),
        }
    }
}

/// Operator suffixes applied to one output column, e.g. `"!= 0"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HavingCondition {
    pub column: String,
    pub suffixes: Vec<String>,
}

/// Operator suffixes applied to `alias.column`, e.g. `"= ?1"`. The alias
/// is always hard-joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereCondition {
    pub alias: String,
    pub column: String,
    pub suffixes: Vec<String>,
}

/// Everything the compiler needs to know about one query.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileRequest {
    pub mode: Mode,
    pub focus: Namespace,
    pub select: Vec<String>,
    pub having: Vec<HavingCondition>,
    pub where_conditions: Vec<WhereCondition>,
    /// Shift positions into the configured coordinate base.
    pub apply_offset: bool,
    /// Overrides the live input tables that may seed FROM.
    pub from_filter: Option<TableFilter>,
    /// Overrides the live input tables that may take part in joins.
    pub join_filter: Option<TableFilter>,
    /// Let user knowledge shadow reference tables of the same name.
    pub user_knowledge: bool,
}

impl CompileRequest {
    pub fn new(mode: Mode, focus: Namespace) -> Self {
        CompileRequest {
            mode,
            focus,
            select: Vec::new(),
            having: Vec::new(),
            where_conditions: Vec::new(),
            apply_offset: false,
            from_filter: None,
            join_filter: None,
            user_knowledge: false,
        }
    }

    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn having(mut self, column: &str, suffix: &str) -> Self {
        match self.having.iter_mut().find(|h| h.column == column) {
            Some(existing) => existing.suffixes.push(suffix.to_string()),
            None => self.having.push(HavingCondition {
                column: column.to_string(),
                suffixes: vec![suffix.to_string()],
            }),
        }
        self
    }

    pub fn where_column(mut self, alias: &str, column: &str, suffix: &str) -> Self {
        match self
            .where_conditions
            .iter_mut()
            .find(|w| w.alias == alias && w.column == column)
        {
            Some(existing) => existing.suffixes.push(suffix.to_string()),
            None => self.where_conditions.push(WhereCondition {
                alias: alias.to_string(),
                column: column.to_string(),
                suffixes: vec![suffix.to_string()],
            }),
        }
        self
    }

    pub fn apply_offset(mut self, apply: bool) -> Self {
        self.apply_offset = apply;
        self
    }

    pub fn from_filter(mut self, filter: TableFilter) -> Self {
        self.from_filter = Some(filter);
        self
    }

    pub fn join_filter(mut self, filter: TableFilter) -> Self {
        self.join_filter = Some(filter);
        self
    }

    pub fn user_knowledge(mut self, enabled: bool) -> Self {
        self.user_knowledge = enabled;
        self
    }

    /// Output columns followed by having columns, in request order.
    pub fn requested_columns(&self) -> impl Iterator<Item = &str> {
        self.select
            .iter()
            .map(String::as_str)
            .chain(self.having.iter().map(|h| h.column.as_str()))
    }
}
