use thiserror::Error;

use crate::catalog::MissingParameter;

/// Compile-time failures. None of these are recoverable by retrying: they
/// describe a request the catalog and current filter state cannot answer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlanError {
    #[error("internal query with unsupported column '{column}'")]
    UnsupportedColumn { column: String },

    #[error("unknown query mode '{mode}'")]
    UnknownMode { mode: String },

    #[error("namespace '{focus}' cannot be a query focus")]
    UnknownFocus { focus: String },

    #[error("internal query with no outputs or conditions")]
    NoOutputsOrConditions,

    #[error("could not find a join path for starting tables: {}", aliases.join(", "))]
    NoJoinPath { aliases: Vec<String> },

    #[error("could not find a source table for output columns: {}", columns.join(", "))]
    NoSourceTable { columns: Vec<String> },

    #[error("could not join source table {alias} for output column {column}")]
    CannotJoinSource { alias: String, column: String },

    #[error("template parameter '{{{placeholder}}}' has no value")]
    MissingParameter { placeholder: String },

    #[error("invalid condition on {target}: {error}")]
    InvalidCondition { target: String, error: String },
}

impl From<MissingParameter> for PlanError {
    fn from(missing: MissingParameter) -> Self {
        PlanError::MissingParameter {
            placeholder: missing.0.name().to_string(),
        }
    }
}
