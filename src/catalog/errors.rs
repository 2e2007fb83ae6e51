//! # Catalog Error Types
//!
//! Errors raised while building a catalog, either the built-in knowledge
//! base catalog or one loaded from YAML. A catalog that builds is total:
//! every alias it mentions is bound and every template parses.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Unknown namespace `{namespace}`")]
    UnknownNamespace { namespace: String },
    #[error("Unknown alias `{alias}` referenced by {referenced_by}")]
    UnknownAlias { alias: String, referenced_by: String },
    #[error("Unknown placeholder `{{{name}}}` in template: {template}")]
    UnknownPlaceholder { name: String, template: String },
    #[error("Unbalanced brace at byte {offset} in template: {template}")]
    UnbalancedBrace { offset: usize, template: String },
    #[error("Single-alias template may not use the right-hand alias marker: {template}")]
    RightMarkerInSingleAlias { template: String },
    #[error("Column `{column}` has no sources")]
    EmptyColumn { column: String },
    #[error("Condition group has no aliases")]
    EmptyAliasSet,
    #[error("Failed to read catalog file: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse catalog: {error}")]
    ConfigParseError { error: String },
}

impl CatalogError {
    /// Create an UnknownAlias error naming the catalog entry that used it
    pub fn unknown_alias_with_context(
        alias: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        CatalogError::UnknownAlias {
            alias: alias.into(),
            referenced_by: context.into(),
        }
    }

    /// Create a ConfigParseError with context information
    pub fn parse_error_with_context(error: impl Into<String>, context: impl Into<String>) -> Self {
        CatalogError::ConfigParseError {
            error: format!("{}\n  Context: {}", error.into(), context.into()),
        }
    }
}
