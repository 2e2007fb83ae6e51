//! Catalog definitions in their declarative form.
//!
//! A catalog is written as YAML (or assembled in code through the same
//! types) and validated into a [`Catalog`](super::Catalog):
//!
//! ```yaml
//! aliases:
//!   A: { namespace: main, table: locus }
//!   B: { namespace: db, table: region }
//! conditions:                 # single-alias predicates
//!   - aliases: [B]
//!     templates: ["{L}.posMin <= {L}.posMax"]
//! joins:                      # edges of the join graph
//!   - left: [A]
//!     right: [B]              # omit `right` to join any two aliases of `left`
//!     templates:
//!       - "{L}.chr = {R}.chr"
//!       - "{L}.pos >= {R}.posMin"
//!       - "{L}.pos <= {R}.posMax"
//! pairs: []                   # applied between included aliases, never edges
//! columns:
//!   locus_label:
//!     - { alias: A, row_id: rowid, expression: "{L}.label" }
//!   region_label:
//!     - { alias: B, row_id: rowid, expression: "{L}.label" }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::errors::CatalogError;
use super::namespace::{Namespace, TableRef};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AliasDef {
    pub namespace: Namespace,
    pub table: String,
    /// Table whose presence keeps this alias out of the seeded FROM set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<TableRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionDef {
    pub aliases: Vec<String>,
    pub templates: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JoinDef {
    pub left: Vec<String>,
    /// Absent means "any two distinct aliases of `left`".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Vec<String>>,
    pub templates: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnSourceDef {
    pub alias: String,
    pub row_id: String,
    pub expression: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
}

/// Complete declarative catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    pub aliases: BTreeMap<String, AliasDef>,
    #[serde(default)]
    pub conditions: Vec<ConditionDef>,
    #[serde(default)]
    pub joins: Vec<JoinDef>,
    #[serde(default)]
    pub pairs: Vec<JoinDef>,
    /// Column name to sources, most preferred first.
    pub columns: BTreeMap<String, Vec<ColumnSourceDef>>,
}

impl CatalogConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        serde_yaml::from_str(yaml).map_err(|e| CatalogError::ConfigParseError {
            error: e.to_string(),
        })
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| CatalogError::ConfigReadError {
            error: format!("{}: {}", path.display(), e),
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            CatalogError::parse_error_with_context(
                e.to_string(),
                format!("While loading catalog {}", path.display()),
            )
        })
    }

    pub fn alias(mut self, alias: &str, namespace: Namespace, table: &str) -> Self {
        self.aliases.insert(
            alias.to_string(),
            AliasDef {
                namespace,
                table: table.to_string(),
                superseded_by: None,
            },
        );
        self
    }

    pub fn superseded_alias(
        mut self,
        alias: &str,
        namespace: Namespace,
        table: &str,
        superseded_by: TableRef,
    ) -> Self {
        self.aliases.insert(
            alias.to_string(),
            AliasDef {
                namespace,
                table: table.to_string(),
                superseded_by: Some(superseded_by),
            },
        );
        self
    }

    pub fn condition(mut self, aliases: &[&str], templates: &[&str]) -> Self {
        self.conditions.push(ConditionDef {
            aliases: owned(aliases),
            templates: owned(templates),
        });
        self
    }

    /// Join between any two distinct aliases of one set.
    pub fn join_within(mut self, aliases: &[&str], templates: &[&str]) -> Self {
        self.joins.push(JoinDef {
            left: owned(aliases),
            right: None,
            templates: owned(templates),
        });
        self
    }

    pub fn join(mut self, left: &[&str], right: &[&str], templates: &[&str]) -> Self {
        self.joins.push(JoinDef {
            left: owned(left),
            right: Some(owned(right)),
            templates: owned(templates),
        });
        self
    }

    pub fn pair_within(mut self, aliases: &[&str], templates: &[&str]) -> Self {
        self.pairs.push(JoinDef {
            left: owned(aliases),
            right: None,
            templates: owned(templates),
        });
        self
    }

    pub fn pair(mut self, left: &[&str], right: &[&str], templates: &[&str]) -> Self {
        self.pairs.push(JoinDef {
            left: owned(left),
            right: Some(owned(right)),
            templates: owned(templates),
        });
        self
    }

    pub fn column(mut self, column: &str, sources: Vec<ColumnSourceDef>) -> Self {
        self.columns.insert(column.to_string(), sources);
        self
    }
}

/// Shorthand for a column source without extra conditions.
pub fn source(alias: &str, row_id: &str, expression: &str) -> ColumnSourceDef {
    ColumnSourceDef {
        alias: alias.to_string(),
        row_id: row_id.to_string(),
        expression: expression.to_string(),
        conditions: Vec::new(),
    }
}

/// Column source that also constrains its alias.
pub fn source_where(
    alias: &str,
    row_id: &str,
    expression: &str,
    conditions: &[&str],
) -> ColumnSourceDef {
    ColumnSourceDef {
        conditions: owned(conditions),
        ..source(alias, row_id, expression)
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
