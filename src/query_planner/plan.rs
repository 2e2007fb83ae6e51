use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::catalog::TableRef;

/// One requested output column; `expression` stays `None` when no source
/// alias made it into the plan and renders as `NULL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectItem {
    pub column: String,
    pub expression: Option<String>,
}

/// Identity columns contributed by one alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowIdentity {
    pub alias: String,
    pub columns: BTreeSet<String>,
}

/// An optionally joined alias with its ON conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeftJoin {
    pub alias: String,
    pub conditions: BTreeSet<String>,
}

/// LEFT JOIN entries in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeftJoinItems(pub Vec<LeftJoin>);

impl LeftJoinItems {
    pub fn contains(&self, alias: &str) -> bool {
        self.position(alias).is_some()
    }

    pub fn position(&self, alias: &str) -> Option<usize> {
        self.0.iter().position(|join| join.alias == alias)
    }

    /// Append `alias` unless it is already joined.
    pub fn push(&mut self, alias: &str) {
        if !self.contains(alias) {
            self.0.push(LeftJoin {
                alias: alias.to_string(),
                conditions: BTreeSet::new(),
            });
        }
    }

    pub fn conditions_mut(&mut self, alias: &str) -> Option<&mut BTreeSet<String>> {
        self.0
            .iter_mut()
            .find(|join| join.alias == alias)
            .map(|join| &mut join.conditions)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|join| join.alias.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Compiled query, every template already rendered. Callers may append
/// GROUP BY, HAVING, ORDER BY and LIMIT before rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub select: Vec<SelectItem>,
    pub row_ids: Vec<RowIdentity>,
    pub from: BTreeSet<String>,
    pub left_joins: LeftJoinItems,
    pub where_clause: BTreeSet<String>,
    pub group_by: Vec<String>,
    pub having: BTreeSet<String>,
    pub order_by: Vec<String>,
    pub limit: Option<u64>,
    /// Table of every alias in FROM or LEFT JOIN.
    pub tables: BTreeMap<String, TableRef>,
}

impl QueryPlan {
    pub fn new(columns: &[String]) -> Self {
        QueryPlan {
            select: columns
                .iter()
                .map(|column| SelectItem {
                    column: column.clone(),
                    expression: None,
                })
                .collect(),
            row_ids: Vec::new(),
            from: BTreeSet::new(),
            left_joins: LeftJoinItems::default(),
            where_clause: BTreeSet::new(),
            group_by: Vec::new(),
            having: BTreeSet::new(),
            order_by: Vec::new(),
            limit: None,
            tables: BTreeMap::new(),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.select.iter().map(|item| item.column.as_str())
    }

    pub fn is_included(&self, alias: &str) -> bool {
        self.from.contains(alias) || self.left_joins.contains(alias)
    }

    pub fn add_row_id(&mut self, alias: &str, column: &str) {
        match self.row_ids.iter_mut().find(|r| r.alias == alias) {
            Some(identity) => {
                identity.columns.insert(column.to_string());
            }
            None => self.row_ids.push(RowIdentity {
                alias: alias.to_string(),
                columns: BTreeSet::from([column.to_string()]),
            }),
        }
    }

    /// Attach conditions that concern `alias`: to WHERE when it is
    /// hard-joined, to its ON clause when it is optional.
    pub fn constrain<I>(&mut self, alias: &str, conditions: I)
    where
        I: IntoIterator<Item = String>,
    {
        if self.from.contains(alias) {
            self.where_clause.extend(conditions);
        } else if let Some(on) = self.left_joins.conditions_mut(alias) {
            on.extend(conditions);
        }
    }

    /// Columns that never found a source; they render as `NULL`.
    pub fn unassigned_columns(&self) -> impl Iterator<Item = &str> {
        self.select
            .iter()
            .filter(|item| item.expression.is_none())
            .map(|item| item.column.as_str())
    }

    pub fn with_group_by(mut self, expressions: Vec<String>) -> Self {
        self.group_by = expressions;
        self
    }

    pub fn with_having(mut self, condition: impl Into<String>) -> Self {
        self.having.insert(condition.into());
        self
    }

    pub fn with_order_by(mut self, expressions: Vec<String>) -> Self {
        self.order_by = expressions;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl fmt::Display for QueryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n---- QueryPlan ----")?;
        writeln!(f, "SELECT:")?;
        for item in &self.select {
            writeln!(
                f,
                "  {} <- {}",
                item.column,
                item.expression.as_deref().unwrap_or("NULL")
            )?;
        }
        writeln!(f, "ROW ID:")?;
        for identity in &self.row_ids {
            let columns: Vec<&str> = identity.columns.iter().map(String::as_str).collect();
            writeln!(f, "  {}: {}", identity.alias, columns.join(", "))?;
        }
        writeln!(f, "FROM:")?;
        for alias in &self.from {
            writeln!(f, "  {}", describe(alias, self.tables.get(alias)))?;
        }
        writeln!(f, "LEFT JOIN:")?;
        for join in &self.left_joins.0 {
            writeln!(f, "  {}", describe(&join.alias, self.tables.get(&join.alias)))?;
            for condition in &join.conditions {
                writeln!(f, "    ON {}", condition)?;
            }
        }
        writeln!(f, "WHERE:")?;
        for condition in &self.where_clause {
            writeln!(f, "  {}", condition)?;
        }
        if !self.group_by.is_empty() {
            writeln!(f, "GROUP BY: {}", self.group_by.join(", "))?;
        }
        for condition in &self.having {
            writeln!(f, "HAVING: {}", condition)?;
        }
        if !self.order_by.is_empty() {
            writeln!(f, "ORDER BY: {}", self.order_by.join(", "))?;
        }
        if let Some(limit) = self.limit {
            writeln!(f, "LIMIT: {}", limit)?;
        }
        writeln!(f, "-------------------")
    }
}

fn describe(alias: &str, table: Option<&TableRef>) -> String {
    match table {
        Some(table) => format!("{} ({})", alias, table),
        None => alias.to_string(),
    }
}
