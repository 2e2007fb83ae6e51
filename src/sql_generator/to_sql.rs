use std::collections::{BTreeMap, BTreeSet};

use super::{RenderOptions, ROW_ID_COLUMN};
use crate::catalog::TableRef;
use crate::query_planner::{LeftJoinItems, QueryPlan, RowIdentity, SelectItem};

pub trait ToSql {
    fn to_sql(&self) -> String;
}

impl ToSql for SelectItem {
    fn to_sql(&self) -> String {
        format!(
            "{} AS {}",
            self.expression.as_deref().unwrap_or("NULL"),
            self.column
        )
    }
}

/// LEFT JOINs need the alias table map, so they render through this view.
struct LeftJoinsWithTables<'a> {
    joins: &'a LeftJoinItems,
    tables: &'a BTreeMap<String, TableRef>,
}

impl ToSql for LeftJoinsWithTables<'_> {
    fn to_sql(&self) -> String {
        let mut sql = String::new();
        for join in &self.joins.0 {
            sql.push_str(&format!(
                "LEFT JOIN {}\n",
                table_with_alias(&join.alias, self.tables)
            ));
            if !join.conditions.is_empty() {
                sql.push_str(&format!("  ON {}\n", conjunction(&join.conditions)));
            }
        }
        sql
    }
}

/// One `COALESCE` per identity column.
fn identity_parts(identity: &RowIdentity) -> Vec<String> {
    identity
        .columns
        .iter()
        .map(|column| format!("COALESCE({}.{},'')", identity.alias, column))
        .collect()
}

fn table_with_alias(alias: &str, tables: &BTreeMap<String, TableRef>) -> String {
    match tables.get(alias) {
        Some(table) => format!("{} AS {}", table.quoted(), alias),
        None => alias.to_string(),
    }
}

/// Sorted by construction.
fn conjunction(conditions: &BTreeSet<String>) -> String {
    conditions
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n  AND ")
}

pub(super) fn render_plan_to_sql(plan: &QueryPlan, options: &RenderOptions) -> String {
    let columns: Vec<String> = plan.select.iter().map(ToSql::to_sql).collect();
    let mut sql = format!("SELECT {}\n", columns.join(",\n  "));

    let mut order_by = plan.order_by.clone();
    let mut row_ids: Vec<String> = Vec::new();
    for identity in &plan.row_ids {
        row_ids.extend(identity_parts(identity));
        if options.sort_row_ids {
            order_by.extend(
                identity
                    .columns
                    .iter()
                    .map(|column| format!("({}.{} IS NULL)", identity.alias, column)),
            );
        }
    }
    if options.split_row_ids {
        for (n, part) in row_ids.iter().enumerate() {
            sql.push_str(&format!("  , {} AS {}_{}\n", part, ROW_ID_COLUMN, n));
        }
    }
    if !options.omit_row_id {
        if row_ids.is_empty() {
            sql.push_str(&format!("  , NULL AS {}\n", ROW_ID_COLUMN));
        } else {
            sql.push_str(&format!("  , ({}) AS {}\n", row_ids.join("||'_'||"), ROW_ID_COLUMN));
        }
    }

    if !plan.from.is_empty() {
        let from: Vec<String> = plan
            .from
            .iter()
            .map(|alias| table_with_alias(alias, &plan.tables))
            .collect();
        sql.push_str(&format!("FROM {}\n", from.join(",\n  ")));
    }
    sql.push_str(
        &LeftJoinsWithTables {
            joins: &plan.left_joins,
            tables: &plan.tables,
        }
        .to_sql(),
    );
    if !plan.where_clause.is_empty() {
        sql.push_str(&format!("WHERE {}\n", conjunction(&plan.where_clause)));
    }
    if !plan.group_by.is_empty() {
        sql.push_str(&format!("GROUP BY {}\n", plan.group_by.join(", ")));
    }
    if !plan.having.is_empty() {
        sql.push_str(&format!("HAVING {}\n", conjunction(&plan.having)));
    }
    if !order_by.is_empty() {
        sql.push_str(&format!("ORDER BY {}\n", order_by.join(", ")));
    }
    if let Some(limit) = plan.limit {
        sql.push_str(&format!("LIMIT {}\n", limit));
    }
    sql
}
