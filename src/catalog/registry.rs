use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::config::{CatalogConfig, ColumnSourceDef, ConditionDef, JoinDef};
use super::errors::CatalogError;
use super::namespace::TableRef;
use super::template::{Placeholder, Template};

/// An alias and the physical table it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasBinding {
    pub alias: String,
    pub table: TableRef,
    pub superseded_by: Option<TableRef>,
}

/// Predicates applied to any included alias of the set, on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionGroup {
    pub aliases: BTreeSet<String>,
    pub templates: Vec<Template>,
}

/// Predicates between two alias sets. Every ordered pair `(l, r)` with
/// `l` from `left`, `r` from `right` and `l != r` is covered; a rule
/// written over a single set has `left == right`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinRule {
    pub left: BTreeSet<String>,
    pub right: BTreeSet<String>,
    pub templates: Vec<Template>,
}

impl JoinRule {
    pub fn alias_pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.left.iter().flat_map(move |l| {
            self.right
                .iter()
                .filter(move |r| *r != l)
                .map(move |r| (l.as_str(), r.as_str()))
        })
    }
}

/// One way of producing an output column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSource {
    pub alias: String,
    /// Column of `alias` identifying the contributing row.
    pub row_id: String,
    pub expression: Template,
    /// Extra predicates on `alias` whenever this source is chosen.
    pub conditions: Vec<Template>,
}

/// Immutable alias, condition and column registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    aliases: BTreeMap<String, AliasBinding>,
    conditions: Vec<ConditionGroup>,
    joins: Vec<JoinRule>,
    pairs: Vec<JoinRule>,
    columns: BTreeMap<String, Vec<ColumnSource>>,
}

impl Catalog {
    pub fn from_config(config: CatalogConfig) -> Result<Self, CatalogError> {
        let aliases: BTreeMap<String, AliasBinding> = config
            .aliases
            .into_iter()
            .map(|(alias, def)| {
                let binding = AliasBinding {
                    alias: alias.clone(),
                    table: TableRef::new(def.namespace, def.table),
                    superseded_by: def.superseded_by,
                };
                (alias, binding)
            })
            .collect();

        let conditions = config
            .conditions
            .into_iter()
            .map(|def| build_condition_group(&aliases, def))
            .collect::<Result<Vec<_>, _>>()?;
        let joins = config
            .joins
            .into_iter()
            .map(|def| build_join_rule(&aliases, def, "join"))
            .collect::<Result<Vec<_>, _>>()?;
        let pairs = config
            .pairs
            .into_iter()
            .map(|def| build_join_rule(&aliases, def, "pair"))
            .collect::<Result<Vec<_>, _>>()?;

        let mut columns = BTreeMap::new();
        for (column, defs) in config.columns {
            if defs.is_empty() {
                return Err(CatalogError::EmptyColumn { column });
            }
            let sources = defs
                .into_iter()
                .map(|def| build_column_source(&aliases, &column, def))
                .collect::<Result<Vec<_>, _>>()?;
            columns.insert(column, sources);
        }

        log::debug!(
            "Catalog built: {} aliases, {} joins, {} pairs, {} columns",
            aliases.len(),
            joins.len(),
            pairs.len(),
            columns.len()
        );

        Ok(Catalog {
            aliases,
            conditions,
            joins,
            pairs,
            columns,
        })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        Self::from_config(CatalogConfig::from_yaml_str(yaml)?)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        Self::from_config(CatalogConfig::from_yaml_file(path)?)
    }

    pub fn binding(&self, alias: &str) -> Option<&AliasBinding> {
        self.aliases.get(alias)
    }

    /// All bindings, ordered by alias name.
    pub fn bindings(&self) -> impl Iterator<Item = &AliasBinding> {
        self.aliases.values()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    pub fn conditions(&self) -> &[ConditionGroup] {
        &self.conditions
    }

    pub fn joins(&self) -> &[JoinRule] {
        &self.joins
    }

    pub fn pairs(&self) -> &[JoinRule] {
        &self.pairs
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Sources of `column`, most preferred first.
    pub fn sources(&self, column: &str) -> Option<&[ColumnSource]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}

fn alias_set(
    aliases: &BTreeMap<String, AliasBinding>,
    names: Vec<String>,
    context: &str,
) -> Result<BTreeSet<String>, CatalogError> {
    if names.is_empty() {
        return Err(CatalogError::EmptyAliasSet);
    }
    names
        .into_iter()
        .map(|name| {
            if aliases.contains_key(&name) {
                Ok(name)
            } else {
                Err(CatalogError::unknown_alias_with_context(name, context))
            }
        })
        .collect()
}

fn parse_single_alias(template: &str) -> Result<Template, CatalogError> {
    let parsed = Template::parse(template)?;
    if parsed.uses(Placeholder::Right) {
        return Err(CatalogError::RightMarkerInSingleAlias {
            template: template.to_string(),
        });
    }
    Ok(parsed)
}

fn build_condition_group(
    aliases: &BTreeMap<String, AliasBinding>,
    def: ConditionDef,
) -> Result<ConditionGroup, CatalogError> {
    let context = format!("condition {:?}", def.templates);
    Ok(ConditionGroup {
        aliases: alias_set(aliases, def.aliases, &context)?,
        templates: def
            .templates
            .iter()
            .map(|t| parse_single_alias(t))
            .collect::<Result<_, _>>()?,
    })
}

fn build_join_rule(
    aliases: &BTreeMap<String, AliasBinding>,
    def: JoinDef,
    kind: &str,
) -> Result<JoinRule, CatalogError> {
    let context = format!("{} {:?}", kind, def.templates);
    let left = alias_set(aliases, def.left, &context)?;
    let right = match def.right {
        Some(right) => alias_set(aliases, right, &context)?,
        None => left.clone(),
    };
    Ok(JoinRule {
        left,
        right,
        templates: def
            .templates
            .iter()
            .map(|t| Template::parse(t))
            .collect::<Result<_, _>>()?,
    })
}

fn build_column_source(
    aliases: &BTreeMap<String, AliasBinding>,
    column: &str,
    def: ColumnSourceDef,
) -> Result<ColumnSource, CatalogError> {
    if !aliases.contains_key(&def.alias) {
        return Err(CatalogError::unknown_alias_with_context(
            def.alias,
            format!("column `{}`", column),
        ));
    }
    Ok(ColumnSource {
        expression: parse_single_alias(&def.expression)?,
        conditions: def
            .conditions
            .iter()
            .map(|t| parse_single_alias(t))
            .collect::<Result<_, _>>()?,
        alias: def.alias,
        row_id: def.row_id,
    })
}
