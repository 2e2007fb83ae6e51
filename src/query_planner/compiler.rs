//! Query compiler: request + catalog + filter state → [`QueryPlan`].
//!
//! ## Stages
//!
//! 1. Build the join graph from live tables and find, for each requested
//!    column, the aliases that can supply it.
//! 2. Seed FROM from pinned aliases and live input tables of the focus.
//! 3. Connect FROM into one join tree.
//! 4. Join in sources for columns FROM cannot supply: per column as LEFT
//!    JOINs in annotate mode, as one hard-joined covering set otherwise.
//! 5. Assign every column its most preferred included source, then inject
//!    single-alias, join and pair conditions.

use crate::catalog::{Catalog, FilterState, Namespace, TableFilter, Template, TemplateParams};

use super::errors::PlanError;
use super::join_graph::{BitSet, JoinGraph};
use super::params::QueryParameters;
use super::plan::QueryPlan;
use super::types::{CompileRequest, Mode};

/// Reference table holding SNP positions; unvalidated rows are excluded
/// unless configured otherwise.
const SNP_LOCUS_TABLE: &str = "snp_locus";

/// User knowledge counts as loaded once it has a source.
const USER_SOURCE_TABLE: &str = "source";

pub struct QueryCompiler<'a> {
    catalog: &'a Catalog,
    filter_state: &'a FilterState,
    parameters: &'a QueryParameters,
}

/// Where a pair condition lands.
enum Attach<'s> {
    Where,
    On(&'s str),
}

impl<'a> QueryCompiler<'a> {
    pub fn new(
        catalog: &'a Catalog,
        filter_state: &'a FilterState,
        parameters: &'a QueryParameters,
    ) -> Self {
        QueryCompiler {
            catalog,
            filter_state,
            parameters,
        }
    }

    pub fn compile(&self, request: &CompileRequest) -> Result<QueryPlan, PlanError> {
        if !request.focus.has_input_schema() {
            return Err(PlanError::UnknownFocus {
                focus: request.focus.to_string(),
            });
        }
        log::debug!(
            "compile(mode={}, focus={}, select={:?}, having={:?}, where={:?})",
            request.mode,
            request.focus,
            request.select,
            request.having,
            request.where_conditions
        );

        let inputs = [Namespace::Main, Namespace::Alt, Namespace::Cand];
        let from_filter = request
            .from_filter
            .clone()
            .unwrap_or_else(|| self.filter_state.table_filter(&inputs));
        let join_filter = request
            .join_filter
            .clone()
            .unwrap_or_else(|| self.filter_state.table_filter(&inputs));
        let knowledge = self.knowledge_filter(request.user_knowledge);

        let graph = JoinGraph::build(self.catalog, |binding| {
            knowledge.qualifies(&binding.table) || join_filter.qualifies(&binding.table)
        });
        log::debug!("join graph:\n{}", graph);

        // column -> candidate aliases, alias -> columns it can supply
        let columns = self.unique_columns(request)?;
        let mut column_aliases: Vec<Vec<usize>> = vec![Vec::new(); columns.len()];
        let mut alias_columns: Vec<BitSet> = vec![BitSet::new(columns.len()); graph.len()];
        for (ci, column) in columns.iter().enumerate() {
            for source in self.catalog.sources(column).unwrap_or_default() {
                let Some(ai) = graph.index_of(&source.alias) else {
                    continue;
                };
                if graph.has_edges(ai) {
                    if !column_aliases[ci].contains(&ai) {
                        column_aliases[ci].push(ai);
                    }
                    alias_columns[ai].insert(ci);
                }
            }
        }
        if column_aliases.iter().all(Vec::is_empty) {
            return Err(PlanError::NoOutputsOrConditions);
        }

        let mut from = self.seed_from(request, &graph, &from_filter)?;
        if from.is_empty() {
            from.insert(self.fallback_alias(&columns[0], &graph, &knowledge)?);
        }
        log::debug!("starting FROM = {:?}", graph.names_of(&from).collect::<Vec<_>>());

        if from.len() > 1 {
            from = graph.connect(&from).ok_or_else(|| PlanError::NoJoinPath {
                aliases: graph.names_of(&from).map(str::to_string).collect(),
            })?;
        }
        log::debug!("joined FROM = {:?}", graph.names_of(&from).collect::<Vec<_>>());

        let mut remaining = BitSet::new(columns.len());
        for (ci, aliases) in column_aliases.iter().enumerate() {
            if !aliases.is_empty() && !aliases.iter().any(|ai| from.contains(*ai)) {
                remaining.insert(ci);
            }
        }

        let mut left_joins: Vec<usize> = Vec::new();
        if request.mode == Mode::Annotate {
            let mut joined = graph.empty_set();
            loop {
                let next = remaining.iter().next();
                let Some(target) = next else {
                    break;
                };
                let alias = *column_aliases[target].first().ok_or_else(|| {
                    PlanError::NoSourceTable {
                        columns: vec![columns[target].clone()],
                    }
                })?;
                let cannot_join = || PlanError::CannotJoinSource {
                    alias: graph.name(alias).to_string(),
                    column: columns[target].clone(),
                };
                let mut path = graph
                    .shortest_path(alias, |i| from.contains(i) || joined.contains(i))
                    .ok_or_else(cannot_join)?;
                // the last node is already joined
                path.pop();
                if path.is_empty() {
                    return Err(cannot_join());
                }
                for ai in path.into_iter().rev() {
                    remaining.difference_with(&alias_columns[ai]);
                    remaining.remove(target);
                    joined.insert(ai);
                    left_joins.push(ai);
                }
                log::debug!(
                    "LEFT JOIN = {:?}",
                    left_joins.iter().map(|ai| graph.name(*ai)).collect::<Vec<_>>()
                );
            }
        } else if !remaining.is_empty() {
            let mut allowed = graph.empty_set();
            for (ai, binding) in self.catalog.bindings().enumerate() {
                let table = &binding.table;
                if !from.contains(ai)
                    && (knowledge.is_live(table.namespace, &table.table) || table.is_zone_table())
                {
                    allowed.insert(ai);
                }
            }
            let missing: Vec<String> = remaining.iter().map(|ci| columns[ci].clone()).collect();
            log::debug!("remaining columns = {:?}", missing);
            from = graph
                .cover(&from, &allowed, remaining, &alias_columns)
                .ok_or(PlanError::NoSourceTable { columns: missing })?;
        }
        log::debug!("final FROM = {:?}", graph.names_of(&from).collect::<Vec<_>>());

        let mut plan = QueryPlan::new(&request.select);
        for ai in from.iter() {
            plan.from.insert(graph.name(ai).to_string());
        }
        for ai in &left_joins {
            plan.left_joins.push(graph.name(*ai));
        }
        for binding in self.catalog.bindings() {
            if plan.is_included(&binding.alias) {
                plan.tables.insert(binding.alias.clone(), binding.table.clone());
            }
        }

        let params = self.parameters.template_params(request.apply_offset);
        self.assign_select(&mut plan, &params)?;
        self.assign_having(&mut plan, request, &params)?;
        self.assign_where(&mut plan, request, &params)?;
        self.inject_alias_conditions(&mut plan, &params)?;
        self.inject_pair_conditions(&mut plan, &params)?;

        let unassigned: Vec<&str> = plan.unassigned_columns().collect();
        if !unassigned.is_empty() {
            log::debug!("columns without an included source render as NULL: {:?}", unassigned);
        }
        log::debug!("{}", plan);
        Ok(plan)
    }

    /// Compiles `request` and, for filter queries while the caller has
    /// supplied user knowledge sources, a second plan reading the user
    /// copies of the shadowed reference tables. The executor merges both.
    pub fn compile_with_user_knowledge(
        &self,
        request: &CompileRequest,
    ) -> Result<(QueryPlan, Option<QueryPlan>), PlanError> {
        let primary = self.compile(request)?;
        let wants_user = request.mode == Mode::Filter
            && !request.user_knowledge
            && self.filter_state.is_live(Namespace::User, USER_SOURCE_TABLE);
        if !wants_user {
            return Ok((primary, None));
        }
        log::debug!("user knowledge is loaded, compiling the user knowledge query");
        let user = self.compile(&request.clone().user_knowledge(true))?;
        Ok((primary, Some(user)))
    }

    /// Every reference table is live. With user knowledge, a user table
    /// replaces the reference table of the same name.
    fn knowledge_filter(&self, user_knowledge: bool) -> TableFilter {
        let mut filter = TableFilter::new();
        for binding in self.catalog.bindings() {
            if binding.table.namespace == Namespace::Db {
                filter.insert(Namespace::Db, &binding.table.table);
            }
        }
        if user_knowledge {
            for binding in self.catalog.bindings() {
                let table = &binding.table.table;
                if binding.table.namespace == Namespace::User
                    && filter.is_live(Namespace::Db, table)
                {
                    filter.remove(Namespace::Db, table);
                    filter.insert(Namespace::User, table);
                }
            }
        }
        filter
    }

    fn unique_columns(&self, request: &CompileRequest) -> Result<Vec<String>, PlanError> {
        let mut columns: Vec<String> = Vec::new();
        for column in request.requested_columns() {
            if !self.catalog.has_column(column) {
                return Err(PlanError::UnsupportedColumn {
                    column: column.to_string(),
                });
            }
            if !columns.iter().any(|c| c == column) {
                columns.push(column.to_string());
            }
        }
        Ok(columns)
    }

    fn seed_from(
        &self,
        request: &CompileRequest,
        graph: &JoinGraph,
        from_filter: &TableFilter,
    ) -> Result<BitSet, PlanError> {
        let alternate_model_filtering = self.parameters.config.alternate_model_filtering;
        let mut from = graph.empty_set();

        for condition in &request.where_conditions {
            let ai = graph
                .index_of(&condition.alias)
                .ok_or_else(|| PlanError::InvalidCondition {
                    target: format!("{}.{}", condition.alias, condition.column),
                    error: "unknown alias".to_string(),
                })?;
            from.insert(ai);
        }

        for (ai, binding) in self.catalog.bindings().enumerate() {
            let table = &binding.table;
            if !from_filter.qualifies(table) {
                continue;
            }
            let in_focus = table.namespace == request.focus
                || (table.namespace == Namespace::Main
                    && request.focus == Namespace::Alt
                    && request.mode != Mode::Annotate
                    && !alternate_model_filtering);
            if !in_focus || !request.mode.seeds_table(&table.table) {
                continue;
            }
            if let Some(preferred) = &binding.superseded_by {
                if alternate_model_filtering
                    || from_filter.is_live(preferred.namespace, &preferred.table)
                {
                    continue;
                }
            }
            from.insert(ai);
        }
        Ok(from)
    }

    /// Least preferred reference-side source of the first column.
    fn fallback_alias(
        &self,
        column: &str,
        graph: &JoinGraph,
        knowledge: &TableFilter,
    ) -> Result<usize, PlanError> {
        self.catalog
            .sources(column)
            .unwrap_or_default()
            .iter()
            .filter(|source| {
                self.catalog
                    .binding(&source.alias)
                    .is_some_and(|b| knowledge.is_live(b.table.namespace, &b.table.table))
            })
            .filter_map(|source| graph.index_of(&source.alias))
            .last()
            .ok_or_else(|| PlanError::NoSourceTable {
                columns: vec![column.to_string()],
            })
    }

    fn assign_select(&self, plan: &mut QueryPlan, params: &TemplateParams) -> Result<(), PlanError> {
        for i in 0..plan.select.len() {
            let column = plan.select[i].column.clone();
            let sources = self.catalog.sources(&column).unwrap_or_default();
            let Some(source) = sources.iter().find(|s| plan.is_included(&s.alias)) else {
                continue;
            };
            let alias = source.alias.as_str();
            plan.add_row_id(alias, &source.row_id);
            plan.select[i].expression = Some(source.expression.render(params, Some(alias), None)?);
            let extra = render_all(&source.conditions, params, Some(alias), None)?;
            plan.constrain(alias, extra);
        }
        Ok(())
    }

    fn assign_having(
        &self,
        plan: &mut QueryPlan,
        request: &CompileRequest,
        params: &TemplateParams,
    ) -> Result<(), PlanError> {
        for having in &request.having {
            let sources = self.catalog.sources(&having.column).unwrap_or_default();
            let Some(source) = sources.iter().find(|s| plan.is_included(&s.alias)) else {
                continue;
            };
            let alias = source.alias.as_str();
            let expression = source.expression.render(params, Some(alias), None)?;
            let conditions: Vec<String> = having
                .suffixes
                .iter()
                .map(|suffix| format!("({} {})", expression, suffix))
                .collect();
            plan.constrain(alias, conditions);
            let extra = render_all(&source.conditions, params, Some(alias), None)?;
            plan.constrain(alias, extra);
        }
        Ok(())
    }

    fn assign_where(
        &self,
        plan: &mut QueryPlan,
        request: &CompileRequest,
        params: &TemplateParams,
    ) -> Result<(), PlanError> {
        for condition in &request.where_conditions {
            let target = format!("{}.{}", condition.alias, condition.column);
            for suffix in &condition.suffixes {
                let template = Template::parse(suffix).map_err(|e| PlanError::InvalidCondition {
                    target: target.clone(),
                    error: e.to_string(),
                })?;
                let rendered = template.render(params, Some(&condition.alias), None)?;
                plan.where_clause.insert(format!("{} {}", target, rendered));
            }
        }
        Ok(())
    }

    fn inject_alias_conditions(
        &self,
        plan: &mut QueryPlan,
        params: &TemplateParams,
    ) -> Result<(), PlanError> {
        for group in self.catalog.conditions() {
            for alias in &group.aliases {
                if plan.is_included(alias) {
                    let rendered = render_all(&group.templates, params, Some(alias), None)?;
                    plan.constrain(alias, rendered);
                }
            }
        }

        if !self.parameters.config.allow_unvalidated_snp_positions {
            let positions: Vec<String> = plan
                .tables
                .iter()
                .filter(|(_, table)| {
                    table.namespace == Namespace::Db && table.table == SNP_LOCUS_TABLE
                })
                .map(|(alias, _)| alias.clone())
                .collect();
            for alias in positions {
                plan.constrain(&alias, [format!("{}.validated > 0", alias)]);
            }
        }
        log::debug!("table WHERE = {:?}", plan.where_clause);
        Ok(())
    }

    /// Join and pair rules between included aliases. A condition between
    /// two LEFT JOINs goes to whichever was joined later.
    fn inject_pair_conditions(
        &self,
        plan: &mut QueryPlan,
        params: &TemplateParams,
    ) -> Result<(), PlanError> {
        for rule in self.catalog.joins().iter().chain(self.catalog.pairs()) {
            for (left, right) in rule.alias_pairs() {
                let attach = match (
                    plan.from.contains(left),
                    plan.from.contains(right),
                    plan.left_joins.position(left),
                    plan.left_joins.position(right),
                ) {
                    (true, true, _, _) => Attach::Where,
                    (true, false, _, Some(_)) => Attach::On(right),
                    (false, true, Some(_), _) => Attach::On(left),
                    (false, false, Some(l), Some(r)) => Attach::On(if l > r { left } else { right }),
                    _ => continue,
                };
                let rendered = render_all(&rule.templates, params, Some(left), Some(right))?;
                match attach {
                    Attach::Where => plan.where_clause.extend(rendered),
                    Attach::On(alias) => {
                        if let Some(on) = plan.left_joins.conditions_mut(alias) {
                            on.extend(rendered);
                        }
                    }
                }
            }
        }
        log::debug!("final WHERE = {:?}", plan.where_clause);
        Ok(())
    }
}

fn render_all(
    templates: &[Template],
    params: &TemplateParams,
    left: Option<&str>,
    right: Option<&str>,
) -> Result<Vec<String>, PlanError> {
    templates
        .iter()
        .map(|t| t.render(params, left, right).map_err(PlanError::from))
        .collect()
}
