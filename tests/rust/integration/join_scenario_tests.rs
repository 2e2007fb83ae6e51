//! Two-table catalog: input loci joined to reference regions.

use rusqlite::types::Value;

use annograph::catalog::{Catalog, FilterState, Namespace};
use annograph::config::QueryConfig;
use annograph::query_planner::{CompileRequest, Mode, PlanError, QueryCompiler, QueryParameters};
use annograph::store::{KnowledgeStore, ResultExecutor};
use annograph::zone_index::ZoneSize;

const CATALOG: &str = r#"
aliases:
  A: { namespace: main, table: locus }
  B: { namespace: db, table: region }
  C: { namespace: db, table: note }
joins:
  - left: [A]
    right: [B]
    templates:
      - "{L}.chr = {R}.chr"
      - "{L}.pos >= {R}.posMin"
      - "{L}.pos <= {R}.posMax"
columns:
  locus_label:
    - { alias: A, row_id: rowid, expression: "{L}.label" }
  region_label:
    - { alias: B, row_id: rowid, expression: "{L}.label" }
  note:
    - { alias: C, row_id: rowid, expression: "{L}.text" }
"#;

fn store() -> KnowledgeStore {
    let store = KnowledgeStore::open_in_memory().unwrap();
    store.create_input_schema().unwrap();
    store
        .connection()
        .execute_batch(
            "CREATE TABLE `db`.`region` (label TEXT, chr INTEGER, posMin INTEGER, posMax INTEGER);
             CREATE TABLE `db`.`note` (text TEXT);
             INSERT INTO `db`.`region` VALUES ('R1', 1, 100, 200), ('R2', 1, 500, 600), ('R3', 2, 100, 200);
             INSERT INTO `main`.`locus` (label, chr, pos) VALUES ('L1', 1, 150), ('L2', 1, 1000);",
        )
        .unwrap();
    store
}

fn parameters() -> QueryParameters {
    QueryParameters::new(QueryConfig::default(), ZoneSize::new(100).unwrap(), 1)
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn sorted(mut rows: Vec<Vec<Value>>) -> Vec<Vec<Value>> {
    rows.sort_by_key(|row| format!("{:?}", row));
    rows
}

#[test]
fn test_filter_mode_hard_joins_the_region() {
    let store = store();
    let catalog = Catalog::from_yaml_str(CATALOG).unwrap();
    let state = FilterState::from_store(&store).unwrap();
    let params = parameters();

    let request = CompileRequest::new(Mode::Filter, Namespace::Main).select(["locus_label", "region_label"]);
    let plan = QueryCompiler::new(&catalog, &state, &params).compile(&request).unwrap();
    assert_eq!(plan.from.iter().collect::<Vec<_>>(), vec!["A", "B"]);
    assert!(plan.left_joins.is_empty());
    assert!(plan.where_clause.contains("A.pos >= B.posMin"));

    let rows = ResultExecutor::new(&store).collect(&plan, None, false, &[]).unwrap();
    assert_eq!(rows, vec![vec![text("L1"), text("R1")]]);
}

#[test]
fn test_annotate_mode_keeps_unmatched_loci() {
    let store = store();
    let catalog = Catalog::from_yaml_str(CATALOG).unwrap();
    let state = FilterState::from_store(&store).unwrap();
    let params = parameters();

    let request =
        CompileRequest::new(Mode::Annotate, Namespace::Main).select(["locus_label", "region_label"]);
    let plan = QueryCompiler::new(&catalog, &state, &params).compile(&request).unwrap();
    assert_eq!(plan.from.iter().collect::<Vec<_>>(), vec!["A"]);
    assert_eq!(plan.left_joins.aliases().collect::<Vec<_>>(), vec!["B"]);

    let rows = ResultExecutor::new(&store).collect(&plan, None, false, &[]).unwrap();
    assert_eq!(
        sorted(rows),
        vec![vec![text("L1"), text("R1")], vec![text("L2"), Value::Null]]
    );
}

#[test]
fn test_where_condition_binds_parameters() {
    let store = store();
    let catalog = Catalog::from_yaml_str(CATALOG).unwrap();
    let state = FilterState::from_store(&store).unwrap();
    let params = parameters();

    let request = CompileRequest::new(Mode::Annotate, Namespace::Main)
        .select(["locus_label", "region_label"])
        .where_column("A", "pos", "> ?1");
    let plan = QueryCompiler::new(&catalog, &state, &params).compile(&request).unwrap();
    assert!(plan.where_clause.contains("A.pos > ?1"));

    let rows = ResultExecutor::new(&store)
        .collect(&plan, None, false, &[Value::Integer(500)])
        .unwrap();
    assert_eq!(rows, vec![vec![text("L2"), Value::Null]]);
}

#[test]
fn test_unconnected_condition_has_no_join_path() {
    let store = store();
    let catalog = Catalog::from_yaml_str(CATALOG).unwrap();
    let state = FilterState::from_store(&store).unwrap();
    let params = parameters();

    let request = CompileRequest::new(Mode::Filter, Namespace::Main)
        .select(["locus_label"])
        .where_column("C", "text", "IS NOT NULL");
    let result = QueryCompiler::new(&catalog, &state, &params).compile(&request);
    assert_eq!(
        result,
        Err(PlanError::NoJoinPath {
            aliases: vec!["A".to_string(), "C".to_string()]
        })
    );
}

#[test]
fn test_empty_input_leaves_nothing_to_join() {
    let store = store();
    store.connection().execute("DELETE FROM `main`.`locus`", ()).unwrap();
    let catalog = Catalog::from_yaml_str(CATALOG).unwrap();
    let state = FilterState::from_store(&store).unwrap();
    let params = parameters();

    // B only has edges to A, which drops out of the join graph with its data
    let request = CompileRequest::new(Mode::Filter, Namespace::Main).select(["region_label"]);
    let result = QueryCompiler::new(&catalog, &state, &params).compile(&request);
    assert_eq!(result, Err(PlanError::NoOutputsOrConditions));
}

#[test]
fn test_unreachable_column_renders_null() {
    let store = store();
    let catalog = Catalog::from_yaml_str(CATALOG).unwrap();
    let state = FilterState::from_store(&store).unwrap();
    let params = parameters();

    // C has no join partner, so `note` has no source in any plan
    let request = CompileRequest::new(Mode::Filter, Namespace::Main).select(["locus_label", "note"]);
    let plan = QueryCompiler::new(&catalog, &state, &params).compile(&request).unwrap();
    assert_eq!(plan.unassigned_columns().collect::<Vec<_>>(), vec!["note"]);

    let rows = ResultExecutor::new(&store).collect(&plan, None, false, &[]).unwrap();
    assert_eq!(
        sorted(rows),
        vec![vec![text("L1"), Value::Null], vec![text("L2"), Value::Null]]
    );
}
