//! Built-in catalog against a small knowledge database.

use rusqlite::types::Value;

use annograph::catalog::{Catalog, FilterState, Namespace};
use annograph::config::{ConfigError, QueryConfig};
use annograph::query_planner::{CompileRequest, Mode, QueryCompiler, QueryParameters};
use annograph::store::{KnowledgeStore, ResultExecutor, StoreError};
use annograph::zone_index::ZoneIndexer;
use annograph::AnnographError;

fn store() -> KnowledgeStore {
    let mut store = KnowledgeStore::open_in_memory().unwrap();
    store.create_knowledge_schema().unwrap();
    store.create_input_schema().unwrap();
    store
        .connection()
        .execute_batch(
            "UPDATE `db`.`setting` SET value = '100' WHERE setting = 'zone_size';
             INSERT INTO `db`.`ldprofile` (ldprofile) VALUES ('');
             INSERT INTO `db`.`type` (type) VALUES ('gene');
             INSERT INTO `db`.`biopolymer` (type_id, label, source_id) VALUES (1, 'G1', 1), (1, 'G2', 1);
             INSERT INTO `db`.`biopolymer_region` (biopolymer_id, ldprofile_id, chr, posMin, posMax, source_id)
                 VALUES (1, 1, 1, 100, 200, 1), (2, 1, 1, 1000, 1100, 1);
             INSERT INTO `main`.`locus` (label, chr, pos) VALUES ('rs1', 1, 150), ('rs2', 1, 1050), ('rs3', 1, 5000);",
        )
        .unwrap();
    ZoneIndexer::new().refresh_biopolymer_zones(&mut store).unwrap();
    store
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn sorted(mut rows: Vec<Vec<Value>>) -> Vec<Vec<Value>> {
    rows.sort_by_key(|row| format!("{:?}", row));
    rows
}

fn run(store: &KnowledgeStore, request: &CompileRequest, allow_duplicates: bool) -> Vec<Vec<Value>> {
    let catalog = Catalog::knowledge_base().unwrap();
    let state = FilterState::from_store(store).unwrap();
    let params = QueryParameters::resolve(QueryConfig::default(), store).unwrap();
    let plan = QueryCompiler::new(catalog, &state, &params).compile(request).unwrap();
    ResultExecutor::new(store)
        .collect(&plan, None, allow_duplicates, &[])
        .unwrap()
}

#[test]
fn test_annotate_loci_with_gene_regions() {
    let store = store();
    let request =
        CompileRequest::new(Mode::Annotate, Namespace::Main).select(["position_label", "region_label"]);
    assert_eq!(
        sorted(run(&store, &request, false)),
        vec![
            vec![text("rs1"), text("G1")],
            vec![text("rs2"), text("G2")],
            vec![text("rs3"), Value::Null],
        ]
    );
}

#[test]
fn test_filter_loci_by_gene_regions() {
    let store = store();
    let request =
        CompileRequest::new(Mode::Filter, Namespace::Main).select(["position_label", "region_label"]);
    assert_eq!(
        sorted(run(&store, &request, false)),
        vec![vec![text("rs1"), text("G1")], vec![text("rs2"), text("G2")]]
    );
}

#[test]
fn test_repeated_identities_are_dropped() {
    let store = store();
    store
        .connection()
        .execute("INSERT INTO `main`.`locus` (label, chr, pos) VALUES ('rs4', 1, 160)", ())
        .unwrap();
    let request = CompileRequest::new(Mode::Filter, Namespace::Main).select(["region_label"]);

    // the identity is the gene alone, so rs1 and rs4 collapse
    assert_eq!(
        sorted(run(&store, &request, false)),
        vec![vec![text("G1")], vec![text("G2")]]
    );
    assert!(run(&store, &request, true).len() >= 2);
}

#[test]
fn test_input_regions_need_fresh_zones() {
    let mut store = store();
    store
        .connection()
        .execute(
            "INSERT INTO `main`.`region` (label, chr, posMin, posMax) VALUES ('R1', 1, 120, 1060)",
            (),
        )
        .unwrap();
    let request =
        CompileRequest::new(Mode::Filter, Namespace::Main).select(["position_label", "region_label"]);

    // no zone rows yet, so the zone join finds nothing
    assert!(run(&store, &request, false).is_empty());

    let written = ZoneIndexer::new()
        .refresh_region_zones(&mut store, Namespace::Main)
        .unwrap();
    assert_eq!(written, 10);
    assert_eq!(
        sorted(run(&store, &request, false)),
        vec![vec![text("rs1"), text("R1")], vec![text("rs2"), text("R1")]]
    );
}

#[test]
fn test_unknown_ld_profile_fails_before_compiling() {
    let store = store();
    let config = QueryConfig {
        ld_profile: "dprime".to_string(),
        ..QueryConfig::default()
    };
    assert!(matches!(
        QueryParameters::resolve(config, &store),
        Err(AnnographError::Config(ConfigError::UnknownLdProfile { .. }))
    ));
}

#[test]
fn test_missing_zone_size_fails_before_compiling() {
    let store = store();
    store
        .connection()
        .execute("DELETE FROM `db`.`setting` WHERE setting = 'zone_size'", ())
        .unwrap();
    assert!(matches!(
        QueryParameters::resolve(QueryConfig::default(), &store),
        Err(AnnographError::Store(StoreError::Config(ConfigError::MissingSetting { .. })))
    ));
}

#[test]
fn test_user_knowledge_query_joins_the_result_stream() {
    let store = store();
    store
        .connection()
        .execute_batch(
            "INSERT INTO `db`.`group` (group_id, type_id, label, source_id) VALUES (1, 1, 'DG', 1);
             INSERT INTO `db`.`group_biopolymer` (group_id, biopolymer_id, specificity, implication, quality, source_id)
                 VALUES (1, 1, 100, 100, 100, 1);
             INSERT INTO `user`.`source` (source_id, source, description) VALUES (1, 'mine', 'curated');
             INSERT INTO `user`.`group` (group_id, label, source_id) VALUES (1, 'UG1', 1), (2, 'UG2', 1);
             INSERT INTO `user`.`group_biopolymer` (group_id, biopolymer_id) VALUES (1, 1), (2, 2);",
        )
        .unwrap();

    let catalog = Catalog::knowledge_base().unwrap();
    let state = FilterState::from_store(&store).unwrap();
    let params = QueryParameters::resolve(QueryConfig::default(), &store).unwrap();
    let request =
        CompileRequest::new(Mode::Filter, Namespace::Main).select(["position_label", "group_label"]);
    let (plan, user_plan) = QueryCompiler::new(catalog, &state, &params)
        .compile_with_user_knowledge(&request)
        .unwrap();
    let user_plan = user_plan.expect("user knowledge is loaded");

    assert!(plan.from.contains("d_g"));
    assert!(!plan.from.contains("u_g"));
    assert!(user_plan.from.contains("u_g"));
    assert!(user_plan.from.contains("u_gb"));
    assert!(!user_plan.from.contains("d_gb"));

    // (rs1, UG1) repeats the identity of (rs1, DG) and is dropped
    let rows = ResultExecutor::new(&store)
        .collect(&plan, Some(&user_plan), false, &[])
        .unwrap();
    assert_eq!(
        rows,
        vec![vec![text("rs1"), text("DG")], vec![text("rs2"), text("UG2")]]
    );
}

#[test]
fn test_no_user_knowledge_query_without_user_sources() {
    let store = store();
    let catalog = Catalog::knowledge_base().unwrap();
    let state = FilterState::from_store(&store).unwrap();
    let params = QueryParameters::resolve(QueryConfig::default(), &store).unwrap();
    let request = CompileRequest::new(Mode::Filter, Namespace::Main).select(["position_label"]);

    let (_, user_plan) = QueryCompiler::new(catalog, &state, &params)
        .compile_with_user_knowledge(&request)
        .unwrap();
    assert!(user_plan.is_none());
}

#[test]
fn test_disease_columns_resolve_from_reference_groups() {
    let store = store();
    store
        .connection()
        .execute_batch(
            "INSERT INTO `db`.`type` (type) VALUES ('disease');
             INSERT INTO `db`.`namespace` (namespace) VALUES ('disease');
             INSERT INTO `db`.`subtype` (subtype) VALUES ('cancer');
             INSERT INTO `db`.`group` (group_id, type_id, subtype_id, label, source_id) VALUES (1, 2, 1, 'D1', 1);
             INSERT INTO `db`.`group_name` (group_id, namespace_id, name, source_id) VALUES (1, 1, 'melanoma', 1);
             INSERT INTO `db`.`group_biopolymer` (group_id, biopolymer_id, specificity, implication, quality, source_id)
                 VALUES (1, 1, 100, 100, 100, 1);",
        )
        .unwrap();
    let request = CompileRequest::new(Mode::Filter, Namespace::Main).select([
        "position_label",
        "disease_label",
        "disease_category",
    ]);
    assert_eq!(
        run(&store, &request, false),
        vec![vec![text("rs1"), text("melanoma"), text("cancer")]]
    );
}
