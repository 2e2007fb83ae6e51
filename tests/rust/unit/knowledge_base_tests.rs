//! Plans compiled against the built-in knowledge base catalog.

use annograph::catalog::{Catalog, FilterState, Namespace};
use annograph::config::QueryConfig;
use annograph::query_planner::{CompileRequest, Mode, PlanError, QueryCompiler, QueryParameters};
use annograph::sql_generator::{generate_sql, RenderOptions};
use annograph::zone_index::ZoneSize;

fn parameters(config: QueryConfig) -> QueryParameters {
    QueryParameters::new(config, ZoneSize::new(100_000).unwrap(), 1)
        .with_gene_type_id(1)
        .with_symbol_namespace_id(2)
}

#[test]
fn test_knowledge_base_is_built_once() {
    let first = Catalog::knowledge_base().unwrap();
    let second = Catalog::knowledge_base().unwrap();
    assert!(std::ptr::eq(first, second));
    assert!(first.has_column("position_label"));
    assert!(first.binding("d_bz").is_some());
}

#[test]
fn test_annotate_reaches_gene_regions_through_zones() {
    let catalog = Catalog::knowledge_base().unwrap();
    let state = FilterState::new().with_live(Namespace::Main, "locus");
    let params = parameters(QueryConfig::default());
    let compiler = QueryCompiler::new(catalog, &state, &params);

    let request =
        CompileRequest::new(Mode::Annotate, Namespace::Main).select(["position_label", "region_label"]);
    let plan = compiler.compile(&request).unwrap();

    assert_eq!(plan.from.iter().collect::<Vec<_>>(), vec!["m_l"]);
    assert_eq!(plan.left_joins.aliases().collect::<Vec<_>>(), vec!["d_bz", "d_br", "d_b"]);
    assert_eq!(plan.select[0].expression.as_deref(), Some("m_l.label"));
    assert_eq!(plan.select[1].expression.as_deref(), Some("d_b.label"));

    let region_on = &plan.left_joins.0[1].conditions;
    assert!(region_on.contains("d_br.ldprofile_id = 1"));
    assert!(region_on.contains("m_l.chr = d_br.chr"));
    assert!(plan.where_clause.is_empty());
}

#[test]
fn test_unvalidated_positions_can_be_excluded() {
    let catalog = Catalog::knowledge_base().unwrap();
    let state = FilterState::new();
    let config = QueryConfig {
        allow_unvalidated_snp_positions: false,
        ..QueryConfig::default()
    };
    let params = parameters(config);
    let compiler = QueryCompiler::new(catalog, &state, &params);

    let plan = compiler
        .compile(&CompileRequest::new(Mode::Filter, Namespace::Main).select(["snp_label"]))
        .unwrap();
    assert_eq!(plan.from.iter().collect::<Vec<_>>(), vec!["d_sl"]);
    assert!(plan.where_clause.contains("d_sl.validated > 0"));
    assert_eq!(plan.select[0].expression.as_deref(), Some("'rs'||d_sl.rs"));
}

#[test]
fn test_compiled_sql_is_deterministic() {
    let catalog = Catalog::knowledge_base().unwrap();
    let state = FilterState::new()
        .with_live(Namespace::Main, "locus")
        .with_live(Namespace::Main, "region");
    let params = parameters(QueryConfig::default());
    let compiler = QueryCompiler::new(catalog, &state, &params);
    let request = CompileRequest::new(Mode::Filter, Namespace::Main)
        .select(["position_label", "region_label"])
        .apply_offset(true);

    let options = RenderOptions::default();
    let first = generate_sql(&compiler.compile(&request).unwrap(), &options);
    let second = generate_sql(&compiler.compile(&request).unwrap(), &options);
    assert_eq!(first, second);
    assert!(first.contains("`main`.`region_zone` AS m_rz"));
}

#[test]
fn test_unsupported_column() {
    let catalog = Catalog::knowledge_base().unwrap();
    let state = FilterState::new();
    let params = parameters(QueryConfig::default());
    let result = QueryCompiler::new(catalog, &state, &params)
        .compile(&CompileRequest::new(Mode::Filter, Namespace::Main).select(["shoe_size"]));
    assert_eq!(
        result,
        Err(PlanError::UnsupportedColumn {
            column: "shoe_size".to_string()
        })
    );
}

#[test]
fn test_disease_columns_read_from_groups() {
    let catalog = Catalog::knowledge_base().unwrap();
    for column in ["disease_label", "disease_category"] {
        let aliases: Vec<&str> = catalog
            .sources(column)
            .unwrap()
            .iter()
            .map(|s| s.alias.as_str())
            .collect();
        assert_eq!(aliases, vec!["a_g", "m_g", "d_g"]);
    }

    let state = FilterState::new().with_live(Namespace::Main, "group");
    let params = parameters(QueryConfig::default());
    let plan = QueryCompiler::new(catalog, &state, &params)
        .compile(
            &CompileRequest::new(Mode::Filter, Namespace::Main)
                .select(["disease_label", "disease_category"]),
        )
        .unwrap();

    assert_eq!(plan.from.iter().collect::<Vec<_>>(), vec!["m_g"]);
    let label = plan.select[0].expression.as_deref().unwrap();
    assert!(label.contains("d_gn.group_id = m_g.group_id AND d_n.namespace = 'disease'"));
    let category = plan.select[1].expression.as_deref().unwrap();
    assert!(category.contains("FROM `db`.`subtype` AS d_s"));
    assert!(category.contains("dg.group_id = m_g.group_id AND d_t.type = 'disease'"));
    assert!(plan.unassigned_columns().next().is_none());
}
