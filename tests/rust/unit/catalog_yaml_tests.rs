//! Catalogs loaded from YAML files.

use std::io::Write;

use annograph::catalog::{Catalog, CatalogError, Namespace};

const CATALOG: &str = r#"
aliases:
  B: { namespace: db, table: region }
  A: { namespace: main, table: locus }
conditions:
  - aliases: [B]
    templates: ["{L}.posMin <= {L}.posMax"]
joins:
  - left: [A]
    right: [B]
    templates:
      - "{L}.chr = {R}.chr"
      - "{L}.pos >= {R}.posMin"
columns:
  region_label:
    - { alias: B, row_id: rowid, expression: "{L}.label" }
  locus_label:
    - { alias: A, row_id: rowid, expression: "{L}.label" }
    - { alias: B, row_id: rowid, expression: "NULL" }
"#;

fn write_catalog(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn test_catalog_from_yaml_file() {
    let file = write_catalog(CATALOG);
    let catalog = Catalog::from_yaml_file(file.path()).unwrap();

    let aliases: Vec<&str> = catalog.bindings().map(|b| b.alias.as_str()).collect();
    assert_eq!(aliases, vec!["A", "B"]);
    assert_eq!(catalog.binding("B").unwrap().table.namespace, Namespace::Db);

    let sources = catalog.sources("locus_label").unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].alias, "A");
    assert!(catalog.sources("gene_label").is_none());
    assert_eq!(catalog.joins().len(), 1);
    assert_eq!(catalog.conditions().len(), 1);
}

#[test]
fn test_unknown_alias_is_rejected() {
    let yaml = CATALOG.replace("right: [B]", "right: [Z]");
    assert!(matches!(
        Catalog::from_yaml_str(&yaml),
        Err(CatalogError::UnknownAlias { alias, .. }) if alias == "Z"
    ));
}

#[test]
fn test_unknown_placeholder_is_rejected() {
    let yaml = CATALOG.replace("{L}.posMin <= {L}.posMax", "{L}.posMin <= {maxPos}");
    assert!(matches!(
        Catalog::from_yaml_str(&yaml),
        Err(CatalogError::UnknownPlaceholder { .. })
    ));
}

#[test]
fn test_unknown_namespace_is_a_parse_error() {
    let yaml = CATALOG.replace("namespace: db", "namespace: warehouse");
    let file = write_catalog(&yaml);
    assert!(matches!(
        Catalog::from_yaml_file(file.path()),
        Err(CatalogError::ConfigParseError { .. })
    ));
}

#[test]
fn test_missing_catalog_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Catalog::from_yaml_file(dir.path().join("absent.yaml")),
        Err(CatalogError::ConfigReadError { .. })
    ));
}
