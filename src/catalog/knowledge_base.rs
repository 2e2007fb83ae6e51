//! Built-in catalog of the genomic knowledge base.
//!
//! Alias prefixes name their namespace: `m_` primary input, `a_` alternate
//! input, `c_` modeling candidates, `u_` user knowledge, `d_` reference
//! knowledge. `_L`/`_R` suffixes are the two sides of a pairwise model.
//!
//! Position/region overlap goes through the zone tables (`*_rz`, `d_bz`):
//! the zone join only narrows candidates, the exact bounds check lives in
//! the locus/region pair conditions.

use lazy_static::lazy_static;

use super::config::{source, source_where, CatalogConfig, ColumnSourceDef};
use super::errors::CatalogError;
use super::namespace::{Namespace, TableRef};
use super::registry::Catalog;

lazy_static! {
    static ref KNOWLEDGE_BASE: Result<Catalog, CatalogError> =
        Catalog::from_config(knowledge_base_config());
}

impl Catalog {
    /// The built-in catalog, built once per process.
    pub fn knowledge_base() -> Result<&'static Catalog, CatalogError> {
        KNOWLEDGE_BASE.as_ref().map_err(Clone::clone)
    }
}

const CHR_NAME: &str = "(CASE {L}.chr WHEN 23 THEN 'X' WHEN 24 THEN 'Y' WHEN 25 THEN 'XY' WHEN 26 THEN 'MT' ELSE {L}.chr END)";
const BIOPOLYMER_IDENTIFIERS: &str = "(SELECT GROUP_CONCAT(namespace||':'||name,'|') FROM `db`.`biopolymer_name` AS d_bn JOIN `db`.`namespace` AS d_n USING (namespace_id) WHERE d_bn.biopolymer_id = {L}.biopolymer_id)";
const GENE_SYMBOLS: &str = "(SELECT GROUP_CONCAT(name,'|') FROM `db`.`biopolymer_name` AS d_bn WHERE d_bn.biopolymer_id = {L}.biopolymer_id AND d_bn.namespace_id = {namespaceID_symbol})";
const GROUP_IDENTIFIERS: &str = "(SELECT GROUP_CONCAT(namespace||':'||name,'|') FROM `db`.`group_name` AS d_gn JOIN `db`.`namespace` AS d_n USING (namespace_id) WHERE d_gn.group_id = {L}.group_id)";
const DISEASE_NAME: &str = "(SELECT name FROM `db`.`group_name` AS d_gn JOIN `db`.`namespace` AS d_n USING (namespace_id) WHERE d_gn.group_id = {L}.group_id AND d_n.namespace = 'disease')";
const DISEASE_CATEGORY: &str = "(SELECT subtype FROM `db`.`subtype` AS d_s JOIN `db`.`group` AS dg USING (subtype_id) JOIN `db`.`type` AS d_t USING (type_id) WHERE dg.group_id = {L}.group_id AND d_t.type = 'disease')";
const IS_GENE: &str = "{L}.type_id+0 = {typeID_gene}";

// Nearest gene regions on either side of a position, for the active LD profile.
const GENE_REGIONS: &str = "FROM `db`.`biopolymer` AS d_b JOIN `db`.`biopolymer_region` AS d_br USING (biopolymer_id) WHERE d_b.type_id+0 = {typeID_gene} AND d_br.ldprofile_id = {ldprofileID} AND d_br.chr = {L}.chr";
const UPSTREAM: &str = "AND d_br.posMax < {L}.pos - {rpMargin}";
const DOWNSTREAM: &str = "AND d_br.posMin > {L}.pos + {rpMargin}";

const SNP_ALIASES: [&str; 2] = ["a_s", "m_s"];
const LOCUS_ALIASES: [&str; 2] = ["a_l", "m_l"];
const REGION_ALIASES: [&str; 2] = ["a_r", "m_r"];
const GENE_ALIASES: [&str; 2] = ["a_bg", "m_bg"];
const GROUP_ALIASES: [&str; 2] = ["a_g", "m_g"];
const SOURCE_ALIASES: [&str; 2] = ["a_c", "m_c"];

/// Declarative form of [`Catalog::knowledge_base`].
pub fn knowledge_base_config() -> CatalogConfig {
    let config = bind_aliases(CatalogConfig::default());
    let config = add_conditions(config);
    let config = add_joins(config);
    let config = add_pairs(config);
    add_columns(config)
}

fn bind_aliases(config: CatalogConfig) -> CatalogConfig {
    use Namespace::*;

    let mut config = config;
    for (prefix, namespace) in [("m", Main), ("a", Alt)] {
        for (suffix, table) in [
            ("s", "snp"),
            ("l", "locus"),
            ("r", "region"),
            ("rz", "region_zone"),
            ("bg", "gene"),
            ("g", "group"),
            ("c", "source"),
        ] {
            config = config.alias(&format!("{}_{}", prefix, suffix), namespace, table);
        }
    }

    config
        .alias("c_mb_L", Cand, "main_biopolymer")
        .superseded_alias(
            "c_mb_R",
            Cand,
            "main_biopolymer",
            TableRef::new(Cand, "alt_biopolymer"),
        )
        .alias("c_ab_R", Cand, "alt_biopolymer")
        .alias("c_g", Cand, "group")
        .alias("u_gb", User, "group_biopolymer")
        .alias("u_gb_L", User, "group_biopolymer")
        .alias("u_gb_R", User, "group_biopolymer")
        .alias("u_g", User, "group")
        .alias("u_c", User, "source")
        .alias("d_sl", Db, "snp_locus")
        .alias("d_br", Db, "biopolymer_region")
        .alias("d_bz", Db, "biopolymer_zone")
        .alias("d_b", Db, "biopolymer")
        .alias("d_gb", Db, "group_biopolymer")
        .alias("d_gb_L", Db, "group_biopolymer")
        .alias("d_gb_R", Db, "group_biopolymer")
        .alias("d_g", Db, "group")
        .alias("d_c", Db, "source")
        .alias("d_w", Db, "gwas")
}

fn add_conditions(config: CatalogConfig) -> CatalogConfig {
    config
        .condition(&["d_br"], &["{L}.ldprofile_id = {ldprofileID}"])
        .condition(
            &["d_gb", "d_gb_L", "d_gb_R"],
            &[
                "{L}.biopolymer_id != 0",
                "({L}.{gbColumn1} {gbCondition} OR {L}.{gbColumn2} {gbCondition})",
            ],
        )
}

fn add_joins(config: CatalogConfig) -> CatalogConfig {
    // SQLite skips an index on a column wrapped in an expression, so every
    // inequality is written once per operand.
    config
        .join_within(&["m_s", "a_s", "d_sl"], &["{L}.rs = {R}.rs"])
        .join(&["m_s", "a_s"], &["d_w"], &["{L}.rs = {R}.rs"])
        .join(
            &["d_sl"],
            &["d_w"],
            &["(({L}.rs = {R}.rs) OR ({L}.chr = {R}.chr AND {L}.pos = {R}.pos))"],
        )
        .join_within(&["m_l", "a_l", "d_sl"], &["{L}.chr = {R}.chr", "{L}.pos = {R}.pos"])
        .join(&["m_l", "a_l"], &["d_w"], &["{L}.chr = {R}.chr", "{L}.pos = {R}.pos"])
        .join(
            &["m_l", "a_l", "d_sl"],
            &["m_rz", "a_rz", "d_bz"],
            &[
                "{L}.chr = {R}.chr",
                "{L}.pos >= (({R}.zone * {zoneSize}) - {rpMargin})",
                "{L}.pos < ((({R}.zone + 1) * {zoneSize}) + {rpMargin})",
                "(({L}.pos + {rpMargin}) / {zoneSize}) >= {R}.zone",
                "(({L}.pos - {rpMargin}) / {zoneSize}) <= {R}.zone",
            ],
        )
        // zone rows are written from their region, so the rowid match suffices
        .join(&["m_rz"], &["m_r"], &["{L}.region_rowid = {R}.rowid"])
        .join(&["a_rz"], &["a_r"], &["{L}.region_rowid = {R}.rowid"])
        .join(
            &["d_bz"],
            &["d_br"],
            &[
                "{L}.biopolymer_id = {R}.biopolymer_id",
                "{L}.chr = {R}.chr",
                // one biopolymer may have several regions on a chromosome
                "(({L}.zone + 1) * {zoneSize}) > {R}.posMin",
                "({L}.zone * {zoneSize}) <= {R}.posMax",
                "{L}.zone >= ({R}.posMin / {zoneSize})",
                "{L}.zone <= ({R}.posMax / {zoneSize})",
            ],
        )
        .join_within(
            &["m_rz", "a_rz", "d_bz"],
            &[
                "{L}.chr = {R}.chr",
                "{L}.zone >= ({R}.zone + (MIN(0,{rmBases}) - {zoneSize}) / {zoneSize})",
                "{L}.zone <= ({R}.zone - (MIN(0,{rmBases}) - {zoneSize}) / {zoneSize})",
                "{R}.zone >= ({L}.zone + (MIN(0,{rmBases}) - {zoneSize}) / {zoneSize})",
                "{R}.zone <= ({L}.zone - (MIN(0,{rmBases}) - {zoneSize}) / {zoneSize})",
            ],
        )
        .join_within(
            &["m_bg", "a_bg", "d_br", "d_b"],
            &["{L}.biopolymer_id = {R}.biopolymer_id"],
        )
        .join(
            &["m_bg", "a_bg", "d_b"],
            &["u_gb", "d_gb"],
            &["{L}.biopolymer_id = {R}.biopolymer_id"],
        )
        .join_within(&["d_gb_L", "d_gb_R"], &["{L}.biopolymer_id != {R}.biopolymer_id"])
        .join_within(&["u_gb_L", "u_gb_R"], &["{L}.biopolymer_id != {R}.biopolymer_id"])
        .join_within(&["m_g", "a_g", "d_gb", "d_g"], &["{L}.group_id = {R}.group_id"])
        .join_within(&["m_g", "a_g", "u_gb", "u_g"], &["{L}.group_id = {R}.group_id"])
        .join_within(&["m_c", "a_c", "d_g", "d_c"], &["{L}.source_id = {R}.source_id"])
        .join_within(&["m_c", "a_c", "u_g", "u_c"], &["{L}.source_id = {R}.source_id"])
        .join(
            &["c_mb_L"],
            &["u_gb_L", "d_gb_L"],
            &["{L}.biopolymer_id = {R}.biopolymer_id"],
        )
        .join(
            &["c_mb_R", "c_ab_R"],
            &["u_gb_R", "d_gb_R"],
            &["{L}.biopolymer_id = {R}.biopolymer_id"],
        )
        .join(
            &["c_g", "d_g"],
            &["d_gb", "d_gb_L", "d_gb_R", "d_g"],
            &["{L}.group_id = {R}.group_id"],
        )
        .join(
            &["c_g", "u_g"],
            &["u_gb", "u_gb_L", "u_gb_R", "u_g"],
            &["{L}.group_id = {R}.group_id"],
        )
}

fn add_pairs(config: CatalogConfig) -> CatalogConfig {
    const MATCH_BASES: &str = "MAX({rmBases}, COALESCE((MIN({L}.posMax - {L}.posMin, {R}.posMax - {R}.posMin) + 1) * {rmPercent} / 100.0, {rmBases}))";
    let overlap = format!(
        "((({{L}}.posMin >= {{R}}.posMin) AND ({{L}}.posMin <= {{R}}.posMax + 1 - {m})) OR (({{R}}.posMin >= {{L}}.posMin) AND ({{R}}.posMin <= {{L}}.posMax + 1 - {m})))",
        m = MATCH_BASES
    );

    config
        .pair(
            &["m_l", "a_l", "d_sl"],
            &["m_r", "a_r", "d_br"],
            &[
                "{L}.chr = {R}.chr",
                "{L}.pos >= ({R}.posMin - {rpMargin})",
                "{L}.pos <= ({R}.posMax + {rpMargin})",
                "({L}.pos + {rpMargin}) >= {R}.posMin",
                "({L}.pos - {rpMargin}) <= {R}.posMax",
            ],
        )
        .pair_within(
            &["m_r", "a_r", "d_br"],
            &[
                "{L}.chr = {R}.chr",
                "({L}.posMax - {L}.posMin + 1) >= {rmBases}",
                "({R}.posMax - {R}.posMin + 1) >= {rmBases}",
                &overlap,
            ],
        )
}

/// The same expression read from each alias in turn.
fn from_each(aliases: &[&str], row_id: &str, expression: &str) -> Vec<ColumnSourceDef> {
    aliases
        .iter()
        .map(|alias| source(alias, row_id, expression))
        .collect()
}

/// Input aliases first, then the reference source.
fn inputs_then(
    aliases: &[&str],
    row_id: &str,
    expression: &str,
    fallback: ColumnSourceDef,
) -> Vec<ColumnSourceDef> {
    let mut sources = from_each(aliases, row_id, expression);
    sources.push(fallback);
    sources
}

/// Nearest-gene lookup evaluated from every locus alias.
fn nearest_gene(select: &str, side: &str, order: &str) -> Vec<ColumnSourceDef> {
    let expression = format!("(SELECT {} {} {}{})", select, GENE_REGIONS, side, order);
    locus_sources(&expression)
}

fn locus_sources(expression: &str) -> Vec<ColumnSourceDef> {
    inputs_then(
        &LOCUS_ALIASES,
        "rowid",
        expression,
        source("d_sl", "_ROWID_", expression),
    )
}

fn add_columns(config: CatalogConfig) -> CatalogConfig {
    let upstream_order = " ORDER BY d_br.posMax DESC LIMIT 1";
    let downstream_order = " ORDER BY d_br.posMin LIMIT 1";
    let upstream_distance = format!(
        "{{L}}.pos - (SELECT MAX(d_br.posMax) {} {})",
        GENE_REGIONS, UPSTREAM
    );
    let downstream_distance = format!(
        "-{{L}}.pos + (SELECT MIN(d_br.posMin) {} {})",
        GENE_REGIONS, DOWNSTREAM
    );

    config
        // snps
        .column(
            "snp_id",
            inputs_then(&SNP_ALIASES, "rowid", "{L}.rs", source("d_sl", "_ROWID_", "{L}.rs")),
        )
        .column(
            "snp_label",
            inputs_then(
                &SNP_ALIASES,
                "rowid",
                "{L}.label",
                source("d_sl", "_ROWID_", "'rs'||{L}.rs"),
            ),
        )
        .column(
            "snp_extra",
            inputs_then(&SNP_ALIASES, "rowid", "{L}.extra", source("d_sl", "_ROWID_", "NULL")),
        )
        .column(
            "snp_flag",
            inputs_then(&SNP_ALIASES, "rowid", "{L}.flag", source("d_sl", "_ROWID_", "NULL")),
        )
        // positions
        .column(
            "position_id",
            inputs_then(
                &LOCUS_ALIASES,
                "rowid",
                "{L}.rowid",
                source("d_sl", "_ROWID_", "{L}._ROWID_"),
            ),
        )
        .column(
            "position_label",
            inputs_then(
                &LOCUS_ALIASES,
                "rowid",
                "{L}.label",
                source("d_sl", "_ROWID_", "'rs'||{L}.rs"),
            ),
        )
        .column("position_chr", locus_sources(CHR_NAME))
        .column("position_pos", locus_sources("{L}.pos {pMinOffset}"))
        .column(
            "position_extra",
            inputs_then(&LOCUS_ALIASES, "rowid", "{L}.extra", source("d_sl", "_ROWID_", "NULL")),
        )
        .column(
            "position_flag",
            inputs_then(&LOCUS_ALIASES, "rowid", "{L}.flag", source("d_sl", "_ROWID_", "NULL")),
        )
        // regions
        .column(
            "region_id",
            inputs_then(
                &REGION_ALIASES,
                "rowid",
                "{L}.rowid",
                source("d_br", "_ROWID_", "{L}._ROWID_"),
            ),
        )
        .column(
            "region_label",
            inputs_then(
                &REGION_ALIASES,
                "rowid",
                "{L}.label",
                source("d_b", "biopolymer_id", "{L}.label"),
            ),
        )
        .column(
            "region_chr",
            inputs_then(&REGION_ALIASES, "rowid", CHR_NAME, source("d_br", "_ROWID_", CHR_NAME)),
        )
        .column("region_zone", from_each(&["a_rz", "m_rz", "d_bz"], "zone", "{L}.zone"))
        .column(
            "region_start",
            inputs_then(
                &REGION_ALIASES,
                "rowid",
                "{L}.posMin {pMinOffset}",
                source("d_br", "_ROWID_", "{L}.posMin {pMinOffset}"),
            ),
        )
        .column(
            "region_stop",
            inputs_then(
                &REGION_ALIASES,
                "rowid",
                "{L}.posMax {pMaxOffset}",
                source("d_br", "_ROWID_", "{L}.posMax {pMaxOffset}"),
            ),
        )
        .column(
            "region_extra",
            inputs_then(&REGION_ALIASES, "rowid", "{L}.extra", source("d_br", "_ROWID_", "NULL")),
        )
        .column(
            "region_flag",
            inputs_then(&REGION_ALIASES, "rowid", "{L}.flag", source("d_br", "_ROWID_", "NULL")),
        )
        // biopolymers
        .column(
            "biopolymer_id",
            from_each(
                &[
                    "a_bg", "m_bg", "c_mb_L", "c_mb_R", "c_ab_R", "u_gb", "d_br", "d_gb",
                    "d_gb_L", "d_gb_R", "d_b",
                ],
                "biopolymer_id",
                "{L}.biopolymer_id",
            ),
        )
        .column(
            "biopolymer_id_L",
            from_each(
                &["c_mb_L", "u_gb_L", "d_gb_L", "d_b"],
                "biopolymer_id",
                "{L}.biopolymer_id",
            ),
        )
        .column(
            "biopolymer_id_R",
            from_each(
                &["c_mb_R", "c_ab_R", "u_gb_R", "d_gb_R", "d_b"],
                "biopolymer_id",
                "{L}.biopolymer_id",
            ),
        )
        .column(
            "biopolymer_label",
            from_each(&["a_bg", "m_bg", "d_b"], "biopolymer_id", "{L}.label"),
        )
        .column(
            "biopolymer_description",
            vec![source("d_b", "biopolymer_id", "{L}.description")],
        )
        .column(
            "biopolymer_identifiers",
            from_each(&["a_bg", "m_bg", "d_b"], "biopolymer_id", BIOPOLYMER_IDENTIFIERS),
        )
        .column("biopolymer_chr", vec![source("d_br", "_ROWID_", CHR_NAME)])
        .column("biopolymer_zone", vec![source("d_bz", "zone", "{L}.zone")])
        .column(
            "biopolymer_start",
            vec![source("d_br", "_ROWID_", "{L}.posMin {pMinOffset}")],
        )
        .column(
            "biopolymer_stop",
            vec![source("d_br", "_ROWID_", "{L}.posMax {pMaxOffset}")],
        )
        .column(
            "biopolymer_extra",
            inputs_then(&GENE_ALIASES, "biopolymer_id", "{L}.extra", source("d_b", "biopolymer_id", "NULL")),
        )
        .column(
            "biopolymer_flag",
            inputs_then(&GENE_ALIASES, "biopolymer_id", "{L}.flag", source("d_b", "biopolymer_id", "NULL")),
        )
        // genes: reference biopolymers restricted to the gene type
        .column(
            "gene_id",
            inputs_then(
                &GENE_ALIASES,
                "biopolymer_id",
                "{L}.biopolymer_id",
                source_where("d_b", "biopolymer_id", "{L}.biopolymer_id", &[IS_GENE]),
            ),
        )
        .column(
            "gene_label",
            inputs_then(
                &GENE_ALIASES,
                "biopolymer_id",
                "{L}.label",
                source_where("d_b", "biopolymer_id", "{L}.label", &[IS_GENE]),
            ),
        )
        .column(
            "gene_description",
            vec![source_where("d_b", "biopolymer_id", "{L}.description", &[IS_GENE])],
        )
        .column(
            "gene_identifiers",
            inputs_then(
                &GENE_ALIASES,
                "biopolymer_id",
                BIOPOLYMER_IDENTIFIERS,
                source_where("d_b", "biopolymer_id", BIOPOLYMER_IDENTIFIERS, &[IS_GENE]),
            ),
        )
        .column(
            "gene_symbols",
            inputs_then(
                &GENE_ALIASES,
                "biopolymer_id",
                GENE_SYMBOLS,
                source_where("d_b", "biopolymer_id", GENE_SYMBOLS, &[IS_GENE]),
            ),
        )
        .column(
            "gene_extra",
            inputs_then(
                &GENE_ALIASES,
                "biopolymer_id",
                "{L}.extra",
                source_where("d_b", "biopolymer_id", "NULL", &[IS_GENE]),
            ),
        )
        .column(
            "gene_flag",
            inputs_then(
                &GENE_ALIASES,
                "biopolymer_id",
                "{L}.flag",
                source_where("d_b", "biopolymer_id", "NULL", &[IS_GENE]),
            ),
        )
        // nearest genes
        .column("upstream_id", nearest_gene("d_b.biopolymer_id", UPSTREAM, upstream_order))
        .column("upstream_label", nearest_gene("d_b.label", UPSTREAM, upstream_order))
        .column("upstream_distance", locus_sources(&upstream_distance))
        .column(
            "upstream_start",
            nearest_gene("d_br.posMin {pMinOffset}", UPSTREAM, upstream_order),
        )
        .column(
            "upstream_stop",
            nearest_gene("d_br.posMax {pMaxOffset}", UPSTREAM, upstream_order),
        )
        .column("downstream_id", nearest_gene("d_b.biopolymer_id", DOWNSTREAM, downstream_order))
        .column("downstream_label", nearest_gene("d_b.label", DOWNSTREAM, downstream_order))
        .column("downstream_distance", locus_sources(&downstream_distance))
        .column(
            "downstream_start",
            nearest_gene("d_br.posMin {pMinOffset}", DOWNSTREAM, downstream_order),
        )
        .column(
            "downstream_stop",
            nearest_gene("d_br.posMax {pMaxOffset}", DOWNSTREAM, downstream_order),
        )
        // groups
        .column(
            "group_id",
            from_each(
                &[
                    "a_g", "m_g", "c_g", "u_gb", "u_gb_L", "u_gb_R", "u_g", "d_gb", "d_gb_L",
                    "d_gb_R", "d_g",
                ],
                "group_id",
                "{L}.group_id",
            ),
        )
        .column(
            "group_label",
            from_each(&["a_g", "m_g", "u_g", "d_g"], "group_id", "{L}.label"),
        )
        .column(
            "group_description",
            from_each(&["u_g", "d_g"], "group_id", "{L}.description"),
        )
        .column("group_identifiers", {
            let mut sources = from_each(&GROUP_ALIASES, "group_id", GROUP_IDENTIFIERS);
            sources.push(source("u_g", "group_id", "{L}.label"));
            sources.push(source("d_g", "group_id", GROUP_IDENTIFIERS));
            sources
        })
        .column("group_extra", {
            let mut sources = from_each(&GROUP_ALIASES, "group_id", "{L}.extra");
            sources.extend(from_each(&["u_g", "d_g"], "group_id", "NULL"));
            sources
        })
        .column("group_flag", {
            let mut sources = from_each(&GROUP_ALIASES, "group_id", "{L}.flag");
            sources.extend(from_each(&["u_g", "d_g"], "group_id", "NULL"));
            sources
        })
        // sources
        .column(
            "source_id",
            from_each(
                &["a_c", "m_c", "u_g", "u_c", "d_g", "d_c"],
                "source_id",
                "{L}.source_id",
            ),
        )
        .column("source_label", {
            let mut sources = from_each(&SOURCE_ALIASES, "source_id", "{L}.label");
            sources.extend(from_each(&["u_c", "d_c"], "source_id", "{L}.source"));
            sources
        })
        // gwas
        .column("gwas_rs", vec![source("d_w", "_ROWID_", "{L}.rs")])
        .column("gwas_chr", vec![source("d_w", "_ROWID_", "{L}.chr")])
        .column("gwas_pos", vec![source("d_w", "_ROWID_", "{L}.pos {pMinOffset}")])
        .column("gwas_trait", vec![source("d_w", "_ROWID_", "{L}.trait")])
        .column("gwas_snps", vec![source("d_w", "_ROWID_", "{L}.snps")])
        .column("gwas_orbeta", vec![source("d_w", "_ROWID_", "{L}.orbeta")])
        .column("gwas_allele95ci", vec![source("d_w", "_ROWID_", "{L}.allele95ci")])
        .column("gwas_riskAfreq", vec![source("d_w", "_ROWID_", "{L}.riskAfreq")])
        .column("gwas_pubmed", vec![source("d_w", "_ROWID_", "{L}.pubmed_id")])
        // diseases are groups of type `disease`
        .column(
            "disease_label",
            from_each(&["a_g", "m_g", "d_g"], "group_id", DISEASE_NAME),
        )
        .column(
            "disease_category",
            from_each(&["a_g", "m_g", "d_g"], "group_id", DISEASE_CATEGORY),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_base_builds() {
        let catalog = Catalog::knowledge_base().unwrap();
        assert_eq!(catalog.alias_count(), 32);
        assert!(catalog.has_column("gene_symbols"));
        assert!(catalog.has_column("downstream_stop"));
        assert!(!catalog.has_column("gene_strand"));
        assert!(catalog.has_column("disease_label"));
        assert!(catalog.has_column("disease_category"));
    }

    #[test]
    fn test_source_preference_order() {
        let catalog = Catalog::knowledge_base().unwrap();
        let aliases: Vec<&str> = catalog
            .sources("snp_label")
            .unwrap()
            .iter()
            .map(|s| s.alias.as_str())
            .collect();
        assert_eq!(aliases, vec!["a_s", "m_s", "d_sl"]);

        let gene = catalog.sources("gene_label").unwrap();
        assert!(gene[0].conditions.is_empty());
        assert_eq!(gene[2].conditions[0].source(), IS_GENE);
    }

    #[test]
    fn test_right_candidate_is_superseded() {
        let catalog = Catalog::knowledge_base().unwrap();
        assert_eq!(
            catalog.binding("c_mb_R").unwrap().superseded_by,
            Some(TableRef::new(Namespace::Cand, "alt_biopolymer"))
        );
        assert_eq!(catalog.binding("c_mb_L").unwrap().superseded_by, None);
    }
}
