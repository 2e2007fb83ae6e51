//! Table definitions for the input namespaces and the reference database.
//!
//! All coordinates are 1-based closed intervals.

use crate::catalog::Namespace;

/// One table with its secondary indexes as `(name, columns)`.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static str,
    pub indexes: &'static [(&'static str, &'static str)],
}

impl TableDef {
    /// `CREATE TABLE` followed by its `CREATE INDEX` statements.
    pub fn create_statements(&self, namespace: Namespace) -> Vec<String> {
        let schema = namespace.schema_name();
        let mut statements = vec![format!(
            "CREATE TABLE IF NOT EXISTS `{}`.`{}` ({})",
            schema, self.name, self.columns
        )];
        for (index, columns) in self.indexes {
            statements.push(format!(
                "CREATE INDEX IF NOT EXISTS `{}`.`{}` ON `{}` {}",
                schema, index, self.name, columns
            ));
        }
        statements
    }
}

/// Input filter tables, identical in `main` and `alt`.
pub const FILTER_TABLES: &[TableDef] = &[
    TableDef {
        name: "snp",
        columns: "rowid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, label VARCHAR(32) NOT NULL, rs INTEGER NOT NULL, flag TINYINT NOT NULL DEFAULT 0, extra TEXT",
        indexes: &[("snp__rs", "(rs)")],
    },
    TableDef {
        name: "locus",
        columns: "rowid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, label VARCHAR(32) NOT NULL, chr TINYINT NOT NULL, pos BIGINT NOT NULL, flag TINYINT NOT NULL DEFAULT 0, extra TEXT",
        indexes: &[("locus__pos", "(chr,pos)")],
    },
    TableDef {
        name: "region",
        columns: "rowid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, label VARCHAR(32) NOT NULL, chr TINYINT NOT NULL, posMin BIGINT NOT NULL, posMax BIGINT NOT NULL, flag TINYINT NOT NULL DEFAULT 0, extra TEXT",
        indexes: &[
            ("region__chr_min", "(chr,posMin)"),
            ("region__chr_max", "(chr,posMax)"),
        ],
    },
    TableDef {
        name: "region_zone",
        columns: "region_rowid INTEGER NOT NULL, chr TINYINT NOT NULL, zone INTEGER NOT NULL, PRIMARY KEY (chr,zone,region_rowid)",
        indexes: &[("region_zone__region", "(region_rowid)")],
    },
    TableDef {
        name: "gene",
        columns: "rowid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, label VARCHAR(32) NOT NULL, biopolymer_id INTEGER NOT NULL, flag TINYINT NOT NULL DEFAULT 0, extra TEXT",
        indexes: &[("gene__biopolymer", "(biopolymer_id)")],
    },
    TableDef {
        name: "group",
        columns: "rowid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, label VARCHAR(32) NOT NULL, group_id INTEGER NOT NULL, flag TINYINT NOT NULL DEFAULT 0, extra TEXT",
        indexes: &[("group__group_id", "(group_id)")],
    },
    TableDef {
        name: "source",
        columns: "rowid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, label VARCHAR(32) NOT NULL, source_id INTEGER NOT NULL, flag TINYINT NOT NULL DEFAULT 0",
        indexes: &[("source__source_id", "(source_id)")],
    },
];

pub const CANDIDATE_TABLES: &[TableDef] = &[
    TableDef {
        name: "main_biopolymer",
        columns: "biopolymer_id INTEGER PRIMARY KEY NOT NULL, flag TINYINT NOT NULL DEFAULT 0",
        indexes: &[],
    },
    TableDef {
        name: "alt_biopolymer",
        columns: "biopolymer_id INTEGER PRIMARY KEY NOT NULL, flag TINYINT NOT NULL DEFAULT 0",
        indexes: &[],
    },
    TableDef {
        name: "group",
        columns: "group_id INTEGER PRIMARY KEY NOT NULL, flag TINYINT NOT NULL DEFAULT 0",
        indexes: &[],
    },
];

pub const USER_TABLES: &[TableDef] = &[
    TableDef {
        name: "group",
        columns: "group_id INTEGER PRIMARY KEY NOT NULL, label VARCHAR(64) NOT NULL, description VARCHAR(256), source_id INTEGER NOT NULL, extra TEXT",
        indexes: &[("group__label", "(label)")],
    },
    TableDef {
        name: "group_group",
        columns: "group_id INTEGER NOT NULL, related_group_id INTEGER NOT NULL, contains TINYINT, PRIMARY KEY (group_id,related_group_id)",
        indexes: &[("group_group__related", "(related_group_id,group_id)")],
    },
    TableDef {
        name: "group_biopolymer",
        columns: "group_id INTEGER NOT NULL, biopolymer_id INTEGER NOT NULL, PRIMARY KEY (group_id,biopolymer_id)",
        indexes: &[("group_biopolymer__biopolymer", "(biopolymer_id,group_id)")],
    },
    TableDef {
        name: "source",
        columns: "source_id INTEGER PRIMARY KEY NOT NULL, source VARCHAR(32) NOT NULL, description VARCHAR(256) NOT NULL",
        indexes: &[],
    },
];

/// Reference tables the built-in catalog reads.
pub const KNOWLEDGE_TABLES: &[TableDef] = &[
    TableDef {
        name: "setting",
        columns: "setting VARCHAR(32) PRIMARY KEY NOT NULL, value VARCHAR(256)",
        indexes: &[],
    },
    TableDef {
        name: "ldprofile",
        columns: "ldprofile_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, ldprofile VARCHAR(32) UNIQUE NOT NULL, description VARCHAR(128), metric VARCHAR(32), value DOUBLE",
        indexes: &[],
    },
    TableDef {
        name: "namespace",
        columns: "namespace_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, namespace VARCHAR(32) UNIQUE NOT NULL, polygenic TINYINT NOT NULL DEFAULT 0",
        indexes: &[],
    },
    TableDef {
        name: "type",
        columns: "type_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, type VARCHAR(32) UNIQUE NOT NULL",
        indexes: &[],
    },
    TableDef {
        name: "subtype",
        columns: "subtype_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, subtype VARCHAR(32) UNIQUE NOT NULL",
        indexes: &[],
    },
    TableDef {
        name: "source",
        columns: "source_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, source VARCHAR(32) UNIQUE NOT NULL, updated DATETIME, version VARCHAR(32), grch INTEGER, ucschg INTEGER, current_ucschg INTEGER",
        indexes: &[],
    },
    TableDef {
        name: "snp_locus",
        columns: "rs INTEGER NOT NULL, chr TINYINT NOT NULL, pos BIGINT NOT NULL, validated TINYINT NOT NULL, source_id TINYINT NOT NULL",
        indexes: &[
            ("snp_locus__rs_chr_pos", "(rs,chr,pos)"),
            ("snp_locus__chr_pos_rs", "(chr,pos,rs)"),
        ],
    },
    TableDef {
        name: "biopolymer",
        columns: "biopolymer_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, type_id TINYINT NOT NULL, label VARCHAR(64) NOT NULL, description VARCHAR(256), source_id TINYINT NOT NULL",
        indexes: &[
            ("biopolymer__type", "(type_id)"),
            ("biopolymer__label_type", "(label,type_id)"),
        ],
    },
    TableDef {
        name: "biopolymer_name",
        columns: "biopolymer_id INTEGER NOT NULL, namespace_id INTEGER NOT NULL, name VARCHAR(256) NOT NULL, source_id TINYINT NOT NULL, PRIMARY KEY (biopolymer_id,namespace_id,name)",
        indexes: &[(
            "biopolymer_name__name_namespace_biopolymer",
            "(name,namespace_id,biopolymer_id)",
        )],
    },
    TableDef {
        name: "biopolymer_region",
        columns: "biopolymer_id INTEGER NOT NULL, ldprofile_id INTEGER NOT NULL, chr TINYINT NOT NULL, posMin BIGINT NOT NULL, posMax BIGINT NOT NULL, source_id TINYINT NOT NULL, PRIMARY KEY (biopolymer_id,ldprofile_id,chr,posMin,posMax)",
        indexes: &[
            ("biopolymer_region__ldprofile_chr_min", "(ldprofile_id,chr,posMin)"),
            ("biopolymer_region__ldprofile_chr_max", "(ldprofile_id,chr,posMax)"),
        ],
    },
    TableDef {
        name: "biopolymer_zone",
        columns: "biopolymer_id INTEGER NOT NULL, chr TINYINT NOT NULL, zone INTEGER NOT NULL, PRIMARY KEY (biopolymer_id,chr,zone)",
        indexes: &[("biopolymer_zone__zone", "(chr,zone,biopolymer_id)")],
    },
    TableDef {
        name: "group",
        columns: "group_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, type_id TINYINT NOT NULL, subtype_id TINYINT, label VARCHAR(64) NOT NULL, description VARCHAR(256), source_id TINYINT NOT NULL",
        indexes: &[
            ("group__type", "(type_id)"),
            ("group__label_type", "(label,type_id)"),
        ],
    },
    TableDef {
        name: "group_name",
        columns: "group_id INTEGER NOT NULL, namespace_id INTEGER NOT NULL, name VARCHAR(256) NOT NULL, source_id TINYINT NOT NULL, PRIMARY KEY (group_id,namespace_id,name)",
        indexes: &[(
            "group_name__name_namespace_group",
            "(name,namespace_id,group_id)",
        )],
    },
    TableDef {
        name: "group_biopolymer",
        columns: "group_id INTEGER NOT NULL, biopolymer_id INTEGER NOT NULL, specificity TINYINT NOT NULL, implication TINYINT NOT NULL, quality TINYINT NOT NULL, source_id TINYINT NOT NULL, PRIMARY KEY (group_id,biopolymer_id,source_id)",
        indexes: &[("group_biopolymer__biopolymer", "(biopolymer_id,group_id)")],
    },
    TableDef {
        name: "gwas",
        columns: "gwas_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, rs INTEGER, chr TINYINT, pos BIGINT, trait VARCHAR(256) NOT NULL, snps VARCHAR(256), orbeta VARCHAR(8), allele95ci VARCHAR(16), riskAfreq VARCHAR(16), pubmed_id INTEGER, source_id TINYINT NOT NULL",
        indexes: &[("gwas__rs", "(rs)"), ("gwas__chr_pos", "(chr,pos)")],
    },
];

/// Default number of bases per zone in a fresh knowledge database.
pub const DEFAULT_ZONE_SIZE: i64 = 100_000;

/// Tables owned by `namespace`.
pub fn tables_for(namespace: Namespace) -> &'static [TableDef] {
    match namespace {
        Namespace::Main | Namespace::Alt => FILTER_TABLES,
        Namespace::Cand => CANDIDATE_TABLES,
        Namespace::User => USER_TABLES,
        Namespace::Db => KNOWLEDGE_TABLES,
    }
}
