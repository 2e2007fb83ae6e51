use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::CatalogError;

/// Table that shares its liveness with the table it buckets.
pub const REGION_ZONE_TABLE: &str = "region_zone";
const REGION_TABLE: &str = "region";

/// One of the fixed data partitions of the knowledge store.
///
/// Every namespace is a separate SQLite schema on the same connection;
/// `Main` is SQLite's own `main` schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Primary input set
    Main,
    /// Alternate input set
    Alt,
    /// Modeling candidates
    Cand,
    /// User-supplied knowledge
    User,
    /// Read-only reference knowledge
    Db,
}

impl Namespace {
    pub const ALL: [Namespace; 5] = [
        Namespace::Main,
        Namespace::Alt,
        Namespace::Cand,
        Namespace::User,
        Namespace::Db,
    ];

    /// Namespaces whose tables are filled per run by the caller.
    pub const INPUT: [Namespace; 4] = [
        Namespace::Main,
        Namespace::Alt,
        Namespace::Cand,
        Namespace::User,
    ];

    pub fn schema_name(&self) -> &'static str {
        match self {
            Namespace::Main => "main",
            Namespace::Alt => "alt",
            Namespace::Cand => "cand",
            Namespace::User => "user",
            Namespace::Db => "db",
        }
    }

    /// Whether queries may be focused on this namespace.
    pub fn has_input_schema(&self) -> bool {
        !matches!(self, Namespace::Db)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema_name())
    }
}

impl FromStr for Namespace {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" => Ok(Namespace::Main),
            "alt" => Ok(Namespace::Alt),
            "cand" => Ok(Namespace::Cand),
            "user" => Ok(Namespace::User),
            "db" => Ok(Namespace::Db),
            _ => Err(CatalogError::UnknownNamespace {
                namespace: s.to_string(),
            }),
        }
    }
}

/// A physical `(namespace, table)` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub namespace: Namespace,
    pub table: String,
}

impl TableRef {
    pub fn new(namespace: Namespace, table: impl Into<String>) -> Self {
        TableRef {
            namespace,
            table: table.into(),
        }
    }

    /// Table name used for liveness checks: a zone bucket table is live
    /// exactly when the region table it indexes is.
    pub fn qualifying_table(&self) -> &str {
        if self.table == REGION_ZONE_TABLE {
            REGION_TABLE
        } else {
            &self.table
        }
    }

    pub fn is_zone_table(&self) -> bool {
        self.table == REGION_ZONE_TABLE
    }

    /// `` `namespace`.`table` ``
    pub fn quoted(&self) -> String {
        format!("`{}`.`{}`", self.namespace.schema_name(), self.table)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_table_qualifies_as_region() {
        let zones = TableRef::new(Namespace::Main, "region_zone");
        assert_eq!(zones.qualifying_table(), "region");
        assert!(zones.is_zone_table());

        let locus = TableRef::new(Namespace::Main, "locus");
        assert_eq!(locus.qualifying_table(), "locus");
    }

    #[test]
    fn test_namespace_parsing() {
        assert_eq!("ALT".parse::<Namespace>().unwrap(), Namespace::Alt);
        assert!("knowledge".parse::<Namespace>().is_err());
        assert!(!Namespace::Db.has_input_schema());
        assert_eq!(
            TableRef::new(Namespace::Db, "group").quoted(),
            "`db`.`group`"
        );
    }
}
