use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use super::errors::StoreError;
use super::schema::{tables_for, DEFAULT_ZONE_SIZE};
use crate::catalog::{FilterState, Namespace};
use crate::config::ConfigError;
use crate::zone_index::ZoneSize;

const IN_MEMORY: &str = ":memory:";

/// One connection with every namespace attached as its own schema.
///
/// The reference database is attached as `db`; the input namespaces other
/// than `main` live in memory for the lifetime of the store.
pub struct KnowledgeStore {
    connection: Connection,
}

impl KnowledgeStore {
    /// Opens the knowledge database in the given file.
    pub fn open<P: AsRef<Path>>(knowledge: P) -> Result<Self, StoreError> {
        let path = knowledge.as_ref().to_string_lossy().into_owned();
        Self::with_knowledge(&path)
    }

    /// A store whose knowledge database is also in memory.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_knowledge(IN_MEMORY)
    }

    fn with_knowledge(path: &str) -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory()?;
        connection
            .execute("ATTACH DATABASE ?1 AS `db`", (path,))
            .map_err(|error| StoreError::Attach {
                path: path.to_string(),
                error,
            })?;
        for namespace in [Namespace::Alt, Namespace::Cand, Namespace::User] {
            connection.execute(
                &format!("ATTACH DATABASE '{}' AS `{}`", IN_MEMORY, namespace.schema_name()),
                (),
            )?;
        }
        log::debug!("opened knowledge database '{}'", path);
        Ok(KnowledgeStore { connection })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.connection
    }

    /// Creates the tables of every input namespace.
    pub fn create_input_schema(&self) -> Result<(), StoreError> {
        for namespace in Namespace::INPUT {
            self.create_tables(namespace)?;
        }
        Ok(())
    }

    /// Creates the reference tables and seeds the default zone size.
    pub fn create_knowledge_schema(&self) -> Result<(), StoreError> {
        self.create_tables(Namespace::Db)?;
        self.connection.execute(
            "INSERT OR IGNORE INTO `db`.`setting` (setting, value) VALUES (?1, ?2)",
            ("zone_size", DEFAULT_ZONE_SIZE.to_string()),
        )?;
        Ok(())
    }

    fn create_tables(&self, namespace: Namespace) -> Result<(), StoreError> {
        for table in tables_for(namespace) {
            for statement in table.create_statements(namespace) {
                self.connection.execute(&statement, ())?;
            }
        }
        Ok(())
    }

    /// Value of a reference database setting.
    pub fn setting(&self, name: &str) -> Result<Option<String>, StoreError> {
        let value: Option<Option<String>> = self
            .connection
            .query_row(
                "SELECT value FROM `db`.`setting` WHERE setting = ?1",
                (name,),
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    pub fn zone_size(&self) -> Result<ZoneSize, StoreError> {
        let value = self.setting("zone_size")?.ok_or_else(|| ConfigError::MissingSetting {
            name: "zone_size".to_string(),
        })?;
        let size: i64 = value.trim().parse().map_err(|_| StoreError::InvalidSetting {
            name: "zone_size".to_string(),
            value: value.clone(),
        })?;
        Ok(ZoneSize::new(size)?)
    }

    pub fn ld_profile_id(&self, profile: &str) -> Result<Option<i64>, StoreError> {
        self.lookup_id(
            "SELECT ldprofile_id FROM `db`.`ldprofile` WHERE LOWER(ldprofile) = LOWER(?1)",
            profile,
        )
    }

    pub fn type_id(&self, name: &str) -> Result<Option<i64>, StoreError> {
        self.lookup_id("SELECT type_id FROM `db`.`type` WHERE type = ?1", name)
    }

    pub fn namespace_id(&self, name: &str) -> Result<Option<i64>, StoreError> {
        self.lookup_id(
            "SELECT namespace_id FROM `db`.`namespace` WHERE namespace = ?1",
            name,
        )
    }

    fn lookup_id(&self, sql: &str, key: &str) -> Result<Option<i64>, StoreError> {
        Ok(self
            .connection
            .query_row(sql, (key,), |row| row.get(0))
            .optional()?)
    }

    /// Number of rows in `namespace.table`.
    pub fn row_count(&self, namespace: Namespace, table: &str) -> Result<u64, StoreError> {
        let sql = format!(
            "SELECT COUNT(*) FROM `{}`.`{}`",
            namespace.schema_name(),
            table
        );
        let count: i64 = self.connection.query_row(&sql, (), |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Whether `namespace.table` exists.
    pub fn has_table(&self, namespace: Namespace, table: &str) -> Result<bool, StoreError> {
        let sql = format!(
            "SELECT 1 FROM `{}`.sqlite_master WHERE type = 'table' AND name = ?1",
            namespace.schema_name()
        );
        Ok(self
            .connection
            .query_row(&sql, (table,), |_| Ok(()))
            .optional()?
            .is_some())
    }
}

impl FilterState {
    /// Row counts of every input table present in the store.
    pub fn from_store(store: &KnowledgeStore) -> Result<Self, StoreError> {
        let mut state = FilterState::new();
        for namespace in Namespace::INPUT {
            for table in tables_for(namespace) {
                if store.has_table(namespace, table.name)? {
                    state.set_count(namespace, table.name, store.row_count(namespace, table.name)?);
                }
            }
        }
        Ok(state)
    }
}
