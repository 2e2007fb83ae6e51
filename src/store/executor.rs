//! Runs compiled plans and streams de-duplicated rows.
//!
//! Every rendered query ends with the `_rowid` identity column. The row
//! stream strips it from the rows it yields and uses it to suppress repeats, either
//! across the whole result ([`DedupPolicy::Distinct`]) or only between
//! consecutive rows ([`DedupPolicy::Adjacent`]).

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, MappedRows, Row, Statement};
use std::collections::HashSet;
use std::fmt;

use super::connection::KnowledgeStore;
use super::errors::StoreError;
use crate::query_planner::QueryPlan;
use crate::sql_generator::{generate_sql, RenderOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupPolicy {
    /// One row per identity over both queries.
    Distinct,
    /// Drop a row only when it repeats the identity of the row before it.
    Adjacent,
}

impl DedupPolicy {
    pub fn from_allow_duplicates(allow_duplicates: bool) -> Self {
        if allow_duplicates {
            DedupPolicy::Adjacent
        } else {
            DedupPolicy::Distinct
        }
    }
}

/// Hashable form of a non-NULL identity value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Integer(i64),
    Real(u64),
    Text(String),
    Blob(Vec<u8>),
}

impl IdentityKey {
    /// `None` for NULL, which never matches another identity.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Integer(i) => Some(IdentityKey::Integer(*i)),
            Value::Real(r) => Some(IdentityKey::Real(r.to_bits())),
            Value::Text(t) => Some(IdentityKey::Text(t.clone())),
            Value::Blob(b) => Some(IdentityKey::Blob(b.clone())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RowDeduplicator {
    policy: DedupPolicy,
    seen: HashSet<IdentityKey>,
    last: Option<IdentityKey>,
}

impl RowDeduplicator {
    pub fn new(policy: DedupPolicy) -> Self {
        RowDeduplicator {
            policy,
            seen: HashSet::new(),
            last: None,
        }
    }

    /// Called before each query's rows; adjacency does not carry over.
    pub fn start_query(&mut self) {
        self.last = None;
    }

    /// Whether a row with this identity should be yielded.
    pub fn admit(&mut self, identity: &Value) -> bool {
        let Some(key) = IdentityKey::from_value(identity) else {
            self.last = None;
            return true;
        };
        match self.policy {
            DedupPolicy::Distinct => self.seen.insert(key),
            DedupPolicy::Adjacent => {
                if self.last.as_ref() == Some(&key) {
                    false
                } else {
                    self.last = Some(key);
                    true
                }
            }
        }
    }
}

/// One row of `EXPLAIN QUERY PLAN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainStep {
    pub id: i64,
    pub parent: i64,
    pub detail: String,
}

impl fmt::Display for ExplainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.parent, self.detail)
    }
}

pub struct ResultExecutor<'a> {
    connection: &'a Connection,
    debug_query: bool,
}

impl<'a> ResultExecutor<'a> {
    pub fn new(store: &'a KnowledgeStore) -> Self {
        ResultExecutor {
            connection: store.connection(),
            debug_query: false,
        }
    }

    /// Log the store's query plan instead of running anything.
    pub fn with_debug_query(mut self, debug_query: bool) -> Self {
        self.debug_query = debug_query;
        self
    }

    /// Renders and prepares `plan`, then `secondary` if given. Nothing runs
    /// until [`PreparedResult::rows`] is iterated. With `debug_query` the
    /// plans are explained here and the result is empty.
    pub fn prepare(
        &self,
        plan: &QueryPlan,
        secondary: Option<&QueryPlan>,
        allow_duplicates: bool,
        bindings: &[Value],
    ) -> Result<PreparedResult<'a>, StoreError> {
        let policy = DedupPolicy::from_allow_duplicates(allow_duplicates);
        let mut statements = Vec::new();
        if self.debug_query {
            for step in self.explain(plan, secondary, bindings)? {
                log::info!("{}", step);
            }
        } else {
            let options = RenderOptions::default().with_sort_row_ids(allow_duplicates);
            for plan in std::iter::once(plan).chain(secondary) {
                let sql = generate_sql(plan, &options);
                log::debug!("{}", sql);
                statements.push(self.connection.prepare(&sql)?);
            }
        }
        Ok(PreparedResult {
            statements,
            bindings: bindings.to_vec(),
            policy,
        })
    }

    /// Every surviving row, identity column removed.
    pub fn collect(
        &self,
        plan: &QueryPlan,
        secondary: Option<&QueryPlan>,
        allow_duplicates: bool,
        bindings: &[Value],
    ) -> Result<Vec<Vec<Value>>, StoreError> {
        let mut result = self.prepare(plan, secondary, allow_duplicates, bindings)?;
        let rows = result.rows().collect();
        rows
    }

    /// `EXPLAIN QUERY PLAN` rows of the primary query, then the secondary.
    pub fn explain(
        &self,
        plan: &QueryPlan,
        secondary: Option<&QueryPlan>,
        bindings: &[Value],
    ) -> Result<Vec<ExplainStep>, StoreError> {
        let mut steps = Vec::new();
        for plan in std::iter::once(plan).chain(secondary) {
            let sql = generate_sql(plan, &RenderOptions::default());
            log::info!("{}", sql);
            let mut statement = self.connection.prepare(&format!("EXPLAIN QUERY PLAN {}", sql))?;
            let rows = statement.query_map(params_from_iter(bindings), |row| {
                Ok(ExplainStep {
                    id: row.get(0)?,
                    parent: row.get(1)?,
                    detail: row.get(3)?,
                })
            })?;
            for step in rows {
                steps.push(step?);
            }
        }
        Ok(steps)
    }
}

/// Prepared statements of one result, run in order by [`ResultRows`].
pub struct PreparedResult<'conn> {
    statements: Vec<Statement<'conn>>,
    bindings: Vec<Value>,
    policy: DedupPolicy,
}

impl<'conn> PreparedResult<'conn> {
    /// Lazy stream of de-duplicated rows over every statement.
    pub fn rows(&mut self) -> ResultRows<'_, 'conn> {
        ResultRows {
            pending: self.statements.iter_mut(),
            current: None,
            bindings: &self.bindings,
            dedup: RowDeduplicator::new(self.policy),
        }
    }
}

type RowReader = fn(&Row<'_>) -> rusqlite::Result<Vec<Value>>;

fn read_row(row: &Row<'_>) -> rusqlite::Result<Vec<Value>> {
    let width = row.as_ref().column_count();
    (0..width).map(|i| row.get::<_, Value>(i)).collect()
}

/// Rows of each statement in turn with the identity column stripped. The
/// first store error is yielded once and ends the stream.
pub struct ResultRows<'s, 'conn> {
    pending: std::slice::IterMut<'s, Statement<'conn>>,
    current: Option<MappedRows<'s, RowReader>>,
    bindings: &'s [Value],
    dedup: RowDeduplicator,
}

impl ResultRows<'_, '_> {
    fn fail(&mut self, error: rusqlite::Error) -> Option<Result<Vec<Value>, StoreError>> {
        self.current = None;
        self.pending = Default::default();
        Some(Err(error.into()))
    }
}

impl Iterator for ResultRows<'_, '_> {
    type Item = Result<Vec<Value>, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(rows) = self.current.as_mut() {
                match rows.next() {
                    Some(Ok(mut values)) => {
                        let identity = values.pop().unwrap_or(Value::Null);
                        if self.dedup.admit(&identity) {
                            return Some(Ok(values));
                        }
                        continue;
                    }
                    Some(Err(error)) => return self.fail(error),
                    None => self.current = None,
                }
            }
            let statement = self.pending.next()?;
            self.dedup.start_query();
            match statement.query_map(params_from_iter(self.bindings), read_row as RowReader) {
                Ok(rows) => self.current = Some(rows),
                Err(error) => return self.fail(error),
            }
        }
    }
}
