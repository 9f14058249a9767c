//! The session facade: insert, update, select, delete over a connection pool

use crate::dialect::Dialect;
use crate::executor::{ConnectionPool, Transaction, TransactionalPool};
use crate::filter::Filter;
use crate::modifier::Modifier;
use crate::statement::{self, ColumnValues, Columns, Statement, Target};
use crate::{Result, Value};
use serde::de::DeserializeOwned;

/// A logical database session: owns the pool handle and the SQL dialect.
///
/// One `Db` value is one unsynchronized session; callers wanting concurrent
/// use clone it and serialize at their own level.
#[derive(Clone)]
pub struct Db<P> {
    pool: P,
    dialect: Dialect,
}

impl<P: TransactionalPool> Db<P> {
    /// Create a session with the default (MySQL) dialect
    pub fn new(pool: P) -> Self {
        Self {
            pool,
            dialect: Dialect::default(),
        }
    }

    /// Create a session generating SQL for the given dialect
    pub fn with_dialect(pool: P, dialect: Dialect) -> Self {
        Self { pool, dialect }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Insert one record; returns the generated row identifier.
    pub async fn insert(&self, table: &str, row: ColumnValues) -> Result<i64> {
        let stmt = statement::insert_statement(table, &row, &self.dialect)?;
        trace_statement(&stmt);
        self.pool.execute_insert(&stmt.sql, &stmt.values).await
    }

    /// Insert a batch inside one transaction; either every record commits
    /// or none do. Returns the generated identifiers in input order.
    ///
    /// The SQL skeleton is computed from the first record; every record is
    /// trusted to share its column set.
    pub async fn insert_batch(&self, table: &str, rows: Vec<ColumnValues>) -> Result<Vec<i64>> {
        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };
        let stmt = statement::insert_statement(table, first, &self.dialect)?;

        let mut txn = self.pool.begin_transaction().await?;
        let mut ids = Vec::with_capacity(rows.len());
        for row in &rows {
            let values = row.values();
            trace_sql(&stmt.sql, &values);
            match txn.execute_insert(&stmt.sql, &values).await {
                Ok(id) => ids.push(id),
                Err(e) => {
                    let _ = txn.rollback().await;
                    return Err(e);
                }
            }
        }
        txn.commit().await?;
        Ok(ids)
    }

    /// Update matching records; returns the affected-row count.
    ///
    /// An empty filter updates every row.
    pub async fn update(&self, table: &str, row: ColumnValues, filter: &Filter) -> Result<u64> {
        let stmt = statement::update_statement(table, &row, filter, &self.dialect)?;
        trace_statement(&stmt);
        self.pool.execute(&stmt.sql, &stmt.values).await
    }

    /// Update a batch inside one transaction; either every record commits
    /// or none do.
    ///
    /// The SQL skeleton comes from the first pair; every pair is trusted to
    /// share the first row's column set and the first filter's shape.
    pub async fn update_batch(
        &self,
        table: &str,
        pairs: Vec<(ColumnValues, Filter)>,
    ) -> Result<()> {
        let Some((first_row, first_filter)) = pairs.first() else {
            return Ok(());
        };
        let stmt = statement::update_statement(table, first_row, first_filter, &self.dialect)?;

        let mut txn = self.pool.begin_transaction().await?;
        for (row, filter) in &pairs {
            let mut values = row.values();
            let (_, where_vals) = filter.to_where(&self.dialect);
            values.extend(where_vals);
            trace_sql(&stmt.sql, &values);
            if let Err(e) = txn.execute(&stmt.sql, &values).await {
                let _ = txn.rollback().await;
                return Err(e);
            }
        }
        txn.commit().await?;
        Ok(())
    }

    /// Select rows; `columns` may be raw list text or a list of names.
    pub async fn select<T, C>(
        &self,
        table: &str,
        columns: C,
        filter: &Filter,
        modifier: &Modifier,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + Unpin,
        C: Into<Columns>,
    {
        let stmt =
            statement::select_statement(table, &columns.into(), filter, modifier, &self.dialect);
        trace_statement(&stmt);
        self.pool.fetch_all(&stmt.sql, &stmt.values).await
    }

    /// Delete rows in scope; returns the affected-row count.
    ///
    /// An empty filter deletes nothing and returns 0.
    pub async fn delete(&self, table: &str, target: Target) -> Result<u64> {
        match statement::delete_statement(table, &target, &self.dialect) {
            Some(stmt) => {
                trace_statement(&stmt);
                self.pool.execute(&stmt.sql, &stmt.values).await
            }
            None => {
                tracing::debug!(table, "delete skipped: empty filter");
                Ok(0)
            }
        }
    }

    /// Run caller-supplied SQL as-is; returns the affected-row count.
    pub async fn exec(&self, sql: &str) -> Result<u64> {
        trace_sql(sql, &[]);
        self.pool.execute(sql, &[]).await
    }

    /// Run caller-supplied SQL with bound values and fetch every row.
    pub async fn query<T>(&self, sql: &str, values: Vec<Value>) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + Unpin,
    {
        trace_sql(sql, &values);
        self.pool.fetch_all(sql, &values).await
    }
}

fn trace_statement(stmt: &Statement) {
    trace_sql(&stmt.sql, &stmt.values);
}

fn trace_sql(sql: &str, values: &[Value]) {
    tracing::debug!(sql, ?values);
}
