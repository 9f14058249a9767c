//! Statement execution over a generic parameterized connection

use crate::{Result, Value};
use serde::de::DeserializeOwned;
use std::future::Future;

/// Parameterized-query execution capability of a database handle
pub trait ConnectionPool: Send + Sync + Clone {
    /// Run a statement that returns no rows; yields the affected-row count
    fn execute(&self, sql: &str, params: &[Value]) -> impl Future<Output = Result<u64>> + Send;

    /// Run an INSERT and report the generated row identifier
    fn execute_insert(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<i64>> + Send;

    /// Run a query and return every row, deserialized
    fn fetch_all<T>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<Vec<T>>> + Send
    where
        T: DeserializeOwned + Send + Unpin;
}

/// An open database transaction
pub trait Transaction: Send {
    /// Run a statement inside the transaction; yields the affected-row count
    fn execute(&mut self, sql: &str, params: &[Value]) -> impl Future<Output = Result<u64>> + Send;

    /// Run an INSERT inside the transaction and report the generated row
    /// identifier
    fn execute_insert(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<i64>> + Send;

    /// Commit the transaction
    fn commit(self) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized;

    /// Rollback the transaction
    fn rollback(self) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized;
}

/// Pools that can open transactions
pub trait TransactionalPool: ConnectionPool {
    type Transaction: Transaction;

    /// Start a new transaction
    fn begin_transaction(&self) -> impl Future<Output = Result<Self::Transaction>> + Send;
}

/// SQLx MySQL pool wrapper
#[cfg(feature = "mysql")]
pub mod mysql {
    use super::*;
    use crate::Error;
    use sqlx::mysql::{MySqlArguments, MySqlRow};
    use sqlx::{Column, MySql, Row, TypeInfo};

    /// MySQL connection pool wrapper
    #[derive(Clone)]
    pub struct MySqlPool {
        inner: sqlx::MySqlPool,
    }

    impl MySqlPool {
        /// Create a new MySQL pool from a connection string
        pub async fn connect(database_url: &str) -> Result<Self> {
            let pool = sqlx::MySqlPool::connect(database_url)
                .await
                .map_err(Error::Connection)?;
            Ok(Self { inner: pool })
        }

        /// Create from an existing sqlx pool
        pub fn from_pool(pool: sqlx::MySqlPool) -> Self {
            Self { inner: pool }
        }
    }

    impl ConnectionPool for MySqlPool {
        async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
            let query = bind_values(sqlx::query(sql), params);
            let result = query.execute(&self.inner).await?;
            Ok(result.rows_affected())
        }

        async fn execute_insert(&self, sql: &str, params: &[Value]) -> Result<i64> {
            let query = bind_values(sqlx::query(sql), params);
            let result = query.execute(&self.inner).await?;
            Ok(result.last_insert_id() as i64)
        }

        async fn fetch_all<T>(&self, sql: &str, params: &[Value]) -> Result<Vec<T>>
        where
            T: DeserializeOwned + Send + Unpin,
        {
            let query = bind_values(sqlx::query(sql), params);
            let rows = query.fetch_all(&self.inner).await?;
            rows_to_items(&rows)
        }
    }

    /// MySQL transaction wrapper
    pub struct MySqlTransaction {
        inner: sqlx::Transaction<'static, MySql>,
    }

    impl Transaction for MySqlTransaction {
        async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
            let query = bind_values(sqlx::query(sql), params);
            let result = query.execute(&mut *self.inner).await?;
            Ok(result.rows_affected())
        }

        async fn execute_insert(&mut self, sql: &str, params: &[Value]) -> Result<i64> {
            let query = bind_values(sqlx::query(sql), params);
            let result = query.execute(&mut *self.inner).await?;
            Ok(result.last_insert_id() as i64)
        }

        async fn commit(self) -> Result<()> {
            self.inner.commit().await?;
            Ok(())
        }

        async fn rollback(self) -> Result<()> {
            self.inner.rollback().await?;
            Ok(())
        }
    }

    impl TransactionalPool for MySqlPool {
        type Transaction = MySqlTransaction;

        async fn begin_transaction(&self) -> Result<Self::Transaction> {
            let txn = self.inner.begin().await?;
            Ok(MySqlTransaction { inner: txn })
        }
    }

    /// Bind Tabula values to a SQLx query
    fn bind_values<'q>(
        mut query: sqlx::query::Query<'q, MySql, MySqlArguments>,
        params: &'q [Value],
    ) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
        for param in params {
            query = match param {
                Value::Null => query.bind(None::<i32>),
                Value::Bool(b) => query.bind(*b),
                Value::I32(i) => query.bind(*i),
                Value::I64(i) => query.bind(*i),
                Value::F32(f) => query.bind(*f),
                Value::F64(f) => query.bind(*f),
                Value::String(s) => query.bind(s.as_str()),
                Value::Bytes(b) => query.bind(b.as_slice()),
                Value::Json(j) => query.bind(j),
                #[cfg(feature = "uuid-support")]
                Value::Uuid(u) => query.bind(*u),
                #[cfg(feature = "datetime-support")]
                Value::DateTime(t) => query.bind(*t),
                #[cfg(feature = "decimal-support")]
                Value::Decimal(d) => query.bind(*d),
            };
        }
        query
    }

    fn rows_to_items<T>(rows: &[MySqlRow]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let json_value = row_to_json_value(row);
            items.push(serde_json::from_value(json_value)?);
        }
        Ok(items)
    }

    fn row_to_json_value(row: &MySqlRow) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (i, column) in row.columns().iter().enumerate() {
            let value = column_to_json(row, i, column.type_info().name());
            map.insert(column.name().to_string(), value);
        }
        serde_json::Value::Object(map)
    }

    fn column_to_json(row: &MySqlRow, i: usize, type_name: &str) -> serde_json::Value {
        use serde_json::Value as Json;

        match type_name {
            "BOOLEAN" => row
                .try_get::<Option<bool>, _>(i)
                .ok()
                .flatten()
                .map_or(Json::Null, Json::Bool),
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => row
                .try_get::<Option<i64>, _>(i)
                .ok()
                .flatten()
                .map_or(Json::Null, |v| Json::Number(v.into())),
            "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
            | "BIGINT UNSIGNED" => row
                .try_get::<Option<u64>, _>(i)
                .ok()
                .flatten()
                .map_or(Json::Null, |v| Json::Number(v.into())),
            "FLOAT" => row
                .try_get::<Option<f32>, _>(i)
                .ok()
                .flatten()
                .and_then(|v| serde_json::Number::from_f64(v as f64))
                .map_or(Json::Null, Json::Number),
            "DOUBLE" => row
                .try_get::<Option<f64>, _>(i)
                .ok()
                .flatten()
                .and_then(serde_json::Number::from_f64)
                .map_or(Json::Null, Json::Number),
            "JSON" => row
                .try_get::<Option<serde_json::Value>, _>(i)
                .ok()
                .flatten()
                .unwrap_or(Json::Null),
            "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => row
                .try_get::<Option<Vec<u8>>, _>(i)
                .ok()
                .flatten()
                .map_or(Json::Null, |bytes| {
                    Json::Array(bytes.into_iter().map(|b| Json::Number(b.into())).collect())
                }),
            #[cfg(feature = "datetime-support")]
            "DATE" => row
                .try_get::<Option<chrono::NaiveDate>, _>(i)
                .ok()
                .flatten()
                .map_or(Json::Null, |v| Json::String(v.to_string())),
            #[cfg(feature = "datetime-support")]
            "DATETIME" => row
                .try_get::<Option<chrono::NaiveDateTime>, _>(i)
                .ok()
                .flatten()
                .map_or(Json::Null, |v| Json::String(v.to_string())),
            #[cfg(feature = "datetime-support")]
            "TIMESTAMP" => row
                .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(i)
                .ok()
                .flatten()
                .map_or(Json::Null, |v| Json::String(v.to_rfc3339())),
            #[cfg(feature = "decimal-support")]
            "DECIMAL" => row
                .try_get::<Option<rust_decimal::Decimal>, _>(i)
                .ok()
                .flatten()
                .map_or(Json::Null, |v| Json::String(v.to_string())),
            // remaining types surface as text when the driver allows it
            _ => row
                .try_get::<Option<String>, _>(i)
                .ok()
                .flatten()
                .map_or(Json::Null, Json::String),
        }
    }
}

/// SQLx SQLite pool wrapper
#[cfg(feature = "sqlite")]
pub mod sqlite {
    use super::*;
    use crate::Error;
    use sqlx::sqlite::{SqliteArguments, SqliteRow};
    use sqlx::{Column, Row, Sqlite, TypeInfo};

    /// SQLite connection pool wrapper
    #[derive(Clone)]
    pub struct SqlitePool {
        inner: sqlx::SqlitePool,
    }

    impl SqlitePool {
        /// Create a new SQLite pool from a connection string
        pub async fn connect(database_url: &str) -> Result<Self> {
            let pool = sqlx::SqlitePool::connect(database_url)
                .await
                .map_err(Error::Connection)?;
            Ok(Self { inner: pool })
        }

        /// Create from an existing sqlx pool
        pub fn from_pool(pool: sqlx::SqlitePool) -> Self {
            Self { inner: pool }
        }
    }

    impl ConnectionPool for SqlitePool {
        async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
            let query = bind_values(sqlx::query(sql), params);
            let result = query.execute(&self.inner).await?;
            Ok(result.rows_affected())
        }

        async fn execute_insert(&self, sql: &str, params: &[Value]) -> Result<i64> {
            let query = bind_values(sqlx::query(sql), params);
            let result = query.execute(&self.inner).await?;
            Ok(result.last_insert_rowid())
        }

        async fn fetch_all<T>(&self, sql: &str, params: &[Value]) -> Result<Vec<T>>
        where
            T: DeserializeOwned + Send + Unpin,
        {
            let query = bind_values(sqlx::query(sql), params);
            let rows = query.fetch_all(&self.inner).await?;
            rows_to_items(&rows)
        }
    }

    /// SQLite transaction wrapper
    pub struct SqliteTransaction {
        inner: sqlx::Transaction<'static, Sqlite>,
    }

    impl Transaction for SqliteTransaction {
        async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
            let query = bind_values(sqlx::query(sql), params);
            let result = query.execute(&mut *self.inner).await?;
            Ok(result.rows_affected())
        }

        async fn execute_insert(&mut self, sql: &str, params: &[Value]) -> Result<i64> {
            let query = bind_values(sqlx::query(sql), params);
            let result = query.execute(&mut *self.inner).await?;
            Ok(result.last_insert_rowid())
        }

        async fn commit(self) -> Result<()> {
            self.inner.commit().await?;
            Ok(())
        }

        async fn rollback(self) -> Result<()> {
            self.inner.rollback().await?;
            Ok(())
        }
    }

    impl TransactionalPool for SqlitePool {
        type Transaction = SqliteTransaction;

        async fn begin_transaction(&self) -> Result<Self::Transaction> {
            let txn = self.inner.begin().await?;
            Ok(SqliteTransaction { inner: txn })
        }
    }

    /// Bind Tabula values to a SQLx query
    fn bind_values<'q>(
        mut query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
        params: &'q [Value],
    ) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
        for param in params {
            query = match param {
                Value::Null => query.bind(None::<i32>),
                Value::Bool(b) => query.bind(*b),
                Value::I32(i) => query.bind(*i),
                Value::I64(i) => query.bind(*i),
                Value::F32(f) => query.bind(*f),
                Value::F64(f) => query.bind(*f),
                Value::String(s) => query.bind(s.as_str()),
                Value::Bytes(b) => query.bind(b.as_slice()),
                Value::Json(j) => query.bind(j),
                #[cfg(feature = "uuid-support")]
                Value::Uuid(u) => query.bind(u.to_string()),
                #[cfg(feature = "datetime-support")]
                Value::DateTime(t) => query.bind(*t),
                // sqlite has no native decimal; bound as text
                #[cfg(feature = "decimal-support")]
                Value::Decimal(d) => query.bind(d.to_string()),
            };
        }
        query
    }

    fn rows_to_items<T>(rows: &[SqliteRow]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let json_value = row_to_json_value(row);
            items.push(serde_json::from_value(json_value)?);
        }
        Ok(items)
    }

    fn row_to_json_value(row: &SqliteRow) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (i, column) in row.columns().iter().enumerate() {
            let value = column_to_json(row, i, column.type_info().name());
            map.insert(column.name().to_string(), value);
        }
        serde_json::Value::Object(map)
    }

    fn column_to_json(row: &SqliteRow, i: usize, type_name: &str) -> serde_json::Value {
        use serde_json::Value as Json;

        match type_name {
            "BOOLEAN" => row
                .try_get::<Option<bool>, _>(i)
                .ok()
                .flatten()
                .map_or(Json::Null, Json::Bool),
            "INTEGER" => row
                .try_get::<Option<i64>, _>(i)
                .ok()
                .flatten()
                .map_or(Json::Null, |v| Json::Number(v.into())),
            "REAL" => row
                .try_get::<Option<f64>, _>(i)
                .ok()
                .flatten()
                .and_then(serde_json::Number::from_f64)
                .map_or(Json::Null, Json::Number),
            "BLOB" => row
                .try_get::<Option<Vec<u8>>, _>(i)
                .ok()
                .flatten()
                .map_or(Json::Null, |bytes| {
                    Json::Array(bytes.into_iter().map(|b| Json::Number(b.into())).collect())
                }),
            #[cfg(feature = "datetime-support")]
            "DATETIME" => row
                .try_get::<Option<chrono::NaiveDateTime>, _>(i)
                .ok()
                .flatten()
                .map_or(Json::Null, |v| Json::String(v.to_string())),
            // TEXT and the remaining affinities surface as text
            _ => row
                .try_get::<Option<String>, _>(i)
                .ok()
                .flatten()
                .map_or(Json::Null, Json::String),
        }
    }
}
