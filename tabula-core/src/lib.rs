//! Tabula Core - a minimal SQL statement builder and executor
//!
//! Describe insert, update, delete, and select operations with plain data
//! structures; Tabula compiles them into parameterized SQL plus an ordered
//! value list and runs them through a pluggable connection pool. Batch
//! operations run inside a single transaction: all records commit or none
//! do.

pub mod db;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod filter;
pub mod modifier;
pub mod statement;
pub mod value;

// Re-export main types
pub use db::Db;
pub use dialect::{Dialect, PlaceholderStyle, Placeholders};
pub use error::{Error, Result};
pub use executor::{ConnectionPool, Transaction, TransactionalPool};
pub use filter::{CompareOp, Condition, Filter, Joint, MatchOp, Predicate, Secondary};
pub use modifier::Modifier;
pub use statement::{
    delete_statement, insert_statement, select_statement, update_statement, ColumnValues, Columns,
    Statement, Target,
};
pub use value::Value;

/// Start an empty column-value mapping
pub fn row() -> ColumnValues {
    ColumnValues::new()
}

/// Start an empty filter
pub fn filter() -> Filter {
    Filter::new()
}
