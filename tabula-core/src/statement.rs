//! Statement generation: INSERT/UPDATE skeletons and composed statements

use crate::dialect::Dialect;
use crate::filter::Filter;
use crate::modifier::Modifier;
use crate::{Error, Result, Value};

/// Ordered column-to-value mapping for INSERT and UPDATE.
///
/// Entry order determines placeholder order in generated SQL and the order
/// of the bound value list.
///
/// # Examples
/// ```
/// use tabula_core::row;
///
/// let user = row().set("name", "John").set("age", 30);
/// assert_eq!(user.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnValues {
    entries: Vec<(String, Value)>,
}

impl ColumnValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column with its value
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.entries.push((column.to_string(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Column names in entry order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(column, _)| column.as_str())
    }

    /// Values in entry order
    pub fn values(&self) -> Vec<Value> {
        self.entries.iter().map(|(_, value)| value.clone()).collect()
    }
}

impl<C, V> FromIterator<(C, V)> for ColumnValues
where
    C: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        }
    }
}

impl<C, V> From<Vec<(C, V)>> for ColumnValues
where
    C: Into<String>,
    V: Into<Value>,
{
    fn from(entries: Vec<(C, V)>) -> Self {
        entries.into_iter().collect()
    }
}

/// An immutable generated statement: SQL text plus its ordered values.
///
/// The number of placeholders in `sql` equals `values.len()`, pairing
/// left-to-right.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub values: Vec<Value>,
}

/// Scope of a DELETE
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Every row in the table
    All,
    /// Rows matching the filter; an empty filter deletes nothing
    Where(Filter),
}

impl From<Filter> for Target {
    fn from(filter: Filter) -> Self {
        Target::Where(filter)
    }
}

/// Column list of a SELECT
#[derive(Debug, Clone, PartialEq)]
pub enum Columns {
    /// `*`
    All,
    /// Verbatim column list text
    Raw(String),
    /// Column names, each trimmed and quoted unless already quoted
    List(Vec<String>),
}

impl Columns {
    fn to_sql(&self, dialect: &Dialect) -> String {
        match self {
            Columns::All => "*".to_string(),
            Columns::Raw(raw) => raw.clone(),
            Columns::List(columns) => columns
                .iter()
                .map(|column| dialect.quote_ident(column.trim()))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<&str> for Columns {
    fn from(raw: &str) -> Self {
        Columns::Raw(raw.to_string())
    }
}

impl From<String> for Columns {
    fn from(raw: String) -> Self {
        Columns::Raw(raw)
    }
}

impl From<Vec<&str>> for Columns {
    fn from(columns: Vec<&str>) -> Self {
        Columns::List(columns.into_iter().map(|c| c.to_string()).collect())
    }
}

impl From<Vec<String>> for Columns {
    fn from(columns: Vec<String>) -> Self {
        Columns::List(columns)
    }
}

/// `insert into <t> (<c1>, ...) values (?, ...)`, one placeholder per
/// column in mapping order
pub fn insert_statement(table: &str, row: &ColumnValues, dialect: &Dialect) -> Result<Statement> {
    if row.is_empty() {
        return Err(Error::invalid_query("insert requires at least one column"));
    }
    let mut ph = dialect.placeholders();
    let columns: Vec<String> = row.columns().map(|c| dialect.quote_ident(c)).collect();
    let markers: Vec<String> = (0..row.len()).map(|_| ph.marker()).collect();
    let sql = format!(
        "insert into {} ({}) values ({})",
        dialect.quote_ident(table),
        columns.join(", "),
        markers.join(", ")
    );
    Ok(Statement {
        sql,
        values: row.values(),
    })
}

/// `update <t> set <c1> = ?, ...` plus the compiled WHERE clause.
///
/// Set values precede filter values in the bound value list; placeholders
/// number continuously across both parts.
pub fn update_statement(
    table: &str,
    row: &ColumnValues,
    filter: &Filter,
    dialect: &Dialect,
) -> Result<Statement> {
    if row.is_empty() {
        return Err(Error::invalid_query(
            "update requires at least one set column",
        ));
    }
    let mut ph = dialect.placeholders();
    let sets: Vec<String> = row
        .columns()
        .map(|c| format!("{} = {}", dialect.quote_ident(c), ph.marker()))
        .collect();
    let mut sql = format!("update {} set {}", dialect.quote_ident(table), sets.join(", "));
    let mut values = row.values();

    let (where_sql, where_vals) = filter.to_where_with(dialect, &mut ph);
    sql.push_str(&where_sql);
    values.extend(where_vals);

    Ok(Statement { sql, values })
}

/// `select <columns> from <t> <where> <modifiers>`
pub fn select_statement(
    table: &str,
    columns: &Columns,
    filter: &Filter,
    modifier: &Modifier,
    dialect: &Dialect,
) -> Statement {
    let mut sql = format!(
        "select {} from {}",
        columns.to_sql(dialect),
        dialect.quote_ident(table)
    );
    let (where_sql, values) = filter.to_where(dialect);
    sql.push_str(&where_sql);
    sql.push_str(&modifier.to_sql(dialect));
    Statement { sql, values }
}

/// `delete from <t> <where>`.
///
/// `Target::All` compiles to an unconditional delete; an empty filter
/// yields `None` (nothing to delete).
pub fn delete_statement(table: &str, target: &Target, dialect: &Dialect) -> Option<Statement> {
    match target {
        Target::All => Some(Statement {
            sql: format!("delete from {}", dialect.quote_ident(table)),
            values: Vec::new(),
        }),
        Target::Where(filter) if filter.is_empty() => None,
        Target::Where(filter) => {
            let (where_sql, values) = filter.to_where(dialect);
            Some(Statement {
                sql: format!("delete from {}{}", dialect.quote_ident(table), where_sql),
                values,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{CompareOp, Predicate};

    fn mysql() -> Dialect {
        Dialect::mysql()
    }

    #[test]
    fn test_insert_statement_shape() {
        let row = ColumnValues::new()
            .set("name", "John")
            .set("age", 30)
            .set("city", "York");
        let stmt = insert_statement("users", &row, &mysql()).unwrap();
        assert_eq!(
            stmt.sql,
            "insert into `users` (`name`, `age`, `city`) values (?, ?, ?)"
        );
        assert_eq!(
            stmt.values,
            vec![
                Value::String("John".to_string()),
                Value::I32(30),
                Value::String("York".to_string()),
            ]
        );
    }

    #[test]
    fn test_insert_placeholder_count_matches_columns() {
        for n in 1..=8 {
            let row: ColumnValues = (0..n).map(|i| (format!("c{}", i), Value::I32(i))).collect();
            let stmt = insert_statement("t", &row, &mysql()).unwrap();
            assert_eq!(stmt.sql.matches('?').count(), n as usize);
            assert_eq!(stmt.values.len(), n as usize);
        }
    }

    #[test]
    fn test_insert_empty_row_fails() {
        let result = insert_statement("users", &ColumnValues::new(), &mysql());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("insert requires at least one column"));
    }

    #[test]
    fn test_update_statement_shape() {
        let row = ColumnValues::new().set("name", "Jane").set("age", 25);
        let filter = Filter::new().eq("id", 7);
        let stmt = update_statement("users", &row, &filter, &mysql()).unwrap();
        assert_eq!(
            stmt.sql,
            "update `users` set `name` = ?, `age` = ? where `id` = ?"
        );
        assert_eq!(
            stmt.values,
            vec![
                Value::String("Jane".to_string()),
                Value::I32(25),
                Value::I32(7),
            ]
        );
    }

    #[test]
    fn test_update_without_filter_has_no_where() {
        let row = ColumnValues::new().set("active", false);
        let stmt = update_statement("users", &row, &Filter::new(), &mysql()).unwrap();
        assert_eq!(stmt.sql, "update `users` set `active` = ?");
        assert_eq!(stmt.values.len(), 1);
    }

    #[test]
    fn test_update_empty_row_fails() {
        let result = update_statement("users", &ColumnValues::new(), &Filter::new(), &mysql());
        assert!(result.is_err());
    }

    #[test]
    fn test_update_numbering_continues_into_where() {
        let row = ColumnValues::new().set("name", "Jane").set("age", 25);
        let filter = Filter::new().where_("id", Predicate::gte(1).and_also(CompareOp::Lt, 10));
        let stmt = update_statement("users", &row, &filter, &Dialect::postgres()).unwrap();
        assert_eq!(
            stmt.sql,
            "update \"users\" set \"name\" = $1, \"age\" = $2 where (\"id\" >= $3 and \"id\" < $4)"
        );
        assert_eq!(stmt.values.len(), 4);
    }

    #[test]
    fn test_select_star() {
        let stmt = select_statement(
            "users",
            &Columns::All,
            &Filter::new(),
            &Modifier::new(),
            &mysql(),
        );
        assert_eq!(stmt.sql, "select * from `users`");
        assert!(stmt.values.is_empty());
    }

    #[test]
    fn test_select_raw_columns_passthrough() {
        let stmt = select_statement(
            "users",
            &Columns::from("id, count(*) as n"),
            &Filter::new(),
            &Modifier::new(),
            &mysql(),
        );
        assert_eq!(stmt.sql, "select id, count(*) as n from `users`");
    }

    #[test]
    fn test_select_list_columns_quoted_and_trimmed() {
        let stmt = select_statement(
            "users",
            &Columns::from(vec![" id", "name ", "count(id)"]),
            &Filter::new(),
            &Modifier::new(),
            &mysql(),
        );
        assert_eq!(stmt.sql, "select `id`, `name`, count(id) from `users`");
    }

    #[test]
    fn test_select_with_filter_and_modifier() {
        let filter = Filter::new().where_("age", Predicate::gt(18));
        let modifier = Modifier::new().order_by("age desc").limit(0, 10);
        let stmt = select_statement("users", &Columns::All, &filter, &modifier, &mysql());
        assert_eq!(
            stmt.sql,
            "select * from `users` where `age` > ? order by age desc limit 0,10"
        );
        assert_eq!(stmt.values, vec![Value::I32(18)]);
    }

    #[test]
    fn test_delete_all() {
        let stmt = delete_statement("logs", &Target::All, &mysql()).unwrap();
        assert_eq!(stmt.sql, "delete from `logs`");
        assert!(stmt.values.is_empty());
    }

    #[test]
    fn test_delete_with_filter() {
        let target = Target::from(Filter::new().eq("id", 3));
        let stmt = delete_statement("logs", &target, &mysql()).unwrap();
        assert_eq!(stmt.sql, "delete from `logs` where `id` = ?");
        assert_eq!(stmt.values, vec![Value::I32(3)]);
    }

    #[test]
    fn test_delete_empty_filter_is_noop() {
        let target = Target::Where(Filter::new());
        assert!(delete_statement("logs", &target, &mysql()).is_none());
    }
}
