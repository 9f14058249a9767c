//! Trailing clause assembly: GROUP BY, ORDER BY, LIMIT

use crate::dialect::Dialect;

/// Trailing SELECT modifiers, appended in fixed order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Modifier {
    group_by: Option<String>,
    order_by: Option<String>,
    limit: Option<(u64, u64)>,
}

impl Modifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group by a single column
    pub fn group_by(mut self, column: &str) -> Self {
        self.group_by = Some(column.to_string());
        self
    }

    /// Raw ORDER BY fragment, appended verbatim.
    ///
    /// Not parameterized; the caller vouches for its safety.
    pub fn order_by(mut self, raw: &str) -> Self {
        self.order_by = Some(raw.to_string());
        self
    }

    /// `limit <offset>,<count>`
    pub fn limit(mut self, offset: u64, count: u64) -> Self {
        self.limit = Some((offset, count));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.group_by.is_none() && self.order_by.is_none() && self.limit.is_none()
    }

    /// Render the set fragments; empty string when nothing is set
    pub fn to_sql(&self, dialect: &Dialect) -> String {
        let mut sql = String::new();
        if let Some(column) = &self.group_by {
            sql.push_str(" group by ");
            sql.push_str(&dialect.quote_ident(column));
        }
        if let Some(raw) = &self.order_by {
            sql.push_str(" order by ");
            sql.push_str(raw);
        }
        if let Some((offset, count)) = self.limit {
            sql.push_str(&format!(" limit {},{}", offset, count));
        }
        sql
    }
}
