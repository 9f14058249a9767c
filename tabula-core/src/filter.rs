//! Condition compiler: structured filters into WHERE clauses

use crate::dialect::{Dialect, Placeholders};
use crate::Value;

/// Operators in the equality family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOp {
    Eq,
    Ne,
    Like,
}

impl MatchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOp::Eq => "=",
            MatchOp::Ne => "!=",
            MatchOp::Like => "like",
        }
    }
}

/// Operators in the ordering family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }
}

/// Logical connector chaining one condition to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Joint {
    #[default]
    And,
    Or,
}

impl Joint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Joint::And => "and",
            Joint::Or => "or",
        }
    }
}

/// Secondary comparison chained inside a [`Predicate::Compare`] group
#[derive(Debug, Clone, PartialEq)]
pub struct Secondary {
    pub joint: Joint,
    pub op: CompareOp,
    pub value: Value,
}

/// The condition applied to one column
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `col <op> ?`; non-empty `any_of` adds `or col <op> ?` alternates and
    /// wraps the group in parentheses
    Matches {
        op: MatchOp,
        value: Value,
        any_of: Vec<Value>,
    },
    /// `col <op> ?`; a secondary comparison adds `and|or col <op2> ?` and
    /// wraps the group in parentheses
    Compare {
        op: CompareOp,
        value: Value,
        secondary: Option<Secondary>,
    },
    /// `col between ? and ?`, low bound first
    Between { low: Value, high: Value },
    /// `col not between ? and ?`
    NotBetween { low: Value, high: Value },
    /// `col in (?, ?, ...)`, one placeholder per element.
    /// An empty list compiles to `in ()`, which most engines reject at
    /// execution.
    In(Vec<Value>),
    /// `col not in (?, ?, ...)`
    NotIn(Vec<Value>),
}

impl Predicate {
    pub fn eq(value: impl Into<Value>) -> Self {
        Predicate::Matches {
            op: MatchOp::Eq,
            value: value.into(),
            any_of: Vec::new(),
        }
    }

    pub fn ne(value: impl Into<Value>) -> Self {
        Predicate::Matches {
            op: MatchOp::Ne,
            value: value.into(),
            any_of: Vec::new(),
        }
    }

    pub fn like(value: impl Into<Value>) -> Self {
        Predicate::Matches {
            op: MatchOp::Like,
            value: value.into(),
            any_of: Vec::new(),
        }
    }

    pub fn compare(op: CompareOp, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            op,
            value: value.into(),
            secondary: None,
        }
    }

    pub fn gt(value: impl Into<Value>) -> Self {
        Self::compare(CompareOp::Gt, value)
    }

    pub fn gte(value: impl Into<Value>) -> Self {
        Self::compare(CompareOp::Gte, value)
    }

    pub fn lt(value: impl Into<Value>) -> Self {
        Self::compare(CompareOp::Lt, value)
    }

    pub fn lte(value: impl Into<Value>) -> Self {
        Self::compare(CompareOp::Lte, value)
    }

    pub fn between(low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Predicate::Between {
            low: low.into(),
            high: high.into(),
        }
    }

    pub fn not_between(low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Predicate::NotBetween {
            low: low.into(),
            high: high.into(),
        }
    }

    pub fn in_list<T, I>(values: I) -> Self
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        Predicate::In(values.into_iter().map(Into::into).collect())
    }

    pub fn not_in<T, I>(values: I) -> Self
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        Predicate::NotIn(values.into_iter().map(Into::into).collect())
    }

    /// Add OR-alternate operand values.
    ///
    /// Only meaningful for the equality family; on any other variant the
    /// call is ignored.
    pub fn or_any<T, I>(mut self, values: I) -> Self
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        if let Predicate::Matches { any_of, .. } = &mut self {
            any_of.extend(values.into_iter().map(Into::into));
        }
        self
    }

    /// Chain ` and col <op> ?` inside the comparison group.
    ///
    /// Only meaningful for the ordering family; on any other variant the
    /// call is ignored.
    pub fn and_also(self, op: CompareOp, value: impl Into<Value>) -> Self {
        self.also(Joint::And, op, value)
    }

    /// Chain ` or col <op> ?` inside the comparison group
    pub fn or_also(self, op: CompareOp, value: impl Into<Value>) -> Self {
        self.also(Joint::Or, op, value)
    }

    fn also(mut self, joint: Joint, op: CompareOp, value: impl Into<Value>) -> Self {
        if let Predicate::Compare { secondary, .. } = &mut self {
            *secondary = Some(Secondary {
                joint,
                op,
                value: value.into(),
            });
        }
        self
    }
}

/// One filter entry: a column, its predicate, and entry modifiers
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    column: String,
    predicate: Predicate,
    prefix: Option<String>,
    suffix: Option<String>,
    joint: Joint,
}

impl Condition {
    pub fn new(column: &str, predicate: Predicate) -> Self {
        Self {
            column: column.to_string(),
            predicate,
            prefix: None,
            suffix: None,
            joint: Joint::And,
        }
    }

    /// Text prepended to the quoted column, e.g. a table alias `"u."`
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Raw SQL appended verbatim after the condition, before the joint
    pub fn suffix(mut self, suffix: &str) -> Self {
        self.suffix = Some(suffix.to_string());
        self
    }

    /// Connector to the next condition (default `and`)
    pub fn joint(mut self, joint: Joint) -> Self {
        self.joint = joint;
        self
    }
}

/// Ordered filter specification compiled into a WHERE clause
///
/// Entries compile strictly in insertion order; the emitted clause
/// preserves that order. Callers needing custom precedence use the
/// `prefix`/`suffix` raw-text escapes on [`Condition`].
///
/// # Examples
/// ```
/// use tabula_core::{Dialect, Filter, Predicate, CompareOp};
///
/// let filter = Filter::new()
///     .where_("age", Predicate::gte(18).and_also(CompareOp::Lt, 65))
///     .eq("status", "active");
/// let (clause, values) = filter.to_where(&Dialect::mysql());
/// assert_eq!(clause, " where (`age` >= ? and `age` < ?) and `status` = ?");
/// assert_eq!(values.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Scalar shorthand for `column = ?`
    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.where_(column, Predicate::eq(value))
    }

    /// Add a condition on a column
    pub fn where_(self, column: &str, predicate: Predicate) -> Self {
        self.push(Condition::new(column, predicate))
    }

    /// Add a fully configured condition entry
    pub fn push(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Compile into a WHERE clause (leading `" where"`, empty string for an
    /// empty filter) and the ordered value list.
    ///
    /// The number of placeholders in the clause always equals the length of
    /// the value list, pairing left-to-right.
    pub fn to_where(&self, dialect: &Dialect) -> (String, Vec<Value>) {
        let mut ph = dialect.placeholders();
        self.to_where_with(dialect, &mut ph)
    }

    pub(crate) fn to_where_with(
        &self,
        dialect: &Dialect,
        ph: &mut Placeholders,
    ) -> (String, Vec<Value>) {
        let mut clause = String::new();
        let mut vals = Vec::new();
        let mut tail = 0;

        for cond in &self.conditions {
            let mut column = dialect.quote_ident(&cond.column);
            if let Some(prefix) = &cond.prefix {
                column = format!("{}{}", prefix, column);
            }

            match &cond.predicate {
                Predicate::Matches { op, value, any_of } => {
                    let mut group = format!(" {} {} {}", column, op.as_str(), ph.marker());
                    vals.push(value.clone());
                    for alt in any_of {
                        group.push_str(&format!(
                            " or {} {} {}",
                            column,
                            op.as_str(),
                            ph.marker()
                        ));
                        vals.push(alt.clone());
                    }
                    if !any_of.is_empty() {
                        group = format!(" ({})", group.trim_start());
                    }
                    clause.push_str(&group);
                }
                Predicate::Compare {
                    op,
                    value,
                    secondary,
                } => {
                    let mut group = format!(" {} {} {}", column, op.as_str(), ph.marker());
                    vals.push(value.clone());
                    if let Some(extra) = secondary {
                        group.push_str(&format!(
                            " {} {} {} {}",
                            extra.joint.as_str(),
                            column,
                            extra.op.as_str(),
                            ph.marker()
                        ));
                        vals.push(extra.value.clone());
                        group = format!(" ({})", group.trim_start());
                    }
                    clause.push_str(&group);
                }
                Predicate::Between { low, high } | Predicate::NotBetween { low, high } => {
                    let op = match cond.predicate {
                        Predicate::Between { .. } => "between",
                        _ => "not between",
                    };
                    clause.push_str(&format!(
                        " {} {} {} and {}",
                        column,
                        op,
                        ph.marker(),
                        ph.marker()
                    ));
                    vals.push(low.clone());
                    vals.push(high.clone());
                }
                Predicate::In(values) | Predicate::NotIn(values) => {
                    let op = match cond.predicate {
                        Predicate::In(_) => "in",
                        _ => "not in",
                    };
                    let markers: Vec<String> = values.iter().map(|_| ph.marker()).collect();
                    clause.push_str(&format!(" {} {} ({})", column, op, markers.join(", ")));
                    vals.extend(values.iter().cloned());
                }
            }

            if let Some(suffix) = &cond.suffix {
                clause.push_str(suffix);
            }
            clause.push(' ');
            clause.push_str(cond.joint.as_str());
            tail = cond.joint.as_str().len() + 1;
        }

        if clause.is_empty() {
            (String::new(), vals)
        } else {
            // drop the dangling connector after the last entry
            clause.truncate(clause.len() - tail);
            (format!(" where{}", clause), vals)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mysql() -> Dialect {
        Dialect::mysql()
    }

    fn placeholder_count(sql: &str) -> usize {
        sql.matches('?').count()
    }

    #[test]
    fn test_empty_filter() {
        let (clause, vals) = Filter::new().to_where(&mysql());
        assert_eq!(clause, "");
        assert!(vals.is_empty());
    }

    #[test]
    fn test_scalar_equality_shorthand() {
        let (clause, vals) = Filter::new().eq("name", "John").to_where(&mysql());
        assert_eq!(clause, " where `name` = ?");
        assert_eq!(vals, vec![Value::String("John".to_string())]);
    }

    #[test]
    fn test_conditions_chain_with_and() {
        let (clause, vals) = Filter::new()
            .eq("name", "John")
            .eq("city", "York")
            .to_where(&mysql());
        assert_eq!(clause, " where `name` = ? and `city` = ?");
        assert_eq!(vals.len(), 2);
    }

    #[test]
    fn test_or_joint_between_entries() {
        let filter = Filter::new()
            .push(Condition::new("name", Predicate::eq("John")).joint(Joint::Or))
            .eq("city", "York");
        let (clause, _) = filter.to_where(&mysql());
        assert_eq!(clause, " where `name` = ? or `city` = ?");
    }

    #[test]
    fn test_trailing_or_joint_is_stripped() {
        let filter =
            Filter::new().push(Condition::new("name", Predicate::eq("John")).joint(Joint::Or));
        let (clause, _) = filter.to_where(&mysql());
        assert_eq!(clause, " where `name` = ?");
    }

    #[test]
    fn test_not_equals_and_like() {
        let (clause, vals) = Filter::new()
            .where_("status", Predicate::ne("closed"))
            .where_("name", Predicate::like("%john%"))
            .to_where(&mysql());
        assert_eq!(clause, " where `status` != ? and `name` like ?");
        assert_eq!(vals.len(), 2);
    }

    #[test]
    fn test_equality_with_or_alternates() {
        let (clause, vals) = Filter::new()
            .where_(
                "status",
                Predicate::eq("active").or_any(["pending", "closed"]),
            )
            .to_where(&mysql());
        assert_eq!(
            clause,
            " where (`status` = ? or `status` = ? or `status` = ?)"
        );
        assert_eq!(
            vals,
            vec![
                Value::String("active".to_string()),
                Value::String("pending".to_string()),
                Value::String("closed".to_string()),
            ]
        );
    }

    #[test]
    fn test_compare_with_and_secondary() {
        let (clause, vals) = Filter::new()
            .where_("age", Predicate::gte(18).and_also(CompareOp::Lt, 65))
            .to_where(&mysql());
        assert_eq!(clause, " where (`age` >= ? and `age` < ?)");
        assert_eq!(vals, vec![Value::I32(18), Value::I32(65)]);
    }

    #[test]
    fn test_compare_with_or_secondary() {
        let (clause, _) = Filter::new()
            .where_("score", Predicate::lt(10).or_also(CompareOp::Gt, 90))
            .to_where(&mysql());
        assert_eq!(clause, " where (`score` < ? or `score` > ?)");
    }

    #[test]
    fn test_compare_without_secondary_has_no_parens() {
        let (clause, _) = Filter::new().where_("age", Predicate::gt(18)).to_where(&mysql());
        assert_eq!(clause, " where `age` > ?");
    }

    #[test]
    fn test_between() {
        let (clause, vals) = Filter::new()
            .where_("score", Predicate::between(10, 20))
            .to_where(&mysql());
        assert_eq!(clause, " where `score` between ? and ?");
        assert_eq!(vals, vec![Value::I32(10), Value::I32(20)]);
    }

    #[test]
    fn test_not_between() {
        let (clause, _) = Filter::new()
            .where_("score", Predicate::not_between(10, 20))
            .to_where(&mysql());
        assert_eq!(clause, " where `score` not between ? and ?");
    }

    #[test]
    fn test_in_list() {
        let (clause, vals) = Filter::new()
            .where_("id", Predicate::in_list([1, 2, 3]))
            .to_where(&mysql());
        assert_eq!(clause, " where `id` in (?, ?, ?)");
        assert_eq!(vals, vec![Value::I32(1), Value::I32(2), Value::I32(3)]);
    }

    #[test]
    fn test_not_in_list() {
        let (clause, _) = Filter::new()
            .where_("id", Predicate::not_in([7, 8]))
            .to_where(&mysql());
        assert_eq!(clause, " where `id` not in (?, ?)");
    }

    #[test]
    fn test_prefix_modifier() {
        let (clause, _) = Filter::new()
            .push(Condition::new("id", Predicate::eq(1)).prefix("u."))
            .to_where(&mysql());
        assert_eq!(clause, " where u.`id` = ?");
    }

    #[test]
    fn test_suffix_appended_verbatim() {
        let (clause, _) = Filter::new()
            .push(Condition::new("id", Predicate::eq(1)).suffix(" and deleted_at is null"))
            .to_where(&mysql());
        assert_eq!(clause, " where `id` = ? and deleted_at is null");
    }

    #[test]
    fn test_expression_column_not_quoted() {
        let (clause, _) = Filter::new()
            .where_("count(id)", Predicate::gt(5))
            .to_where(&mysql());
        assert_eq!(clause, " where count(id) > ?");
    }

    #[test]
    fn test_or_any_ignored_on_ordering_family() {
        let predicate = Predicate::gt(5).or_any([6, 7]);
        let (clause, vals) = Filter::new().where_("n", predicate).to_where(&mysql());
        assert_eq!(clause, " where `n` > ?");
        assert_eq!(vals.len(), 1);
    }

    #[test]
    fn test_and_also_ignored_on_equality_family() {
        let predicate = Predicate::eq(5).and_also(CompareOp::Lt, 9);
        let (clause, vals) = Filter::new().where_("n", predicate).to_where(&mysql());
        assert_eq!(clause, " where `n` = ?");
        assert_eq!(vals.len(), 1);
    }

    #[test]
    fn test_placeholders_match_values_in_mixed_filter() {
        let filter = Filter::new()
            .eq("a", 1)
            .where_("b", Predicate::eq("x").or_any(["y", "z"]))
            .where_("c", Predicate::gte(10).and_also(CompareOp::Lte, 20))
            .where_("d", Predicate::between(1, 5))
            .where_("e", Predicate::in_list([1, 2, 3, 4]));
        let (clause, vals) = filter.to_where(&mysql());
        assert_eq!(placeholder_count(&clause), vals.len());
        assert_eq!(vals.len(), 12);
    }

    #[test]
    fn test_numbered_placeholders() {
        let (clause, vals) = Filter::new()
            .where_("age", Predicate::gte(18).and_also(CompareOp::Lt, 65))
            .where_("id", Predicate::in_list([1, 2]))
            .to_where(&Dialect::postgres());
        assert_eq!(
            clause,
            " where (\"age\" >= $1 and \"age\" < $2) and \"id\" in ($3, $4)"
        );
        assert_eq!(vals.len(), 4);
    }
}
