//! Row predicates for the query evaluator

use crate::data::{Row, Value};

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

/// A filter condition over a single row.
///
/// Predicates are pure and never raise: a null value, a type mismatch, or a
/// reference to an unknown column all evaluate to false.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Compare a column to a value. Ordering operators are defined on
    /// Integer only; equality requires matching types.
    Compare {
        column: String,
        op: CompareOp,
        value: Value,
    },
    /// The column's value is null
    IsNull(String),
    /// The column's value is present
    IsNotNull(String),
    /// String column contains a substring
    Contains { column: String, needle: String },
    /// String column starts with a prefix
    StartsWith { column: String, prefix: String },
    /// The column's value equals one of the listed values
    In { column: String, values: Vec<Value> },
    /// AND combination
    And(Vec<Predicate>),
    /// OR combination
    Or(Vec<Predicate>),
    /// NOT
    Not(Box<Predicate>),
}

impl Predicate {
    /// Check if a row matches this predicate
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Predicate::Compare { column, op, value } => match row.get(column) {
                Some(row_value) => Self::compare(row_value, *op, value),
                None => false,
            },
            Predicate::IsNull(column) => row.contains(column) && row.get(column).is_none(),
            Predicate::IsNotNull(column) => row.get(column).is_some(),
            Predicate::Contains { column, needle } => {
                if let Some(Value::String(s)) = row.get(column) {
                    s.contains(needle.as_str())
                } else {
                    false
                }
            }
            Predicate::StartsWith { column, prefix } => {
                if let Some(Value::String(s)) = row.get(column) {
                    s.starts_with(prefix.as_str())
                } else {
                    false
                }
            }
            Predicate::In { column, values } => match row.get(column) {
                Some(row_value) => values.iter().any(|v| row_value == v),
                None => false,
            },
            Predicate::And(predicates) => predicates.iter().all(|p| p.matches(row)),
            Predicate::Or(predicates) => predicates.iter().any(|p| p.matches(row)),
            Predicate::Not(predicate) => !predicate.matches(row),
        }
    }

    fn compare(left: &Value, op: CompareOp, right: &Value) -> bool {
        match (left, right) {
            (Value::Integer(l), Value::Integer(r)) => match op {
                CompareOp::Equal => l == r,
                CompareOp::NotEqual => l != r,
                CompareOp::LessThan => l < r,
                CompareOp::LessEqual => l <= r,
                CompareOp::GreaterThan => l > r,
                CompareOp::GreaterEqual => l >= r,
            },
            (Value::String(l), Value::String(r)) => match op {
                CompareOp::Equal => l == r,
                CompareOp::NotEqual => l != r,
                _ => false,
            },
            (Value::Boolean(l), Value::Boolean(r)) => match op {
                CompareOp::Equal => l == r,
                CompareOp::NotEqual => l != r,
                _ => false,
            },
            // mismatched types never compare
            _ => false,
        }
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            column: column.into(),
            op: CompareOp::Equal,
            value: value.into(),
        }
    }

    pub fn not_equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            column: column.into(),
            op: CompareOp::NotEqual,
            value: value.into(),
        }
    }

    pub fn greater_than(column: impl Into<String>, value: i32) -> Self {
        Predicate::Compare {
            column: column.into(),
            op: CompareOp::GreaterThan,
            value: Value::Integer(value),
        }
    }

    pub fn greater_or_equal(column: impl Into<String>, value: i32) -> Self {
        Predicate::Compare {
            column: column.into(),
            op: CompareOp::GreaterEqual,
            value: Value::Integer(value),
        }
    }

    pub fn less_than(column: impl Into<String>, value: i32) -> Self {
        Predicate::Compare {
            column: column.into(),
            op: CompareOp::LessThan,
            value: Value::Integer(value),
        }
    }

    pub fn less_or_equal(column: impl Into<String>, value: i32) -> Self {
        Predicate::Compare {
            column: column.into(),
            op: CompareOp::LessEqual,
            value: Value::Integer(value),
        }
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Predicate::IsNull(column.into())
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Predicate::IsNotNull(column.into())
    }

    pub fn contains(column: impl Into<String>, needle: impl Into<String>) -> Self {
        Predicate::Contains {
            column: column.into(),
            needle: needle.into(),
        }
    }

    pub fn starts_with(column: impl Into<String>, prefix: impl Into<String>) -> Self {
        Predicate::StartsWith {
            column: column.into(),
            prefix: prefix.into(),
        }
    }

    pub fn in_list(column: impl Into<String>, values: Vec<Value>) -> Self {
        Predicate::In {
            column: column.into(),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(name: &str, age: i32, active: bool) -> Row {
        let mut row = Row::new();
        row.set("name", name);
        row.set("age", age);
        row.set("active", active);
        row
    }

    #[test]
    fn test_compare_integers() {
        let row = make_row("John", 30, true);

        assert!(Predicate::greater_than("age", 25).matches(&row));
        assert!(!Predicate::less_than("age", 25).matches(&row));
        assert!(Predicate::greater_or_equal("age", 30).matches(&row));
        assert!(Predicate::less_or_equal("age", 30).matches(&row));
        assert!(Predicate::equals("age", 30).matches(&row));
        assert!(Predicate::not_equals("age", 29).matches(&row));
    }

    #[test]
    fn test_equality_other_types() {
        let row = make_row("John", 30, true);

        assert!(Predicate::equals("name", "John").matches(&row));
        assert!(Predicate::equals("active", true).matches(&row));
        assert!(Predicate::not_equals("name", "Jane").matches(&row));
    }

    #[test]
    fn test_ordering_is_integer_only() {
        let row = make_row("John", 30, true);

        // ordering on a string column is false, not an error
        assert!(!Predicate::Compare {
            column: "name".to_string(),
            op: CompareOp::GreaterThan,
            value: Value::from("Aaa"),
        }
        .matches(&row));
    }

    #[test]
    fn test_type_mismatch_is_false() {
        let row = make_row("John", 30, true);

        assert!(!Predicate::equals("age", "30").matches(&row));
        assert!(!Predicate::not_equals("age", "30").matches(&row));
    }

    #[test]
    fn test_null_comparisons_are_false() {
        let mut row = Row::new();
        row.set_null("age");

        assert!(!Predicate::equals("age", 1).matches(&row));
        assert!(!Predicate::not_equals("age", 1).matches(&row));
        assert!(!Predicate::greater_than("age", 0).matches(&row));
    }

    #[test]
    fn test_unknown_column_is_false() {
        let row = make_row("John", 30, true);

        assert!(!Predicate::equals("salary", 1).matches(&row));
        assert!(!Predicate::is_null("salary").matches(&row));
        assert!(!Predicate::contains("salary", "x").matches(&row));
    }

    #[test]
    fn test_is_null_and_is_not_null() {
        let mut row = make_row("John", 30, true);
        row.set_null("nickname");

        assert!(Predicate::is_null("nickname").matches(&row));
        assert!(!Predicate::is_not_null("nickname").matches(&row));
        assert!(Predicate::is_not_null("name").matches(&row));
        assert!(!Predicate::is_null("name").matches(&row));
    }

    #[test]
    fn test_string_operators() {
        let row = make_row("John Smith", 30, true);

        assert!(Predicate::contains("name", "hn Sm").matches(&row));
        assert!(Predicate::starts_with("name", "John").matches(&row));
        assert!(!Predicate::starts_with("name", "Smith").matches(&row));
        // string ops on non-string columns are false
        assert!(!Predicate::contains("age", "3").matches(&row));
    }

    #[test]
    fn test_in_list() {
        let row = make_row("John", 30, true);

        assert!(Predicate::in_list("age", vec![Value::Integer(29), Value::Integer(30)]).matches(&row));
        assert!(!Predicate::in_list("age", vec![Value::Integer(1)]).matches(&row));
        assert!(!Predicate::in_list("age", vec![Value::from("30")]).matches(&row));
    }

    #[test]
    fn test_and_or_not() {
        let row = make_row("John", 30, true);

        let both = Predicate::And(vec![
            Predicate::greater_than("age", 25),
            Predicate::equals("name", "John"),
        ]);
        assert!(both.matches(&row));

        let either = Predicate::Or(vec![
            Predicate::less_than("age", 25),
            Predicate::equals("name", "John"),
        ]);
        assert!(either.matches(&row));

        assert!(!Predicate::Not(Box::new(both)).matches(&row));
    }
}
