//! In-memory evaluation of predicates against records.

use core::cmp::Ordering;

use crate::record::Record;
use crate::reference::ColumnRef;
use crate::value::Value;

use super::{CompareOp, Operand, Predicate};

static NULL: Value = Value::Null;

/// Resolves a column against a record: qualified key first, then the bare
/// name, then the alias. Missing columns read as NULL.
pub(crate) fn resolve<'r>(record: &'r Record, column: &ColumnRef) -> &'r Value {
    if column.owner().is_some() {
        if let Some(value) = record.get(&column.qualified()) {
            return value;
        }
    }
    record
        .get(column.name())
        .or_else(|| column.alias_name().and_then(|alias| record.get(alias)))
        .unwrap_or(&NULL)
}

fn operand<'r>(record: &'r Record, operand: &'r Operand) -> &'r Value {
    match operand {
        Operand::Column(column) => resolve(record, column),
        Operand::Literal(value) => value,
    }
}

impl Predicate {
    /// Evaluates the predicate against one record.
    pub fn evaluate(&self, record: &Record) -> bool {
        match self {
            Predicate::Compare { left, op, right } => {
                if let Some(tested) = null_test(left, right) {
                    let is_null = operand(record, tested).is_null();
                    return match op {
                        CompareOp::Eq => is_null,
                        CompareOp::Ne => !is_null,
                        _ => false,
                    };
                }
                compare(operand(record, left), *op, operand(record, right))
            }
            Predicate::Like {
                operand: target,
                pattern,
                negated,
            } => match operand(record, target) {
                Value::Text(text) => like_match(text, pattern) != *negated,
                _ => false,
            },
            Predicate::And(children) => children.iter().all(|child| child.evaluate(record)),
            Predicate::Or(children) => children.iter().any(|child| child.evaluate(record)),
            Predicate::Not(inner) => !inner.evaluate(record),
        }
    }
}

/// The operand tested by `x = NULL` / `x <> NULL`, when one side is a NULL
/// literal.
fn null_test<'p>(left: &'p Operand, right: &'p Operand) -> Option<&'p Operand> {
    match (left, right) {
        (tested, Operand::Literal(Value::Null)) | (Operand::Literal(Value::Null), tested) => {
            Some(tested)
        }
        _ => None,
    }
}

/// Any comparison reading a NULL from a column is false.
fn compare(left: &Value, op: CompareOp, right: &Value) -> bool {
    if left.is_null() || right.is_null() {
        return false;
    }
    let Some(ordering) = left.compare(right) else {
        return false;
    };
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    }
}

fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    // Iterative wildcard match with single-star backtracking.
    let (mut t, mut p) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            star = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '%')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::*;
    use crate::reference::col;

    fn row() -> Record {
        Record::new()
            .with("id", 7)
            .with("name", "alice")
            .with("score", 4.5)
            .with("email", Value::Null)
            .with("orders.total", 120)
    }

    #[test]
    fn test_compare_numbers_across_kinds() {
        assert!(gt(col("score"), 4).evaluate(&row()));
        assert!(eq(col("id"), 7.0).evaluate(&row()));
        assert!(!lt(col("id"), 7).evaluate(&row()));
        assert!(lte(col("id"), 7).evaluate(&row()));
    }

    #[test]
    fn test_null_semantics() {
        assert!(is_null(col("email")).evaluate(&row()));
        assert!(is_null(col("missing")).evaluate(&row()));
        assert!(is_not_null(col("name")).evaluate(&row()));
        assert!(!gt(col("email"), 1).evaluate(&row()));
        assert!(!eq(col("name"), 1).evaluate(&row()));
        assert!(eq(Value::Null, col("email")).evaluate(&row()));
    }

    #[test]
    fn test_null_column_comparisons_are_false() {
        let row = Record::new().with("x", Value::Null).with("y", Value::Null);
        assert!(!neq(col("x"), 5).evaluate(&row));
        assert!(!eq(col("x"), col("y")).evaluate(&row));
        assert!(!neq(col("x"), col("y")).evaluate(&row));
        assert!(!neq(col("x"), col("missing")).evaluate(&row));
        assert!(neq(col("x"), Value::Null).evaluate(&Record::new().with("x", 1)));
    }

    #[test]
    fn test_qualified_column_lookup() {
        assert!(eq(col("orders.total"), 120).evaluate(&row()));
        assert!(eq(col("users.id"), 7).evaluate(&row()));
    }

    #[test]
    fn test_like_wildcards() {
        assert!(like_match("alice", "a%"));
        assert!(like_match("alice", "%ic%"));
        assert!(like_match("alice", "_lice"));
        assert!(like_match("alice", "%"));
        assert!(!like_match("alice", "b%"));
        assert!(!like_match("alice", "alic"));
        assert!(like_match("", "%"));
        assert!(not_like(col("name"), "b%").evaluate(&row()));
        assert!(!like(col("id"), "7").evaluate(&row()));
    }

    #[test]
    fn test_logical_combinators() {
        let p = (eq(col("id"), 7) & like(col("name"), "a%")) | eq(col("id"), 0);
        assert!(p.evaluate(&row()));
        assert!(!(!p).evaluate(&row()));
        assert!(and([]).evaluate(&row()));
        assert!(!or([]).evaluate(&row()));
    }
}
