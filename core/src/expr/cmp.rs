//! Comparison constructors.
//!
//! Comparing against a NULL literal with [`eq`] / [`neq`] means IS NULL /
//! IS NOT NULL; [`is_null`] and [`is_not_null`] spell that out.

use crate::value::Value;

use super::{CompareOp, Operand, Predicate};

fn compare<L, R>(left: L, op: CompareOp, right: R) -> Predicate
where
    L: Into<Operand>,
    R: Into<Operand>,
{
    Predicate::Compare {
        left: left.into(),
        op,
        right: right.into(),
    }
}

/// Equality comparison (`=`).
pub fn eq<L: Into<Operand>, R: Into<Operand>>(left: L, right: R) -> Predicate {
    compare(left, CompareOp::Eq, right)
}

/// Inequality comparison (`<>`).
pub fn neq<L: Into<Operand>, R: Into<Operand>>(left: L, right: R) -> Predicate {
    compare(left, CompareOp::Ne, right)
}

/// Less-than comparison (`<`).
pub fn lt<L: Into<Operand>, R: Into<Operand>>(left: L, right: R) -> Predicate {
    compare(left, CompareOp::Lt, right)
}

/// Less-than-or-equal comparison (`<=`).
pub fn lte<L: Into<Operand>, R: Into<Operand>>(left: L, right: R) -> Predicate {
    compare(left, CompareOp::Le, right)
}

/// Greater-than comparison (`>`).
pub fn gt<L: Into<Operand>, R: Into<Operand>>(left: L, right: R) -> Predicate {
    compare(left, CompareOp::Gt, right)
}

/// Greater-than-or-equal comparison (`>=`).
pub fn gte<L: Into<Operand>, R: Into<Operand>>(left: L, right: R) -> Predicate {
    compare(left, CompareOp::Ge, right)
}

/// `IS NULL` test.
pub fn is_null<E: Into<Operand>>(expr: E) -> Predicate {
    compare(expr, CompareOp::Eq, Value::Null)
}

/// `IS NOT NULL` test.
pub fn is_not_null<E: Into<Operand>>(expr: E) -> Predicate {
    compare(expr, CompareOp::Ne, Value::Null)
}

/// Pattern match with `%` (any run) and `_` (any single character) wildcards.
pub fn like<E: Into<Operand>>(expr: E, pattern: impl Into<String>) -> Predicate {
    Predicate::Like {
        operand: expr.into(),
        pattern: pattern.into(),
        negated: false,
    }
}

/// Negated pattern match.
pub fn not_like<E: Into<Operand>>(expr: E, pattern: impl Into<String>) -> Predicate {
    Predicate::Like {
        operand: expr.into(),
        pattern: pattern.into(),
        negated: true,
    }
}
