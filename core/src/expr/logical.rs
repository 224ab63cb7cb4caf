//! Logical operators (AND, OR, NOT).
//!
//! This module provides both function-based and operator-based logical operations:
//!
//! ```ignore
//! // Function style
//! and([condition1, condition2])
//! or([condition1, condition2])
//! not(condition)
//!
//! // Operator style (via std::ops traits)
//! condition1 & condition2   // BitAnd
//! condition1 | condition2   // BitOr
//! !condition                 // Not
//! ```

use core::ops::{BitAnd, BitOr, Not};

use super::Predicate;

// =============================================================================
// NOT
// =============================================================================

/// Logical NOT. A double negation collapses.
pub fn not(expr: Predicate) -> Predicate {
    match expr {
        Predicate::Not(inner) => *inner,
        other => Predicate::Not(Box::new(other)),
    }
}

// =============================================================================
// AND
// =============================================================================

/// Logical AND of multiple conditions.
///
/// A single condition is returned unchanged; no conditions is always true.
pub fn and<I>(conditions: I) -> Predicate
where
    I: IntoIterator<Item = Predicate>,
{
    let mut all: Vec<Predicate> = conditions.into_iter().collect();
    if all.len() == 1 {
        return all.remove(0);
    }
    Predicate::And(all)
}

// =============================================================================
// OR
// =============================================================================

/// Logical OR of multiple conditions.
///
/// A single condition is returned unchanged; no conditions is always false.
pub fn or<I>(conditions: I) -> Predicate
where
    I: IntoIterator<Item = Predicate>,
{
    let mut any: Vec<Predicate> = conditions.into_iter().collect();
    if any.len() == 1 {
        return any.remove(0);
    }
    Predicate::Or(any)
}

// =============================================================================
// Operators
// =============================================================================

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        match self {
            Predicate::And(mut children) if !children.is_empty() => {
                children.push(rhs);
                Predicate::And(children)
            }
            lhs => Predicate::And(vec![lhs, rhs]),
        }
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        match self {
            Predicate::Or(mut children) if !children.is_empty() => {
                children.push(rhs);
                Predicate::Or(children)
            }
            lhs => Predicate::Or(vec![lhs, rhs]),
        }
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        not(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{eq, gt};
    use crate::reference::col;

    #[test]
    fn test_and_flattens_chains() {
        let p = eq(col("a"), 1) & eq(col("b"), 2) & gt(col("c"), 3);
        assert!(matches!(&p, Predicate::And(children) if children.len() == 3));
    }

    #[test]
    fn test_single_condition_is_unwrapped() {
        let p = or([eq(col("a"), 1)]);
        assert_eq!(p, eq(col("a"), 1));
    }

    #[test]
    fn test_double_not_collapses() {
        let p = eq(col("a"), 1);
        assert_eq!(!!p.clone(), p);
    }
}
