//! Join clauses and the two-step join assembly protocol.
//!
//! A join is declared first and completed by its condition:
//!
//! ```
//! use quarry_core::{Query, JoinKind, col, expr::eq};
//!
//! # fn main() -> quarry_core::Result<()> {
//! let query = Query::new("customers")
//!     .join("orders", JoinKind::Inner)?
//!     .on(eq(col("orders.customer_id"), col("customers.id")))?;
//! assert_eq!(query.joins().count(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! The pending half lives in a [`JoinBuilder`] value returned by
//! [`Query::join`], never inside the query itself, so two composition chains
//! that start from the same base query cannot see each other's pending join.

use core::fmt;

use crate::error::{QuarryError, Result};
use crate::expr::{Operand, Predicate};
use crate::query::Query;
use crate::reference::ObjectRef;

// =============================================================================
// Join Kind Enum
// =============================================================================

/// The type of JOIN operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    /// Left outer join: rows of the query target are kept without a match.
    Outer,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "INNER JOIN"),
            JoinKind::Outer => write!(f, "LEFT OUTER JOIN"),
        }
    }
}

// =============================================================================
// Completed join clause
// =============================================================================

/// A completed join: target, kind and condition.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinClause {
    pub target: ObjectRef,
    pub kind: JoinKind,
    pub condition: Predicate,
}

impl fmt::Display for JoinClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ON {}", self.kind, self.target, self.condition)
    }
}

// =============================================================================
// Pending join
// =============================================================================

/// A join whose condition has not been supplied yet.
///
/// Not `Clone`; consumed by exactly one [`Query::on`] call.
#[derive(Debug, PartialEq)]
pub struct PendingJoin {
    target: ObjectRef,
    kind: JoinKind,
}

impl PendingJoin {
    pub(crate) fn new(target: ObjectRef, kind: JoinKind) -> Self {
        Self { target, kind }
    }

    pub fn target(&self) -> &ObjectRef {
        &self.target
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub(crate) fn complete(self, condition: Predicate) -> JoinClause {
        JoinClause {
            target: self.target,
            kind: self.kind,
            condition,
        }
    }
}

// =============================================================================
// Join builder
// =============================================================================

/// A query paired with its pending join, finalised into a [`Query`] by
/// [`on`](Self::on) or [`on_columns`](Self::on_columns).
#[derive(Debug)]
#[must_use = "a join is only added to the query once `on` supplies its condition"]
pub struct JoinBuilder {
    query: Query,
    pending: PendingJoin,
}

impl JoinBuilder {
    pub(crate) fn new(query: Query, pending: PendingJoin) -> Self {
        Self { query, pending }
    }

    /// The join target declared by [`Query::join`].
    pub fn target(&self) -> &ObjectRef {
        self.pending.target()
    }

    /// Supplies the join condition and returns the query with the completed
    /// join appended.
    pub fn on(self, condition: impl Into<Option<Predicate>>) -> Result<Query> {
        self.query.on(Some(self.pending), condition)
    }

    /// Supplies the condition as named column equalities over the join
    /// target: `on_columns([("customer_id", col("customers.id"))])` means
    /// `target.customer_id = customers.id`.
    pub fn on_columns<I, K, V>(self, pairs: I) -> Result<Query>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Operand>,
    {
        let condition = Predicate::columns_equal(self.pending.target(), pairs).ok_or_else(|| {
            QuarryError::InvalidExpression("on expects an expression or named columns".into())
        })?;
        self.on(condition)
    }

    /// Splits the builder into the unchanged query and the pending join,
    /// for callers that supply the condition later via [`Query::on`].
    pub fn into_parts(self) -> (Query, PendingJoin) {
        (self.query, self.pending)
    }
}
