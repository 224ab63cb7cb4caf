//! Immutable clause-based queries.
//!
//! A [`Query`] is a target object name plus an ordered list of
//! [`Clause`]s. Composition methods (in `builder`) take `&self` and return a
//! new value; the clause list is shared behind an `Arc` so cloning a query is
//! cheap and queries can be handed across tasks freely.

mod builder;
mod total_count;

use std::sync::Arc;

use compact_str::CompactString;

use crate::clause::{Clause, ClauseKind};
use crate::exec::ClauseId;
use crate::join::JoinClause;

pub use total_count::{TotalCount, TotalCountSink};

/// A logical query against one named data object.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    target: CompactString,
    clauses: Arc<[Clause]>,
    singleton: bool,
}

impl Query {
    /// Creates an empty query against `target`.
    pub fn new(target: impl Into<CompactString>) -> Self {
        Self {
            target: target.into(),
            clauses: Arc::from(Vec::new()),
            singleton: false,
        }
    }

    pub(crate) fn rebuild(&self, clauses: Vec<Clause>) -> Self {
        Self {
            target: self.target.clone(),
            clauses: Arc::from(clauses),
            singleton: self.singleton,
        }
    }

    /// The target object name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// All clauses, in composition order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Clauses paired with the identity adapters use to report them.
    pub fn clauses_with_ids(&self) -> impl Iterator<Item = (ClauseId, &Clause)> {
        self.clauses
            .iter()
            .enumerate()
            .map(|(i, clause)| (ClauseId::new(i), clause))
    }

    /// Looks a clause up by identity.
    pub fn clause(&self, id: ClauseId) -> Option<&Clause> {
        self.clauses.get(id.index())
    }

    pub fn clauses_of(&self, kind: ClauseKind) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().filter(move |c| c.kind() == kind)
    }

    pub fn count_of(&self, kind: ClauseKind) -> usize {
        self.clauses_of(kind).count()
    }

    pub fn has(&self, kind: ClauseKind) -> bool {
        self.clauses.iter().any(|c| c.kind() == kind)
    }

    /// Completed joins, in composition order.
    pub fn joins(&self) -> impl Iterator<Item = &JoinClause> {
        self.clauses.iter().filter_map(|c| match c {
            Clause::Join(join) => Some(join),
            _ => None,
        })
    }

    /// The current `Skip` value, if any.
    pub fn skip_value(&self) -> Option<usize> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Skip(n) => Some(*n),
            _ => None,
        })
    }

    /// The current `Take` value, if any.
    pub fn take_value(&self) -> Option<usize> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Take(n) => Some(*n),
            _ => None,
        })
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl core::fmt::Display for Query {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "FROM {}", self.target)?;
        for clause in self.clauses.iter() {
            write!(f, " {clause}")?;
        }
        Ok(())
    }
}
