//! The closed set of query clauses.
//!
//! Each [`Clause`] describes one query concern. A [`Query`](crate::Query)
//! holds them in composition order; [`Stage`] gives the fixed order in which
//! the fallback executor applies them.

use core::fmt;

use crate::expr::Predicate;
use crate::join::JoinClause;
use crate::query::TotalCountSink;
use crate::reference::{ColumnRef, ObjectRef, Projection};

/// Sort direction for ORDER BY clauses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

/// Cardinality requested for an eagerly included object graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Cardinality {
    /// Let the adapter decide from its relationship metadata.
    #[default]
    Unspecified,
    /// A single related object (or none).
    One,
    /// A collection of related objects.
    Many,
}

/// One query concern.
#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    /// Projection list. At most one per query.
    Select(Vec<Projection>),
    /// Filter; multiple `Where` clauses combine with AND.
    Where(Predicate),
    /// One sort key; order of appearance is sort precedence.
    OrderBy {
        column: ColumnRef,
        direction: OrderDirection,
    },
    /// Rows to skip. At most one per query.
    Skip(usize),
    /// Maximum rows to return. At most one per query.
    Take(usize),
    /// Drop duplicate rows. At most one per query.
    Distinct,
    /// Completed join.
    Join(JoinClause),
    /// Post-aggregation filter.
    Having(Predicate),
    /// Eagerly include a related object graph.
    With {
        reference: ObjectRef,
        cardinality: Cardinality,
    },
    /// Row-locking hint. At most one per query.
    ForUpdate { skip_locked: bool },
    /// Request for the pre-paging match count.
    WithTotalCount(TotalCountSink),
}

/// Discriminant of [`Clause`], used to inspect and clear clauses by kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    Select,
    Where,
    OrderBy,
    Skip,
    Take,
    Distinct,
    Join,
    Having,
    With,
    ForUpdate,
    WithTotalCount,
}

impl ClauseKind {
    /// Every kind, in declaration order.
    pub const ALL: [ClauseKind; 11] = [
        ClauseKind::Select,
        ClauseKind::Where,
        ClauseKind::OrderBy,
        ClauseKind::Skip,
        ClauseKind::Take,
        ClauseKind::Distinct,
        ClauseKind::Join,
        ClauseKind::Having,
        ClauseKind::With,
        ClauseKind::ForUpdate,
        ClauseKind::WithTotalCount,
    ];

    /// The fallback stage clauses of this kind belong to.
    pub const fn stage(self) -> Stage {
        match self {
            ClauseKind::Join | ClauseKind::With | ClauseKind::ForUpdate => Stage::Source,
            ClauseKind::Where | ClauseKind::Having => Stage::Filter,
            ClauseKind::Distinct => Stage::Distinct,
            ClauseKind::OrderBy => Stage::Order,
            ClauseKind::WithTotalCount => Stage::Count,
            ClauseKind::Skip | ClauseKind::Take => Stage::Page,
            ClauseKind::Select => Stage::Project,
        }
    }
}

/// Fixed application order of the fallback executor.
///
/// Clause semantics compose in this order regardless of the order in which
/// clauses were added: filter, then de-duplicate, then sort, then record the
/// total count, then page, then project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Shapes which rows exist (joins, includes, locks). Adapter-only.
    Source,
    Filter,
    Distinct,
    Order,
    Count,
    Page,
    Project,
}

impl Stage {
    /// Returns true for stages that transform the row sequence and can
    /// therefore run in memory.
    pub const fn is_row_stage(self) -> bool {
        !matches!(self, Stage::Source)
    }

    /// Returns true if a clause of this stage only yields the right rows
    /// once every clause of `earlier` has run.
    ///
    /// Filtering, de-duplication and sorting commute with one another. The
    /// total count needs the final row set, and paging and projection need
    /// everything before them.
    pub const fn depends_on(self, earlier: Stage) -> bool {
        match self {
            Stage::Source | Stage::Filter | Stage::Distinct | Stage::Order => false,
            Stage::Count => matches!(earlier, Stage::Filter | Stage::Distinct),
            Stage::Page | Stage::Project => {
                earlier.is_row_stage() && (earlier as u8) < (self as u8)
            }
        }
    }
}

impl Clause {
    pub const fn kind(&self) -> ClauseKind {
        match self {
            Clause::Select(_) => ClauseKind::Select,
            Clause::Where(_) => ClauseKind::Where,
            Clause::OrderBy { .. } => ClauseKind::OrderBy,
            Clause::Skip(_) => ClauseKind::Skip,
            Clause::Take(_) => ClauseKind::Take,
            Clause::Distinct => ClauseKind::Distinct,
            Clause::Join(_) => ClauseKind::Join,
            Clause::Having(_) => ClauseKind::Having,
            Clause::With { .. } => ClauseKind::With,
            Clause::ForUpdate { .. } => ClauseKind::ForUpdate,
            Clause::WithTotalCount(_) => ClauseKind::WithTotalCount,
        }
    }

    pub const fn stage(&self) -> Stage {
        self.kind().stage()
    }

    /// Returns true for kinds a query holds at most once, where a new value
    /// replaces the old.
    pub const fn is_single_valued(&self) -> bool {
        matches!(
            self.kind(),
            ClauseKind::Skip | ClauseKind::Take | ClauseKind::Distinct | ClauseKind::ForUpdate
        )
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Select(columns) => {
                write!(f, "SELECT ")?;
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{column}")?;
                }
                Ok(())
            }
            Clause::Where(predicate) => write!(f, "WHERE {predicate}"),
            Clause::OrderBy { column, direction } => {
                let dir = match direction {
                    OrderDirection::Asc => "ASC",
                    OrderDirection::Desc => "DESC",
                };
                write!(f, "ORDER BY {} {dir}", column.qualified())
            }
            Clause::Skip(n) => write!(f, "SKIP {n}"),
            Clause::Take(n) => write!(f, "TAKE {n}"),
            Clause::Distinct => write!(f, "DISTINCT"),
            Clause::Join(join) => write!(f, "{join}"),
            Clause::Having(predicate) => write!(f, "HAVING {predicate}"),
            Clause::With {
                reference,
                cardinality,
            } => write!(f, "WITH {reference} ({cardinality:?})"),
            Clause::ForUpdate { skip_locked: true } => write!(f, "FOR UPDATE SKIP LOCKED"),
            Clause::ForUpdate { skip_locked: false } => write!(f, "FOR UPDATE"),
            Clause::WithTotalCount(_) => write!(f, "WITH TOTAL COUNT"),
        }
    }
}
