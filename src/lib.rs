//! # quarry
//!
//! A data-source-agnostic query builder. Queries are immutable values built
//! from typed clauses; an [`Executor`] runs them against any backend that
//! implements [`Adapter`], and applies in memory whatever the backend could
//! not.
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry::prelude::*;
//!
//! /// A backend that hands back its rows and leaves every clause to quarry.
//! struct Rows(Vec<Record>);
//!
//! impl Adapter for Rows {
//!     async fn run(&self, query: &Query) -> anyhow::Result<QueryResult> {
//!         let plan = Pushdown::none(query);
//!         Ok(QueryResult::handled(self.0.clone()).with_unhandled(plan.into_unhandled()))
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> quarry::Result<()> {
//! let db = Executor::new(Rows(vec![
//!     record! { "name" => "ann", "age" => 31 },
//!     record! { "name" => "ben", "age" => 17 },
//!     record! { "name" => "cat", "age" => 45 },
//! ]));
//!
//! let adults = Query::new("people")
//!     .r#where(gte(col("age"), 18))?
//!     .order_by_descending("age");
//!
//! let (page, total) = adults.take(1).with_total_count();
//! let rows = db.execute(&page).await?;
//! assert_eq!(rows[0].get("name"), Some(&Value::from("cat")));
//! assert_eq!(total.get(), Some(2));
//! assert_eq!(db.count(&adults).await?, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! | Feature     | Effect                                              |
//! |-------------|-----------------------------------------------------|
//! | `tracing`   | Debug/warn events for execution and fallback passes |
//! | `profiling` | `puffin` scopes around the fallback passes           |
//! | `serde`     | Serialization for values, records and options       |

// =============================================================================
// Root-level exports
// =============================================================================

/// Result type for quarry operations
pub use quarry_core::error::Result;

/// Error types
pub mod error {
    pub use quarry_core::error::QuarryError;
}

pub use quarry_core::{
    Adapter, Cardinality, Clause, ClauseId, ClauseKind, ColumnRef, ExecOptions, Executor, Fetched,
    FromRecord, FromValue, HintPolicy, JoinBuilder, JoinClause, JoinKind, NullOrder, ObjectRef,
    OrderDirection, PendingJoin, Predicate, Projection, Pushdown, Query, QueryResult, Record,
    Stage, TotalCount, Value, col, record,
};

/// Predicate constructors and operators.
pub use quarry_core::expr;

/// Lower-level building blocks for adapter authors.
pub mod core {
    pub use quarry_core::exec::{Applied, Fallback};
    pub use quarry_core::reference::IntoObjectRef;
    pub use quarry_core::*;
}

/// Everything needed to build and run queries.
pub mod prelude {
    pub use quarry_core::expr::{
        and, eq, gt, gte, is_not_null, is_null, like, lt, lte, neq, not, not_like, or,
    };
    pub use quarry_core::{
        Adapter, Executor, JoinKind, OrderDirection, Predicate, Projection, Pushdown, Query,
        QueryResult, Record, Value, col, record,
    };
}
