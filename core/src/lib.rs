//! Core engine for quarry: immutable clause-based queries and the adapter
//! execution protocol with in-memory fallback.
//!
//! ```
//! use quarry_core::{Query, col, expr::gt};
//!
//! # fn main() -> quarry_core::Result<()> {
//! let query = Query::new("users")
//!     .r#where(gt(col("age"), 17))?
//!     .order_by("name")
//!     .take(20);
//! assert_eq!(query.clauses().len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod clause;
pub mod error;
pub mod exec;
pub mod expr;
pub mod join;
pub mod options;
pub mod profiling;
pub mod query;
pub mod record;
pub mod reference;
pub mod row;
pub mod tracing;
pub mod value;

// Re-export key types and traits
pub use clause::{Cardinality, Clause, ClauseKind, OrderDirection, Stage};
pub use error::{QuarryError, Result};
pub use exec::{Adapter, Applied, ClauseId, Executor, Fallback, Fetched, Pushdown, QueryResult};
pub use expr::{Operand, Predicate};
pub use join::{JoinBuilder, JoinClause, JoinKind, PendingJoin};
pub use options::{ExecOptions, HintPolicy, NullOrder};
pub use query::{Query, TotalCount};
pub use record::Record;
pub use reference::{ColumnRef, IntoObjectRef, ObjectRef, Projection, col};
pub use row::{FromRecord, FromValue};
pub use value::Value;
