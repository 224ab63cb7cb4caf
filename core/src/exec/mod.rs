//! Query execution.
//!
//! An [`Executor`] hands a [`Query`] to an [`Adapter`], checks the adapter's
//! report of which clauses it left unhandled, and applies those clauses in
//! memory. The result is the same whether the adapter pushed down every
//! clause, some of them, or none.
//!
//! Adapters report unhandled clauses by [`ClauseId`]. A valid report never
//! has a handled clause whose stage [depends on](Stage::depends_on) a stage
//! left to the fallback: an adapter may sort while leaving a filter
//! unhandled, but may not page. [`Pushdown::plan`] produces reports with
//! that shape.

mod fallback;
mod materialize;
mod pushdown;

use core::fmt;
use core::future::Future;

use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::clause::{Clause, ClauseKind, Stage};
use crate::error::{QuarryError, Result};
use crate::options::{ExecOptions, HintPolicy};
use crate::query::Query;
use crate::record::Record;

pub use fallback::{Applied, Fallback};
pub use materialize::Fetched;
pub use pushdown::Pushdown;

/// The identity of a clause within one [`Query`] value: its position in
/// [`Query::clauses`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClauseId(usize);

impl ClauseId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ClauseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an adapter returns for one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Rows after every clause the adapter applied.
    pub rows: Vec<Record>,
    /// Clauses the adapter did not apply.
    pub unhandled: Vec<ClauseId>,
    /// Pre-paging match count, required when the adapter handled a
    /// `WithTotalCount` clause.
    pub total_count: Option<u64>,
}

impl QueryResult {
    /// A result for which the adapter applied every clause.
    pub fn handled(rows: Vec<Record>) -> Self {
        Self {
            rows,
            unhandled: Vec::new(),
            total_count: None,
        }
    }

    pub fn with_unhandled(mut self, unhandled: impl IntoIterator<Item = ClauseId>) -> Self {
        self.unhandled = unhandled.into_iter().collect();
        self
    }

    pub fn with_total_count(mut self, count: u64) -> Self {
        self.total_count = Some(count);
        self
    }
}

/// A backend that executes as much of a query as it can.
///
/// Implementations translate the query into their native form, return every
/// row they can produce for the clauses they applied, and list every clause
/// they did not apply. Backend failures are returned as errors; the
/// executor propagates them unchanged and never retries.
pub trait Adapter {
    fn run(&self, query: &Query) -> impl Future<Output = anyhow::Result<QueryResult>> + Send;
}

impl<A: Adapter> Adapter for &A {
    fn run(&self, query: &Query) -> impl Future<Output = anyhow::Result<QueryResult>> + Send {
        (**self).run(query)
    }
}

impl<A: Adapter> Adapter for std::sync::Arc<A> {
    fn run(&self, query: &Query) -> impl Future<Output = anyhow::Result<QueryResult>> + Send {
        (**self).run(query)
    }
}

/// Runs queries against one adapter.
#[derive(Debug, Clone)]
pub struct Executor<A> {
    adapter: A,
    options: ExecOptions,
}

impl<A: Adapter> Executor<A> {
    pub fn new(adapter: A) -> Self {
        Self::with_options(adapter, ExecOptions::new())
    }

    pub fn with_options(adapter: A, options: ExecOptions) -> Self {
        Self { adapter, options }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn options(&self) -> &ExecOptions {
        &self.options
    }

    /// Runs `query` and returns its rows.
    ///
    /// Each call re-runs the whole pipeline. A singleton query runs with
    /// `take(1)`. `WithTotalCount` requests in the query are fulfilled before
    /// this returns.
    pub async fn execute(&self, query: &Query) -> Result<Vec<Record>> {
        let limited;
        let query = if query.is_singleton() {
            limited = materialize::limit_one(query);
            &limited
        } else {
            query
        };
        crate::quarry_trace_query!(query.target(), query.clauses().len());

        let result = self.adapter.run(query).await?;
        crate::quarry_trace_result!(result.rows.len(), result.unhandled.len());

        let remaining = self.remaining(query, &result)?;
        let QueryResult {
            rows, total_count, ..
        } = result;

        let applied = if remaining.is_empty() {
            Applied {
                rows,
                total_count: None,
            }
        } else {
            Fallback::only(query, remaining.iter().copied())
                .options(self.options)
                .apply(rows)
        };

        for (id, clause) in query.clauses_with_ids() {
            if let Clause::WithTotalCount(sink) = clause {
                let count = if remaining.contains(&id) {
                    applied.total_count
                } else {
                    total_count
                };
                if let Some(count) = count {
                    sink.fulfill(count);
                }
            }
        }

        Ok(applied.rows)
    }

    /// Checks the adapter's report and returns the clauses the fallback must
    /// apply.
    fn remaining(&self, query: &Query, result: &QueryResult) -> Result<SmallVec<[ClauseId; 8]>> {
        let mut unhandled: HashSet<ClauseId> = HashSet::with_capacity(result.unhandled.len());
        for &id in &result.unhandled {
            let clause = query
                .clause(id)
                .ok_or_else(|| QuarryError::contract(format!("unknown clause {id}")))?;
            match clause.kind() {
                ClauseKind::Join => {
                    return Err(QuarryError::contract(format!(
                        "join {id} cannot be applied in memory"
                    )));
                }
                kind @ (ClauseKind::With | ClauseKind::ForUpdate) => {
                    if self.options.unhandled_hints == HintPolicy::Reject {
                        return Err(QuarryError::contract(format!(
                            "{kind:?} clause {id} left unhandled"
                        )));
                    }
                    crate::quarry_trace_dropped!(kind);
                }
                _ => {
                    unhandled.insert(id);
                }
            }
        }

        let open: SmallVec<[Stage; 8]> = unhandled
            .iter()
            .filter_map(|id| query.clause(*id))
            .map(Clause::stage)
            .collect();
        if open.is_empty() {
            return handled_counts(query, result).map(|()| SmallVec::new());
        }

        for (id, clause) in query.clauses_with_ids() {
            if unhandled.contains(&id) {
                continue;
            }
            let stage = clause.stage();
            if let Some(earlier) = open.iter().find(|earlier| stage.depends_on(**earlier)) {
                return Err(QuarryError::contract(format!(
                    "{:?} clause {id} applied ahead of an unhandled {earlier:?} stage",
                    clause.kind()
                )));
            }
        }

        // A take applied before an unhandled skip would page the wrong rows.
        let skip_unhandled = query
            .clauses_with_ids()
            .any(|(id, c)| matches!(c, Clause::Skip(_)) && unhandled.contains(&id));
        if skip_unhandled {
            if let Some((id, _)) = query
                .clauses_with_ids()
                .find(|(id, c)| matches!(c, Clause::Take(_)) && !unhandled.contains(id))
            {
                return Err(QuarryError::contract(format!(
                    "take {id} applied before an unhandled skip"
                )));
            }
        }

        // Sort keys only make sense together: an unhandled key re-sorts by
        // every key.
        let order_unhandled = query
            .clauses_with_ids()
            .any(|(id, c)| c.kind() == ClauseKind::OrderBy && unhandled.contains(&id));
        if order_unhandled {
            unhandled.extend(
                query
                    .clauses_with_ids()
                    .filter(|(_, c)| c.kind() == ClauseKind::OrderBy)
                    .map(|(id, _)| id),
            );
        }

        handled_counts(query, result)?;

        let mut remaining: SmallVec<[ClauseId; 8]> = unhandled
            .into_iter()
            .filter(|id| query.clause(*id).is_some_and(|c| c.stage() != Stage::Source))
            .collect();
        remaining.sort_unstable();
        Ok(remaining)
    }
}

/// A handled `WithTotalCount` must come back with a count.
fn handled_counts(query: &Query, result: &QueryResult) -> Result<()> {
    if result.total_count.is_some() {
        return Ok(());
    }
    for (id, clause) in query.clauses_with_ids() {
        if clause.kind() == ClauseKind::WithTotalCount && !result.unhandled.contains(&id) {
            return Err(QuarryError::contract(format!(
                "total count {id} handled without a count"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::gt;
    use crate::record;
    use crate::reference::col;

    struct Canned(QueryResult);

    impl Adapter for Canned {
        async fn run(&self, _query: &Query) -> anyhow::Result<QueryResult> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl Adapter for Failing {
        async fn run(&self, _query: &Query) -> anyhow::Result<QueryResult> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    fn rows() -> Vec<Record> {
        vec![record! { "a" => 3 }, record! { "a" => 1 }, record! { "a" => 2 }]
    }

    fn query() -> Query {
        Query::new("t")
            .r#where(gt(col("a"), 0))
            .unwrap()
            .order_by("a")
            .take(2)
    }

    #[tokio::test]
    async fn test_unknown_clause_is_backend_error() {
        let exec = Executor::new(Canned(
            QueryResult::handled(rows()).with_unhandled([ClauseId::new(9)]),
        ));
        let err = exec.execute(&query()).await.unwrap_err();
        assert!(err.is_backend());
    }

    #[tokio::test]
    async fn test_later_stage_handled_is_backend_error() {
        // order unhandled while take was applied
        let exec = Executor::new(Canned(
            QueryResult::handled(rows()).with_unhandled([ClauseId::new(1)]),
        ));
        let err = exec.execute(&query()).await.unwrap_err();
        assert!(err.is_backend());
    }

    #[tokio::test]
    async fn test_sorted_rows_with_unhandled_filter_and_page() {
        let sorted = vec![
            record! { "a" => -1 },
            record! { "a" => 1 },
            record! { "a" => 2 },
            record! { "a" => 3 },
        ];
        let exec = Executor::new(Canned(
            QueryResult::handled(sorted).with_unhandled([ClauseId::new(0), ClauseId::new(2)]),
        ));
        let out = exec.execute(&query()).await.unwrap();
        assert_eq!(out, vec![record! { "a" => 1 }, record! { "a" => 2 }]);
    }

    #[tokio::test]
    async fn test_handled_count_with_unhandled_filter_is_backend_error() {
        let (q, _) = Query::new("t").r#where(gt(col("a"), 0)).unwrap().with_total_count();
        let exec = Executor::new(Canned(
            QueryResult::handled(rows())
                .with_unhandled([ClauseId::new(0)])
                .with_total_count(3),
        ));
        assert!(exec.execute(&q).await.unwrap_err().is_backend());
    }

    #[tokio::test]
    async fn test_nothing_unhandled_returns_rows_as_is() {
        let exec = Executor::new(Canned(QueryResult::handled(rows())));
        assert_eq!(exec.execute(&query()).await.unwrap(), rows());
    }

    #[tokio::test]
    async fn test_all_unhandled_runs_fallback() {
        let ids = (0..3).map(ClauseId::new);
        let exec = Executor::new(Canned(QueryResult::handled(rows()).with_unhandled(ids)));
        let out = exec.execute(&query()).await.unwrap();
        assert_eq!(out, vec![record! { "a" => 1 }, record! { "a" => 2 }]);
    }

    #[tokio::test]
    async fn test_backend_error_propagates_unchanged() {
        let err = Executor::new(Failing).execute(&query()).await.unwrap_err();
        assert!(err.is_backend());
        assert_eq!(err.to_string(), "connection refused");
    }

    #[tokio::test]
    async fn test_unhandled_join_is_backend_error() {
        let q = Query::new("users")
            .join_on(
                "orders",
                crate::JoinKind::Inner,
                crate::expr::eq(col("orders.user_id"), col("users.id")),
            )
            .unwrap();
        let exec = Executor::new(Canned(
            QueryResult::handled(Vec::new()).with_unhandled([ClauseId::new(0)]),
        ));
        assert!(exec.execute(&q).await.unwrap_err().is_backend());
    }

    #[tokio::test]
    async fn test_hint_policy() {
        let q = Query::new("users").for_update(true).with("orders").unwrap();
        let report =
            QueryResult::handled(rows()).with_unhandled([ClauseId::new(0), ClauseId::new(1)]);

        let dropping = Executor::new(Canned(report.clone()));
        assert_eq!(dropping.execute(&q).await.unwrap().len(), 3);

        let rejecting = Executor::with_options(
            Canned(report),
            ExecOptions::new().unhandled_hints(HintPolicy::Reject),
        );
        assert!(rejecting.execute(&q).await.unwrap_err().is_backend());
    }

    #[tokio::test]
    async fn test_handled_total_count_requires_count() {
        let (q, count) = Query::new("t").take(1).with_total_count();
        let missing = Executor::new(Canned(QueryResult::handled(rows())));
        assert!(missing.execute(&q).await.unwrap_err().is_backend());

        let present = Executor::new(Canned(QueryResult::handled(rows()).with_total_count(30)));
        present.execute(&q).await.unwrap();
        assert_eq!(count.get(), Some(30));
    }
}
