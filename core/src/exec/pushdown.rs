//! Splitting a query between an adapter and the in-memory fallback.

use smallvec::SmallVec;

use crate::clause::Clause;
use crate::query::Query;

use super::ClauseId;

/// A split of one query's clauses into the ones an adapter applies and the
/// ones it reports as unhandled.
///
/// ```
/// use quarry_core::{Clause, ClauseKind, Pushdown, Query, col, expr::gt};
///
/// # fn main() -> quarry_core::Result<()> {
/// let query = Query::new("t").r#where(gt(col("a"), 0))?.order_by("a").take(2);
///
/// // An adapter that can filter and page, but not sort.
/// let plan = Pushdown::plan(&query, |c: &Clause| c.kind() != ClauseKind::OrderBy);
/// assert_eq!(plan.handled().len(), 1);
/// assert_eq!(plan.unhandled().len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pushdown {
    handled: SmallVec<[ClauseId; 8]>,
    unhandled: SmallVec<[ClauseId; 8]>,
}

/// Whether leaving `unhandled` to the fallback forces `clause` there too.
fn pulls(unhandled: &Clause, clause: &Clause) -> bool {
    clause.stage().depends_on(unhandled.stage())
        || matches!(
            (unhandled, clause),
            (Clause::OrderBy { .. }, Clause::OrderBy { .. }) | (Clause::Skip(_), Clause::Take(_))
        )
}

impl Pushdown {
    /// Plans a split from a capability check.
    ///
    /// Clauses `supports` rejects are unhandled. An unhandled clause then
    /// pulls every clause whose stage [depends on](crate::Stage::depends_on) it
    /// into the unhandled set, along with the other sort keys when it is a
    /// sort key, and the take when it is a skip.
    pub fn plan<F>(query: &Query, mut supports: F) -> Self
    where
        F: FnMut(&Clause) -> bool,
    {
        let clauses = query.clauses();
        let mut handled: SmallVec<[bool; 16]> = clauses.iter().map(&mut supports).collect();

        // Dependencies only point at lower stages, so walking in stage order
        // settles every clause in one pass.
        let mut order: SmallVec<[usize; 16]> = (0..clauses.len()).collect();
        order.sort_by_key(|&index| clauses[index].stage());
        for index in order {
            if !handled[index] {
                continue;
            }
            let clause = &clauses[index];
            let pulled = clauses
                .iter()
                .zip(&handled)
                .any(|(other, ok)| !*ok && pulls(other, clause));
            if pulled {
                handled[index] = false;
            }
        }

        let mut plan = Pushdown::default();
        for ((id, _), ok) in query.clauses_with_ids().zip(handled) {
            if ok {
                plan.handled.push(id);
            } else {
                plan.unhandled.push(id);
            }
        }
        plan
    }

    /// Plans a split where the adapter applies nothing.
    pub fn none(query: &Query) -> Self {
        Self::plan(query, |_| false)
    }

    pub fn handled(&self) -> &[ClauseId] {
        &self.handled
    }

    pub fn unhandled(&self) -> &[ClauseId] {
        &self.unhandled
    }

    pub fn is_handled(&self, id: ClauseId) -> bool {
        self.handled.contains(&id)
    }

    /// Unhandled ids, in the form
    /// [`QueryResult::with_unhandled`](super::QueryResult::with_unhandled) takes.
    pub fn into_unhandled(self) -> Vec<ClauseId> {
        self.unhandled.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::ClauseKind;
    use crate::expr::{gt, lt};
    use crate::reference::col;

    fn query() -> Query {
        Query::new("t")
            .r#where(gt(col("a"), 0))
            .unwrap()
            .r#where(lt(col("a"), 100))
            .unwrap()
            .order_by("a")
            .then_by("b")
            .unwrap()
            .skip(1)
            .take(2)
            .select(["a"])
            .unwrap()
    }

    fn ids(raw: &[usize]) -> Vec<ClauseId> {
        raw.iter().copied().map(ClauseId::new).collect()
    }

    #[test]
    fn test_everything_supported() {
        let plan = Pushdown::plan(&query(), |_| true);
        assert!(plan.unhandled().is_empty());
        assert_eq!(plan.handled().len(), 7);
    }

    #[test]
    fn test_unsupported_filter_keeps_other_filters() {
        let plan = Pushdown::plan(&query(), |c| {
            !matches!(c, Clause::Where(p) if p.to_string().contains('<'))
        });
        // the sort commutes with the filter and stays with the adapter
        assert_eq!(plan.handled(), ids(&[0, 2, 3]).as_slice());
        assert_eq!(plan.unhandled(), ids(&[1, 4, 5, 6]).as_slice());
    }

    #[test]
    fn test_unsupported_sort_key_pulls_all_keys() {
        let mut seen = 0;
        let plan = Pushdown::plan(&query(), |c| {
            if c.kind() == ClauseKind::OrderBy {
                seen += 1;
                return seen == 1;
            }
            true
        });
        assert_eq!(plan.handled(), ids(&[0, 1]).as_slice());
        assert_eq!(plan.unhandled(), ids(&[2, 3, 4, 5, 6]).as_slice());
    }

    #[test]
    fn test_unsupported_skip_pulls_take() {
        let plan = Pushdown::plan(&query(), |c| c.kind() != ClauseKind::Skip);
        assert_eq!(plan.unhandled(), ids(&[4, 5, 6]).as_slice());

        let plan = Pushdown::plan(&query(), |c| c.kind() != ClauseKind::Take);
        assert_eq!(plan.unhandled(), ids(&[5, 6]).as_slice());
    }

    #[test]
    fn test_unsupported_distinct_keeps_sort_but_pulls_count() {
        let (q, _) = Query::new("t").distinct().order_by("a").with_total_count();
        let plan = Pushdown::plan(&q, |c| c.kind() != ClauseKind::Distinct);
        assert_eq!(plan.handled(), ids(&[1]).as_slice());
        assert_eq!(plan.unhandled(), ids(&[0, 2]).as_slice());
    }

    #[test]
    fn test_unsupported_projection_only() {
        let plan = Pushdown::plan(&query(), |c| c.kind() != ClauseKind::Select);
        assert_eq!(plan.unhandled(), ids(&[6]).as_slice());
    }

    #[test]
    fn test_source_clauses_do_not_pull() {
        let q = Query::new("t").for_update(false).take(3);
        let plan = Pushdown::plan(&q, |c| c.kind() != ClauseKind::ForUpdate);
        assert_eq!(plan.unhandled(), ids(&[0]).as_slice());
        assert!(plan.is_handled(ClauseId::new(1)));
        assert_eq!(Pushdown::none(&q).unhandled().len(), 2);
    }
}
