//! Composition methods on [`Query`].
//!
//! Every method takes `&self` and returns a new query; the receiver is never
//! changed. Composition errors surface here, before a query can reach an
//! adapter.

use crate::clause::{Cardinality, Clause, ClauseKind, OrderDirection};
use crate::error::{QuarryError, Result};
use crate::expr::{Operand, Predicate};
use crate::join::{JoinBuilder, JoinKind, PendingJoin};
use crate::reference::{ColumnRef, IntoObjectRef, ObjectRef, Projection};

use super::{Query, TotalCount};

impl Query {
    // =========================================================================
    // Internal helpers
    // =========================================================================

    fn push(&self, clause: Clause) -> Query {
        let mut clauses = Vec::with_capacity(self.clauses.len() + 1);
        clauses.extend(self.clauses.iter().cloned());
        clauses.push(clause);
        self.rebuild(clauses)
    }

    fn without(&self, kind: ClauseKind) -> Vec<Clause> {
        self.clauses
            .iter()
            .filter(|c| c.kind() != kind)
            .cloned()
            .collect()
    }

    /// Swaps the single clause of `clause`'s kind in place, or appends it.
    fn replace_single(&self, clause: Clause) -> Query {
        let kind = clause.kind();
        let mut clauses: Vec<Clause> = self.clauses.to_vec();
        match clauses.iter().position(|c| c.kind() == kind) {
            Some(at) => {
                clauses[at] = clause;
                let mut seen = false;
                clauses.retain(|c| {
                    if c.kind() != kind {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => clauses.push(clause),
        }
        self.rebuild(clauses)
    }

    // =========================================================================
    // Projection
    // =========================================================================

    /// Sets the projection list.
    ///
    /// Fails with [`QuarryError::InvalidComposition`] if the query already
    /// has a `Select`; use [`replace_select`](Self::replace_select) to swap it.
    pub fn select<I, P>(&self, columns: I) -> Result<Query>
    where
        I: IntoIterator<Item = P>,
        P: Into<Projection>,
    {
        if self.has(ClauseKind::Select) {
            return Err(QuarryError::InvalidComposition(
                "query already has a select clause".into(),
            ));
        }
        Ok(self.push(Clause::Select(columns.into_iter().map(Into::into).collect())))
    }

    /// Replaces any existing projection list.
    pub fn replace_select<I, P>(&self, columns: I) -> Query
    where
        I: IntoIterator<Item = P>,
        P: Into<Projection>,
    {
        let mut clauses = self.without(ClauseKind::Select);
        clauses.push(Clause::Select(columns.into_iter().map(Into::into).collect()));
        self.rebuild(clauses)
    }

    pub fn clear_select(&self) -> Query {
        self.clear(ClauseKind::Select)
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Adds a filter. Repeated calls combine with AND.
    pub fn r#where(&self, predicate: impl Into<Option<Predicate>>) -> Result<Query> {
        let predicate = predicate
            .into()
            .ok_or_else(|| QuarryError::InvalidArgument("where requires a predicate".into()))?;
        Ok(self.push(Clause::Where(predicate)))
    }

    /// Drops every existing filter and adds `predicate`.
    pub fn replace_where(&self, predicate: Predicate) -> Query {
        let mut clauses = self.without(ClauseKind::Where);
        clauses.push(Clause::Where(predicate));
        self.rebuild(clauses)
    }

    pub fn clear_where(&self) -> Query {
        self.clear(ClauseKind::Where)
    }

    /// Adds a post-aggregation filter.
    pub fn having(&self, predicate: impl Into<Option<Predicate>>) -> Result<Query> {
        let predicate = predicate
            .into()
            .ok_or_else(|| QuarryError::InvalidArgument("having requires a predicate".into()))?;
        Ok(self.push(Clause::Having(predicate)))
    }

    pub fn clear_having(&self) -> Query {
        self.clear(ClauseKind::Having)
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    pub fn order_by(&self, column: impl Into<ColumnRef>) -> Query {
        self.order_by_with(column, OrderDirection::Asc)
    }

    pub fn order_by_descending(&self, column: impl Into<ColumnRef>) -> Query {
        self.order_by_with(column, OrderDirection::Desc)
    }

    /// Appends a sort key with an explicit direction.
    pub fn order_by_with(&self, column: impl Into<ColumnRef>, direction: OrderDirection) -> Query {
        self.push(Clause::OrderBy {
            column: column.into(),
            direction,
        })
    }

    /// Orders by several columns ascending: the first is the primary key,
    /// the rest follow as secondary keys in argument order.
    pub fn order_by_all<I, C>(&self, columns: I) -> Result<Query>
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnRef>,
    {
        let mut columns = columns.into_iter();
        let first = columns.next().ok_or_else(|| {
            QuarryError::InvalidArgument("order_by_all requires at least one column".into())
        })?;
        columns.try_fold(self.order_by(first), |query, column| query.then_by(column))
    }

    /// Appends a secondary sort key.
    ///
    /// Fails with [`QuarryError::MissingPrecedingClause`] when no `OrderBy`
    /// exists yet.
    pub fn then_by(&self, column: impl Into<ColumnRef>) -> Result<Query> {
        self.then_by_with(column, OrderDirection::Asc)
    }

    pub fn then_by_descending(&self, column: impl Into<ColumnRef>) -> Result<Query> {
        self.then_by_with(column, OrderDirection::Desc)
    }

    pub fn then_by_with(
        &self,
        column: impl Into<ColumnRef>,
        direction: OrderDirection,
    ) -> Result<Query> {
        if !self.has(ClauseKind::OrderBy) {
            return Err(QuarryError::MissingPrecedingClause(
                "then_by must follow order_by".into(),
            ));
        }
        Ok(self.order_by_with(column, direction))
    }

    pub fn clear_order_by(&self) -> Query {
        self.clear(ClauseKind::OrderBy)
    }

    // =========================================================================
    // Paging, distinctness and locking
    // =========================================================================

    pub fn skip(&self, n: usize) -> Query {
        self.replace_single(Clause::Skip(n))
    }

    pub fn take(&self, n: usize) -> Query {
        self.replace_single(Clause::Take(n))
    }

    /// Drops duplicate rows.
    ///
    /// Duplicates are whole source rows, compared before the projection
    /// runs, so `distinct().select(["dept"])` keeps one row per distinct
    /// source row, not one per `dept`. A SQL `SELECT DISTINCT` differs.
    pub fn distinct(&self) -> Query {
        self.replace_single(Clause::Distinct)
    }

    pub fn for_update(&self, skip_locked: bool) -> Query {
        self.replace_single(Clause::ForUpdate { skip_locked })
    }

    pub fn clear_skip(&self) -> Query {
        self.clear(ClauseKind::Skip)
    }

    pub fn clear_take(&self) -> Query {
        self.clear(ClauseKind::Take)
    }

    pub fn clear_distinct(&self) -> Query {
        self.clear(ClauseKind::Distinct)
    }

    pub fn clear_for_update(&self) -> Query {
        self.clear(ClauseKind::ForUpdate)
    }

    // =========================================================================
    // Eager includes
    // =========================================================================

    /// Requests a related object graph, letting the adapter pick the
    /// cardinality.
    pub fn with(&self, reference: impl IntoObjectRef) -> Result<Query> {
        self.with_cardinality(reference, Cardinality::Unspecified)
    }

    pub fn with_one(&self, reference: impl IntoObjectRef) -> Result<Query> {
        self.with_cardinality(reference, Cardinality::One)
    }

    pub fn with_many(&self, reference: impl IntoObjectRef) -> Result<Query> {
        self.with_cardinality(reference, Cardinality::Many)
    }

    pub fn with_cardinality(
        &self,
        reference: impl IntoObjectRef,
        cardinality: Cardinality,
    ) -> Result<Query> {
        Ok(self.push(Clause::With {
            reference: reference.into_object_ref()?,
            cardinality,
        }))
    }

    pub fn clear_with(&self) -> Query {
        self.clear(ClauseKind::With)
    }

    // =========================================================================
    // Total count and singleton
    // =========================================================================

    /// Requests the number of rows the query matches before paging.
    ///
    /// The returned [`TotalCount`] is fulfilled when the returned query is
    /// executed.
    pub fn with_total_count(&self) -> (Query, TotalCount) {
        let (sink, count) = TotalCount::channel();
        (self.push(Clause::WithTotalCount(sink)), count)
    }

    pub fn clear_with_total_count(&self) -> Query {
        self.clear(ClauseKind::WithTotalCount)
    }

    /// Marks the query as yielding at most one record. Executing it adds
    /// `take(1)`.
    pub fn singleton(&self) -> Query {
        let mut query = self.clone();
        query.singleton = true;
        query
    }

    /// A copy without the singleton flag.
    pub(crate) fn sequence(&self) -> Query {
        let mut query = self.clone();
        query.singleton = false;
        query
    }

    // =========================================================================
    // Joins
    // =========================================================================

    /// Declares a join whose condition is supplied next, via
    /// [`JoinBuilder::on`].
    ///
    /// Fails with [`QuarryError::InvalidArgument`] when `target` does not
    /// resolve to an object reference.
    pub fn join(&self, target: impl IntoObjectRef, kind: JoinKind) -> Result<JoinBuilder> {
        let target = target.into_object_ref()?;
        Ok(JoinBuilder::new(self.clone(), PendingJoin::new(target, kind)))
    }

    pub fn left_join(&self, target: impl IntoObjectRef) -> Result<JoinBuilder> {
        self.join(target, JoinKind::Outer)
    }

    pub fn outer_join(&self, target: impl IntoObjectRef) -> Result<JoinBuilder> {
        self.join(target, JoinKind::Outer)
    }

    /// Completes a pending join.
    ///
    /// Fails with [`QuarryError::InvalidComposition`] if there is no pending
    /// join and with [`QuarryError::InvalidExpression`] if there is no
    /// condition.
    pub fn on(
        &self,
        pending: impl Into<Option<PendingJoin>>,
        condition: impl Into<Option<Predicate>>,
    ) -> Result<Query> {
        let pending = pending.into().ok_or_else(|| {
            QuarryError::InvalidComposition("on must be preceded by a join".into())
        })?;
        let condition = condition.into().ok_or_else(|| {
            QuarryError::InvalidExpression("on requires a join condition".into())
        })?;
        Ok(self.push(Clause::Join(pending.complete(condition))))
    }

    /// Declares and completes a join in one step.
    ///
    /// Fails with [`QuarryError::InvalidJoin`] when the target does not
    /// resolve, or when it would join the query's own object without an
    /// alias that tells the two apart.
    pub fn join_on(
        &self,
        target: impl IntoObjectRef,
        kind: JoinKind,
        condition: Predicate,
    ) -> Result<Query> {
        let target = self.join_target(target)?;
        self.on(PendingJoin::new(target, kind), condition)
    }

    /// Joins on named column equalities over the join target.
    pub fn join_where<I, K, V>(
        &self,
        target: impl IntoObjectRef,
        kind: JoinKind,
        pairs: I,
    ) -> Result<Query>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Operand>,
    {
        let target = self.join_target(target)?;
        let condition = Predicate::columns_equal(&target, pairs)
            .ok_or_else(|| QuarryError::InvalidJoin("could not create join expression".into()))?;
        self.on(PendingJoin::new(target, kind), condition)
    }

    fn join_target(&self, target: impl IntoObjectRef) -> Result<ObjectRef> {
        let target = target
            .into_object_ref()
            .map_err(|e| QuarryError::InvalidJoin(format!("incorrect join target: {e}")))?;
        if ObjectRef::names_match(target.alias_or_name(), &self.target) {
            return Err(QuarryError::InvalidJoin(format!(
                "cannot join unaliased object '{}' to itself",
                target.name()
            )));
        }
        Ok(target)
    }

    pub fn clear_joins(&self) -> Query {
        self.clear(ClauseKind::Join)
    }

    // =========================================================================
    // Generic clearing
    // =========================================================================

    /// Removes every clause of `kind`; a no-op when there are none.
    pub fn clear(&self, kind: ClauseKind) -> Query {
        if !self.has(kind) {
            return self.clone();
        }
        self.rebuild(self.without(kind))
    }
}
