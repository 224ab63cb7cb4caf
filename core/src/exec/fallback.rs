//! In-memory application of clauses an adapter left unhandled.
//!
//! Passes run in [`Stage`](crate::Stage) order no matter how the clauses
//! were listed: filter, distinct, order, total count, page, project.

use core::cmp::Ordering;

use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::clause::{Clause, OrderDirection};
use crate::expr::{Predicate, resolve};
use crate::options::{ExecOptions, NullOrder};
use crate::query::Query;
use crate::record::Record;
use crate::reference::{ColumnRef, Projection};
use crate::value::Value;

use super::ClauseId;

/// Rows after the fallback passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Applied {
    pub rows: Vec<Record>,
    /// Rows matched before paging, when a `WithTotalCount` clause was applied.
    pub total_count: Option<u64>,
}

/// Applies a chosen subset of a query's clauses to a row set.
#[derive(Debug, Clone)]
pub struct Fallback<'q> {
    query: &'q Query,
    selected: SmallVec<[bool; 16]>,
    options: ExecOptions,
}

impl<'q> Fallback<'q> {
    /// Applies every clause of `query`.
    pub fn all(query: &'q Query) -> Self {
        Self {
            query,
            selected: SmallVec::from_elem(true, query.clauses().len()),
            options: ExecOptions::new(),
        }
    }

    /// Applies only the clauses in `ids`. Unknown ids are ignored.
    pub fn only(query: &'q Query, ids: impl IntoIterator<Item = ClauseId>) -> Self {
        let mut selected = SmallVec::from_elem(false, query.clauses().len());
        for id in ids {
            if let Some(slot) = selected.get_mut(id.index()) {
                *slot = true;
            }
        }
        Self {
            query,
            selected,
            options: ExecOptions::new(),
        }
    }

    pub fn options(mut self, options: ExecOptions) -> Self {
        self.options = options;
        self
    }

    fn chosen(&self) -> impl Iterator<Item = &'q Clause> + '_ {
        self.query
            .clauses()
            .iter()
            .zip(self.selected.iter())
            .filter_map(|(clause, on)| on.then_some(clause))
    }

    /// Runs the passes over `rows`.
    pub fn apply(&self, mut rows: Vec<Record>) -> Applied {
        crate::quarry_profile_function!();

        let mut filters: SmallVec<[&Predicate; 4]> = SmallVec::new();
        let mut keys: SmallVec<[(&ColumnRef, OrderDirection); 4]> = SmallVec::new();
        let mut distinct = false;
        let mut count = false;
        let mut skip = None;
        let mut take = None;
        let mut projection = None;

        for clause in self.chosen() {
            match clause {
                Clause::Where(p) | Clause::Having(p) => filters.push(p),
                Clause::Distinct => distinct = true,
                Clause::OrderBy { column, direction } => keys.push((column, *direction)),
                Clause::WithTotalCount(_) => count = true,
                Clause::Skip(n) => skip = Some(*n),
                Clause::Take(n) => take = Some(*n),
                Clause::Select(columns) => projection = Some(columns.as_slice()),
                Clause::Join(_) | Clause::With { .. } | Clause::ForUpdate { .. } => {}
            }
        }

        if !filters.is_empty() {
            crate::quarry_profile_scope!("fallback", "filter");
            rows.retain(|row| filters.iter().all(|p| p.evaluate(row)));
            crate::quarry_trace_fallback!("filter", rows.len());
        }

        if distinct {
            crate::quarry_profile_scope!("fallback", "distinct");
            let mut seen: HashSet<Record> = HashSet::with_capacity(rows.len());
            rows.retain(|row| seen.insert(row.clone()));
            crate::quarry_trace_fallback!("distinct", rows.len());
        }

        if !keys.is_empty() {
            crate::quarry_profile_scope!("fallback", "order");
            let nulls = self.options.null_order;
            rows.sort_by(|a, b| {
                keys.iter()
                    .map(|(column, direction)| {
                        compare_key(resolve(a, column), resolve(b, column), *direction, nulls)
                    })
                    .find(|ord| ord.is_ne())
                    .unwrap_or(Ordering::Equal)
            });
            crate::quarry_trace_fallback!("order", rows.len());
        }

        let total_count = count.then(|| rows.len() as u64);

        if skip.is_some() || take.is_some() {
            crate::quarry_profile_scope!("fallback", "page");
            let skip = skip.unwrap_or(0).min(rows.len());
            rows.drain(..skip);
            if let Some(take) = take {
                rows.truncate(take);
            }
            crate::quarry_trace_fallback!("page", rows.len());
        }

        if let Some(columns) = projection {
            crate::quarry_profile_scope!("fallback", "project");
            rows = project(rows, columns);
            crate::quarry_trace_fallback!("project", rows.len());
        }

        Applied { rows, total_count }
    }
}

fn compare_key(a: &Value, b: &Value, direction: OrderDirection, nulls: NullOrder) -> Ordering {
    let ord = match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) if nulls == NullOrder::First => Ordering::Less,
        (true, false) => Ordering::Greater,
        (false, true) if nulls == NullOrder::First => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.sort_cmp(b),
    };
    match direction {
        OrderDirection::Asc => ord,
        OrderDirection::Desc => ord.reverse(),
    }
}

fn project(rows: Vec<Record>, columns: &[Projection]) -> Vec<Record> {
    if columns.contains(&Projection::Count) {
        let count = Record::new().with(Projection::COUNT_COLUMN, Value::Integer(rows.len() as i64));
        return vec![count];
    }
    if columns.contains(&Projection::Exists) {
        if rows.is_empty() {
            return Vec::new();
        }
        return vec![Record::new().with(Projection::EXISTS_COLUMN, true)];
    }
    rows.iter()
        .map(|row| {
            columns
                .iter()
                .filter_map(|p| match p {
                    Projection::Column(column) => {
                        Some((column.output_name(), resolve(row, column).clone()))
                    }
                    _ => None,
                })
                .collect()
        })
        .collect()
}
