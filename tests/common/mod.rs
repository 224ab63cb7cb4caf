#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use quarry::core::Fallback;
use quarry::prelude::*;
use quarry::{Clause, ClauseKind};

/// Every clause kind an in-memory backend can apply itself.
pub const ROW_KINDS: [ClauseKind; 8] = [
    ClauseKind::Where,
    ClauseKind::Having,
    ClauseKind::Distinct,
    ClauseKind::OrderBy,
    ClauseKind::WithTotalCount,
    ClauseKind::Skip,
    ClauseKind::Take,
    ClauseKind::Select,
];

/// In-memory adapter with a configurable capability set.
///
/// Clauses of a supported kind are applied here, the rest are reported
/// unhandled through [`Pushdown::plan`].
pub struct MemoryAdapter {
    rows: Vec<Record>,
    supports: Vec<ClauseKind>,
    failure: Option<String>,
    calls: AtomicUsize,
    last: Mutex<Option<Query>>,
}

impl MemoryAdapter {
    /// Supports every row kind plus joins, includes and locks.
    pub fn new(rows: Vec<Record>) -> Self {
        let mut supports = ROW_KINDS.to_vec();
        supports.extend([ClauseKind::Join, ClauseKind::With, ClauseKind::ForUpdate]);
        Self::supporting(rows, supports)
    }

    /// Supports nothing; everything runs in the fallback.
    pub fn bare(rows: Vec<Record>) -> Self {
        Self::supporting(rows, [])
    }

    pub fn supporting(rows: Vec<Record>, kinds: impl IntoIterator<Item = ClauseKind>) -> Self {
        Self {
            rows,
            supports: kinds.into_iter().collect(),
            failure: None,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        let mut adapter = Self::bare(Vec::new());
        adapter.failure = Some(message.to_string());
        adapter
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The query most recently handed to `run`.
    pub fn last_query(&self) -> Option<Query> {
        self.last.lock().unwrap().clone()
    }

    fn supports(&self, clause: &Clause) -> bool {
        self.supports.contains(&clause.kind())
    }
}

impl Adapter for MemoryAdapter {
    async fn run(&self, query: &Query) -> anyhow::Result<QueryResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(query.clone());
        if let Some(message) = &self.failure {
            anyhow::bail!("{message}");
        }

        let plan = Pushdown::plan(query, |c| self.supports(c));
        let applied =
            Fallback::only(query, plan.handled().iter().copied()).apply(self.rows.clone());
        let mut result = QueryResult::handled(applied.rows).with_unhandled(plan.into_unhandled());
        result.total_count = applied.total_count;
        Ok(result)
    }
}

/// `{ "a": n }` rows.
pub fn numbers(values: &[i64]) -> Vec<Record> {
    values.iter().map(|n| record! { "a" => *n }).collect()
}

pub fn people() -> Vec<Record> {
    vec![
        record! { "id" => 1, "name" => "ann", "dept" => "ops", "age" => 31 },
        record! { "id" => 2, "name" => "ben", "dept" => "dev", "age" => 17 },
        record! { "id" => 3, "name" => "cat", "dept" => "dev", "age" => 45 },
        record! { "id" => 4, "name" => "dan", "dept" => Value::Null, "age" => 28 },
        record! { "id" => 5, "name" => "eve", "dept" => "ops", "age" => 39 },
    ]
}

/// Every subset of `kinds`.
pub fn subsets(kinds: &[ClauseKind]) -> Vec<Vec<ClauseKind>> {
    (0..1u32 << kinds.len())
        .map(|mask| {
            kinds
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, k)| *k)
                .collect()
        })
        .collect()
}
