//! Result shapes built on [`Executor::execute`].
//!
//! Single-row helpers add `take(1)` to the query before it runs so the
//! adapter never produces rows that would be thrown away. `count` and
//! `exists` replace the projection with a marker and let the adapter (or
//! the fallback) compute the answer.

use futures_util::stream::{self, Stream, StreamExt};

use crate::error::{QuarryError, Result};
use crate::query::Query;
use crate::record::Record;
use crate::reference::Projection;
use crate::row::{FromRecord, FromValue};
use crate::value::Value;

use super::{Adapter, Executor};

/// Output of [`Executor::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Rows(Vec<Record>),
    /// A singleton query's record, or `None` when nothing matched.
    Single(Option<Record>),
}

impl Fetched {
    /// Flattens into a row list.
    pub fn into_rows(self) -> Vec<Record> {
        match self {
            Fetched::Rows(rows) => rows,
            Fetched::Single(row) => row.into_iter().collect(),
        }
    }
}

pub(super) fn limit_one(query: &Query) -> Query {
    match query.take_value() {
        Some(n) if n <= 1 => query.clone(),
        _ => query.take(1),
    }
}

fn first_value(rows: Vec<Record>) -> Result<Value> {
    let row = rows.into_iter().next().ok_or(QuarryError::EmptyResult)?;
    row.into_iter()
        .next()
        .map(|(_, value)| value)
        .ok_or(QuarryError::EmptyRow)
}

impl<A: Adapter> Executor<A> {
    // =========================================================================
    // Sequences
    // =========================================================================

    /// Lazily runs `query` when first polled and yields its rows.
    ///
    /// Every stream returned re-runs the query independently.
    pub fn stream<'a>(&'a self, query: &'a Query) -> impl Stream<Item = Result<Record>> + 'a {
        stream::once(self.execute(query)).flat_map(|result| match result {
            Ok(rows) => stream::iter(rows.into_iter().map(Ok::<Record, QuarryError>)).left_stream(),
            Err(err) => stream::iter([Err(err)]).right_stream(),
        })
    }

    pub async fn to_list(&self, query: &Query) -> Result<Vec<Record>> {
        self.execute(query).await
    }

    pub async fn to_array(&self, query: &Query) -> Result<Box<[Record]>> {
        Ok(self.execute(query).await?.into_boxed_slice())
    }

    /// Casts every row to `T`, failing on the first row that does not convert.
    pub async fn cast<T: FromRecord>(&self, query: &Query) -> Result<Vec<T>> {
        self.execute(query)
            .await?
            .iter()
            .map(T::from_record)
            .collect()
    }

    /// Casts every row to `T`, skipping rows that do not convert.
    pub async fn of_type<T: FromRecord>(&self, query: &Query) -> Result<Vec<T>> {
        Ok(self
            .execute(query)
            .await?
            .iter()
            .filter_map(|row| T::from_record(row).ok())
            .collect())
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    /// The first value of the first row.
    ///
    /// Fails with [`QuarryError::EmptyResult`] when there are no rows and
    /// with [`QuarryError::EmptyRow`] when the first row has no values.
    pub async fn to_scalar(&self, query: &Query) -> Result<Value> {
        first_value(self.execute(query).await?)
    }

    /// Like [`to_scalar`](Self::to_scalar), with `None` in place of the
    /// empty-result and empty-row errors.
    pub async fn to_scalar_or_default(&self, query: &Query) -> Result<Option<Value>> {
        match self.to_scalar(query).await {
            Ok(value) => Ok(Some(value)),
            Err(QuarryError::EmptyResult | QuarryError::EmptyRow) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn to_scalar_as<T: FromValue>(&self, query: &Query) -> Result<T> {
        T::from_value(&self.to_scalar(query).await?)
    }

    /// The first value of every row; rows without values yield `Null`.
    pub async fn to_scalar_list(&self, query: &Query) -> Result<Vec<Value>> {
        Ok(self
            .execute(query)
            .await?
            .into_iter()
            .map(|row| row.into_iter().next().map(|(_, v)| v).unwrap_or_default())
            .collect())
    }

    pub async fn to_scalar_array(&self, query: &Query) -> Result<Box<[Value]>> {
        Ok(self.to_scalar_list(query).await?.into_boxed_slice())
    }

    pub async fn to_scalar_list_as<T: FromValue>(&self, query: &Query) -> Result<Vec<T>> {
        self.to_scalar_list(query)
            .await?
            .iter()
            .map(T::from_value)
            .collect()
    }

    // =========================================================================
    // Single rows
    // =========================================================================

    /// The first row. Fails with [`QuarryError::EmptyResult`] when nothing
    /// matched.
    pub async fn first(&self, query: &Query) -> Result<Record> {
        self.first_or_default(query)
            .await?
            .ok_or(QuarryError::EmptyResult)
    }

    pub async fn first_or_default(&self, query: &Query) -> Result<Option<Record>> {
        Ok(self.execute(&limit_one(query)).await?.into_iter().next())
    }

    /// The only row. Only the first match is ever fetched; no uniqueness
    /// check is made.
    pub async fn single(&self, query: &Query) -> Result<Record> {
        self.first(query).await
    }

    pub async fn single_or_default(&self, query: &Query) -> Result<Option<Record>> {
        self.first_or_default(query).await
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    /// Number of rows `query` matches, ignoring ordering and paging.
    pub async fn count(&self, query: &Query) -> Result<u64> {
        let probe = query
            .sequence()
            .clear_order_by()
            .clear_skip()
            .clear_take()
            .replace_select([Projection::Count]);
        match self.to_scalar_or_default(&probe).await? {
            None | Some(Value::Null) => Ok(0),
            Some(value) => u64::from_value(&value),
        }
    }

    /// Whether `query` matches at least one row, ignoring ordering and
    /// paging.
    pub async fn exists(&self, query: &Query) -> Result<bool> {
        let probe = query
            .sequence()
            .clear_order_by()
            .clear_skip()
            .clear_take()
            .replace_select([Projection::Exists]);
        Ok(self.execute(&probe).await?.len() == 1)
    }

    pub async fn any(&self, query: &Query) -> Result<bool> {
        self.exists(query).await
    }

    // =========================================================================
    // Singleton-aware entry point
    // =========================================================================

    /// Runs `query`, yielding one record for singleton queries and the row
    /// list otherwise.
    pub async fn fetch(&self, query: &Query) -> Result<Fetched> {
        if query.is_singleton() {
            return Ok(Fetched::Single(self.first_or_default(query).await?));
        }
        Ok(Fetched::Rows(self.execute(query).await?))
    }
}
