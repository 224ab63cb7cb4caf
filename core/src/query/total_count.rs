//! Write-once total-count side channel.
//!
//! [`Query::with_total_count`](crate::Query::with_total_count) hands the
//! caller a [`TotalCount`] and stores the matching [`TotalCountSink`] in the
//! query's clause list. The executor fulfils the sink once, with the number
//! of rows that matched before paging.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{QuarryError, Result};

/// Producer half, owned by the `WithTotalCount` clause.
#[derive(Clone)]
pub struct TotalCountSink {
    tx: Arc<watch::Sender<Option<u64>>>,
}

impl TotalCountSink {
    /// Stores `count` unless a count was already stored. Returns whether
    /// this call stored it.
    pub(crate) fn fulfill(&self, count: u64) -> bool {
        self.tx.send_if_modified(|slot| match slot {
            Some(_) => false,
            None => {
                *slot = Some(count);
                true
            }
        })
    }

    pub(crate) fn is_fulfilled(&self) -> bool {
        self.tx.borrow().is_some()
    }
}

impl PartialEq for TotalCountSink {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tx, &other.tx)
    }
}

impl core::fmt::Debug for TotalCountSink {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("TotalCountSink").field(&*self.tx.borrow()).finish()
    }
}

/// Consumer half: the total number of rows the query matched, ignoring
/// `skip`/`take`.
///
/// The value is available once the query has been executed. [`get`](Self::get)
/// returns `None` before that; [`wait`](Self::wait) suspends until it is set.
#[derive(Debug, Clone)]
pub struct TotalCount {
    rx: watch::Receiver<Option<u64>>,
}

impl TotalCount {
    pub(crate) fn channel() -> (TotalCountSink, TotalCount) {
        let (tx, rx) = watch::channel(None);
        (TotalCountSink { tx: Arc::new(tx) }, TotalCount { rx })
    }

    /// The count, if execution has produced it.
    pub fn get(&self) -> Option<u64> {
        *self.rx.borrow()
    }

    /// Waits for the count.
    ///
    /// Fails with [`QuarryError::TotalCountUnavailable`] if every query
    /// carrying the request is dropped without producing it.
    pub async fn wait(&self) -> Result<u64> {
        let mut rx = self.rx.clone();
        let value = *rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| QuarryError::TotalCountUnavailable)?;
        value.ok_or(QuarryError::TotalCountUnavailable)
    }
}
