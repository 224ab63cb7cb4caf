//! Per-executor settings.

/// Where nulls sort when the fallback executor orders rows ascending.
/// Descending order reverses the placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NullOrder {
    #[default]
    First,
    Last,
}

/// What to do when an adapter leaves a `With` or `ForUpdate` clause
/// unhandled. Neither can be applied in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HintPolicy {
    /// Log and skip the clause.
    #[default]
    Drop,
    /// Fail execution with a backend error.
    Reject,
}

/// Execution settings for an [`Executor`](crate::Executor).
///
/// ```
/// use quarry_core::{ExecOptions, HintPolicy, NullOrder};
///
/// let options = ExecOptions::new()
///     .null_order(NullOrder::Last)
///     .unhandled_hints(HintPolicy::Reject);
/// assert_eq!(options.null_order, NullOrder::Last);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExecOptions {
    pub null_order: NullOrder,
    pub unhandled_hints: HintPolicy,
}

impl ExecOptions {
    pub const fn new() -> Self {
        Self {
            null_order: NullOrder::First,
            unhandled_hints: HintPolicy::Drop,
        }
    }

    pub const fn null_order(mut self, order: NullOrder) -> Self {
        self.null_order = order;
        self
    }

    pub const fn unhandled_hints(mut self, policy: HintPolicy) -> Self {
        self.unhandled_hints = policy;
        self
    }
}
