use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuarryError {
    /// Structurally illegal clause combination (duplicate select, `on` without a pending join)
    #[error("Invalid composition: {0}")]
    InvalidComposition(String),

    /// A clause that requires an earlier clause was added first (`then_by` before `order_by`)
    #[error("Missing preceding clause: {0}")]
    MissingPrecedingClause(String),

    /// A required argument was absent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A mandatory predicate was absent or malformed
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// Self-join without an alias, or an unresolvable join target
    #[error("Invalid join: {0}")]
    InvalidJoin(String),

    /// Scalar extraction over a query that produced no rows
    #[error("Query returned no rows; cannot return scalar value")]
    EmptyResult,

    /// Scalar extraction over a row without values
    #[error("Selected row contains no values; cannot return scalar value")]
    EmptyRow,

    /// Error mapping a record or value into a typed shape
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// The query carrying the total-count request was dropped without running
    #[error("Total count was never produced")]
    TotalCountUnavailable,

    /// Opaque backend failure, propagated unchanged from the adapter
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl QuarryError {
    /// Returns true for every structurally illegal composition, including a
    /// missing preceding clause.
    pub fn is_invalid_composition(&self) -> bool {
        matches!(
            self,
            QuarryError::InvalidComposition(_) | QuarryError::MissingPrecedingClause(_)
        )
    }

    /// Returns true when the error came from the adapter or from an adapter
    /// contract violation.
    pub fn is_backend(&self) -> bool {
        matches!(self, QuarryError::Backend(_))
    }

    pub(crate) fn contract(message: impl core::fmt::Display) -> Self {
        QuarryError::Backend(anyhow::anyhow!("adapter contract violation: {message}"))
    }
}

/// Result type for query composition and execution
pub type Result<T> = std::result::Result<T, QuarryError>;
