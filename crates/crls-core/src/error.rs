//! Guard error types.

use thiserror::Error;

/// Boxed error produced by caller-supplied predicates and producers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by a guard invocation.
///
/// The guard adds no failure modes of its own beyond validating what the
/// caller's predicates return; every other variant wraps a caller error.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The dataset producer failed before any predicate ran.
    #[error("dataset producer failed: {0}")]
    Producer(#[source] BoxError),

    /// A row predicate failed.
    #[error("row predicate failed at record {index}: {source}")]
    RowPredicate {
        /// Position of the record in the acquired dataset.
        index: usize,
        /// Error raised by the predicate.
        #[source]
        source: BoxError,
    },

    /// A column predicate failed.
    #[error("column predicate failed at record {index}: {source}")]
    ColumnPredicate {
        /// Position of the record in the acquired dataset.
        index: usize,
        /// Error raised by the predicate.
        #[source]
        source: BoxError,
    },

    /// A combined row and column predicate failed.
    #[error("security predicate failed at record {index}: {source}")]
    Predicate {
        /// Position of the record in the acquired dataset.
        index: usize,
        /// Error raised by the predicate.
        #[source]
        source: BoxError,
    },

    /// A predicate returned something that is not a valid decision.
    #[error("malformed column selection at record {index}: {source}")]
    MalformedColumns {
        /// Position of the record in the acquired dataset.
        index: usize,
        /// What was wrong with the result.
        #[source]
        source: DecisionError,
    },

    /// A selected field does not exist on the record (strict mode only).
    #[error("record {index} has no field `{field}`")]
    UnknownField {
        /// Position of the record in the acquired dataset.
        index: usize,
        /// Requested field name.
        field: String,
    },

    /// A value could not be turned into a record.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Invalid filter configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for guard operations.
pub type GuardResult<T> = Result<T, GuardError>;

/// A loosely typed predicate result that does not decode to a decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    /// Neither a bool nor an array of field names.
    #[error("expected bool or array of field names, got {0}")]
    Shape(&'static str),

    /// An array member is not a string.
    #[error("field names must be strings, got {0}")]
    FieldName(&'static str),
}
