//! Security specifications and their normalized form.
//!
//! A specification is either decomposed (independent row and column
//! predicates, each optional) or combined (one predicate returning a
//! [`Decision`]). Both compile to a single [`CompiledPolicy`] so the
//! evaluator only ever deals with one shape.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::columns::{Columns, Decision};
use crate::error::{BoxError, DecisionError, GuardError};

/// Row visibility predicate.
pub type RowPredicate<R, C> = Arc<dyn Fn(&R, &C) -> Result<bool, BoxError> + Send + Sync>;

/// Column selection predicate.
pub type ColumnPredicate<R, C> = Arc<dyn Fn(&R, &C) -> Result<Columns, BoxError> + Send + Sync>;

/// Combined predicate in normalized form.
pub type DecisionFn<R, C> = Arc<dyn Fn(&R, &C) -> Result<Decision, PolicyError> + Send + Sync>;

/// Failure of a single policy evaluation, before it is tied to a record.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Row predicate failed.
    #[error("row predicate failed: {0}")]
    Row(#[source] BoxError),

    /// Column predicate failed.
    #[error("column predicate failed: {0}")]
    Column(#[source] BoxError),

    /// Combined predicate failed.
    #[error("security predicate failed: {0}")]
    Combined(#[source] BoxError),

    /// Predicate result is not a valid decision.
    #[error(transparent)]
    Malformed(#[from] DecisionError),
}

impl PolicyError {
    /// Attach the index of the record being evaluated.
    pub fn at(self, index: usize) -> GuardError {
        match self {
            PolicyError::Row(source) => GuardError::RowPredicate { index, source },
            PolicyError::Column(source) => GuardError::ColumnPredicate { index, source },
            PolicyError::Combined(source) => GuardError::Predicate { index, source },
            PolicyError::Malformed(source) => GuardError::MalformedColumns { index, source },
        }
    }
}

/// Row and column security for one dataset.
pub enum SecuritySpec<R, C> {
    /// Independent predicates. A missing row predicate admits every record;
    /// a missing column predicate selects every column.
    Decomposed {
        /// Row visibility predicate.
        row: Option<RowPredicate<R, C>>,
        /// Column selection predicate.
        column: Option<ColumnPredicate<R, C>>,
    },
    /// A single predicate deciding visibility and columns in one call.
    Combined(DecisionFn<R, C>),
}

impl<R: 'static, C: 'static> SecuritySpec<R, C> {
    /// Create an empty decomposed specification.
    pub fn new() -> Self {
        SecuritySpec::Decomposed {
            row: None,
            column: None,
        }
    }

    /// Set the row predicate.
    ///
    /// Replaces a combined predicate if one was set.
    pub fn with_row<F>(self, predicate: F) -> Self
    where
        F: Fn(&R, &C) -> bool + Send + Sync + 'static,
    {
        self.set_row(Arc::new(
            move |record: &R, context: &C| -> Result<bool, BoxError> {
                Ok(predicate(record, context))
            },
        ))
    }

    /// Set a fallible row predicate.
    pub fn try_with_row<F, E>(self, predicate: F) -> Self
    where
        F: Fn(&R, &C) -> Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.set_row(Arc::new(
            move |record: &R, context: &C| -> Result<bool, BoxError> {
                predicate(record, context).map_err(Into::into)
            },
        ))
    }

    /// Set the column predicate.
    ///
    /// Replaces a combined predicate if one was set.
    pub fn with_column<F>(self, predicate: F) -> Self
    where
        F: Fn(&R, &C) -> Columns + Send + Sync + 'static,
    {
        self.set_column(Arc::new(
            move |record: &R, context: &C| -> Result<Columns, BoxError> {
                Ok(predicate(record, context))
            },
        ))
    }

    /// Set a fallible column predicate.
    pub fn try_with_column<F, E>(self, predicate: F) -> Self
    where
        F: Fn(&R, &C) -> Result<Columns, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.set_column(Arc::new(
            move |record: &R, context: &C| -> Result<Columns, BoxError> {
                predicate(record, context).map_err(Into::into)
            },
        ))
    }

    /// Create a specification from a combined predicate.
    pub fn combined<F>(predicate: F) -> Self
    where
        F: Fn(&R, &C) -> Decision + Send + Sync + 'static,
    {
        SecuritySpec::Combined(Arc::new(
            move |record: &R, context: &C| -> Result<Decision, PolicyError> {
                Ok(predicate(record, context))
            },
        ))
    }

    /// Create a specification from a fallible combined predicate.
    pub fn try_combined<F, E>(predicate: F) -> Self
    where
        F: Fn(&R, &C) -> Result<Decision, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        SecuritySpec::Combined(Arc::new(
            move |record: &R, context: &C| -> Result<Decision, PolicyError> {
                predicate(record, context).map_err(|e| PolicyError::Combined(e.into()))
            },
        ))
    }

    /// Create a specification from a predicate returning loosely typed JSON.
    ///
    /// See [`Decision::from_json`] for the accepted shapes. Anything else
    /// fails the guard call with [`GuardError::MalformedColumns`].
    pub fn dynamic<F>(predicate: F) -> Self
    where
        F: Fn(&R, &C) -> Value + Send + Sync + 'static,
    {
        SecuritySpec::Combined(Arc::new(
            move |record: &R, context: &C| -> Result<Decision, PolicyError> {
                Decision::from_json(&predicate(record, context)).map_err(PolicyError::Malformed)
            },
        ))
    }

    fn set_row(self, predicate: RowPredicate<R, C>) -> Self {
        match self {
            SecuritySpec::Decomposed { column, .. } => SecuritySpec::Decomposed {
                row: Some(predicate),
                column,
            },
            SecuritySpec::Combined(_) => SecuritySpec::Decomposed {
                row: Some(predicate),
                column: None,
            },
        }
    }

    fn set_column(self, predicate: ColumnPredicate<R, C>) -> Self {
        match self {
            SecuritySpec::Decomposed { row, .. } => SecuritySpec::Decomposed {
                row,
                column: Some(predicate),
            },
            SecuritySpec::Combined(_) => SecuritySpec::Decomposed {
                row: None,
                column: Some(predicate),
            },
        }
    }

    /// Check whether neither a row nor a column predicate is configured.
    pub fn is_empty(&self) -> bool {
        matches!(
            self,
            SecuritySpec::Decomposed {
                row: None,
                column: None
            }
        )
    }

    /// Normalize into a single combined predicate.
    ///
    /// Returns `None` for an empty specification: the caller should pass
    /// the dataset through untouched.
    pub fn compile(self) -> Option<CompiledPolicy<R, C>> {
        match self {
            SecuritySpec::Decomposed {
                row: None,
                column: None,
            } => None,
            SecuritySpec::Decomposed { row, column } => {
                let decide: DecisionFn<R, C> = Arc::new(
                    move |record: &R, context: &C| -> Result<Decision, PolicyError> {
                        if let Some(row) = &row {
                            if !row(record, context).map_err(PolicyError::Row)? {
                                return Ok(Decision::Exclude);
                            }
                        }
                        let columns = match &column {
                            Some(column) => {
                                column(record, context).map_err(PolicyError::Column)?
                            }
                            None => Columns::All,
                        };
                        Ok(Decision::Include(columns))
                    },
                );
                Some(CompiledPolicy { decide })
            }
            SecuritySpec::Combined(decide) => Some(CompiledPolicy { decide }),
        }
    }
}

impl<R: 'static, C: 'static> Default for SecuritySpec<R, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, C> Clone for SecuritySpec<R, C> {
    fn clone(&self) -> Self {
        match self {
            SecuritySpec::Decomposed { row, column } => SecuritySpec::Decomposed {
                row: row.clone(),
                column: column.clone(),
            },
            SecuritySpec::Combined(decide) => SecuritySpec::Combined(Arc::clone(decide)),
        }
    }
}

impl<R, C> fmt::Debug for SecuritySpec<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecuritySpec::Decomposed { row, column } => f
                .debug_struct("Decomposed")
                .field("row", &row.is_some())
                .field("column", &column.is_some())
                .finish(),
            SecuritySpec::Combined(_) => f.write_str("Combined"),
        }
    }
}

/// A specification normalized to one decision per record.
pub struct CompiledPolicy<R, C> {
    decide: DecisionFn<R, C>,
}

impl<R, C> CompiledPolicy<R, C> {
    /// Decide visibility and columns for a record.
    pub fn decide(&self, record: &R, context: &C) -> Result<Decision, PolicyError> {
        (self.decide)(record, context)
    }
}

impl<R, C> Clone for CompiledPolicy<R, C> {
    fn clone(&self) -> Self {
        Self {
            decide: Arc::clone(&self.decide),
        }
    }
}

impl<R, C> fmt::Debug for CompiledPolicy<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPolicy").finish_non_exhaustive()
    }
}
