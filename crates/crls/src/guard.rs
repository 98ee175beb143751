//! Bound guards.
//!
//! A guard pairs a dataset source with a compiled policy. Calling it
//! acquires the dataset and filters it for the given context. Guards hold
//! no per-call state and can be shared across threads and tasks.

use std::sync::Arc;

use crls_core::{filter_rows, CompiledPolicy, FilterConfig, GuardResult, Record};
use tracing::{instrument, trace};

use crate::source::{Dataset, DatasetSource};

#[cfg(feature = "async")]
use crate::source::AsyncSource;

/// Guard over a fixed dataset or a synchronous producer.
pub struct SyncGuard<R, C> {
    source: DatasetSource<R>,
    policy: Option<CompiledPolicy<R, C>>,
    config: Arc<FilterConfig>,
}

impl<R, C> SyncGuard<R, C> {
    pub(crate) fn new(
        source: DatasetSource<R>,
        policy: Option<CompiledPolicy<R, C>>,
        config: FilterConfig,
    ) -> Self {
        Self {
            source,
            policy,
            config: Arc::new(config),
        }
    }

    /// Check if the guard returns its dataset untouched.
    pub fn is_passthrough(&self) -> bool {
        self.policy.is_none()
    }

    /// Get the filter configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }
}

impl<R: Record, C> SyncGuard<R, C> {
    /// Return the records visible to `context`.
    #[instrument(level = "debug", name = "guard", skip_all, fields(label = %self.config.label))]
    pub fn call(&self, context: &C) -> GuardResult<Dataset<R>> {
        let rows = self.source.acquire()?;
        apply(rows, context, self.policy.as_ref(), &self.config)
    }
}

impl<R, C> Clone for SyncGuard<R, C> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            policy: self.policy.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

/// Guard over an asynchronous producer.
#[cfg(feature = "async")]
pub struct AsyncGuard<R, C> {
    source: AsyncSource<R>,
    policy: Option<CompiledPolicy<R, C>>,
    config: Arc<FilterConfig>,
}

#[cfg(feature = "async")]
impl<R, C> AsyncGuard<R, C> {
    pub(crate) fn new(
        source: AsyncSource<R>,
        policy: Option<CompiledPolicy<R, C>>,
        config: FilterConfig,
    ) -> Self {
        Self {
            source,
            policy,
            config: Arc::new(config),
        }
    }

    /// Check if the guard returns its dataset untouched.
    pub fn is_passthrough(&self) -> bool {
        self.policy.is_none()
    }

    /// Get the filter configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }
}

#[cfg(feature = "async")]
impl<R: Record, C> AsyncGuard<R, C> {
    /// Await the producer, then return the records visible to `context`.
    #[instrument(level = "debug", name = "guard", skip_all, fields(label = %self.config.label))]
    pub async fn call(&self, context: &C) -> GuardResult<Dataset<R>> {
        let rows = self.source.acquire().await?;
        apply(rows, context, self.policy.as_ref(), &self.config)
    }
}

#[cfg(feature = "async")]
impl<R, C> Clone for AsyncGuard<R, C> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            policy: self.policy.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

/// Shared evaluation step of both guard shapes.
fn apply<R: Record, C>(
    rows: Dataset<R>,
    context: &C,
    policy: Option<&CompiledPolicy<R, C>>,
    config: &FilterConfig,
) -> GuardResult<Dataset<R>> {
    match policy {
        None => {
            trace!(rows = rows.len(), "no security configured, passing dataset through");
            Ok(rows)
        }
        Some(policy) => filter_rows(&rows, context, policy, config).map(Arc::from),
    }
}
