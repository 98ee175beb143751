//! Guard binding.
//!
//! Binding is synchronous and side-effect free: neither the producer nor
//! any predicate runs until the returned guard is called. The guard shape
//! is chosen by the entry point, never by inspecting the source at runtime.

use crls_core::{CompiledPolicy, FilterConfig, Record, SecuritySpec};
use tracing::debug;

use crate::guard::SyncGuard;
use crate::source::DatasetSource;

#[cfg(feature = "async")]
use crate::guard::AsyncGuard;
#[cfg(feature = "async")]
use crate::source::AsyncSource;

/// Builder for guards sharing one security specification and config.
pub struct GuardBinder<R, C> {
    security: Option<SecuritySpec<R, C>>,
    config: FilterConfig,
}

impl<R: Record + 'static, C: 'static> GuardBinder<R, C> {
    /// Create a binder with no security and the default config.
    pub fn new() -> Self {
        Self {
            security: None,
            config: FilterConfig::default(),
        }
    }

    /// Set the security specification.
    pub fn with_security(mut self, security: SecuritySpec<R, C>) -> Self {
        self.security = Some(security);
        self
    }

    /// Set the filter configuration.
    pub fn with_config(mut self, config: FilterConfig) -> Self {
        self.config = config;
        self
    }

    /// Bind a fixed dataset or synchronous producer.
    pub fn bind_sync(self, source: impl Into<DatasetSource<R>>) -> SyncGuard<R, C> {
        let source = source.into();
        let policy = compile(self.security);
        debug!(
            label = %self.config.label,
            fixed = source.is_fixed(),
            passthrough = policy.is_none(),
            "bound sync guard"
        );
        SyncGuard::new(source, policy, self.config)
    }

    /// Bind an asynchronous producer.
    #[cfg(feature = "async")]
    pub fn bind_async(self, source: AsyncSource<R>) -> AsyncGuard<R, C> {
        let policy = compile(self.security);
        debug!(
            label = %self.config.label,
            passthrough = policy.is_none(),
            "bound async guard"
        );
        AsyncGuard::new(source, policy, self.config)
    }
}

impl<R: Record + 'static, C: 'static> Default for GuardBinder<R, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// An absent and an empty specification both yield a pass-through guard.
fn compile<R: 'static, C: 'static>(
    security: Option<SecuritySpec<R, C>>,
) -> Option<CompiledPolicy<R, C>> {
    security.and_then(SecuritySpec::compile)
}

/// Bind a fixed dataset or synchronous producer with the default config.
pub fn bind_sync<R, C>(
    source: impl Into<DatasetSource<R>>,
    security: Option<SecuritySpec<R, C>>,
) -> SyncGuard<R, C>
where
    R: Record + 'static,
    C: 'static,
{
    GuardBinder {
        security,
        config: FilterConfig::default(),
    }
    .bind_sync(source)
}

/// Bind an asynchronous producer with the default config.
#[cfg(feature = "async")]
pub fn bind_async<R, C>(
    source: AsyncSource<R>,
    security: Option<SecuritySpec<R, C>>,
) -> AsyncGuard<R, C>
where
    R: Record + 'static,
    C: 'static,
{
    GuardBinder {
        security,
        config: FilterConfig::default(),
    }
    .bind_async(source)
}
