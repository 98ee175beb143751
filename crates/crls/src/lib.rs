//! CRLS - row and column level security guards for in-memory datasets.
//!
//! Bind a dataset (fixed, or produced on demand) to a [`SecuritySpec`] once,
//! then call the returned guard with each request's context:
//!
//! - [`bind_sync`] / [`GuardBinder::bind_sync`] return a [`SyncGuard`] for
//!   fixed datasets and synchronous producers.
//! - [`bind_async`] / [`GuardBinder::bind_async`] return an [`AsyncGuard`]
//!   whose `call` must be awaited (feature `async`, on by default).
//!
//! Without a specification the guard hands back the acquired dataset
//! itself. Every call re-acquires the dataset and re-evaluates every
//! predicate; nothing is cached between calls.
//!
//! # Example
//!
//! ```
//! use crls::{bind_sync, Columns, Row, SecurityContext, SecuritySpec};
//!
//! let posts = vec![
//!     Row::new().with_field("id", 1).with_field("tenant", 123).with_field("secret", true),
//!     Row::new().with_field("id", 2).with_field("tenant", 456),
//! ];
//!
//! let guard = bind_sync(
//!     posts,
//!     Some(
//!         SecuritySpec::<Row, SecurityContext>::new()
//!             .with_row(|row, ctx| row.get("tenant") == ctx.attribute("tenant"))
//!             .with_column(|_, _| Columns::only(["id", "tenant"])),
//!     ),
//! );
//!
//! let ctx = SecurityContext::new("alice").with_attribute("tenant", 123);
//! let visible = guard.call(&ctx).unwrap();
//! assert_eq!(visible.len(), 1);
//! assert!(visible[0].get("secret").is_none());
//! ```

pub mod binder;
pub mod guard;
pub mod source;

pub use binder::{bind_sync, GuardBinder};
pub use guard::SyncGuard;
pub use source::{Dataset, DatasetSource, Producer};

#[cfg(feature = "async")]
pub use binder::bind_async;
#[cfg(feature = "async")]
pub use guard::AsyncGuard;
#[cfg(feature = "async")]
pub use source::{AsyncProducer, AsyncSource};

/// Re-export of the evaluation core.
pub use crls_core as core;
pub use crls_core::{
    filter_rows, BoxError, Columns, Decision, DecisionError, FieldSet, FilterConfig, GuardError,
    GuardResult, MissingFieldPolicy, Record, Row, SecurityContext, SecuritySpec,
};
