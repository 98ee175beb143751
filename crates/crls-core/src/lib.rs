//! CRLS Core - row and column level security for in-memory records.
//!
//! This crate holds the evaluation side of a guard:
//! - [`Record`] and the default [`Row`] type
//! - Column selections and per-record [`Decision`]s
//! - [`SecuritySpec`] and its normalized [`CompiledPolicy`]
//! - The [`filter_rows`] evaluator and its [`FilterConfig`]
//!
//! Binding datasets to guards lives in the `crls` crate.
//!
//! # Example
//!
//! ```
//! use crls_core::{filter_rows, Columns, FilterConfig, Row, SecurityContext, SecuritySpec};
//!
//! let rows = vec![
//!     Row::new().with_field("id", 1).with_field("tenant", 123).with_field("secret", true),
//!     Row::new().with_field("id", 2).with_field("tenant", 456),
//! ];
//!
//! let policy = SecuritySpec::<Row, SecurityContext>::new()
//!     .with_row(|row, ctx| row.get("tenant") == ctx.attribute("tenant"))
//!     .with_column(|_, _| Columns::only(["id", "tenant"]))
//!     .compile()
//!     .expect("policy has a row predicate");
//!
//! let ctx = SecurityContext::new("alice").with_attribute("tenant", 123);
//! let visible = filter_rows(&rows, &ctx, &policy, &FilterConfig::default()).unwrap();
//!
//! assert_eq!(visible.len(), 1);
//! assert!(visible[0].get("secret").is_none());
//! ```

pub mod columns;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod policy;
pub mod record;

pub use columns::{Columns, Decision, FieldSet};
pub use config::{FilterConfig, MissingFieldPolicy, DEFAULT_LABEL};
pub use context::SecurityContext;
pub use error::{BoxError, DecisionError, GuardError, GuardResult};
pub use filter::filter_rows;
pub use policy::{
    ColumnPredicate, CompiledPolicy, DecisionFn, PolicyError, RowPredicate, SecuritySpec,
};
pub use record::{Record, Row};
