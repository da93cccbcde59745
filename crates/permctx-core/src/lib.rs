//! # permctx-core
//!
//! Foundation types shared by every permctx crate.
//!
//! - **Context sets**: [`ContextSet`] and its [`ContextSetBuilder`], the immutable
//!   key → values mapping handed to the permission evaluator
//! - **Resource keys**: [`ResourceKey`] namespaced identifiers and the
//!   default-namespace formatting rule for context values
//! - **Rewrites**: [`RewriteTable`] substitution rules applied to world names
//! - **Subjects**: the [`Subject`] capability trait and branded [`SubjectId`]
//! - **Errors**: [`ContextError`] via `thiserror`
//! - **Logging**: `tracing` subscriber setup

#![deny(unsafe_code)]

pub mod context;
pub mod errors;
pub mod ids;
pub mod keys;
pub mod logging;
pub mod resource;
pub mod rewrite;
pub mod subject;

pub use context::{Context, ContextConsumer, ContextSet, ContextSetBuilder, SatisfyMode};
pub use errors::{ContextError, Result};
pub use ids::SubjectId;
pub use resource::ResourceKey;
pub use rewrite::{RewriteTable, UnmatchedPolicy};
pub use subject::{Subject, WorldKind, WorldView};
