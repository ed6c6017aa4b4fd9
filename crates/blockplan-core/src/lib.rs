#![forbid(unsafe_code)]
//! blockplan-core: shared data model for the leaf nodes of a lazy logical plan.
//!
//! This crate contains only *pure* types: per-block metadata, bundles of block
//! references, schemas, identifiers, and configuration. It never touches the
//! blocks themselves; a `BlockRef` is an opaque handle whose lifetime is
//! managed by the storage layer.
//!
//! Crates that use this:
//! - blockplan-planner: leaf operators and the metadata aggregator.

pub mod bundle;
pub mod config;
pub mod error;
pub mod id;
pub mod metadata;
pub mod prelude;
pub mod schema;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
