#![forbid(unsafe_code)]
//! blockplan-planner: leaf operators of the logical plan and the metadata
//! aggregation they share.
//!
//! Design:
//! - `LogicalOperator` is the DAG node surface the optimizer consumes.
//! - `BoundInputOperator` wraps block refs that already exist;
//!   `DeferredInputOperator` wraps cached bundles *or* a bundle factory.
//! - Both memoize `aggregate_output_metadata()` through `MetadataCache`; the
//!   schema part is delegated to a `SchemaUnifier`.
//!
//! NOTE: No execution happens here. Nothing in this crate reads or frees a
//! block; it only summarizes metadata other components computed.

pub mod aggregate;
pub mod from;
pub mod input_data;
pub mod logical;
pub mod unify;

pub use aggregate::{aggregate_bundles, MetadataCache};
pub use from::{BoundInputOperator, FromKind};
pub use input_data::{DeferredInputOperator, InputDataFactory, InputSource};
pub use logical::{LogicalOperator, LogicalPlan};
pub use unify::{MergeSchemaUnifier, SchemaUnifier};
