#![forbid(unsafe_code)]
//! blockplan: leaf nodes of a lazy logical plan over distributed blocks.
//!
//! Re-exports the workspace crates under one name.

pub use blockplan_core;
pub use blockplan_planner;

pub mod prelude {
    pub use blockplan_core::prelude::*;
    pub use blockplan_planner::{
        BoundInputOperator, DeferredInputOperator, FromKind, InputDataFactory, InputSource,
        LogicalOperator, LogicalPlan, MergeSchemaUnifier, SchemaUnifier,
    };
}
