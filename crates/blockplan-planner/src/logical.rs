//! Logical operator surface and the plan that holds a DAG of them.
//!
//! Operators are shared through `Arc`: the same leaf may sit at the bottom of
//! several plans at once.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use blockplan_core::bundle::DataBundle;
use blockplan_core::config::PlannerConfig;
use blockplan_core::error::Result;
use blockplan_core::id::OpId;
use blockplan_core::metadata::BlockMetadata;

/// A node in the logical DAG.
pub trait LogicalOperator: fmt::Debug + Send + Sync {
    /// Identity of this node, unique per process.
    fn id(&self) -> OpId;

    /// Human-readable operator name (stable).
    fn name(&self) -> &str;

    /// Upstream operators, in order. Empty for leaves.
    fn input_dependencies(&self) -> &[Arc<dyn LogicalOperator>];

    /// Number of output bundles, if known before execution.
    fn num_outputs(&self) -> Option<usize>;

    /// Bundles this operator already holds, if any.
    fn output_data(&self) -> Option<Vec<DataBundle>>;

    /// Best-effort summary of the operator's output.
    fn aggregate_output_metadata(&self) -> BlockMetadata;

    /// Whether the operator can be written into a portable plan description.
    fn supports_lineage_serialization(&self) -> bool;

    fn is_source(&self) -> bool {
        self.input_dependencies().is_empty()
    }
}

/// A logical plan rooted at `dag`.
#[derive(Debug, Clone)]
pub struct LogicalPlan {
    dag: Arc<dyn LogicalOperator>,
    config: PlannerConfig,
}

impl LogicalPlan {
    pub fn new(dag: Arc<dyn LogicalOperator>, config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        let plan = Self { dag, config };
        if plan.config.eager_metadata {
            for source in plan.sources() {
                let meta = source.aggregate_output_metadata();
                tracing::debug!(
                    op = %source.id(),
                    name = source.name(),
                    num_rows = ?meta.num_rows,
                    "pre-warmed source metadata"
                );
            }
        }
        Ok(plan)
    }

    pub fn dag(&self) -> &Arc<dyn LogicalOperator> {
        &self.dag
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Every operator reachable from the root, each once, in depth-first
    /// pre-order.
    pub fn operators(&self) -> Vec<Arc<dyn LogicalOperator>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut stack = vec![Arc::clone(&self.dag)];
        while let Some(op) = stack.pop() {
            if !seen.insert(op.id()) {
                continue;
            }
            // Reverse so the first input is visited first.
            for input in op.input_dependencies().iter().rev() {
                stack.push(Arc::clone(input));
            }
            out.push(op);
        }
        out
    }

    /// Leaf operators, in discovery order.
    pub fn sources(&self) -> Vec<Arc<dyn LogicalOperator>> {
        self.operators()
            .into_iter()
            .filter(|op| op.is_source())
            .collect()
    }

    pub fn supports_lineage_serialization(&self) -> bool {
        self.operators()
            .iter()
            .all(|op| op.supports_lineage_serialization())
    }

    /// Parallelism to request from a deferred source's factory.
    pub fn parallelism_hint(&self, requested: Option<usize>) -> usize {
        self.config.resolve_parallelism(requested)
    }
}
