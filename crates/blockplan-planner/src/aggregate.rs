//! Aggregate metadata over a run of bundles, plus the memo both leaf
//! operators keep it in.
//!
//! Row and byte totals follow the all-or-unknown rule: one unknown term makes
//! the total unknown. The schema comes from the unifier, fed every block's
//! metadata in bundle order then block order.

use once_cell::sync::OnceCell;

use blockplan_core::bundle::{sum_known, DataBundle};
use blockplan_core::metadata::BlockMetadata;

use crate::unify::SchemaUnifier;

/// Summarize `bundles` into a single metadata record.
///
/// `input_files` and `exec_stats` are never aggregated at this layer.
pub fn aggregate_bundles(bundles: &[DataBundle], unifier: &dyn SchemaUnifier) -> BlockMetadata {
    let num_rows = sum_known(bundles.iter().map(DataBundle::num_rows));
    let size_bytes = sum_known(
        bundles
            .iter()
            .flat_map(|b| b.metadata().map(|m| m.size_bytes)),
    );

    let metadata: Vec<&BlockMetadata> = bundles.iter().flat_map(|b| b.metadata()).collect();
    let schema = unifier.unify(&metadata);

    tracing::trace!(
        bundles = bundles.len(),
        blocks = metadata.len(),
        ?num_rows,
        ?size_bytes,
        has_schema = schema.is_some(),
        "aggregated output metadata"
    );

    BlockMetadata {
        num_rows,
        size_bytes,
        schema,
        input_files: None,
        exec_stats: None,
    }
}

/// Compute-once slot for an operator's aggregate metadata.
///
/// Concurrent first reads run the computation once; everyone sees its result.
/// Clearing requires `&mut`, so callers decide how writers are serialized.
#[derive(Debug, Default)]
pub struct MetadataCache {
    slot: OnceCell<BlockMetadata>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute<F>(&self, compute: F) -> BlockMetadata
    where
        F: FnOnce() -> BlockMetadata,
    {
        self.slot.get_or_init(compute).clone()
    }

    pub fn is_populated(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Drop the memoized value. Returns whether there was one.
    pub fn invalidate(&mut self) -> bool {
        let had_value = self.slot.take().is_some();
        if had_value {
            tracing::trace!("invalidated output metadata cache");
        }
        had_value
    }
}
