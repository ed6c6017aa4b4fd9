//! Leaf operators for data that is already materialized in the object store.
//!
//! The `from_*` constructors on the user side turn in-memory data into blocks
//! and hand the refs plus per-block metadata to `BoundInputOperator`. Which
//! constructor produced the blocks is recorded in `FromKind` for display only.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use blockplan_core::bundle::DataBundle;
use blockplan_core::error::{Error, Result};
use blockplan_core::id::{BlockRef, OpId};
use blockplan_core::metadata::BlockMetadata;

use crate::aggregate::{aggregate_bundles, MetadataCache};
use crate::logical::LogicalOperator;
use crate::unify::{MergeSchemaUnifier, SchemaUnifier};

/// Provenance of a bound input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FromKind {
    Items,
    Blocks,
    Numpy,
    Arrow,
    Pandas,
}

impl FromKind {
    pub fn name(&self) -> &'static str {
        match self {
            FromKind::Items => "FromItems",
            FromKind::Blocks => "FromBlocks",
            FromKind::Numpy => "FromNumpy",
            FromKind::Arrow => "FromArrow",
            FromKind::Pandas => "FromPandas",
        }
    }
}

impl fmt::Display for FromKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fixed list of block refs, one bundle per block. Immutable once built.
pub struct BoundInputOperator {
    id: OpId,
    kind: FromKind,
    input_data: Vec<DataBundle>,
    unifier: Arc<dyn SchemaUnifier>,
    cache: MetadataCache,
}

impl BoundInputOperator {
    pub fn new(
        kind: FromKind,
        block_refs: Vec<BlockRef>,
        block_metadata: Vec<BlockMetadata>,
    ) -> Result<Self> {
        Self::with_unifier(kind, block_refs, block_metadata, Arc::new(MergeSchemaUnifier))
    }

    /// Like `new`, with a caller-chosen schema unifier.
    pub fn with_unifier(
        kind: FromKind,
        block_refs: Vec<BlockRef>,
        block_metadata: Vec<BlockMetadata>,
        unifier: Arc<dyn SchemaUnifier>,
    ) -> Result<Self> {
        if block_refs.len() != block_metadata.len() {
            return Err(Error::ShapeMismatch {
                refs: block_refs.len(),
                metadata: block_metadata.len(),
            });
        }

        // Not owned: the same blocks may back every plan built from this data.
        let input_data: Vec<DataBundle> = block_refs
            .into_iter()
            .zip(block_metadata)
            .map(|(block, meta)| DataBundle::single(block, meta, false))
            .collect();

        let id = OpId::next();
        tracing::trace!(op = %id, kind = %kind, bundles = input_data.len(), "bound input created");

        Ok(Self {
            id,
            kind,
            input_data,
            unifier,
            cache: MetadataCache::new(),
        })
    }

    pub fn kind(&self) -> FromKind {
        self.kind
    }

    pub fn input_data(&self) -> &[DataBundle] {
        &self.input_data
    }

    pub fn num_blocks(&self) -> usize {
        self.input_data.iter().map(DataBundle::num_blocks).sum()
    }

    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate();
    }
}

impl fmt::Debug for BoundInputOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundInputOperator")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("bundles", &self.input_data.len())
            .field("cached", &self.cache.is_populated())
            .finish()
    }
}

impl LogicalOperator for BoundInputOperator {
    fn id(&self) -> OpId {
        self.id
    }

    fn name(&self) -> &str {
        self.kind.name()
    }

    fn input_dependencies(&self) -> &[Arc<dyn LogicalOperator>] {
        &[]
    }

    fn num_outputs(&self) -> Option<usize> {
        Some(self.input_data.len())
    }

    fn output_data(&self) -> Option<Vec<DataBundle>> {
        Some(self.input_data.clone())
    }

    fn aggregate_output_metadata(&self) -> BlockMetadata {
        self.cache
            .get_or_compute(|| aggregate_bundles(&self.input_data, self.unifier.as_ref()))
    }

    // Block refs are tied to the live session.
    fn supports_lineage_serialization(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockplan_core::schema::{DataType, Field, Schema};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn meta(rows: u64, bytes: u64) -> BlockMetadata {
        BlockMetadata::with_counts(rows, bytes)
    }

    fn refs(n: usize) -> Vec<BlockRef> {
        (0..n).map(|_| BlockRef::new()).collect()
    }

    #[test]
    fn one_unowned_bundle_per_block() {
        let block_refs = refs(3);
        let op = BoundInputOperator::new(
            FromKind::Items,
            block_refs.clone(),
            vec![meta(1, 8), meta(2, 16), meta(3, 24)],
        )
        .unwrap();

        let out = op.output_data().unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(op.num_outputs(), Some(3));
        assert_eq!(op.num_blocks(), 3);
        for (bundle, block) in out.iter().zip(&block_refs) {
            assert!(!bundle.owns_blocks());
            assert_eq!(bundle.block_refs().next(), Some(block));
        }
        assert_eq!(out, op.input_data());
    }

    #[test]
    fn mismatched_lengths_fail() {
        let err = BoundInputOperator::new(FromKind::Blocks, refs(3), vec![meta(1, 1), meta(1, 1)])
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { refs: 3, metadata: 2 }));
    }

    #[test]
    fn empty_input_is_known_zero() {
        let op = BoundInputOperator::new(FromKind::Arrow, vec![], vec![]).unwrap();
        let agg = op.aggregate_output_metadata();
        assert_eq!(agg.num_rows, Some(0));
        assert_eq!(agg.size_bytes, Some(0));
        assert_eq!(agg.schema, None);
    }

    #[test]
    fn aggregate_is_memoized_until_invalidated() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let unifier = move |_: &[&BlockMetadata]| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(Schema::new(vec![Field::new("x", DataType::Int32, false)]))
        };
        let mut op = BoundInputOperator::with_unifier(
            FromKind::Pandas,
            refs(2),
            vec![meta(10, 100), meta(5, 50)],
            Arc::new(unifier),
        )
        .unwrap();

        let a = op.aggregate_output_metadata();
        let b = op.aggregate_output_metadata();
        assert_eq!(a, b);
        assert_eq!(a.num_rows, Some(15));
        assert_eq!(a.size_bytes, Some(150));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        op.invalidate_cache();
        assert_eq!(op.aggregate_output_metadata(), a);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn kind_only_affects_name() {
        let kinds = [
            (FromKind::Items, "FromItems"),
            (FromKind::Blocks, "FromBlocks"),
            (FromKind::Numpy, "FromNumpy"),
            (FromKind::Arrow, "FromArrow"),
            (FromKind::Pandas, "FromPandas"),
        ];
        for (kind, name) in kinds {
            let op = BoundInputOperator::new(kind, refs(1), vec![meta(7, 70)]).unwrap();
            assert_eq!(op.name(), name);
            assert_eq!(op.kind(), kind);
            assert!(op.is_source());
            assert!(!op.supports_lineage_serialization());
            assert_eq!(op.aggregate_output_metadata().num_rows, Some(7));
        }
    }
}
