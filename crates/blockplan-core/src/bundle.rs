//! Bundles of block references with their metadata.
//!
//! A bundle is the unit the execution layer hands between operators. It keeps
//! the (ref, metadata) pairs in order and records whether it is the exclusive
//! owner of the referenced blocks.

use serde::{Deserialize, Serialize};

use crate::id::BlockRef;
use crate::metadata::BlockMetadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBundle {
    blocks: Vec<(BlockRef, BlockMetadata)>,
    /// When false the blocks may back other plans and must not be freed
    /// after this bundle is consumed.
    owns_blocks: bool,
}

impl DataBundle {
    pub fn new(blocks: Vec<(BlockRef, BlockMetadata)>, owns_blocks: bool) -> Self {
        Self {
            blocks,
            owns_blocks,
        }
    }

    /// Bundle holding a single block.
    pub fn single(block: BlockRef, metadata: BlockMetadata, owns_blocks: bool) -> Self {
        Self::new(vec![(block, metadata)], owns_blocks)
    }

    pub fn owns_blocks(&self) -> bool {
        self.owns_blocks
    }

    pub fn blocks(&self) -> &[(BlockRef, BlockMetadata)] {
        &self.blocks
    }

    pub fn block_refs(&self) -> impl Iterator<Item = &BlockRef> {
        self.blocks.iter().map(|(r, _)| r)
    }

    pub fn metadata(&self) -> impl Iterator<Item = &BlockMetadata> {
        self.blocks.iter().map(|(_, m)| m)
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total rows, or `None` if any block's count is unknown.
    /// An empty bundle knows it has zero rows.
    pub fn num_rows(&self) -> Option<u64> {
        sum_known(self.metadata().map(|m| m.num_rows))
    }

    /// Total bytes, or `None` if any block's size is unknown.
    pub fn size_bytes(&self) -> Option<u64> {
        sum_known(self.metadata().map(|m| m.size_bytes))
    }
}

/// Saturating sum that is unknown as soon as one term is unknown.
pub fn sum_known<I>(values: I) -> Option<u64>
where
    I: IntoIterator<Item = Option<u64>>,
{
    values
        .into_iter()
        .try_fold(0u64, |acc, v| v.map(|v| acc.saturating_add(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(rows: Option<u64>, bytes: Option<u64>) -> (BlockRef, BlockMetadata) {
        (
            BlockRef::new(),
            BlockMetadata {
                num_rows: rows,
                size_bytes: bytes,
                ..BlockMetadata::unknown()
            },
        )
    }

    #[test]
    fn totals_over_known_blocks() {
        let b = DataBundle::new(vec![block(Some(3), Some(30)), block(Some(4), Some(40))], true);
        assert_eq!(b.num_rows(), Some(7));
        assert_eq!(b.size_bytes(), Some(70));
        assert_eq!(b.num_blocks(), 2);
        assert!(b.owns_blocks());
    }

    #[test]
    fn one_unknown_block_poisons_total() {
        let b = DataBundle::new(vec![block(Some(3), Some(30)), block(None, Some(40))], false);
        assert_eq!(b.num_rows(), None);
        assert_eq!(b.size_bytes(), Some(70));
    }

    #[test]
    fn empty_bundle_is_known_zero() {
        let b = DataBundle::new(vec![], false);
        assert!(b.is_empty());
        assert_eq!(b.num_rows(), Some(0));
        assert_eq!(b.size_bytes(), Some(0));
    }

    #[test]
    fn sum_saturates() {
        assert_eq!(sum_known([Some(u64::MAX), Some(1)]), Some(u64::MAX));
        assert_eq!(sum_known(std::iter::empty()), Some(0));
    }

    #[test]
    fn block_order_is_preserved() {
        let (r1, m1) = block(Some(1), None);
        let (r2, m2) = block(Some(2), None);
        let b = DataBundle::new(vec![(r1, m1), (r2, m2)], false);
        let refs: Vec<_> = b.block_refs().copied().collect();
        assert_eq!(refs, vec![r1, r2]);
    }
}
