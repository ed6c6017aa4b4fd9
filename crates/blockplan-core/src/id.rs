//! Strongly-typed identifiers used across the planner.
//!
//! Downstream crates should *not* use raw integers or strings for IDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

macro_rules! new_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(v: u64) -> Self {
                Self(v)
            }
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

new_id!(OpId);

static NEXT_OP_ID: AtomicU64 = AtomicU64::new(1);

impl OpId {
    /// Allocate a process-unique operator id.
    pub fn next() -> Self {
        Self(NEXT_OP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Opaque handle to a physical block held by the object store.
///
/// Equality is handle identity; two refs to blocks with equal contents are
/// still different refs. The referenced block's lifetime is managed elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockRef(Uuid);

impl BlockRef {
    /// Mint a fresh handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BlockRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockRef({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_ids_are_unique() {
        let a = OpId::next();
        let b = OpId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn block_refs_compare_by_handle() {
        let a = BlockRef::new();
        let b = BlockRef::new();
        assert_ne!(a, b);
        assert_eq!(a, BlockRef::from_uuid(*a.as_uuid()));
    }
}
