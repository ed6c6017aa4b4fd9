//! Convenient re-exports for downstream crates.

pub use crate::bundle::DataBundle;
pub use crate::config::PlannerConfig;
pub use crate::error::{Error, Result};
pub use crate::id::{BlockRef, OpId};
pub use crate::metadata::{BlockMetadata, ExecStats};
pub use crate::schema::{DataType, Field, Schema};
