//! Per-block metadata records.
//!
//! Every field is optional: producers fill in what they know. Unknown is a
//! real answer here and must never be read as zero.

use serde::{Deserialize, Serialize};

use crate::schema::Schema;

/// Execution statistics recorded by the task that produced a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecStats {
    pub wall_time_s: f64,
    pub cpu_time_s: f64,
    pub max_rss_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockMetadata {
    pub num_rows: Option<u64>,
    pub size_bytes: Option<u64>,
    pub schema: Option<Schema>,
    pub input_files: Option<Vec<String>>,
    pub exec_stats: Option<ExecStats>,
}

impl BlockMetadata {
    /// Metadata with every field unknown.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Metadata with known row/byte counts and nothing else.
    pub fn with_counts(num_rows: u64, size_bytes: u64) -> Self {
        Self {
            num_rows: Some(num_rows),
            size_bytes: Some(size_bytes),
            ..Self::default()
        }
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn input_files(mut self, files: Vec<String>) -> Self {
        self.input_files = Some(files);
        self
    }

    pub fn exec_stats(mut self, stats: ExecStats) -> Self {
        self.exec_stats = Some(stats);
        self
    }

    pub fn is_unknown(&self) -> bool {
        self.num_rows.is_none()
            && self.size_bytes.is_none()
            && self.schema.is_none()
            && self.input_files.is_none()
            && self.exec_stats.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DataType, Field};

    #[test]
    fn unknown_is_not_zero() {
        let unknown = BlockMetadata::unknown();
        let zero = BlockMetadata::with_counts(0, 0);
        assert!(unknown.is_unknown());
        assert!(!zero.is_unknown());
        assert_ne!(unknown, zero);
    }

    #[test]
    fn serde_keeps_unknown_fields_null() {
        let meta = BlockMetadata {
            num_rows: Some(3),
            ..BlockMetadata::unknown()
        }
        .schema(Schema::new(vec![Field::new("id", DataType::Int64, false)]));

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["num_rows"], 3);
        assert!(json["size_bytes"].is_null());

        let back: BlockMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }
}
