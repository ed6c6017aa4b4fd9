//! Schema unification over per-block metadata.
//!
//! The aggregator treats this as a black box: it hands over every block's
//! metadata in bundle order and takes whatever schema comes back.

use blockplan_core::metadata::BlockMetadata;
use blockplan_core::schema::{DataType, Field, Schema};

/// Merge the schemas of an ordered run of blocks into one.
///
/// Implementations must be pure and deterministic for a given input order.
pub trait SchemaUnifier: Send + Sync {
    fn unify(&self, metadata: &[&BlockMetadata]) -> Option<Schema>;
}

impl<F> SchemaUnifier for F
where
    F: Fn(&[&BlockMetadata]) -> Option<Schema> + Send + Sync,
{
    fn unify(&self, metadata: &[&BlockMetadata]) -> Option<Schema> {
        self(metadata)
    }
}

/// Default unifier.
///
/// Unknown and empty schemas are skipped. Fields are merged by name in
/// first-seen order; numeric columns widen, and a column missing from some
/// blocks becomes nullable. Any other type conflict yields the first known
/// schema unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct MergeSchemaUnifier;

impl SchemaUnifier for MergeSchemaUnifier {
    fn unify(&self, metadata: &[&BlockMetadata]) -> Option<Schema> {
        let known: Vec<&Schema> = metadata
            .iter()
            .filter_map(|m| m.schema.as_ref())
            .filter(|s| !s.is_empty())
            .collect();

        let (first, rest) = known.split_first()?;
        if rest.iter().all(|s| s == first) {
            return Some((*first).clone());
        }

        let mut fields: Vec<Field> = first.fields.clone();
        for schema in rest {
            for field in &schema.fields {
                match fields.iter_mut().find(|f| f.name == field.name) {
                    Some(existing) => match widen(existing.data_type, field.data_type) {
                        Some(t) => {
                            existing.data_type = t;
                            existing.nullable |= field.nullable;
                        }
                        None => {
                            tracing::debug!(
                                column = %field.name,
                                left = ?existing.data_type,
                                right = ?field.data_type,
                                "incompatible column types; keeping first schema"
                            );
                            return Some((*first).clone());
                        }
                    },
                    None => fields.push(field.clone()),
                }
            }
        }

        for field in &mut fields {
            if known.iter().any(|s| s.index_of(&field.name).is_none()) {
                field.nullable = true;
            }
        }

        Some(Schema::new(fields))
    }
}

fn widen(a: DataType, b: DataType) -> Option<DataType> {
    if a == b {
        return Some(a);
    }
    if a.is_integer() && b.is_integer() {
        return Some(DataType::Int64);
    }
    if (a.is_integer() || a.is_float()) && (b.is_integer() || b.is_float()) {
        return Some(DataType::Float64);
    }
    None
}
