//! Leaf operator for input that may not exist yet.
//!
//! Holds either bundles cached from an earlier execution or a factory that
//! produces read bundles on demand. The execution layer swaps either one when
//! it re-binds a plan to fresh upstream results.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use blockplan_core::bundle::DataBundle;
use blockplan_core::error::{Error, Result};
use blockplan_core::id::OpId;
use blockplan_core::metadata::BlockMetadata;

use crate::aggregate::{aggregate_bundles, MetadataCache};
use crate::logical::LogicalOperator;
use crate::unify::{MergeSchemaUnifier, SchemaUnifier};

/// Produces bundles for a requested parallelism.
pub type InputDataFactory = Arc<dyn Fn(usize) -> Vec<DataBundle> + Send + Sync>;

/// What the operator currently holds. Never both.
#[derive(Clone)]
pub enum InputSource {
    Materialized(Vec<DataBundle>),
    Factory(InputDataFactory),
    /// Both were cleared by updates; only reachable after construction.
    Unbound,
}

impl InputSource {
    pub fn bundles(&self) -> Option<&[DataBundle]> {
        match self {
            InputSource::Materialized(b) => Some(b),
            _ => None,
        }
    }

    pub fn factory(&self) -> Option<&InputDataFactory> {
        match self {
            InputSource::Factory(f) => Some(f),
            _ => None,
        }
    }
}

impl fmt::Debug for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Materialized(b) => f.debug_tuple("Materialized").field(&b.len()).finish(),
            InputSource::Factory(_) => f.write_str("Factory"),
            InputSource::Unbound => f.write_str("Unbound"),
        }
    }
}

/// Source and memo live under one lock so a reader never pairs new bundles
/// with a stale aggregate.
#[derive(Debug)]
struct State {
    source: InputSource,
    cache: MetadataCache,
}

pub struct DeferredInputOperator {
    id: OpId,
    state: RwLock<State>,
    unifier: Arc<dyn SchemaUnifier>,
}

impl DeferredInputOperator {
    pub fn new_with_data(bundles: Vec<DataBundle>) -> Self {
        Self::from_source(InputSource::Materialized(bundles), Arc::new(MergeSchemaUnifier))
    }

    pub fn new_with_factory(factory: InputDataFactory) -> Self {
        Self::from_source(InputSource::Factory(factory), Arc::new(MergeSchemaUnifier))
    }

    /// Build from optional parts; exactly one must be present.
    pub fn try_new(
        input_data: Option<Vec<DataBundle>>,
        factory: Option<InputDataFactory>,
    ) -> Result<Self> {
        let source = match (input_data, factory) {
            (Some(bundles), None) => InputSource::Materialized(bundles),
            (None, Some(factory)) => InputSource::Factory(factory),
            (Some(_), Some(_)) => {
                return Err(Error::InvalidConstruction(
                    "input data and input data factory are mutually exclusive".to_string(),
                ))
            }
            (None, None) => {
                return Err(Error::InvalidConstruction(
                    "one of input data or input data factory is required".to_string(),
                ))
            }
        };
        Ok(Self::from_source(source, Arc::new(MergeSchemaUnifier)))
    }

    /// Swap in a different schema unifier. Consumes `self`, so no cached
    /// aggregate computed with the old unifier can survive.
    pub fn with_unifier(self, unifier: Arc<dyn SchemaUnifier>) -> Self {
        let state = self.state.into_inner().unwrap_or_else(PoisonError::into_inner);
        Self {
            id: self.id,
            state: RwLock::new(State {
                source: state.source,
                cache: MetadataCache::new(),
            }),
            unifier,
        }
    }

    fn from_source(source: InputSource, unifier: Arc<dyn SchemaUnifier>) -> Self {
        let id = OpId::next();
        tracing::trace!(op = %id, ?source, "deferred input created");
        Self {
            id,
            state: RwLock::new(State {
                source,
                cache: MetadataCache::new(),
            }),
            unifier,
        }
    }

    // The guarded state stays consistent across a panic in a reader: the
    // memo is a pure function of the source.
    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current source.
    pub fn source(&self) -> InputSource {
        self.read().source.clone()
    }

    pub fn input_data_factory(&self) -> Option<InputDataFactory> {
        self.read().source.factory().cloned()
    }

    /// The bundles this operator would feed into execution: held bundles as
    /// they are, or a fresh factory run for `parallelism`. Does not store the
    /// factory output.
    pub fn materialize(&self, parallelism: usize) -> Option<Vec<DataBundle>> {
        let factory = {
            let state = self.read();
            match &state.source {
                InputSource::Materialized(b) => return Some(b.clone()),
                InputSource::Factory(f) => Arc::clone(f),
                InputSource::Unbound => return None,
            }
        };
        // Run the factory outside the lock; it may be slow.
        let bundles = factory(parallelism);
        tracing::debug!(op = %self.id, parallelism, bundles = bundles.len(), "invoked input data factory");
        Some(bundles)
    }

    /// Replace held bundles. `None` clears them; an installed factory is
    /// kept only in that case.
    pub fn update_data(&self, new_bundles: Option<Vec<DataBundle>>) {
        let mut state = self.write();
        match new_bundles {
            Some(bundles) => {
                tracing::debug!(op = %self.id, bundles = bundles.len(), "input data replaced");
                state.source = InputSource::Materialized(bundles);
            }
            None => {
                if matches!(state.source, InputSource::Materialized(_)) {
                    state.source = InputSource::Unbound;
                }
                tracing::debug!(op = %self.id, "input data cleared");
            }
        }
        state.cache.invalidate();
    }

    /// Replace the factory. Installing one drops any held bundles; `None`
    /// clears a factory but leaves held bundles alone.
    pub fn update_factory(&self, new_factory: Option<InputDataFactory>) {
        let mut state = self.write();
        let had_bundles = matches!(state.source, InputSource::Materialized(_));
        match new_factory {
            Some(factory) => state.source = InputSource::Factory(factory),
            None => {
                if !had_bundles {
                    state.source = InputSource::Unbound;
                }
            }
        }
        tracing::debug!(op = %self.id, had_bundles, "input data factory replaced");
        // Without bundles the aggregate was already the fixed all-unknown value.
        if had_bundles {
            state.cache.invalidate();
        }
    }

    pub fn invalidate_cache(&self) {
        self.write().cache.invalidate();
    }
}

impl fmt::Debug for DeferredInputOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("DeferredInputOperator")
            .field("id", &self.id)
            .field("source", &state.source)
            .field("cached", &state.cache.is_populated())
            .finish()
    }
}

impl LogicalOperator for DeferredInputOperator {
    fn id(&self) -> OpId {
        self.id
    }

    fn name(&self) -> &str {
        "InputData"
    }

    fn input_dependencies(&self) -> &[Arc<dyn LogicalOperator>] {
        &[]
    }

    fn num_outputs(&self) -> Option<usize> {
        self.read().source.bundles().map(<[DataBundle]>::len)
    }

    fn output_data(&self) -> Option<Vec<DataBundle>> {
        self.read().source.bundles().map(<[DataBundle]>::to_vec)
    }

    fn aggregate_output_metadata(&self) -> BlockMetadata {
        let state = self.read();
        match &state.source {
            InputSource::Materialized(bundles) => state
                .cache
                .get_or_compute(|| aggregate_bundles(bundles, self.unifier.as_ref())),
            // A factory's output is unknown until it runs.
            _ => BlockMetadata::unknown(),
        }
    }

    fn supports_lineage_serialization(&self) -> bool {
        false
    }
}
