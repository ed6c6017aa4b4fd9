use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A bound input was given a different number of block references than
    /// metadata records.
    #[error("shape mismatch: {refs} block refs vs {metadata} metadata records")]
    ShapeMismatch { refs: usize, metadata: usize },

    /// A deferred input was given both (or neither) of bundles and a factory.
    #[error("invalid construction: {0}")]
    InvalidConstruction(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}
