//! Planner configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Parallelism hint handed to a deferred input's factory when the caller
    /// does not pick one.
    pub default_parallelism: usize,

    /// Pre-compute every source's aggregate metadata when a plan is built.
    pub eager_metadata: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_parallelism: 8,
            eager_metadata: false,
        }
    }
}

impl PlannerConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `BLOCKPLAN_DEFAULT_PARALLELISM`: factory parallelism hint
    /// - `BLOCKPLAN_EAGER_METADATA`: `1`/`true` to pre-warm metadata caches
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("BLOCKPLAN_DEFAULT_PARALLELISM") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.default_parallelism = v;
            }
        }

        if let Ok(s) = std::env::var("BLOCKPLAN_EAGER_METADATA") {
            if let Some(v) = parse_flag(&s) {
                cfg.eager_metadata = v;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_parallelism == 0 {
            return Err(Error::Config(
                "default_parallelism must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Pick the parallelism to request from a factory. Never returns 0.
    pub fn resolve_parallelism(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_parallelism).max(1)
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
