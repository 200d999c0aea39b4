//! Configuration for the feature construction core.

use serde::{Deserialize, Serialize};

/// Tunables applied to every generator built by a `FeatureBuilder`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCoreConfig {
    /// Log masked extraction failures at debug level.
    ///
    /// Masking itself is unconditional: a failing extraction always yields
    /// the generator's default value. This only controls whether the
    /// occurrence is recorded through `tracing`.
    #[serde(default = "default_true")]
    pub log_masked_extractions: bool,
    /// Maximum number of events folded per aggregation call (0 = unlimited).
    ///
    /// When set, only the most recent N in-window events are folded.
    #[serde(default)]
    pub max_aggregate_events: usize,
}

impl Default for FeatureCoreConfig {
    fn default() -> Self {
        Self {
            log_masked_extractions: true,
            max_aggregate_events: 0,
        }
    }
}

fn default_true() -> bool {
    true
}
