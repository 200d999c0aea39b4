//! Per-record feature generation.
//!
//! A generator binds an extraction closure, a fallback value, and an
//! aggregation strategy into one immutable, side-effect-free evaluator. The
//! surrounding execution engine may call `evaluate` concurrently across
//! record partitions; there is no shared mutable state.

use crate::aggregator::{Aggregator, Event};
use crate::types::{FeatureKind, FeatureValue};
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;

pub(crate) type ExtractFn<I> = Arc<dyn Fn(&I) -> anyhow::Result<FeatureValue> + Send + Sync>;

/// The operator that turns one raw input record into one feature value.
pub struct FeatureGenerator<I> {
    feature_name: String,
    operation_name: String,
    output_kind: FeatureKind,
    extract: ExtractFn<I>,
    default_value: FeatureValue,
    extract_source_text: String,
    aggregator: Aggregator,
    aggregate_window: Option<Duration>,
    log_masked: bool,
    max_aggregate_events: usize,
}

impl<I> FeatureGenerator<I> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        feature_name: String,
        output_kind: FeatureKind,
        extract: ExtractFn<I>,
        default_value: FeatureValue,
        extract_source_text: String,
        aggregator: Aggregator,
        aggregate_window: Option<Duration>,
        log_masked: bool,
        max_aggregate_events: usize,
    ) -> Self {
        let operation_name = format!("{}({})", aggregator.name(), feature_name);
        Self {
            feature_name,
            operation_name,
            output_kind,
            extract,
            default_value,
            extract_source_text,
            aggregator,
            aggregate_window,
            log_masked,
            max_aggregate_events,
        }
    }

    /// `"<aggregator>(<feature name>)"`.
    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    pub fn output_kind(&self) -> FeatureKind {
        self.output_kind
    }

    /// Value substituted when extraction fails for a record.
    pub fn default_value(&self) -> &FeatureValue {
        &self.default_value
    }

    /// Human-readable rendition of the extraction logic. Never executed.
    pub fn extract_source_text(&self) -> &str {
        &self.extract_source_text
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Aggregation window; `None` means unbounded.
    pub fn aggregate_window(&self) -> Option<Duration> {
        self.aggregate_window
    }

    /// Produce the feature value for one record.
    ///
    /// An extraction error, or a value of the wrong kind, is masked by the
    /// default value; a single bad record never aborts a derivation pass.
    pub fn evaluate(&self, record: &I) -> FeatureValue {
        match (self.extract)(record) {
            Ok(value) if value.kind() == self.output_kind => value,
            Ok(value) => {
                if self.log_masked {
                    tracing::debug!(
                        feature = %self.feature_name,
                        expected = %self.output_kind,
                        actual = %value.kind(),
                        "extraction returned wrong kind, using default value"
                    );
                }
                self.default_value.clone()
            }
            Err(err) => {
                if self.log_masked {
                    tracing::debug!(
                        feature = %self.feature_name,
                        error = %err,
                        "extraction failed, using default value"
                    );
                }
                self.default_value.clone()
            }
        }
    }

    /// Fold timestamped events through the aggregator, honoring the window.
    pub fn aggregate(&self, events: &[Event], now: DateTime<Utc>) -> FeatureValue {
        self.aggregator
            .fold(events, now, self.aggregate_window, self.max_aggregate_events)
    }
}

// Manual impl: a derived Clone would add an unneeded `I: Clone` bound.
impl<I> Clone for FeatureGenerator<I> {
    fn clone(&self) -> Self {
        Self {
            feature_name: self.feature_name.clone(),
            operation_name: self.operation_name.clone(),
            output_kind: self.output_kind,
            extract: self.extract.clone(),
            default_value: self.default_value.clone(),
            extract_source_text: self.extract_source_text.clone(),
            aggregator: self.aggregator.clone(),
            aggregate_window: self.aggregate_window,
            log_masked: self.log_masked,
            max_aggregate_events: self.max_aggregate_events,
        }
    }
}

impl<I> fmt::Debug for FeatureGenerator<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureGenerator")
            .field("operation_name", &self.operation_name)
            .field("output_kind", &self.output_kind)
            .field("default_value", &self.default_value)
            .field("extract_source_text", &self.extract_source_text)
            .field("aggregate_window", &self.aggregate_window)
            .finish_non_exhaustive()
    }
}
