//! Fluent, single-use construction of raw features.
//!
//! Every step takes the builder by value and returns it, so a builder is
//! consumed exactly once: after a terminal call (`as_predictor` /
//! `as_response`) the builder is gone and the finished feature is immutable.

use crate::aggregator::Aggregator;
use crate::config::FeatureCoreConfig;
use crate::descriptor::{FeatureDescriptor, mint_uid};
use crate::error::{FeatureError, Result};
use crate::feature::Feature;
use crate::generator::{ExtractFn, FeatureGenerator};
use crate::registry::FeatureTypeRegistry;
use crate::types::{FeatureKind, FeatureValue};
use chrono::Duration;
use std::sync::Arc;

/// Name used when the caller does not supply one.
pub const DEFAULT_FEATURE_NAME: &str = "feature";

/// Staged builder for one raw feature over input records of type `I`.
pub struct FeatureBuilder<I> {
    name: String,
    output_kind: FeatureKind,
    input_type: String,
    extract: Option<ExtractFn<I>>,
    default_value: Option<FeatureValue>,
    extract_source_text: Option<String>,
    aggregator: Option<Aggregator>,
    aggregate_window: Option<Duration>,
    registry: Arc<FeatureTypeRegistry>,
    config: FeatureCoreConfig,
}

impl<I> FeatureBuilder<I> {
    /// Start a builder with an explicit output kind and name.
    ///
    /// The input type tag is taken from `I`'s type name.
    pub fn new(output_kind: FeatureKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_kind,
            input_type: std::any::type_name::<I>().to_string(),
            extract: None,
            default_value: None,
            extract_source_text: None,
            aggregator: None,
            aggregate_window: None,
            registry: FeatureTypeRegistry::global(),
            config: FeatureCoreConfig::default(),
        }
    }

    /// Start a builder with the default name.
    pub fn unnamed(output_kind: FeatureKind) -> Self {
        Self::new(output_kind, DEFAULT_FEATURE_NAME)
    }

    /// Resolve registry lookups against a custom registry instead of the
    /// process-wide default.
    pub fn with_registry(mut self, registry: Arc<FeatureTypeRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: FeatureCoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Bind the extraction function. The fallback defaults to the output
    /// kind's empty value.
    pub fn extract<F>(self, f: F) -> Self
    where
        F: Fn(&I) -> anyhow::Result<FeatureValue> + Send + Sync + 'static,
    {
        let default = FeatureValue::empty(self.output_kind);
        self.extract_with(f, default)
    }

    /// Bind the extraction function and an explicit fallback value.
    ///
    /// The fallback is substituted, never propagated as an error, whenever
    /// the extraction function fails for a record.
    pub fn extract_with<F>(mut self, f: F, default: FeatureValue) -> Self
    where
        F: Fn(&I) -> anyhow::Result<FeatureValue> + Send + Sync + 'static,
    {
        self.extract = Some(Arc::new(f));
        self.default_value = Some(default);
        self
    }

    /// Attach a human-readable rendition of the extraction logic, kept for
    /// audit and debugging display.
    pub fn extract_source(mut self, text: impl Into<String>) -> Self {
        self.extract_source_text = Some(text.into());
        self
    }

    /// Override the kind's default aggregator.
    pub fn aggregate(mut self, aggregator: Aggregator) -> Self {
        self.aggregator = Some(aggregator);
        self
    }

    /// Override the default aggregator with an ad hoc zero/combine pair.
    pub fn aggregate_with<F>(self, zero: FeatureValue, combine: F) -> Self
    where
        F: Fn(FeatureValue, FeatureValue) -> FeatureValue + Send + Sync + 'static,
    {
        let name = format!("Combine{}", self.output_kind.short_name());
        self.aggregate(Aggregator::custom(name, zero, combine))
    }

    /// Bound the aggregation to a trailing time window.
    pub fn window(mut self, window: Duration) -> Self {
        self.aggregate_window = Some(window);
        self
    }

    /// Finalize as a model input.
    pub fn as_predictor(self) -> Result<Feature<I>> {
        self.finalize(false)
    }

    /// Finalize as the model target.
    pub fn as_response(self) -> Result<Feature<I>> {
        self.finalize(true)
    }

    fn finalize(self, is_response: bool) -> Result<Feature<I>> {
        let extract = self.extract.ok_or_else(|| {
            FeatureError::invalid_feature(format!(
                "feature '{}' has no extraction function",
                self.name
            ))
        })?;
        let default_value = match self.default_value {
            Some(v) => {
                if v.kind() != self.output_kind {
                    return Err(FeatureError::invalid_feature(format!(
                        "feature '{}' declares kind {} but its default value is {}",
                        self.name,
                        self.output_kind,
                        v.kind()
                    )));
                }
                v
            }
            None => self.registry.empty_value_of(self.output_kind)?,
        };
        // Default aggregator resolution happens here, eagerly: an
        // unsupported kind fails the build, not a later evaluation.
        let aggregator = match self.aggregator {
            Some(a) => a,
            None => self.registry.default_aggregator_for(self.output_kind)?,
        };
        // Source text must be non-empty; a blank override falls back to the
        // placeholder.
        let extract_source_text = self
            .extract_source_text
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| "<closure>".to_string());

        let generator = FeatureGenerator::new(
            self.name.clone(),
            self.output_kind,
            extract,
            default_value,
            extract_source_text,
            aggregator,
            self.aggregate_window,
            self.config.log_masked_extractions,
            self.config.max_aggregate_events,
        );
        let descriptor = FeatureDescriptor::new(
            self.name,
            self.input_type,
            self.output_kind,
            is_response,
            Vec::new(),
            mint_uid(self.output_kind.short_name()),
        );
        Ok(Feature::raw(descriptor, generator))
    }
}
