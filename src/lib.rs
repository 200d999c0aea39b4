//! # featuremill — typed feature construction and aggregation
//!
//! Core building blocks for declaring strongly-typed features over raw
//! input records in an ML pipeline: a closed registry of feature value
//! kinds with default aggregators and row converters, an immutable
//! descriptor/generator pair per feature, a fluent single-use builder, and
//! schema-driven derivation of one feature per dataframe column.
//!
//! Everything built here is immutable after construction and safe to
//! evaluate concurrently; the distributed execution engine that feeds
//! records in lives outside this crate.

pub mod aggregator;
pub mod builder;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod feature;
pub mod generator;
pub mod registry;
pub mod schema;
pub mod types;

// Re-export commonly used types at the crate root.
pub use aggregator::{Aggregator, Event};
pub use builder::{DEFAULT_FEATURE_NAME, FeatureBuilder};
pub use config::FeatureCoreConfig;
pub use descriptor::{FeatureDescriptor, StageRef};
pub use error::{FeatureError, Result};
pub use feature::{Feature, FeatureOrigin};
pub use generator::FeatureGenerator;
pub use registry::{FeatureTypeRegistry, RowConverter, TypeEntry};
pub use schema::{ColumnSchema, ColumnType, Row, TableSchema, derive_features, derive_features_with};
pub use types::{FeatureKind, FeatureValue};
