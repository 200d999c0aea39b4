//! The feature type registry.
//!
//! For every supported `FeatureKind` the registry holds the default
//! aggregator, the row converter used by schema-derived features, and the
//! kind's empty value. Lookups are total over the closed kind set; asking
//! for an unregistered kind is a build-time error, never an evaluation-time
//! one.

use crate::aggregator::Aggregator;
use crate::error::{FeatureError, Result};
use crate::schema::ColumnType;
use crate::types::{FeatureKind, FeatureValue};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Converts feature values to and from the tabular engine's JSON cells.
#[derive(Clone, Copy)]
pub struct RowConverter {
    to_row: fn(&FeatureValue) -> serde_json::Value,
    from_row: fn(&serde_json::Value) -> FeatureValue,
}

impl RowConverter {
    pub fn new(
        to_row: fn(&FeatureValue) -> serde_json::Value,
        from_row: fn(&serde_json::Value) -> FeatureValue,
    ) -> Self {
        Self { to_row, from_row }
    }

    pub fn to_row(&self, value: &FeatureValue) -> serde_json::Value {
        (self.to_row)(value)
    }

    pub fn from_row(&self, cell: &serde_json::Value) -> FeatureValue {
        (self.from_row)(cell)
    }
}

/// Registry entry for one feature kind.
#[derive(Clone)]
pub struct TypeEntry {
    pub aggregator: Aggregator,
    pub converter: RowConverter,
}

/// Registry of supported feature kinds.
pub struct FeatureTypeRegistry {
    entries: HashMap<FeatureKind, TypeEntry>,
}

static GLOBAL: LazyLock<Arc<FeatureTypeRegistry>> =
    LazyLock::new(|| Arc::new(FeatureTypeRegistry::with_defaults()));

impl FeatureTypeRegistry {
    /// An empty registry; kinds must be registered before use.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// A registry covering the full closed kind set with default aggregators.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in FeatureKind::ALL {
            registry.register(kind, TypeEntry {
                aggregator: default_aggregator(kind),
                converter: converter(kind),
            });
        }
        registry
    }

    /// The process-wide default registry.
    pub fn global() -> Arc<FeatureTypeRegistry> {
        GLOBAL.clone()
    }

    /// Register or replace the entry for a kind.
    pub fn register(&mut self, kind: FeatureKind, entry: TypeEntry) {
        tracing::trace!(kind = %kind, aggregator = entry.aggregator.name(), "registering feature kind");
        self.entries.insert(kind, entry);
    }

    /// The default aggregator for a kind.
    pub fn default_aggregator_for(&self, kind: FeatureKind) -> Result<Aggregator> {
        self.entry(kind).map(|e| e.aggregator.clone())
    }

    /// The row converter for a kind.
    pub fn row_converter_for(&self, kind: FeatureKind) -> Result<RowConverter> {
        self.entry(kind).map(|e| e.converter)
    }

    /// The empty value of a kind.
    pub fn empty_value_of(&self, kind: FeatureKind) -> Result<FeatureValue> {
        self.entry(kind).map(|_| FeatureValue::empty(kind))
    }

    /// Map a tabular column type to the feature kind it derives to.
    pub fn kind_for_column(&self, dtype: &ColumnType) -> Result<FeatureKind> {
        let kind = match dtype {
            ColumnType::Float => FeatureKind::Real,
            ColumnType::Integer => FeatureKind::Integral,
            ColumnType::Boolean => FeatureKind::Binary,
            ColumnType::String => FeatureKind::Text,
            other => {
                return Err(FeatureError::type_not_supported(format!(
                    "column type {other:?}"
                )));
            }
        };
        // The mapped kind must itself be registered.
        self.entry(kind)?;
        Ok(kind)
    }

    fn entry(&self, kind: FeatureKind) -> Result<&TypeEntry> {
        self.entries
            .get(&kind)
            .ok_or_else(|| FeatureError::type_not_supported(kind.type_name()))
    }
}

impl Default for FeatureTypeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn default_aggregator(kind: FeatureKind) -> Aggregator {
    match kind {
        FeatureKind::Real => Aggregator::max_real(),
        FeatureKind::RealNN => Aggregator::max_real_nn(),
        FeatureKind::Integral => Aggregator::max_integral(),
        FeatureKind::Binary | FeatureKind::Text => Aggregator::most_recent(kind),
        FeatureKind::RealMap => Aggregator::merge_real_map(),
        FeatureKind::TextMap => Aggregator::merge_text_map(),
    }
}

fn converter(kind: FeatureKind) -> RowConverter {
    match kind {
        FeatureKind::Real => RowConverter {
            to_row: |v| match v {
                FeatureValue::Real(Some(x)) => serde_json::json!(x),
                _ => serde_json::Value::Null,
            },
            from_row: |cell| FeatureValue::Real(cell.as_f64()),
        },
        FeatureKind::RealNN => RowConverter {
            to_row: |v| match v {
                FeatureValue::RealNN(x) => serde_json::json!(x),
                _ => serde_json::Value::Null,
            },
            from_row: |cell| FeatureValue::RealNN(cell.as_f64().unwrap_or(0.0)),
        },
        FeatureKind::Integral => RowConverter {
            to_row: |v| match v {
                FeatureValue::Integral(Some(x)) => serde_json::json!(x),
                _ => serde_json::Value::Null,
            },
            from_row: |cell| FeatureValue::Integral(cell.as_i64()),
        },
        FeatureKind::Binary => RowConverter {
            to_row: |v| match v {
                FeatureValue::Binary(Some(x)) => serde_json::json!(x),
                _ => serde_json::Value::Null,
            },
            from_row: |cell| FeatureValue::Binary(cell.as_bool()),
        },
        FeatureKind::Text => RowConverter {
            to_row: |v| match v {
                FeatureValue::Text(Some(x)) => serde_json::json!(x),
                _ => serde_json::Value::Null,
            },
            from_row: |cell| FeatureValue::Text(cell.as_str().map(str::to_string)),
        },
        FeatureKind::RealMap => RowConverter {
            to_row: |v| match v {
                FeatureValue::RealMap(m) => serde_json::json!(m),
                _ => serde_json::Value::Null,
            },
            from_row: |cell| {
                let map = cell
                    .as_object()
                    .map(|obj| {
                        obj.iter()
                            .filter_map(|(k, v)| v.as_f64().map(|x| (k.clone(), x)))
                            .collect()
                    })
                    .unwrap_or_default();
                FeatureValue::RealMap(map)
            },
        },
        FeatureKind::TextMap => RowConverter {
            to_row: |v| match v {
                FeatureValue::TextMap(m) => serde_json::json!(m),
                _ => serde_json::Value::Null,
            },
            from_row: |cell| {
                let map = cell
                    .as_object()
                    .map(|obj| {
                        obj.iter()
                            .filter_map(|(k, v)| {
                                v.as_str().map(|x| (k.clone(), x.to_string()))
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                FeatureValue::TextMap(map)
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_total_over_kinds() {
        let registry = FeatureTypeRegistry::with_defaults();
        for kind in FeatureKind::ALL {
            assert!(registry.default_aggregator_for(kind).is_ok());
            assert!(registry.row_converter_for(kind).is_ok());
            assert_eq!(
                registry.empty_value_of(kind).unwrap(),
                FeatureValue::empty(kind)
            );
        }
    }

    #[test]
    fn test_unregistered_kind_is_build_time_error() {
        let registry = FeatureTypeRegistry::new();
        let err = registry.default_aggregator_for(FeatureKind::Real).unwrap_err();
        assert!(matches!(err, FeatureError::TypeNotSupported(_)));
        assert!(err.to_string().contains("featuremill::types::Real"));
    }

    #[test]
    fn test_column_type_mapping() {
        let registry = FeatureTypeRegistry::with_defaults();
        assert_eq!(
            registry.kind_for_column(&ColumnType::Float).unwrap(),
            FeatureKind::Real
        );
        assert_eq!(
            registry.kind_for_column(&ColumnType::Integer).unwrap(),
            FeatureKind::Integral
        );
        assert_eq!(
            registry.kind_for_column(&ColumnType::String).unwrap(),
            FeatureKind::Text
        );
        assert!(registry.kind_for_column(&ColumnType::Json).is_err());
    }

    #[test]
    fn test_real_converter_roundtrip() {
        let registry = FeatureTypeRegistry::with_defaults();
        let conv = registry.row_converter_for(FeatureKind::Real).unwrap();
        let cell = conv.to_row(&FeatureValue::real(1.5));
        assert_eq!(conv.from_row(&cell), FeatureValue::real(1.5));
        assert_eq!(conv.from_row(&serde_json::Value::Null), FeatureValue::Real(None));
    }

    #[test]
    fn test_register_overrides_default_aggregator() {
        let mut registry = FeatureTypeRegistry::with_defaults();
        let converter = registry.row_converter_for(FeatureKind::Real).unwrap();
        registry.register(FeatureKind::Real, TypeEntry {
            aggregator: Aggregator::most_recent(FeatureKind::Real),
            converter,
        });
        let agg = registry.default_aggregator_for(FeatureKind::Real).unwrap();
        assert_eq!(agg.name(), "MostRecentReal");
    }
}
