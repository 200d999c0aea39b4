//! Tabular schema types and schema-driven feature derivation.
//!
//! Given a dataframe schema and a nominated response column, derivation
//! builds one raw feature per column: the response column becomes the
//! response feature, every other column becomes a predictor, in schema
//! order. Each derived feature reads its cell positionally through the
//! registry's row converter.

use crate::builder::FeatureBuilder;
use crate::config::FeatureCoreConfig;
use crate::error::{FeatureError, Result};
use crate::feature::Feature;
use crate::registry::FeatureTypeRegistry;
use crate::types::FeatureKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Storage type of a dataframe column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Boolean,
    Json,
    Null,
}

/// Schema for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub dtype: ColumnType,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, dtype: ColumnType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

/// Ordered schema of a dataframe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(columns: Vec<ColumnSchema>) -> Self {
        Self { columns }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// One positionally-addressable dataframe row.
pub type Row = Vec<serde_json::Value>;

/// Derive one raw feature per schema column against the default registry.
///
/// Returns the response feature and the remaining predictor features in
/// schema-declaration order. See [`derive_features_with`].
pub fn derive_features(
    schema: &TableSchema,
    response_name: &str,
    expected_response_kind: FeatureKind,
) -> Result<(Feature<Row>, Vec<Feature<Row>>)> {
    derive_features_with(
        schema,
        response_name,
        expected_response_kind,
        FeatureTypeRegistry::global(),
        FeatureCoreConfig::default(),
    )
}

/// Derive features against a specific registry and config.
///
/// Fails fast, before any feature is built, when the response column is
/// missing or carries an unexpected type.
pub fn derive_features_with(
    schema: &TableSchema,
    response_name: &str,
    expected_response_kind: FeatureKind,
    registry: Arc<FeatureTypeRegistry>,
    config: FeatureCoreConfig,
) -> Result<(Feature<Row>, Vec<Feature<Row>>)> {
    let response_column = schema
        .column(response_name)
        .ok_or_else(|| FeatureError::response_not_found(response_name))?;
    let response_kind = registry.kind_for_column(&response_column.dtype)?;
    if response_kind != expected_response_kind {
        return Err(FeatureError::response_type_mismatch(
            response_name,
            response_kind.type_name(),
            expected_response_kind.type_name(),
        ));
    }

    let mut response = None;
    let mut predictors = Vec::with_capacity(schema.columns.len().saturating_sub(1));
    for (index, column) in schema.columns.iter().enumerate() {
        let kind = registry.kind_for_column(&column.dtype)?;
        let converter = registry.row_converter_for(kind)?;
        let is_response = column.name == response_name;
        let builder = FeatureBuilder::<Row>::new(kind, &column.name)
            .with_registry(registry.clone())
            .with_config(config.clone())
            .extract(move |row: &Row| {
                let value = match row.get(index) {
                    Some(cell) => converter.from_row(cell),
                    None => converter.from_row(&serde_json::Value::Null),
                };
                Ok(value)
            })
            .extract_source(format!("row[{index}] as {}", kind.short_name()));
        if is_response {
            response = Some(builder.as_response()?);
        } else {
            predictors.push(builder.as_predictor()?);
        }
    }

    // Presence was validated up front; the loop always fills this in.
    let response = response
        .ok_or_else(|| FeatureError::response_not_found(response_name))?;
    tracing::debug!(
        response = response_name,
        predictors = predictors.len(),
        "derived features from schema"
    );
    Ok((response, predictors))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passenger_schema() -> TableSchema {
        TableSchema::new(vec![
            ColumnSchema::new("survived", ColumnType::Integer),
            ColumnSchema::new("age", ColumnType::Float),
            ColumnSchema::new("name", ColumnType::String),
            ColumnSchema::new("is_adult", ColumnType::Boolean),
        ])
    }

    #[test]
    fn test_derivation_splits_response_and_predictors() {
        let (response, predictors) =
            derive_features(&passenger_schema(), "survived", FeatureKind::Integral).unwrap();
        assert_eq!(response.name(), "survived");
        assert!(response.is_response());
        assert!(response.is_raw());

        let names: Vec<_> = predictors.iter().map(|f| f.name().to_string()).collect();
        assert_eq!(names, vec!["age", "name", "is_adult"]);
        assert!(predictors.iter().all(|f| !f.is_response()));
    }

    #[test]
    fn test_derived_kinds_follow_column_types() {
        let (response, predictors) =
            derive_features(&passenger_schema(), "survived", FeatureKind::Integral).unwrap();
        assert_eq!(response.output_kind(), FeatureKind::Integral);
        assert_eq!(predictors[0].output_kind(), FeatureKind::Real);
        assert_eq!(predictors[1].output_kind(), FeatureKind::Text);
        assert_eq!(predictors[2].output_kind(), FeatureKind::Binary);
    }

    #[test]
    fn test_derived_features_read_cells_positionally() {
        let (response, predictors) =
            derive_features(&passenger_schema(), "survived", FeatureKind::Integral).unwrap();
        let row: Row = vec![
            serde_json::json!(1),
            serde_json::json!(38.0),
            serde_json::json!("Cumings"),
            serde_json::json!(true),
        ];
        assert_eq!(
            response.generator().unwrap().evaluate(&row),
            crate::types::FeatureValue::integral(1)
        );
        assert_eq!(
            predictors[0].generator().unwrap().evaluate(&row),
            crate::types::FeatureValue::real(38.0)
        );
        assert_eq!(
            predictors[1].generator().unwrap().evaluate(&row),
            crate::types::FeatureValue::text("Cumings")
        );
    }

    #[test]
    fn test_missing_cell_yields_empty_value() {
        let (_, predictors) =
            derive_features(&passenger_schema(), "survived", FeatureKind::Integral).unwrap();
        let short_row: Row = vec![serde_json::json!(0)];
        assert_eq!(
            predictors[0].generator().unwrap().evaluate(&short_row),
            crate::types::FeatureValue::Real(None)
        );
    }

    #[test]
    fn test_unknown_response_column() {
        let err =
            derive_features(&passenger_schema(), "not_a_column", FeatureKind::Real).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Response feature 'not_a_column' was not found in dataframe schema"
        );
    }

    #[test]
    fn test_wrongly_typed_response_column() {
        let err = derive_features(&passenger_schema(), "name", FeatureKind::Real).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Response feature 'name' is of type featuremill::types::Text, \
             but expected featuremill::types::Real"
        );
    }

    #[test]
    fn test_unsupported_column_type_fails_derivation() {
        let schema = TableSchema::new(vec![
            ColumnSchema::new("label", ColumnType::Integer),
            ColumnSchema::new("payload", ColumnType::Json),
        ]);
        let err = derive_features(&schema, "label", FeatureKind::Integral).unwrap_err();
        assert!(matches!(err, FeatureError::TypeNotSupported(_)));
    }
}
