//! Error types for the featuremill crate.

use thiserror::Error;

/// Convenience result type used throughout the crate.
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Top-level error type for feature construction and schema derivation.
///
/// All variants are build-time or derivation-time failures. Per-record
/// extraction failures are never surfaced through this type; they are masked
/// by the generator's default value (see `FeatureGenerator::evaluate`).
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Feature type {0} is not supported by the type registry")]
    TypeNotSupported(String),

    #[error("Response feature '{0}' was not found in dataframe schema")]
    ResponseNotFound(String),

    #[error("Response feature '{name}' is of type {actual}, but expected {expected}")]
    ResponseTypeMismatch {
        name: String,
        actual: String,
        expected: String,
    },

    #[error("Invalid feature definition: {0}")]
    InvalidFeature(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl FeatureError {
    pub fn type_not_supported(type_name: impl Into<String>) -> Self {
        Self::TypeNotSupported(type_name.into())
    }

    pub fn response_not_found(name: impl Into<String>) -> Self {
        Self::ResponseNotFound(name.into())
    }

    pub fn response_type_mismatch(
        name: impl Into<String>,
        actual: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::ResponseTypeMismatch {
            name: name.into(),
            actual: actual.into(),
            expected: expected.into(),
        }
    }

    pub fn invalid_feature(msg: impl Into<String>) -> Self {
        Self::InvalidFeature(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_not_found_message() {
        let err = FeatureError::response_not_found("label");
        assert_eq!(
            err.to_string(),
            "Response feature 'label' was not found in dataframe schema"
        );
    }

    #[test]
    fn test_response_type_mismatch_message() {
        let err = FeatureError::response_type_mismatch(
            "label",
            "featuremill::types::Text",
            "featuremill::types::Real",
        );
        assert_eq!(
            err.to_string(),
            "Response feature 'label' is of type featuremill::types::Text, \
             but expected featuremill::types::Real"
        );
    }
}
