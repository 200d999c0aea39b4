//! Feature value kinds and their runtime representation.
//!
//! The set of kinds is closed: every kind has exactly one default aggregator
//! and one row-conversion rule in the type registry. Values travel through
//! the pipeline as `FeatureValue`, tagged with the kind they were declared
//! with at build time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Semantic kind of a feature value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Nullable real number.
    Real,
    /// Non-nullable real number.
    RealNN,
    /// Nullable integer.
    Integral,
    /// Nullable boolean.
    Binary,
    /// Nullable text.
    Text,
    /// String-keyed map of reals.
    RealMap,
    /// String-keyed map of strings.
    TextMap,
}

impl FeatureKind {
    /// All supported kinds, in registry order.
    pub const ALL: [FeatureKind; 7] = [
        FeatureKind::Real,
        FeatureKind::RealNN,
        FeatureKind::Integral,
        FeatureKind::Binary,
        FeatureKind::Text,
        FeatureKind::RealMap,
        FeatureKind::TextMap,
    ];

    /// Short name, used as the uid prefix of raw features.
    pub fn short_name(&self) -> &'static str {
        match self {
            FeatureKind::Real => "Real",
            FeatureKind::RealNN => "RealNN",
            FeatureKind::Integral => "Integral",
            FeatureKind::Binary => "Binary",
            FeatureKind::Text => "Text",
            FeatureKind::RealMap => "RealMap",
            FeatureKind::TextMap => "TextMap",
        }
    }

    /// Fully-qualified type name, used in derivation error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FeatureKind::Real => "featuremill::types::Real",
            FeatureKind::RealNN => "featuremill::types::RealNN",
            FeatureKind::Integral => "featuremill::types::Integral",
            FeatureKind::Binary => "featuremill::types::Binary",
            FeatureKind::Text => "featuremill::types::Text",
            FeatureKind::RealMap => "featuremill::types::RealMap",
            FeatureKind::TextMap => "featuremill::types::TextMap",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A feature value at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FeatureValue {
    Real(Option<f64>),
    RealNN(f64),
    Integral(Option<i64>),
    Binary(Option<bool>),
    Text(Option<String>),
    RealMap(HashMap<String, f64>),
    TextMap(HashMap<String, String>),
}

impl FeatureValue {
    /// Non-null real.
    pub fn real(v: f64) -> Self {
        Self::Real(Some(v))
    }

    /// Non-null integer.
    pub fn integral(v: i64) -> Self {
        Self::Integral(Some(v))
    }

    /// Non-null boolean.
    pub fn binary(v: bool) -> Self {
        Self::Binary(Some(v))
    }

    /// Non-null text.
    pub fn text(v: impl Into<String>) -> Self {
        Self::Text(Some(v.into()))
    }

    /// The kind tag of this value.
    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureValue::Real(_) => FeatureKind::Real,
            FeatureValue::RealNN(_) => FeatureKind::RealNN,
            FeatureValue::Integral(_) => FeatureKind::Integral,
            FeatureValue::Binary(_) => FeatureKind::Binary,
            FeatureValue::Text(_) => FeatureKind::Text,
            FeatureValue::RealMap(_) => FeatureKind::RealMap,
            FeatureValue::TextMap(_) => FeatureKind::TextMap,
        }
    }

    /// The empty value of a kind: null for scalar kinds, zero for RealNN,
    /// the empty map for map kinds.
    pub fn empty(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Real => FeatureValue::Real(None),
            FeatureKind::RealNN => FeatureValue::RealNN(0.0),
            FeatureKind::Integral => FeatureValue::Integral(None),
            FeatureKind::Binary => FeatureValue::Binary(None),
            FeatureKind::Text => FeatureValue::Text(None),
            FeatureKind::RealMap => FeatureValue::RealMap(HashMap::new()),
            FeatureKind::TextMap => FeatureValue::TextMap(HashMap::new()),
        }
    }

    /// Whether this value carries no information (null or empty map).
    pub fn is_empty(&self) -> bool {
        match self {
            FeatureValue::Real(v) => v.is_none(),
            FeatureValue::RealNN(_) => false,
            FeatureValue::Integral(v) => v.is_none(),
            FeatureValue::Binary(v) => v.is_none(),
            FeatureValue::Text(v) => v.is_none(),
            FeatureValue::RealMap(m) => m.is_empty(),
            FeatureValue::TextMap(m) => m.is_empty(),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::real(v)
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::integral(v)
    }
}

impl From<bool> for FeatureValue {
    fn from(v: bool) -> Self {
        FeatureValue::binary(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::text(v)
    }
}
