//! Immutable feature descriptors and origin references.

use crate::types::FeatureKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mint a fresh uid with the given prefix.
///
/// Raw features use the output kind's short name as prefix; stage-derived
/// features use the stage name. The suffix is 12 hex chars of a v4 uuid.
pub(crate) fn mint_uid(prefix: &str) -> String {
    let fresh = Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &fresh[..12])
}

/// Immutable description of one feature.
///
/// Created once at build time; evaluation only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    name: String,
    input_type: String,
    output_kind: FeatureKind,
    is_response: bool,
    parents: Vec<FeatureDescriptor>,
    uid: String,
}

impl FeatureDescriptor {
    pub(crate) fn new(
        name: String,
        input_type: String,
        output_kind: FeatureKind,
        is_response: bool,
        parents: Vec<FeatureDescriptor>,
        uid: String,
    ) -> Self {
        Self {
            name,
            input_type,
            output_kind,
            is_response,
            parents,
            uid,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared input record type, as bound at builder-start time.
    pub fn input_type(&self) -> &str {
        &self.input_type
    }

    pub fn output_kind(&self) -> FeatureKind {
        self.output_kind
    }

    /// Fully-qualified name of the output type.
    pub fn type_name(&self) -> &'static str {
        self.output_kind.type_name()
    }

    pub fn is_response(&self) -> bool {
        self.is_response
    }

    /// A feature is raw iff it has no parents.
    pub fn is_raw(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn parents(&self) -> &[FeatureDescriptor] {
        &self.parents
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }
}

/// Reference to the pipeline stage that produced a derived feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRef {
    name: String,
    uid: String,
}

impl StageRef {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let uid = mint_uid(&name);
        Self { name, uid }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }
}
