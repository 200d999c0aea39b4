//! The finished feature: descriptor plus origin.

use crate::descriptor::{FeatureDescriptor, StageRef, mint_uid};
use crate::error::{FeatureError, Result};
use crate::generator::FeatureGenerator;
use crate::types::FeatureKind;
use std::fmt;

/// Where a feature's values come from.
///
/// Raw features are backed by a generator over the input record; derived
/// features are backed by a transformation stage of the downstream pipeline
/// framework and carry their parent descriptors instead.
pub enum FeatureOrigin<I> {
    Generator(FeatureGenerator<I>),
    Stage(StageRef),
}

impl<I> Clone for FeatureOrigin<I> {
    fn clone(&self) -> Self {
        match self {
            FeatureOrigin::Generator(g) => FeatureOrigin::Generator(g.clone()),
            FeatureOrigin::Stage(s) => FeatureOrigin::Stage(s.clone()),
        }
    }
}

impl<I> fmt::Debug for FeatureOrigin<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureOrigin::Generator(g) => f.debug_tuple("Generator").field(g).finish(),
            FeatureOrigin::Stage(s) => f.debug_tuple("Stage").field(s).finish(),
        }
    }
}

/// A finished, immutable feature.
pub struct Feature<I> {
    descriptor: FeatureDescriptor,
    origin: FeatureOrigin<I>,
}

impl<I> Clone for Feature<I> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            origin: self.origin.clone(),
        }
    }
}

impl<I> Feature<I> {
    pub(crate) fn raw(descriptor: FeatureDescriptor, generator: FeatureGenerator<I>) -> Self {
        Self {
            descriptor,
            origin: FeatureOrigin::Generator(generator),
        }
    }

    /// Mint a derived feature backed by a transformation stage.
    ///
    /// `parents` must be non-empty: a feature is raw iff it has no parents,
    /// and raw features are generator-backed by construction.
    pub fn from_stage(
        name: impl Into<String>,
        output_kind: FeatureKind,
        is_response: bool,
        parents: Vec<FeatureDescriptor>,
        stage: StageRef,
    ) -> Result<Self> {
        if parents.is_empty() {
            return Err(FeatureError::invalid_feature(
                "a stage-derived feature requires at least one parent",
            ));
        }
        let input_type = parents[0].input_type().to_string();
        let uid = mint_uid(stage.name());
        let descriptor = FeatureDescriptor::new(
            name.into(),
            input_type,
            output_kind,
            is_response,
            parents,
            uid,
        );
        Ok(Self {
            descriptor,
            origin: FeatureOrigin::Stage(stage),
        })
    }

    pub fn descriptor(&self) -> &FeatureDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn uid(&self) -> &str {
        self.descriptor.uid()
    }

    pub fn is_response(&self) -> bool {
        self.descriptor.is_response()
    }

    pub fn is_raw(&self) -> bool {
        self.descriptor.is_raw()
    }

    pub fn parents(&self) -> &[FeatureDescriptor] {
        self.descriptor.parents()
    }

    pub fn output_kind(&self) -> FeatureKind {
        self.descriptor.output_kind()
    }

    /// Fully-qualified name of the output type.
    pub fn type_name(&self) -> &'static str {
        self.descriptor.type_name()
    }

    pub fn origin(&self) -> &FeatureOrigin<I> {
        &self.origin
    }

    /// The backing generator, for raw features.
    pub fn generator(&self) -> Option<&FeatureGenerator<I>> {
        match &self.origin {
            FeatureOrigin::Generator(g) => Some(g),
            FeatureOrigin::Stage(_) => None,
        }
    }
}

impl<I> fmt::Debug for Feature<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature")
            .field("descriptor", &self.descriptor)
            .field("origin", &self.origin)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FeatureBuilder;
    use crate::types::FeatureValue;

    #[test]
    fn test_from_stage_requires_parents() {
        let err = Feature::<()>::from_stage(
            "derived",
            FeatureKind::Real,
            false,
            vec![],
            StageRef::new("ScalerStage"),
        )
        .unwrap_err();
        assert!(matches!(err, FeatureError::InvalidFeature(_)));
    }

    #[test]
    fn test_from_stage_uid_and_parents() {
        let parent = FeatureBuilder::<i64>::new(FeatureKind::Real, "a")
            .extract(|v| Ok(FeatureValue::real(*v as f64)))
            .as_predictor()
            .unwrap();
        let derived = Feature::<i64>::from_stage(
            "a_scaled",
            FeatureKind::Real,
            false,
            vec![parent.descriptor().clone()],
            StageRef::new("ScalerStage"),
        )
        .unwrap();
        assert!(!derived.is_raw());
        assert!(derived.uid().starts_with("ScalerStage_"));
        assert!(derived.generator().is_none());
        assert_eq!(derived.parents().len(), 1);
    }
}
