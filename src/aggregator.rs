//! Monoid-style aggregation over timestamped feature values.
//!
//! An aggregator is a named zero element plus an associative combine
//! operation. Aggregation folds a finite window of `(timestamp, value)`
//! events left-to-right starting from the zero element; events outside the
//! window are dropped before folding.

use crate::types::{FeatureKind, FeatureValue};
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;

/// One timestamped feature value observed for an entity.
pub type Event = (DateTime<Utc>, FeatureValue);

type CombineFn = Arc<dyn Fn(FeatureValue, FeatureValue) -> FeatureValue + Send + Sync>;

/// A monoid reduction over feature values.
#[derive(Clone)]
pub struct Aggregator {
    name: String,
    zero: FeatureValue,
    combine: CombineFn,
}

impl Aggregator {
    /// Build an ad hoc aggregator from a zero element and a combine function.
    pub fn custom<F>(name: impl Into<String>, zero: FeatureValue, combine: F) -> Self
    where
        F: Fn(FeatureValue, FeatureValue) -> FeatureValue + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            zero,
            combine: Arc::new(combine),
        }
    }

    /// Name of the aggregation, used in a generator's operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity element of the reduction.
    pub fn zero(&self) -> &FeatureValue {
        &self.zero
    }

    /// Apply the combine operation once.
    pub fn combine(&self, acc: FeatureValue, next: FeatureValue) -> FeatureValue {
        (self.combine)(acc, next)
    }

    /// Fold events into a single value.
    ///
    /// When `window` is set, only events with a timestamp in
    /// `[now - window, now]` participate (both bounds inclusive). When
    /// `max_events` is non-zero, only the last `max_events` surviving events
    /// are folded. Events are folded in the order given.
    pub fn fold(
        &self,
        events: &[Event],
        now: DateTime<Utc>,
        window: Option<Duration>,
        max_events: usize,
    ) -> FeatureValue {
        let in_window: Vec<&Event> = match window {
            Some(w) => {
                let floor = now - w;
                events
                    .iter()
                    .filter(|(ts, _)| *ts >= floor && *ts <= now)
                    .collect()
            }
            None => events.iter().collect(),
        };
        let start = if max_events > 0 && in_window.len() > max_events {
            in_window.len() - max_events
        } else {
            0
        };
        in_window[start..]
            .iter()
            .fold(self.zero.clone(), |acc, (_, v)| self.combine(acc, v.clone()))
    }

    /// Take-maximum over nullable reals; null is the identity.
    pub fn max_real() -> Self {
        Self::custom("MaxReal", FeatureValue::Real(None), |acc, next| {
            match (acc, next) {
                (FeatureValue::Real(Some(a)), FeatureValue::Real(Some(b))) => {
                    FeatureValue::Real(Some(a.max(b)))
                }
                (FeatureValue::Real(None), b) => b,
                (a, _) => a,
            }
        })
    }

    /// Take-maximum over non-nullable reals.
    pub fn max_real_nn() -> Self {
        Self::custom("MaxRealNN", FeatureValue::RealNN(f64::MIN), |acc, next| {
            match (acc, next) {
                (FeatureValue::RealNN(a), FeatureValue::RealNN(b)) => {
                    FeatureValue::RealNN(a.max(b))
                }
                (a, _) => a,
            }
        })
    }

    /// Take-maximum over nullable integers; null is the identity.
    pub fn max_integral() -> Self {
        Self::custom("MaxIntegral", FeatureValue::Integral(None), |acc, next| {
            match (acc, next) {
                (FeatureValue::Integral(Some(a)), FeatureValue::Integral(Some(b))) => {
                    FeatureValue::Integral(Some(a.max(b)))
                }
                (FeatureValue::Integral(None), b) => b,
                (a, _) => a,
            }
        })
    }

    /// Keep the most recent non-empty value of the given kind.
    pub fn most_recent(kind: FeatureKind) -> Self {
        Self::custom(
            format!("MostRecent{}", kind.short_name()),
            FeatureValue::empty(kind),
            |acc, next| if next.is_empty() { acc } else { next },
        )
    }

    /// Merge real maps; on key collision the later value wins.
    pub fn merge_real_map() -> Self {
        Self::custom(
            "MergeRealMap",
            FeatureValue::empty(FeatureKind::RealMap),
            |acc, next| match (acc, next) {
                (FeatureValue::RealMap(mut a), FeatureValue::RealMap(b)) => {
                    a.extend(b);
                    FeatureValue::RealMap(a)
                }
                (a, _) => a,
            },
        )
    }

    /// Merge text maps; on key collision the later value wins.
    pub fn merge_text_map() -> Self {
        Self::custom(
            "MergeTextMap",
            FeatureValue::empty(FeatureKind::TextMap),
            |acc, next| match (acc, next) {
                (FeatureValue::TextMap(mut a), FeatureValue::TextMap(b)) => {
                    a.extend(b);
                    FeatureValue::TextMap(a)
                }
                (a, _) => a,
            },
        )
    }
}

// Aggregators are compared by identity (name + zero), not by closure.
impl PartialEq for Aggregator {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.zero == other.zero
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("name", &self.name)
            .field("zero", &self.zero)
            .finish_non_exhaustive()
    }
}
