//! Property-based tests for the feature construction core using proptest.

use chrono::{Duration, TimeZone, Utc};
use featuremill::{Aggregator, FeatureBuilder, FeatureKind, FeatureValue};
use proptest::prelude::*;

// --- Builder identity properties ---

proptest! {
    #[test]
    fn built_feature_keeps_its_name(name in "[a-zA-Z][a-zA-Z0-9_]{0,30}") {
        let feature = FeatureBuilder::<i64>::new(FeatureKind::Real, name.clone())
            .extract(|v| Ok(FeatureValue::real(*v as f64)))
            .as_predictor()
            .unwrap();
        prop_assert_eq!(feature.name(), name.as_str());
        prop_assert!(feature.is_raw());
        prop_assert!(feature.uid().starts_with("Real_"));
    }

    #[test]
    fn operation_name_is_aggregator_of_name(name in "[a-z]{1,12}") {
        let feature = FeatureBuilder::<i64>::new(FeatureKind::Text, name.clone())
            .extract(|v| Ok(FeatureValue::text(v.to_string())))
            .as_predictor()
            .unwrap();
        let generator = feature.generator().unwrap();
        let expected = format!("MostRecentText({name})");
        prop_assert_eq!(generator.operation_name(), expected.as_str());
    }

    #[test]
    fn extraction_errors_always_mask_to_default(default in any::<f64>(), age in any::<i64>()) {
        let feature = FeatureBuilder::<i64>::new(FeatureKind::Real, "a")
            .extract_with(
                |_| anyhow::bail!("bad record"),
                FeatureValue::real(default),
            )
            .as_predictor()
            .unwrap();
        prop_assert_eq!(
            feature.generator().unwrap().evaluate(&age),
            FeatureValue::real(default)
        );
    }
}

// --- Aggregation properties ---

proptest! {
    #[test]
    fn max_real_fold_equals_slice_max(values in prop::collection::vec(-1e9f64..1e9, 1..50)) {
        let agg = Aggregator::max_real();
        let base = Utc.timestamp_opt(0, 0).unwrap();
        let events: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (base + Duration::seconds(i as i64), FeatureValue::real(*v)))
            .collect();
        let now = base + Duration::seconds(values.len() as i64);
        let expected = values.iter().cloned().fold(f64::MIN, f64::max);
        prop_assert_eq!(agg.fold(&events, now, None, 0), FeatureValue::real(expected));
    }

    #[test]
    fn window_never_admits_events_older_than_window(
        offsets in prop::collection::vec(0i64..10_000, 1..50),
        window_secs in 1i64..5_000,
    ) {
        let agg = Aggregator::max_integral();
        let now = Utc.timestamp_opt(100_000, 0).unwrap();
        // Event value encodes its own age so the fold result exposes which
        // events were admitted.
        let events: Vec<_> = offsets
            .iter()
            .map(|age| (now - Duration::seconds(*age), FeatureValue::integral(*age)))
            .collect();
        let out = agg.fold(&events, now, Some(Duration::seconds(window_secs)), 0);
        match out {
            FeatureValue::Integral(Some(max_age)) => prop_assert!(max_age <= window_secs),
            FeatureValue::Integral(None) => {
                prop_assert!(offsets.iter().all(|age| *age > window_secs));
            }
            other => prop_assert!(false, "unexpected value {other:?}"),
        }
    }

    #[test]
    fn fold_of_no_events_is_zero(window_secs in 1i64..1_000) {
        let agg = Aggregator::max_real();
        let now = Utc.timestamp_opt(0, 0).unwrap();
        let out = agg.fold(&[], now, Some(Duration::seconds(window_secs)), 0);
        prop_assert_eq!(out, agg.zero().clone());
    }
}

// --- Window metadata properties ---

proptest! {
    #[test]
    fn window_is_stored_exactly(secs in 1i64..1_000_000) {
        let feature = FeatureBuilder::<i64>::new(FeatureKind::Real, "a")
            .extract(|v| Ok(FeatureValue::real(*v as f64)))
            .window(Duration::seconds(secs))
            .as_predictor()
            .unwrap();
        prop_assert_eq!(
            feature.generator().unwrap().aggregate_window(),
            Some(Duration::seconds(secs))
        );
    }
}
