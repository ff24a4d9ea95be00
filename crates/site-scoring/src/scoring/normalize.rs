//! Maps raw factor values onto a `[0, 1]` desirability scale.
//!
//! Numeric values are clamped into the factor bounds before a policy curve is
//! applied, so out-of-range inputs never extrapolate. Every ramp whose
//! denominator collapses to zero yields `0.0`.

use super::schema::{FactorDefinition, FactorKind, NumericBounds, OptimalPolicy};
use super::value::{is_truthy_token, FactorValue};

/// Flat score for any valid category until per-category weights exist.
pub const CATEGORICAL_NEUTRAL_SCORE: f64 = 0.7;

pub fn normalize(value: &FactorValue, definition: &FactorDefinition) -> f64 {
    let normalized = match definition.kind {
        FactorKind::Numeric(bounds) => match value {
            FactorValue::Number(number) => normalize_numeric(*number, &bounds),
            FactorValue::Flag(_) | FactorValue::Category(_) => 0.0,
        },
        FactorKind::Boolean => {
            if is_truthy(value) {
                1.0
            } else {
                0.0
            }
        }
        FactorKind::Categorical { .. } => match value {
            FactorValue::Category(category) if !category.trim().is_empty() => {
                CATEGORICAL_NEUTRAL_SCORE
            }
            _ => 0.0,
        },
    };

    normalized.clamp(0.0, 1.0)
}

fn is_truthy(value: &FactorValue) -> bool {
    match value {
        FactorValue::Flag(flag) => *flag,
        FactorValue::Number(number) => number.is_finite() && *number > 0.0,
        FactorValue::Category(text) => is_truthy_token(text),
    }
}

pub fn normalize_numeric(value: f64, bounds: &NumericBounds) -> f64 {
    let NumericBounds { min, max, .. } = *bounds;
    if !value.is_finite() || !(min <= max) {
        return 0.0;
    }

    let value = value.clamp(min, max);

    let normalized = match bounds.policy {
        OptimalPolicy::Higher => ramp(value - min, max - min),
        OptimalPolicy::Lower {
            acceptable_max: Some(limit),
        } => {
            if value <= limit {
                1.0
            } else {
                1.0 - ramp(value - limit, max - limit)
            }
        }
        OptimalPolicy::Lower {
            acceptable_max: None,
        } => 1.0 - ramp(value - min, max - min),
        OptimalPolicy::Target { value: target } => {
            let max_deviation = (target - min).abs().max((max - target).abs());
            if max_deviation <= 0.0 {
                0.0
            } else {
                (1.0 - (value - target).abs() / max_deviation).max(0.0)
            }
        }
        OptimalPolicy::Range {
            min: range_min,
            max: range_max,
        } => {
            if (range_min..=range_max).contains(&value) {
                1.0
            } else if value < range_min {
                ramp(value - min, range_min - min)
            } else if max > range_max {
                1.0 - ramp(value - range_max, max - range_max)
            } else {
                0.0
            }
        }
    };

    normalized.clamp(0.0, 1.0)
}

fn ramp(offset: f64, span: f64) -> f64 {
    if span <= 0.0 {
        0.0
    } else {
        offset / span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::schema::{Product, SchemaRegistry};

    fn bounds(min: f64, max: f64, policy: OptimalPolicy) -> NumericBounds {
        NumericBounds {
            min,
            max,
            policy,
            step: None,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn higher_policy_is_linear_and_clamped() {
        let curve = bounds(800.0, 1300.0, OptimalPolicy::Higher);
        assert_close(normalize_numeric(1100.0, &curve), 0.6);
        assert_close(normalize_numeric(200.0, &curve), 0.0);
        assert_close(normalize_numeric(9000.0, &curve), 1.0);
    }

    #[test]
    fn lower_policy_without_bound_inverts() {
        let curve = bounds(
            0.0,
            10.0,
            OptimalPolicy::Lower {
                acceptable_max: None,
            },
        );
        assert_close(normalize_numeric(2.5, &curve), 0.75);
        assert_close(normalize_numeric(-4.0, &curve), 1.0);
    }

    #[test]
    fn lower_policy_with_bound_is_flat_until_bound() {
        let curve = bounds(
            0.0,
            20.0,
            OptimalPolicy::Lower {
                acceptable_max: Some(10.0),
            },
        );
        assert_close(normalize_numeric(4.0, &curve), 1.0);
        assert_close(normalize_numeric(10.0, &curve), 1.0);
        assert_close(normalize_numeric(15.0, &curve), 0.5);
        assert_close(normalize_numeric(20.0, &curve), 0.0);
    }

    #[test]
    fn lower_policy_bound_at_max_never_divides_by_zero() {
        let curve = bounds(
            0.0,
            20.0,
            OptimalPolicy::Lower {
                acceptable_max: Some(20.0),
            },
        );
        assert_close(normalize_numeric(25.0, &curve), 1.0);
    }

    #[test]
    fn target_policy_peaks_at_target() {
        let curve = bounds(0.0, 360.0, OptimalPolicy::Target { value: 180.0 });
        assert_close(normalize_numeric(180.0, &curve), 1.0);
        assert_close(normalize_numeric(90.0, &curve), 0.5);
        assert_close(normalize_numeric(0.0, &curve), 0.0);
        assert_close(normalize_numeric(360.0, &curve), 0.0);
    }

    #[test]
    fn target_policy_keeps_residual_at_nearer_bound() {
        let curve = bounds(0.0, 100.0, OptimalPolicy::Target { value: 75.0 });
        assert_close(normalize_numeric(0.0, &curve), 0.0);
        assert_close(normalize_numeric(100.0, &curve), 1.0 - 25.0 / 75.0);
    }

    #[test]
    fn range_policy_edges() {
        let curve = bounds(
            0.0,
            90.0,
            OptimalPolicy::Range {
                min: 25.0,
                max: 40.0,
            },
        );
        assert_close(normalize_numeric(25.0, &curve), 1.0);
        assert_close(normalize_numeric(40.0, &curve), 1.0);
        assert_close(normalize_numeric(0.0, &curve), 0.0);
        assert_close(normalize_numeric(90.0, &curve), 0.0);
        assert_close(normalize_numeric(12.5, &curve), 0.5);
        assert_close(normalize_numeric(65.0, &curve), 0.5);
    }

    #[test]
    fn range_touching_bounds_scores_flat() {
        let curve = bounds(
            0.0,
            10.0,
            OptimalPolicy::Range {
                min: 0.0,
                max: 10.0,
            },
        );
        assert_close(normalize_numeric(-5.0, &curve), 1.0);
        assert_close(normalize_numeric(50.0, &curve), 1.0);
    }

    #[test]
    fn nan_and_wrong_types_score_zero() {
        let registry = SchemaRegistry::extended();
        let schema = registry.schema(Product::Pv);
        let area = schema.factor("roof_area_sqm").expect("area");

        assert_close(normalize(&FactorValue::Number(f64::NAN), area), 0.0);
        assert_close(normalize(&FactorValue::Flag(true), area), 0.0);
        assert_close(
            normalize(&FactorValue::Category("viel".to_string()), area),
            0.0,
        );
    }

    #[test]
    fn boolean_and_categorical_factors() {
        let registry = SchemaRegistry::extended();
        let schema = registry.schema(Product::Storage);
        let owner = schema.factor("eigentuemer").expect("owner");
        let industry = schema.factor("branche").expect("industry");

        assert_close(normalize(&FactorValue::Category("Ja".into()), owner), 1.0);
        assert_close(normalize(&FactorValue::Category("nein".into()), owner), 0.0);
        assert_close(normalize(&FactorValue::Number(3.0), owner), 1.0);
        assert_close(normalize(&FactorValue::Number(0.0), owner), 0.0);
        assert_close(
            normalize(&FactorValue::Category("Landwirtschaft".into()), industry),
            CATEGORICAL_NEUTRAL_SCORE,
        );
        assert_close(normalize(&FactorValue::Category("  ".into()), industry), 0.0);
    }

    #[test]
    fn every_standard_factor_stays_in_unit_interval() {
        let samples = [
            -1.0e9,
            -1.0,
            0.0,
            0.35,
            32.0,
            180.0,
            1100.0,
            1.0e9,
        ];
        for registry in [SchemaRegistry::standard(), SchemaRegistry::extended()] {
            for schema in registry.schemas() {
                for factor in &schema.factors {
                    for sample in samples {
                        let score = normalize(&FactorValue::Number(sample), factor);
                        assert!(
                            (0.0..=1.0).contains(&score),
                            "{} produced {score} for {sample}",
                            factor.key
                        );
                    }
                    for invalid in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
                        assert_eq!(
                            normalize(&FactorValue::Number(invalid), factor),
                            0.0,
                            "{} accepted {invalid}",
                            factor.key
                        );
                    }
                }
            }
        }
    }
}
