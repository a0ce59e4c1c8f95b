//! C8 Calibrator: two-stage Platt scaling (base calibration from
//! `evaluationTones`, a second learned-adjustment stage from
//! `learningSignals`) plus the per-context confidence floor (spec §4.8).

use tone_config::{EvaluationTonesConfig, LearningSignalsConfig};

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn platt(raw: f64, a: f64, b: f64) -> f64 {
    sigmoid(a * raw + b)
}

/// Apply both calibration stages to a raw probability (spec §4.8 step 1-2).
pub fn calibrate(raw: f64, ctx: &str, evaluation_tones: &EvaluationTonesConfig, learning_signals: &LearningSignalsConfig) -> f64 {
    let stage1_params = evaluation_tones.platt_for(ctx);
    let stage1 = platt(raw, stage1_params.a, stage1_params.b);

    let stage2_params = learning_signals.platt_adjust_for(ctx);
    platt(stage1, stage2_params.a, stage2_params.b)
}

/// Clamp a calibrated confidence to never read below the per-context floor
/// (spec §4.8 step 3: "confidence floors exist so the UI never claims
/// near-zero confidence on a context we know we're weak in").
pub fn apply_confidence_floor(calibrated: f64, ctx: &str, evaluation_tones: &EvaluationTonesConfig) -> f64 {
    calibrated.max(evaluation_tones.min_confidence_for(ctx))
}

/// New-user discount (spec §4.8: "for 'new users' (externally flagged)
/// multiply by 0.7 with a floor of 0.1"). The new-user flag itself is
/// externally sourced (the caller's profile, out of scope here).
const NEW_USER_MULTIPLIER: f64 = 0.7;
const NEW_USER_FLOOR: f64 = 0.1;

pub fn apply_new_user_discount(calibrated: f64, is_new_user: bool) -> f64 {
    if !is_new_user {
        return calibrated.clamp(0.0, 1.0);
    }
    (calibrated * NEW_USER_MULTIPLIER).max(NEW_USER_FLOOR).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tone_config::PlattParams;

    #[test]
    fn identity_platt_params_are_near_passthrough_sigmoid() {
        let evaluation = EvaluationTonesConfig::default();
        let learning = LearningSignalsConfig::default();
        let calibrated = calibrate(0.0, "general", &evaluation, &learning);
        assert!((calibrated - 0.5).abs() < 1e-9);
    }

    #[test]
    fn confidence_floor_lifts_low_values() {
        let mut evaluation = EvaluationTonesConfig::default();
        evaluation.min_confidence.insert("conflict".to_string(), 0.6);
        let floored = apply_confidence_floor(0.1, "conflict", &evaluation);
        assert_eq!(floored, 0.6);
    }

    #[test]
    fn new_user_discount_applies_multiplier_and_floor() {
        assert!((apply_new_user_discount(0.9, true) - 0.63).abs() < 1e-9);
        assert_eq!(apply_new_user_discount(0.05, true), NEW_USER_FLOOR);
        assert_eq!(apply_new_user_discount(0.9, false), 0.9);
    }

    #[test]
    fn custom_platt_params_shift_the_curve() {
        let mut evaluation = EvaluationTonesConfig::default();
        evaluation.platt.insert("conflict".to_string(), PlattParams { a: 2.0, b: 1.0 });
        let learning = LearningSignalsConfig::default();
        let high = calibrate(1.0, "conflict", &evaluation, &learning);
        let low = calibrate(-1.0, "conflict", &evaluation, &learning);
        assert!(high > low);
    }
}
