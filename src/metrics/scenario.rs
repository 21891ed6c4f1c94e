use std::collections::BTreeMap;

use super::clamp;
use super::forecast::{
    bucket_forecast_with, stage_breakdown_by_bucket_with, ForecastLine, Forecastable,
};
use super::policy::{ForecastBands, ScenarioShifts};
use super::types::{ScenarioPreset, ScenarioResult};
use crate::records::OpportunityStage;

/// Stage name (e.g. `PROPOSAL`) to win probability in percent (0-100).
pub type StageProbabilities = BTreeMap<String, f64>;

pub fn recalculate_scenario<T: Forecastable>(
    opps: &[T],
    overrides: &StageProbabilities,
) -> ScenarioResult {
    recalculate_scenario_with(&ForecastBands::DEFAULT, opps, overrides)
}

/// Re-bucket `opps` as if every opportunity in an overridden stage had the
/// override probability. Stages without an override keep each
/// opportunity's own stored probability. Override keys that name no stage
/// simply match nothing.
pub fn recalculate_scenario_with<T: Forecastable>(
    bands: &ForecastBands,
    opps: &[T],
    overrides: &StageProbabilities,
) -> ScenarioResult {
    for stage in unmatched_stage_keys(overrides) {
        log::debug!("Ignoring probability override for unknown stage {stage}");
    }

    let adjusted: Vec<ForecastLine> = opps
        .iter()
        .map(|opp| ForecastLine {
            amount: opp.amount(),
            probability: adjusted_probability(opp, overrides),
            stage: opp.stage(),
        })
        .collect();

    let buckets = bucket_forecast_with(bands, &adjusted);
    ScenarioResult {
        commit: buckets.commit,
        best_case: buckets.best_case,
        upside: buckets.upside,
        by_stage: stage_breakdown_by_bucket_with(bands, &adjusted),
    }
}

/// Override keys that are not the exact wire name of an open stage.
fn unmatched_stage_keys(overrides: &StageProbabilities) -> Vec<&str> {
    overrides
        .keys()
        .map(String::as_str)
        .filter(|key| !OpportunityStage::OPEN.iter().any(|s| s.as_str() == *key))
        .collect()
}

fn adjusted_probability<T: Forecastable>(opp: &T, overrides: &StageProbabilities) -> f64 {
    let pct = overrides
        .get(opp.stage().as_str())
        .copied()
        .unwrap_or_else(|| opp.probability() * 100.0);
    clamp(pct, 0.0, 100.0) / 100.0
}

pub fn apply_scenario_preset(
    stage_defaults: &StageProbabilities,
    preset: ScenarioPreset,
) -> StageProbabilities {
    apply_scenario_preset_with(&ScenarioShifts::DEFAULT, stage_defaults, preset)
}

/// Shift every stage default by the preset's offset, clamped to [0, 100].
pub fn apply_scenario_preset_with(
    shifts: &ScenarioShifts,
    stage_defaults: &StageProbabilities,
    preset: ScenarioPreset,
) -> StageProbabilities {
    let shift = match preset {
        ScenarioPreset::Conservative => shifts.conservative,
        ScenarioPreset::Current => shifts.current,
        ScenarioPreset::Aggressive => shifts.aggressive,
    };

    stage_defaults
        .iter()
        .map(|(stage, value)| (stage.clone(), clamp(value + shift, 0.0, 100.0)))
        .collect()
}

/// Mean stored probability (rounded percent) for every open stage; 0 for
/// stages with no opportunities.
pub fn scenario_stage_defaults<T: Forecastable>(opps: &[T]) -> StageProbabilities {
    OpportunityStage::OPEN
        .iter()
        .map(|stage| {
            let probabilities: Vec<f64> = opps
                .iter()
                .filter(|o| o.stage() == *stage)
                .map(|o| o.probability())
                .collect();
            let pct = if probabilities.is_empty() {
                0.0
            } else {
                (probabilities.iter().sum::<f64>() / probabilities.len() as f64 * 100.0).round()
            };
            (stage.as_str().to_string(), pct)
        })
        .collect()
}
