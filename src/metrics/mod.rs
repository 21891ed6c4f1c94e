pub mod account_plan;
pub mod actions;
pub mod coaching;
pub mod forecast;
pub mod guardrails;
pub mod health;
pub mod policy;
pub mod questions;
pub mod scenario;
pub mod types;

pub use account_plan::{account_plan_completeness, REQUIRED_ACCOUNT_PLAN_FIELDS};
pub use actions::{
    build_action_candidates, rank_manager_actions, rank_manager_actions_with,
    PendingApprovalSignal, RiskSignal,
};
pub use coaching::{build_coaching_flags, build_coaching_flags_with};
pub use forecast::{
    average_forecast_error, bucket_forecast, bucket_forecast_with, forecast_accuracy, pct_delta,
    pipeline_coverage, stage_breakdown_by_bucket, stage_breakdown_by_bucket_with, ForecastLine,
    Forecastable,
};
pub use guardrails::{
    discount_guardrail_label, discount_guardrail_label_with, discount_risk, discount_risk_with,
    GuardrailSummary,
};
pub use health::{compute_health_score, compute_health_score_with, health_band};
pub use policy::{CoachingThresholds, MetricsPolicy};
pub use questions::{status_from_coverage, status_from_forecast};
pub use scenario::{
    apply_scenario_preset, apply_scenario_preset_with, recalculate_scenario,
    recalculate_scenario_with, scenario_stage_defaults, StageProbabilities,
};
pub use types::*;

/// Bound `value` to `[min, max]`. NaN maps to `min`.
pub(crate) fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}
