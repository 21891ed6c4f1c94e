use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Upper bound on the manager action list, whatever the policy asks for.
pub const MAX_MANAGER_ACTIONS: usize = 6;

/// Component weights of the account health score. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthWeights {
    pub usage_trend: f64,
    pub support: f64,
    pub engagement: f64,
    pub renewal: f64,
    pub payment: f64,
}

impl HealthWeights {
    pub const DEFAULT: Self = Self {
        usage_trend: 0.30,
        support: 0.20,
        engagement: 0.20,
        renewal: 0.15,
        payment: 0.15,
    };

    pub fn total(&self) -> f64 {
        self.usage_trend + self.support + self.engagement + self.renewal + self.payment
    }
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthPolicy {
    pub weights: HealthWeights,
    /// Usage score for a flat trend.
    pub usage_neutral: f64,
    pub usage_points_per_pct: f64,
    pub support_points_per_weight: f64,
    pub meeting_points: f64,
    pub meeting_cap: f64,
    pub stakeholder_points: f64,
    pub stakeholder_cap: f64,
    pub qbr_bonus: f64,
    /// Days to renewal at which the renewal score reaches 100.
    pub renewal_horizon_days: f64,
    pub payment_good: f64,
    pub payment_watch: f64,
    pub payment_overdue: f64,
    pub healthy_min: f64,
    pub watch_min: f64,
}

impl HealthPolicy {
    pub const DEFAULT: Self = Self {
        weights: HealthWeights::DEFAULT,
        usage_neutral: 50.0,
        usage_points_per_pct: 2.0,
        support_points_per_weight: 12.0,
        meeting_points: 12.0,
        meeting_cap: 60.0,
        stakeholder_points: 8.0,
        stakeholder_cap: 24.0,
        qbr_bonus: 16.0,
        renewal_horizon_days: 180.0,
        payment_good: 100.0,
        payment_watch: 60.0,
        payment_overdue: 25.0,
        healthy_min: 75.0,
        watch_min: 60.0,
    };
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Lower bounds of the forecast probability bands. Each band is half-open:
/// `[best_case_min, commit_min)` is best case, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastBands {
    pub commit_min: f64,
    pub best_case_min: f64,
    pub upside_min: f64,
}

impl ForecastBands {
    pub const DEFAULT: Self = Self {
        commit_min: 0.70,
        best_case_min: 0.40,
        upside_min: 0.10,
    };
}

impl Default for ForecastBands {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachingThresholds {
    pub coverage_goal: f64,
    pub coverage_high: f64,
    pub slipping_min: u32,
    pub slipping_high: u32,
    pub discount_max: f64,
    pub discount_high: f64,
    pub multithread_goal: f64,
    pub multithread_high: f64,
    pub renewal_touch_min: u32,
    /// Team scorecard: win rate (percent) that counts as strong conversion.
    pub strong_win_rate: f64,
    /// Team scorecard: renewal touchpoints expected per AE.
    pub renewal_touchpoint_goal: u32,
}

impl CoachingThresholds {
    pub const DEFAULT: Self = Self {
        coverage_goal: 2.5,
        coverage_high: 1.8,
        slipping_min: 3,
        slipping_high: 5,
        discount_max: 0.18,
        discount_high: 0.24,
        multithread_goal: 2.5,
        multithread_high: 2.0,
        renewal_touch_min: 2,
        strong_win_rate: 35.0,
        renewal_touchpoint_goal: 4,
    };
}

impl Default for CoachingThresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionPolicy {
    pub max_actions: usize,
    /// Ranks below this start as `new`; the rest are `in_progress`.
    pub new_ranks: usize,
    pub high_impact_min: i32,
    pub medium_impact_min: i32,
    pub max_risk_candidates: usize,
    pub max_coaching_candidates: usize,
    pub max_approval_candidates: usize,
}

impl ActionPolicy {
    pub const DEFAULT: Self = Self {
        max_actions: 6,
        new_ranks: 3,
        high_impact_min: 15,
        medium_impact_min: 10,
        max_risk_candidates: 4,
        max_coaching_candidates: 4,
        max_approval_candidates: 3,
    };
}

impl Default for ActionPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Additive percentage-point shift applied by each scenario preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioShifts {
    pub conservative: f64,
    pub current: f64,
    pub aggressive: f64,
}

impl ScenarioShifts {
    pub const DEFAULT: Self = Self {
        conservative: -8.0,
        current: 0.0,
        aggressive: 8.0,
    };
}

impl Default for ScenarioShifts {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Discount approval ladder and deal-desk risk cut-offs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailPolicy {
    pub rep_max: f64,
    pub manager_max: f64,
    pub director_max: f64,
    pub medium_risk_above: f64,
    pub high_risk_above: f64,
}

impl GuardrailPolicy {
    pub const DEFAULT: Self = Self {
        rep_max: 0.10,
        manager_max: 0.20,
        director_max: 0.30,
        medium_risk_above: 0.10,
        high_risk_above: 0.20,
    };
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionPolicy {
    pub coverage_on_track: f64,
    pub coverage_watch: f64,
    pub forecast_on_track: f64,
    pub forecast_watch: f64,
    /// At-risk account counts below these are on track / watch.
    pub at_risk_on_track_below: usize,
    pub at_risk_watch_below: usize,
    /// Coaching flag counts up to these are on track / watch.
    pub coaching_on_track_max: usize,
    pub coaching_watch_max: usize,
    pub qbr_overdue_max: usize,
    pub plan_completeness_min: f64,
}

impl QuestionPolicy {
    pub const DEFAULT: Self = Self {
        coverage_on_track: 2.5,
        coverage_watch: 2.0,
        forecast_on_track: 0.92,
        forecast_watch: 0.75,
        at_risk_on_track_below: 12,
        at_risk_watch_below: 20,
        coaching_on_track_max: 8,
        coaching_watch_max: 14,
        qbr_overdue_max: 6,
        plan_completeness_min: 70.0,
    };
}

impl Default for QuestionPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The complete policy, one frozen value per computation cycle.
///
/// Scoring functions read [`MetricsPolicy::DEFAULT`] unless the caller uses
/// a `*_with` variant. A policy file only names the values it overrides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsPolicy {
    pub health: HealthPolicy,
    pub forecast: ForecastBands,
    pub coaching: CoachingThresholds,
    pub actions: ActionPolicy,
    pub scenario: ScenarioShifts,
    pub guardrails: GuardrailPolicy,
    pub questions: QuestionPolicy,
}

impl MetricsPolicy {
    pub const DEFAULT: Self = Self {
        health: HealthPolicy::DEFAULT,
        forecast: ForecastBands::DEFAULT,
        coaching: CoachingThresholds::DEFAULT,
        actions: ActionPolicy::DEFAULT,
        scenario: ScenarioShifts::DEFAULT,
        guardrails: GuardrailPolicy::DEFAULT,
        questions: QuestionPolicy::DEFAULT,
    };

    /// Parse a (possibly partial) policy document and validate it.
    pub fn from_json(raw: &str) -> Result<Self> {
        let policy: MetricsPolicy = serde_json::from_str(raw)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Reject policies that would break score bounds or band ordering.
    pub fn validate(&self) -> Result<()> {
        let w = &self.health.weights;
        let weights = [w.usage_trend, w.support, w.engagement, w.renewal, w.payment];
        if weights.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::Config("health weights must be finite and non-negative".into()));
        }
        if (w.total() - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(Error::Config(format!(
                "health weights must sum to 1.0, got {}",
                w.total()
            )));
        }
        if self.health.renewal_horizon_days <= 0.0 {
            return Err(Error::Config("renewal_horizon_days must be positive".into()));
        }
        if self.health.healthy_min < self.health.watch_min {
            return Err(Error::Config("healthy_min must not be below watch_min".into()));
        }

        let f = &self.forecast;
        let ordered = f.upside_min >= 0.0
            && f.upside_min < f.best_case_min
            && f.best_case_min < f.commit_min
            && f.commit_min <= 1.0;
        if !ordered {
            return Err(Error::Config(format!(
                "forecast bands must satisfy 0 <= upside < best_case < commit <= 1, got {} / {} / {}",
                f.upside_min, f.best_case_min, f.commit_min
            )));
        }

        let c = &self.coaching;
        if c.coverage_high > c.coverage_goal
            || c.slipping_high < c.slipping_min
            || c.discount_high < c.discount_max
            || c.multithread_high > c.multithread_goal
        {
            return Err(Error::Config(
                "coaching high-severity thresholds must be stricter than their triggers".into(),
            ));
        }
        if !(0.0..=100.0).contains(&c.strong_win_rate) {
            return Err(Error::Config("strong_win_rate must be a percentage".into()));
        }

        let a = &self.actions;
        if a.max_actions == 0 || a.max_actions > MAX_MANAGER_ACTIONS {
            return Err(Error::Config(format!(
                "max_actions must be between 1 and {MAX_MANAGER_ACTIONS}, got {}",
                a.max_actions
            )));
        }
        if a.new_ranks > a.max_actions || a.high_impact_min < a.medium_impact_min {
            return Err(Error::Config("action ranking thresholds are inconsistent".into()));
        }

        let g = &self.guardrails;
        if !(g.rep_max <= g.manager_max && g.manager_max <= g.director_max) {
            return Err(Error::Config("discount guardrail ladder must be ascending".into()));
        }

        Ok(())
    }
}

impl Default for MetricsPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((HealthWeights::DEFAULT.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_default_policy_is_valid() {
        MetricsPolicy::default().validate().unwrap();
    }

    #[test]
    fn test_partial_policy_keeps_defaults() {
        let policy = MetricsPolicy::from_json(r#"{"coaching": {"coverage_goal": 3.0}}"#).unwrap();
        assert_eq!(policy.coaching.coverage_goal, 3.0);
        assert_eq!(policy.coaching.coverage_high, 1.8);
        assert_eq!(policy.health, HealthPolicy::DEFAULT);
        assert_eq!(policy.actions.max_actions, 6);
    }

    #[test]
    fn test_rejects_weights_not_summing_to_one() {
        let err = MetricsPolicy::from_json(r#"{"health": {"weights": {"usage_trend": 0.5}}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_unordered_bands() {
        let err = MetricsPolicy::from_json(r#"{"forecast": {"best_case_min": 0.8}}"#).unwrap_err();
        assert!(err.to_string().contains("forecast bands"));
    }

    #[test]
    fn test_rejects_lenient_high_severity() {
        let err = MetricsPolicy::from_json(r#"{"coaching": {"slipping_high": 2}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_action_limit_out_of_range() {
        let err = MetricsPolicy::from_json(r#"{"actions": {"max_actions": 10}}"#).unwrap_err();
        assert!(err.to_string().contains("max_actions"));
        let err = MetricsPolicy::from_json(r#"{"actions": {"max_actions": 0}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let policy = MetricsPolicy::from_json(r#"{"actions": {"max_actions": 4}}"#).unwrap();
        assert_eq!(policy.actions.max_actions, 4);
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = MetricsPolicy::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
