use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::records::{OpportunityStage, PaymentStatus};

/// Per-account signals feeding the health score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthInputs {
    /// Signed percent change in API-call volume over the observed window.
    pub usage_trend_pct: f64,
    /// Sum of open-ticket severity weights.
    pub open_tickets_weighted: f64,
    pub meetings_last_45_days: u32,
    pub qbr_completed: bool,
    pub active_stakeholders: u32,
    pub renewal_date: NaiveDate,
    pub payment_status: PaymentStatus,
}

/// Component scores and their weighted blend, all in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScoreBreakdown {
    pub usage_trend_score: f64,
    pub support_score: f64,
    pub engagement_score: f64,
    pub renewal_score: f64,
    pub payment_score: f64,
    pub weighted_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Healthy,
    Watch,
    Risk,
}

/// One line of the weight-transparency table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthBreakdownRow {
    pub metric: &'static str,
    pub weight: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastBucket {
    Commit,
    BestCase,
    Upside,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastBucketResult {
    pub commit: f64,
    pub best_case: f64,
    pub upside: f64,
}

impl ForecastBucketResult {
    pub fn total(&self) -> f64 {
        self.commit + self.best_case + self.upside
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastStageRow {
    pub stage: OpportunityStage,
    pub commit: f64,
    pub best_case: f64,
    pub pipeline: f64,
}

/// Historical commit vs actual for one quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastTrendPoint {
    pub quarter: String,
    pub commit: f64,
    pub actual: f64,
    /// Error fraction, not percent.
    pub error_pct: f64,
}

/// Per-salesperson aggregates, pre-computed by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AeCoachingInput {
    pub ae_id: String,
    pub ae_name: String,
    pub pipeline_coverage: f64,
    pub slipping_deals: u32,
    pub avg_discount: f64,
    pub stakeholder_count_avg: f64,
    pub renewal_touches_30d: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoachingFlagKind {
    LowPipelineCoverage,
    SlippingDates,
    HighDiscount,
    LowMultiThreading,
    LowRenewalTouch,
}

impl CoachingFlagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoachingFlagKind::LowPipelineCoverage => "LOW_PIPELINE_COVERAGE",
            CoachingFlagKind::SlippingDates => "SLIPPING_DATES",
            CoachingFlagKind::HighDiscount => "HIGH_DISCOUNT",
            CoachingFlagKind::LowMultiThreading => "LOW_MULTI_THREADING",
            CoachingFlagKind::LowRenewalTouch => "LOW_RENEWAL_TOUCH",
        }
    }

    /// Lowercase words, e.g. `low pipeline coverage`.
    pub fn topic(&self) -> String {
        self.as_str().to_lowercase().replace('_', " ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingFlag {
    pub ae_id: String,
    pub ae_name: String,
    pub flag: CoachingFlagKind,
    pub severity: FlagSeverity,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCandidate {
    pub id: String,
    pub title: String,
    pub owner: String,
    pub impact_score: i32,
    pub urgency_score: i32,
    #[serde(default)]
    pub blocked: bool,
}

impl ActionCandidate {
    pub fn combined_score(&self) -> i32 {
        self.impact_score + self.urgency_score
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionImpact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    New,
    InProgress,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerAction {
    pub id: String,
    pub title: String,
    pub owner: String,
    pub due_date: NaiveDate,
    pub impact: ActionImpact,
    pub status: ActionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioPreset {
    Conservative,
    Current,
    Aggressive,
}

impl std::str::FromStr for ScenarioPreset {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(ScenarioPreset::Conservative),
            "current" => Ok(ScenarioPreset::Current),
            "aggressive" => Ok(ScenarioPreset::Aggressive),
            _ => Err(crate::error::Error::invalid_filter("preset", s)),
        }
    }
}

/// Forecast recomputed under stage-probability overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub commit: f64,
    pub best_case: f64,
    pub upside: f64,
    pub by_stage: Vec<ForecastStageRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    OnTrack,
    Watch,
    Risk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountRisk {
    Low,
    Medium,
    High,
}
