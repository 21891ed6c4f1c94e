use chrono::NaiveDate;
use serde::Serialize;

use crate::filters::DashboardFilters;
use crate::metrics::{
    CoachingFlag, DiscountRisk, ForecastTrendPoint, GuardrailSummary, HealthBand,
    HealthBreakdownRow, HealthScoreBreakdown, ManagerAction, QuestionStatus, StageProbabilities,
};
use crate::records::{
    ApprovalStatus, AccountPlan, OpportunityStage, PaymentStatus, QbrStatus, Segment, Stakeholder,
    TicketSeverity,
};

// ── Executive overview ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KpiDelta {
    pub value: f64,
    /// Percent change against the prior quarter.
    pub delta: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastVsTarget {
    pub commit: f64,
    pub best_case: f64,
    pub upside: f64,
    pub target: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastAccuracySummary {
    pub average_error: f64,
    pub trend: Vec<ForecastTrendPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveSnapshot {
    pub nrr: KpiDelta,
    pub expansion_arr: KpiDelta,
    pub renewal_arr: KpiDelta,
    pub pipeline_coverage: KpiDelta,
    pub forecast_vs_target: ForecastVsTarget,
    pub forecast_accuracy: ForecastAccuracySummary,
}

/// Stage row with a display label (`TECH EVAL`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageBreakdownRow {
    pub stage: String,
    pub commit: f64,
    pub best_case: f64,
    pub pipeline: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopDealRow {
    pub id: String,
    pub deal: String,
    pub stage: String,
    pub amount: f64,
    pub close_date: NaiveDate,
    pub confidence: f64,
    pub next_step: String,
    pub owner: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastAndPipeline {
    pub stage_breakdown: Vec<StageBreakdownRow>,
    pub trend: Vec<ForecastTrendPoint>,
    pub top_deals: Vec<TopDealRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRow {
    pub account_id: String,
    pub account: String,
    pub owner: String,
    pub arr: f64,
    pub renewal_date: NaiveDate,
    /// Rounded weighted score.
    pub health_score: i64,
    pub health_band: HealthBand,
    pub breakdown: HealthScoreBreakdown,
    pub actions: Vec<&'static str>,
}

/// Health weights as whole percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightTransparency {
    pub usage_trend: f64,
    pub support: f64,
    pub engagement: f64,
    pub renewal_proximity: f64,
    pub payment: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerHealth {
    pub at_risk_count: usize,
    pub arr_at_risk: f64,
    pub rows: Vec<HealthRow>,
    pub weight_transparency: WeightTransparency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub ae_id: String,
    pub ae_name: String,
    pub region: String,
    pub expansion_arr: f64,
    pub retention_arr: f64,
    /// Percent of closed deals won.
    pub win_rate: f64,
    pub cycle_days: f64,
    pub activity_volume: u32,
    pub pipeline_coverage: f64,
    pub avg_discount: f64,
    pub stakeholder_count_avg: f64,
    pub slipping_deals: u32,
    pub renewal_touches_30d: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPerformance {
    pub leaderboard: Vec<LeaderboardRow>,
    pub coaching_flags: Vec<CoachingFlag>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QbrCadence {
    pub completed: usize,
    pub scheduled: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingCadence {
    pub qbr_cadence: QbrCadence,
    /// Mean completeness over every plan, in percent.
    pub account_plan_completeness: f64,
    pub guardrails: GuardrailSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerQuestion {
    pub id: &'static str,
    pub question: &'static str,
    pub status: QuestionStatus,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub filters: DashboardFilters,
    pub quarter_key: String,
    pub executive_snapshot: ExecutiveSnapshot,
    pub forecast_and_pipeline: ForecastAndPipeline,
    pub customer_health: CustomerHealth,
    pub team_performance: TeamPerformance,
    pub operating_cadence: OperatingCadence,
    pub manager_questions: Vec<ManagerQuestion>,
    pub manager_actions: Vec<ManagerAction>,
}

// ── Accounts ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRow {
    pub id: String,
    pub name: String,
    pub segment: Segment,
    pub region: String,
    pub arr: f64,
    pub renewal_date: NaiveDate,
    pub ai_maturity: Option<String>,
    pub health_score: f64,
    pub owner: String,
    pub payment_status: PaymentStatus,
    pub open_pipeline: f64,
    pub qbr_status: QbrStatus,
    pub account_plan_completeness: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsagePoint {
    pub date: NaiveDate,
    pub api_calls: f64,
    pub seats_active: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskItem {
    pub id: String,
    pub severity: TicketSeverity,
    pub status: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextAction {
    pub id: String,
    pub close_date: NaiveDate,
    pub stage: OpportunityStage,
    pub next_step: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QbrSummary {
    pub id: String,
    pub quarter: String,
    pub status: QbrStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetail {
    pub id: String,
    pub name: String,
    pub segment: Segment,
    pub region: String,
    pub arr: f64,
    pub renewal_date: NaiveDate,
    pub ai_maturity: Option<String>,
    pub owner: String,
    pub health: HealthScoreBreakdown,
    pub health_band: HealthBand,
    pub health_rows: Vec<HealthBreakdownRow>,
    pub usage_metrics: Vec<UsagePoint>,
    pub stakeholders: Vec<Stakeholder>,
    pub qbrs: Vec<QbrSummary>,
    pub risks: Vec<RiskItem>,
    pub next_actions: Vec<NextAction>,
    pub plan: Option<AccountPlan>,
    pub plan_completeness: u32,
}

// ── Pipeline ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunnelRow {
    pub stage: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealDeskRow {
    pub id: String,
    pub deal: String,
    pub owner: String,
    pub stage: OpportunityStage,
    pub amount: f64,
    pub requested_discount: f64,
    pub guardrail: &'static str,
    pub justification: String,
    pub risk: DiscountRisk,
    pub approval_status: ApprovalStatus,
    pub recommended_counter: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioBase {
    pub commit: f64,
    pub best_case: f64,
    pub upside: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineView {
    pub quarter_key: String,
    pub funnel: Vec<FunnelRow>,
    pub scenario_defaults: StageProbabilities,
    pub scenario_base: ScenarioBase,
    pub deal_desk: Vec<DealDeskRow>,
}

// ── Team ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrendPoint {
    /// Short month name, e.g. `Mar`.
    pub month: String,
    pub won_arr: f64,
    pub pipeline_arr: f64,
    pub activity_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkingPoints {
    pub working: String,
    pub stuck: String,
    pub next_week: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AePerformance {
    pub ae_id: String,
    pub name: String,
    pub region: String,
    pub pipeline_coverage: f64,
    pub win_rate: f64,
    pub avg_discount: f64,
    pub renewal_touchpoints: usize,
    pub monthly_trend: Vec<MonthlyTrendPoint>,
    pub talking_points: TalkingPoints,
    pub expansion_arr: f64,
    pub retention_arr: f64,
}
