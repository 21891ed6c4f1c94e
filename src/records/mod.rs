use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Pipeline stage of an opportunity. The two `Closed*` stages are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpportunityStage {
    Prospect,
    Discovery,
    TechEval,
    Proposal,
    Negotiation,
    Legal,
    ClosedWon,
    ClosedLost,
}

impl OpportunityStage {
    /// Open stages in pipeline order. These are the stages a scenario can adjust.
    pub const OPEN: [OpportunityStage; 6] = [
        OpportunityStage::Prospect,
        OpportunityStage::Discovery,
        OpportunityStage::TechEval,
        OpportunityStage::Proposal,
        OpportunityStage::Negotiation,
        OpportunityStage::Legal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityStage::Prospect => "PROSPECT",
            OpportunityStage::Discovery => "DISCOVERY",
            OpportunityStage::TechEval => "TECH_EVAL",
            OpportunityStage::Proposal => "PROPOSAL",
            OpportunityStage::Negotiation => "NEGOTIATION",
            OpportunityStage::Legal => "LEGAL",
            OpportunityStage::ClosedWon => "CLOSED_WON",
            OpportunityStage::ClosedLost => "CLOSED_LOST",
        }
    }

    /// Display label, e.g. `TECH EVAL`.
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, OpportunityStage::ClosedWon | OpportunityStage::ClosedLost)
    }
}

impl fmt::Display for OpportunityStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpportunityStage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "PROSPECT" => Ok(OpportunityStage::Prospect),
            "DISCOVERY" => Ok(OpportunityStage::Discovery),
            "TECH_EVAL" => Ok(OpportunityStage::TechEval),
            "PROPOSAL" => Ok(OpportunityStage::Proposal),
            "NEGOTIATION" => Ok(OpportunityStage::Negotiation),
            "LEGAL" => Ok(OpportunityStage::Legal),
            "CLOSED_WON" => Ok(OpportunityStage::ClosedWon),
            "CLOSED_LOST" => Ok(OpportunityStage::ClosedLost),
            _ => Err(Error::Other(format!("unknown stage: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpportunityKind {
    NewBusiness,
    Expansion,
    Renewal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Segment {
    Seed,
    SeriesA,
    SeriesBPlus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Good,
    Watch,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    Call,
    Email,
    Meeting,
    Qbr,
    Note,
}

impl ActivityKind {
    /// Activity kinds that count as a customer touch.
    pub fn is_touch(&self) -> bool {
        matches!(
            self,
            ActivityKind::Call | ActivityKind::Email | ActivityKind::Meeting | ActivityKind::Qbr
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QbrStatus {
    Scheduled,
    Completed,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountExecutive {
    pub id: String,
    pub name: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub segment: Segment,
    pub region: String,
    pub arr: f64,
    pub renewal_date: NaiveDate,
    #[serde(default)]
    pub ai_maturity: Option<String>,
    /// Last persisted score; the live one is recomputed from signals.
    #[serde(default)]
    pub health_score: f64,
    pub payment_status: PaymentStatus,
    pub owner_ae_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub account_id: String,
    pub owner_ae_id: String,
    pub kind: OpportunityKind,
    pub stage: OpportunityStage,
    pub amount: f64,
    pub probability: f64,
    pub close_date: NaiveDate,
    pub created_at: NaiveDate,
    #[serde(default)]
    pub next_step: String,
    #[serde(default)]
    pub discount_requested: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub account_id: String,
    pub ae_id: String,
    pub kind: ActivityKind,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    pub id: String,
    pub account_id: String,
    pub severity: TicketSeverity,
    pub status: String,
    pub date: NaiveDate,
}

impl SupportTicket {
    pub fn is_open(&self) -> bool {
        self.status != "closed"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stakeholder {
    pub id: String,
    pub account_id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub influence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetric {
    pub account_id: String,
    pub date: NaiveDate,
    pub api_calls: f64,
    #[serde(default)]
    pub seats_active: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Qbr {
    pub id: String,
    pub account_id: String,
    /// Quarter key, e.g. `2026-Q1`.
    pub quarter: String,
    pub status: QbrStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountPlan {
    pub account_id: String,
    pub business_goals: Option<String>,
    pub success_metrics: Option<String>,
    pub stakeholder_map: Option<String>,
    pub risk_log: Option<String>,
    pub expansion_hypothesis: Option<String>,
    pub exec_alignment_date: Option<NaiveDate>,
    pub next_qbr_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountApproval {
    pub id: String,
    pub opportunity_id: String,
    pub requested_discount: f64,
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default)]
    pub recommended_counter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterTarget {
    pub quarter: String,
    pub team_target_arr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSnapshot {
    pub quarter: String,
    pub commit: f64,
    pub actual: f64,
    pub created_at: NaiveDate,
}

/// Everything one computation cycle reads, already fetched into memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dataset {
    pub accounts: Vec<Account>,
    pub account_executives: Vec<AccountExecutive>,
    pub opportunities: Vec<Opportunity>,
    pub activities: Vec<Activity>,
    pub support_tickets: Vec<SupportTicket>,
    pub stakeholders: Vec<Stakeholder>,
    pub usage_metrics: Vec<UsageMetric>,
    pub qbrs: Vec<Qbr>,
    pub account_plans: Vec<AccountPlan>,
    pub discount_approvals: Vec<DiscountApproval>,
    pub quarter_targets: Vec<QuarterTarget>,
    pub forecast_snapshots: Vec<ForecastSnapshot>,
}

impl Dataset {
    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn account_executive(&self, id: &str) -> Option<&AccountExecutive> {
        self.account_executives.iter().find(|ae| ae.id == id)
    }

    pub fn opportunity(&self, id: &str) -> Option<&Opportunity> {
        self.opportunities.iter().find(|o| o.id == id)
    }

    pub fn quarter_target(&self, quarter_key: &str) -> Option<&QuarterTarget> {
        self.quarter_targets.iter().find(|t| t.quarter == quarter_key)
    }

    pub fn account_plan(&self, account_id: &str) -> Option<&AccountPlan> {
        self.account_plans.iter().find(|p| p.account_id == account_id)
    }

    /// Name of an account's owner, or its id when the AE row is missing.
    pub fn owner_name(&self, ae_id: &str) -> String {
        self.account_executive(ae_id)
            .map(|ae| ae.name.clone())
            .unwrap_or_else(|| ae_id.to_string())
    }

    pub fn record_count(&self) -> usize {
        self.accounts.len()
            + self.account_executives.len()
            + self.opportunities.len()
            + self.activities.len()
            + self.support_tickets.len()
            + self.stakeholders.len()
            + self.usage_metrics.len()
            + self.qbrs.len()
            + self.account_plans.len()
            + self.discount_approvals.len()
            + self.quarter_targets.len()
            + self.forecast_snapshots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_round_trips_wire_name() {
        let json = serde_json::to_string(&OpportunityStage::TechEval).unwrap();
        assert_eq!(json, "\"TECH_EVAL\"");
        let back: OpportunityStage = serde_json::from_str("\"CLOSED_WON\"").unwrap();
        assert_eq!(back, OpportunityStage::ClosedWon);
    }

    #[test]
    fn test_stage_from_str_is_lenient() {
        assert_eq!("tech eval".parse::<OpportunityStage>().unwrap(), OpportunityStage::TechEval);
        assert_eq!("LEGAL".parse::<OpportunityStage>().unwrap(), OpportunityStage::Legal);
        assert!("WON".parse::<OpportunityStage>().is_err());
    }

    #[test]
    fn test_stage_label_and_openness() {
        assert_eq!(OpportunityStage::TechEval.label(), "TECH EVAL");
        assert!(OpportunityStage::Legal.is_open());
        assert!(!OpportunityStage::ClosedLost.is_open());
        assert!(OpportunityStage::OPEN.iter().all(|s| s.is_open()));
    }

    #[test]
    fn test_account_plan_deserializes_partial() {
        let plan: AccountPlan = serde_json::from_str(
            r#"{"accountId":"a1","businessGoals":"grow","nextQbrDate":"2026-05-01"}"#,
        )
        .unwrap();
        assert_eq!(plan.business_goals.as_deref(), Some("grow"));
        assert_eq!(plan.next_qbr_date, NaiveDate::from_ymd_opt(2026, 5, 1));
        assert!(plan.risk_log.is_none());
    }

    #[test]
    fn test_touch_kinds() {
        assert!(ActivityKind::Qbr.is_touch());
        assert!(!ActivityKind::Note.is_touch());
    }
}
