pub mod accounts;
pub mod overview;
pub mod pipeline;
pub mod team;
pub mod types;

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::filters::{contains_ci, DashboardFilters, Quarter, QuarterContext};
use crate::metrics::health::{open_ticket_weight, usage_trend_pct};
use crate::metrics::{compute_health_score_with, HealthInputs, HealthScoreBreakdown, MetricsPolicy};
use crate::records::{Account, Dataset, Opportunity};

pub use accounts::{account_detail, accounts_view};
pub use overview::{dashboard_view, manager_questions};
pub use pipeline::{pipeline_view, recalculate_pipeline_scenario};
pub use team::team_view;
pub use types::*;

/// Inputs shared by every view: the dataset, the policy and the reference
/// date. Every view is a pure function of these and its filters.
///
/// Account, owner and stakeholder lookups are indexed once here so views
/// can resolve them per opportunity or activity.
#[derive(Debug, Clone)]
pub struct DashboardContext<'a> {
    pub dataset: &'a Dataset,
    pub policy: &'a MetricsPolicy,
    /// Reference date for "now"-relative windows.
    pub today: NaiveDate,
    accounts: HashMap<&'a str, &'a Account>,
    owners: HashMap<&'a str, &'a str>,
    stakeholders: HashMap<&'a str, u32>,
}

impl<'a> DashboardContext<'a> {
    pub fn new(dataset: &'a Dataset, policy: &'a MetricsPolicy, today: NaiveDate) -> Self {
        // First row wins on duplicate ids.
        let mut accounts = HashMap::with_capacity(dataset.accounts.len());
        for account in &dataset.accounts {
            accounts.entry(account.id.as_str()).or_insert(account);
        }
        let mut owners = HashMap::with_capacity(dataset.account_executives.len());
        for ae in &dataset.account_executives {
            owners.entry(ae.id.as_str()).or_insert(ae.name.as_str());
        }
        let mut stakeholders: HashMap<&str, u32> = HashMap::new();
        for stakeholder in &dataset.stakeholders {
            *stakeholders.entry(stakeholder.account_id.as_str()).or_default() += 1;
        }

        Self {
            dataset,
            policy,
            today,
            accounts,
            owners,
            stakeholders,
        }
    }

    /// The filter quarter in the reference date's year.
    pub fn quarter_context(&self, quarter: Quarter) -> QuarterContext {
        QuarterContext::new(quarter, self.today.year())
    }

    fn account(&self, account_id: &str) -> Option<&'a Account> {
        self.accounts.get(account_id).copied()
    }

    /// Owner display name, or the AE id when the AE row is missing.
    fn owner_name(&self, ae_id: &str) -> String {
        self.owners
            .get(ae_id)
            .map_or_else(|| ae_id.to_string(), |name| name.to_string())
    }

    fn account_name(&self, account_id: &str) -> String {
        self.account(account_id)
            .map_or_else(|| account_id.to_string(), |a| a.name.clone())
    }

    /// Accounts in segment/region scope whose name or owner matches the search.
    fn scoped_accounts(&self, filters: &DashboardFilters) -> Vec<&'a Account> {
        self.dataset
            .accounts
            .iter()
            .filter(|a| filters.matches_account_scope(a))
            .filter(|a| {
                filters.search().is_none_or(|q| {
                    contains_ci(&a.name, q) || contains_ci(&self.owner_name(&a.owner_ae_id), q)
                })
            })
            .collect()
    }

    /// Opportunities closing inside `quarter` whose account is in scope. The
    /// search matches account name, owner name or next step.
    fn scoped_opportunities(
        &self,
        filters: &DashboardFilters,
        quarter: &QuarterContext,
    ) -> Vec<&'a Opportunity> {
        let unscoped = filters.segment.segment().is_none() && filters.region.region().is_none();

        self.dataset
            .opportunities
            .iter()
            .filter(|o| quarter.contains(o.close_date))
            .filter(|o| {
                unscoped
                    || self
                        .account(&o.account_id)
                        .is_some_and(|a| filters.matches_account_scope(a))
            })
            .filter(|o| {
                filters.search().is_none_or(|q| {
                    contains_ci(&self.account_name(&o.account_id), q)
                        || contains_ci(&self.owner_name(&o.owner_ae_id), q)
                        || contains_ci(&o.next_step, q)
                })
            })
            .collect()
    }

    fn stakeholder_count(&self, account_id: &str) -> u32 {
        self.stakeholders.get(account_id).copied().unwrap_or(0)
    }

    /// Live health score for an account from its raw signals.
    fn account_health(
        &self,
        account: &Account,
        meetings_last_45_days: u32,
        qbr_completed: bool,
    ) -> HealthScoreBreakdown {
        let inputs = HealthInputs {
            usage_trend_pct: usage_trend_pct(
                self.dataset
                    .usage_metrics
                    .iter()
                    .filter(|m| m.account_id == account.id),
            ),
            open_tickets_weighted: open_ticket_weight(
                self.dataset
                    .support_tickets
                    .iter()
                    .filter(|t| t.account_id == account.id),
            ),
            meetings_last_45_days,
            qbr_completed,
            active_stakeholders: self.stakeholder_count(&account.id),
            renewal_date: account.renewal_date,
            payment_status: account.payment_status,
        };
        compute_health_score_with(&self.policy.health, &inputs, self.today)
    }
}

pub(crate) fn sum<'a>(values: impl IntoIterator<Item = &'a Opportunity>) -> f64 {
    values.into_iter().map(|o| o.amount).sum()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;

    use crate::records::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// 2026-02-15, inside Q1 2026.
    pub fn today() -> NaiveDate {
        date(2026, 2, 15)
    }

    pub fn account(id: &str, name: &str, segment: Segment, region: &str, owner: &str) -> Account {
        Account {
            id: id.into(),
            name: name.into(),
            segment,
            region: region.into(),
            arr: 100_000.0,
            renewal_date: date(2026, 12, 31),
            ai_maturity: None,
            health_score: 70.0,
            payment_status: PaymentStatus::Good,
            owner_ae_id: owner.into(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn opp(
        id: &str,
        account_id: &str,
        owner: &str,
        kind: OpportunityKind,
        stage: OpportunityStage,
        amount: f64,
        probability: f64,
        close_date: NaiveDate,
    ) -> Opportunity {
        Opportunity {
            id: id.into(),
            account_id: account_id.into(),
            owner_ae_id: owner.into(),
            kind,
            stage,
            amount,
            probability,
            close_date,
            created_at: date(2025, 11, 1),
            next_step: format!("Follow up on {id}"),
            discount_requested: 0.05,
        }
    }

    pub fn dataset() -> Dataset {
        use OpportunityKind::*;
        use OpportunityStage::*;

        let mut risky = account("acc3", "Cobalt Health", Segment::SeriesBPlus, "APAC", "ae2");
        risky.payment_status = PaymentStatus::Overdue;
        risky.renewal_date = date(2026, 3, 1);
        risky.arr = 250_000.0;
        risky.health_score = 40.0;

        let mut high_discount = opp("o4", "acc2", "ae2", NewBusiness, Negotiation, 80_000.0, 0.6, date(2026, 3, 15));
        high_discount.discount_requested = 0.25;

        Dataset {
            accounts: vec![
                account("acc1", "Acme Robotics", Segment::SeriesA, "EMEA", "ae1"),
                account("acc2", "Beta Labs", Segment::Seed, "NA", "ae2"),
                risky,
            ],
            account_executives: vec![
                AccountExecutive {
                    id: "ae1".into(),
                    name: "Jordan Lee".into(),
                    region: "EMEA".into(),
                },
                AccountExecutive {
                    id: "ae2".into(),
                    name: "Sam Patel".into(),
                    region: "NA".into(),
                },
            ],
            opportunities: vec![
                opp("o1", "acc1", "ae1", Expansion, ClosedWon, 50_000.0, 1.0, date(2026, 1, 20)),
                opp("o2", "acc1", "ae1", Renewal, ClosedWon, 100_000.0, 1.0, date(2026, 2, 1)),
                opp("o3", "acc1", "ae1", Renewal, Legal, 100_000.0, 0.85, date(2026, 3, 20)),
                high_discount,
                opp("o5", "acc3", "ae2", NewBusiness, Prospect, 40_000.0, 0.2, date(2026, 1, 30)),
                opp("o6", "acc3", "ae2", NewBusiness, Discovery, 10_000.0, 0.05, date(2026, 3, 1)),
                opp("o7", "acc2", "ae2", NewBusiness, ClosedLost, 30_000.0, 0.0, date(2026, 2, 10)),
                // Prior quarter
                opp("p1", "acc1", "ae1", Expansion, ClosedWon, 25_000.0, 1.0, date(2025, 11, 15)),
                opp("p2", "acc2", "ae2", NewBusiness, Proposal, 60_000.0, 0.5, date(2025, 12, 10)),
            ],
            activities: vec![
                Activity {
                    id: "act1".into(),
                    account_id: "acc1".into(),
                    ae_id: "ae1".into(),
                    kind: ActivityKind::Meeting,
                    date: date(2026, 2, 10),
                },
                Activity {
                    id: "act2".into(),
                    account_id: "acc3".into(),
                    ae_id: "ae2".into(),
                    kind: ActivityKind::Call,
                    date: date(2026, 2, 1),
                },
                Activity {
                    id: "act3".into(),
                    account_id: "acc1".into(),
                    ae_id: "ae1".into(),
                    kind: ActivityKind::Email,
                    date: date(2025, 12, 5),
                },
            ],
            support_tickets: vec![
                SupportTicket {
                    id: "t1".into(),
                    account_id: "acc3".into(),
                    severity: TicketSeverity::Critical,
                    status: "open".into(),
                    date: date(2026, 2, 1),
                },
                SupportTicket {
                    id: "t2".into(),
                    account_id: "acc3".into(),
                    severity: TicketSeverity::High,
                    status: "open".into(),
                    date: date(2026, 1, 20),
                },
                SupportTicket {
                    id: "t3".into(),
                    account_id: "acc1".into(),
                    severity: TicketSeverity::Low,
                    status: "closed".into(),
                    date: date(2026, 1, 5),
                },
            ],
            stakeholders: vec![
                Stakeholder {
                    id: "s1".into(),
                    account_id: "acc1".into(),
                    name: "Ada".into(),
                    role: "CTO".into(),
                    influence: "high".into(),
                },
                Stakeholder {
                    id: "s2".into(),
                    account_id: "acc1".into(),
                    name: "Grace".into(),
                    role: "VP Eng".into(),
                    influence: "medium".into(),
                },
            ],
            usage_metrics: vec![
                UsageMetric {
                    account_id: "acc3".into(),
                    date: date(2026, 2, 1),
                    api_calls: 500.0,
                    seats_active: 10,
                },
                UsageMetric {
                    account_id: "acc3".into(),
                    date: date(2026, 1, 1),
                    api_calls: 1000.0,
                    seats_active: 12,
                },
            ],
            qbrs: vec![
                Qbr {
                    id: "q1".into(),
                    account_id: "acc1".into(),
                    quarter: "2026-Q1".into(),
                    status: QbrStatus::Completed,
                },
                Qbr {
                    id: "q2".into(),
                    account_id: "acc3".into(),
                    quarter: "2026-Q1".into(),
                    status: QbrStatus::Overdue,
                },
            ],
            account_plans: vec![AccountPlan {
                account_id: "acc1".into(),
                business_goals: Some("Automate QA".into()),
                success_metrics: Some("50% fewer escapes".into()),
                stakeholder_map: Some("CTO sponsor".into()),
                risk_log: Some("None".into()),
                expansion_hypothesis: None,
                exec_alignment_date: Some(date(2026, 1, 10)),
                next_qbr_date: Some(date(2026, 4, 10)),
            }],
            discount_approvals: vec![DiscountApproval {
                id: "ap1".into(),
                opportunity_id: "o4".into(),
                requested_discount: 0.25,
                approval_status: ApprovalStatus::Pending,
                justification: None,
                recommended_counter: None,
            }],
            quarter_targets: vec![
                QuarterTarget {
                    quarter: "2026-Q1".into(),
                    team_target_arr: 400_000.0,
                },
                QuarterTarget {
                    quarter: "2025-Q4".into(),
                    team_target_arr: 200_000.0,
                },
            ],
            forecast_snapshots: (1..=6)
                .map(|i| ForecastSnapshot {
                    quarter: format!("q{i}"),
                    commit: 90.0,
                    actual: 100.0,
                    created_at: date(2024, i, 1),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::filters::{parse_filters, RegionFilter};

    #[test]
    fn test_scoped_accounts_by_region_and_search() {
        let data = dataset();
        let policy = MetricsPolicy::DEFAULT;
        let ctx = DashboardContext::new(&data, &policy, today());

        let all = ctx.scoped_accounts(&DashboardFilters::default());
        assert_eq!(all.len(), 3);

        let emea = DashboardFilters {
            region: RegionFilter::Emea,
            ..Default::default()
        };
        let ids: Vec<_> = ctx.scoped_accounts(&emea).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["acc1"]);

        // Owner name matches too, case-insensitively.
        let by_owner = parse_filters([("q", "sam")]).unwrap();
        let ids: Vec<_> = ctx.scoped_accounts(&by_owner).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["acc2", "acc3"]);
    }

    #[test]
    fn test_scoped_opportunities_by_quarter() {
        let data = dataset();
        let policy = MetricsPolicy::DEFAULT;
        let ctx = DashboardContext::new(&data, &policy, today());
        let q1 = ctx.quarter_context(Quarter::Q1);
        assert_eq!(q1.key, "2026-Q1");

        let opps = ctx.scoped_opportunities(&DashboardFilters::default(), &q1);
        assert_eq!(opps.len(), 7);

        let search = parse_filters([("q", "follow up on o3")]).unwrap();
        let opps = ctx.scoped_opportunities(&search, &q1);
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].id, "o3");
    }

    #[test]
    fn test_lookups_are_indexed_once() {
        let mut data = dataset();
        let mut shadow = data.accounts[0].clone();
        shadow.name = "Shadow Acme".to_string();
        data.accounts.push(shadow);
        let policy = MetricsPolicy::DEFAULT;
        let ctx = DashboardContext::new(&data, &policy, today());

        assert_eq!(ctx.account_name("acc1"), "Acme Robotics");
        assert_eq!(ctx.account_name("missing"), "missing");
        assert_eq!(ctx.owner_name("ae2"), "Sam Patel");
        assert_eq!(ctx.owner_name("ae9"), "ae9");
        assert_eq!(
            ctx.stakeholder_count("acc1"),
            data.stakeholders.iter().filter(|s| s.account_id == "acc1").count() as u32
        );
        assert_eq!(ctx.stakeholder_count("missing"), 0);
    }

    #[test]
    fn test_account_health_uses_live_signals() {
        let data = dataset();
        let policy = MetricsPolicy::DEFAULT;
        let ctx = DashboardContext::new(&data, &policy, today());
        let risky = data.account("acc3").unwrap();
        let health = ctx.account_health(risky, 0, false);
        // Usage halved: 50 + (-50 * 2) clamps to 0.
        assert_eq!(health.usage_trend_score, 0.0);
        // Critical (4) + High (3) open tickets.
        assert_eq!(health.support_score, 16.0);
        assert_eq!(health.payment_score, 25.0);
        assert!(health.weighted_score < policy.health.watch_min);
    }
}
