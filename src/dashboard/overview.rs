use std::collections::{HashMap, HashSet};

use super::types::*;
use super::{sum, DashboardContext};
use crate::date_util::{add_days, calendar_days_between, sub_days};
use crate::filters::DashboardFilters;
use crate::format::{format_currency, format_ratio};
use crate::metrics::guardrails::GuardrailSummary;
use crate::metrics::health::health_band;
use crate::metrics::questions::{
    status_from_at_risk_count, status_from_cadence, status_from_coaching_load,
    status_from_coverage_with, status_from_forecast_with,
};
use crate::metrics::{
    account_plan_completeness, average_forecast_error, bucket_forecast_with,
    build_action_candidates, build_coaching_flags_with, forecast_accuracy, pct_delta,
    pipeline_coverage, rank_manager_actions_with, stage_breakdown_by_bucket_with,
    AeCoachingInput, ForecastTrendPoint, PendingApprovalSignal, RiskSignal,
};
use crate::records::{
    ActivityKind, ApprovalStatus, Opportunity, OpportunityKind, OpportunityStage, QbrStatus,
};

const TOP_DEALS: usize = 15;
const HEALTH_ROWS: usize = 25;
const TREND_POINTS: usize = 4;
const MEETING_WINDOW_DAYS: i64 = 45;
const TOUCH_WINDOW_DAYS: i64 = 30;
const RENEWAL_WINDOW_DAYS: i64 = 90;

const HEALTH_PLAYBOOK: [&str; 5] = [
    "Schedule QBR",
    "Escalate to Product",
    "Exec sponsor",
    "Offer training",
    "Renegotiate plan",
];

/// Won, renewal and pipeline totals for one quarter.
struct QuarterTotals {
    expansion_arr: f64,
    renewal_arr: f64,
    nrr: f64,
    pipeline: f64,
    won: f64,
    remaining_target: f64,
    coverage: f64,
}

impl QuarterTotals {
    fn new(opps: &[&Opportunity], target: Option<f64>) -> Self {
        let won: Vec<&Opportunity> = opps
            .iter()
            .copied()
            .filter(|o| o.stage == OpportunityStage::ClosedWon)
            .collect();
        let won_of = |kind: OpportunityKind| sum(won.iter().copied().filter(|o| o.kind == kind));

        let expansion_arr = won_of(OpportunityKind::Expansion);
        let renewal_arr = won_of(OpportunityKind::Renewal);
        let renewable_base = sum(opps.iter().copied().filter(|o| o.kind == OpportunityKind::Renewal));
        let nrr = if renewable_base > 0.0 {
            renewal_arr / renewable_base * 100.0
        } else {
            0.0
        };

        let pipeline = sum(opps.iter().copied().filter(|o| o.stage.is_open()));
        let won = sum(won.iter().copied());
        // A missing target counts as 1 so coverage stays finite.
        let remaining_target = (target.unwrap_or(1.0) - won).max(1.0);

        Self {
            expansion_arr,
            renewal_arr,
            nrr,
            pipeline,
            won,
            remaining_target,
            coverage: pipeline_coverage(pipeline, remaining_target),
        }
    }
}

/// The executive dashboard: one pass over the filter quarter that feeds
/// every panel and the ranked manager action list.
pub fn dashboard_view(ctx: &DashboardContext<'_>, filters: &DashboardFilters) -> DashboardView {
    let policy = ctx.policy;
    let data = ctx.dataset;
    let today = ctx.today;

    let quarter = ctx.quarter_context(filters.quarter);
    let prev = quarter.previous();
    let target = data.quarter_target(&quarter.key).map(|t| t.team_target_arr);
    let prev_target = data.quarter_target(&prev.key).map(|t| t.team_target_arr);

    let quarter_opps = ctx.scoped_opportunities(filters, &quarter);
    let prev_opps = ctx.scoped_opportunities(filters, &prev);
    let open_opps: Vec<&Opportunity> = quarter_opps.iter().copied().filter(|o| o.stage.is_open()).collect();

    let current = QuarterTotals::new(&quarter_opps, target);
    let previous = QuarterTotals::new(&prev_opps, prev_target);
    log::debug!(
        "{}: pipeline {:.0}, won {:.0}, remaining target {:.0}",
        quarter.key,
        current.pipeline,
        current.won,
        current.remaining_target
    );

    let forecast = bucket_forecast_with(&policy.forecast, &open_opps);

    // Forecast accuracy trend
    let mut snapshots: Vec<_> = data.forecast_snapshots.iter().collect();
    snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let mut trend: Vec<ForecastTrendPoint> = snapshots
        .into_iter()
        .take(TREND_POINTS)
        .map(|s| ForecastTrendPoint {
            quarter: s.quarter.clone(),
            commit: s.commit,
            actual: s.actual,
            error_pct: forecast_accuracy(s.actual, s.commit),
        })
        .collect();
    trend.reverse();

    let stage_breakdown = stage_breakdown_by_bucket_with(&policy.forecast, &open_opps)
        .into_iter()
        .map(|row| StageBreakdownRow {
            stage: row.stage.label(),
            commit: row.commit,
            best_case: row.best_case,
            pipeline: row.pipeline,
        })
        .collect();

    let mut by_amount = open_opps.clone();
    by_amount.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    let top_deals = by_amount
        .into_iter()
        .take(TOP_DEALS)
        .map(|o| TopDealRow {
            id: o.id.clone(),
            deal: ctx.account_name(&o.account_id),
            stage: o.stage.label(),
            amount: o.amount,
            close_date: o.close_date,
            confidence: o.probability,
            next_step: o.next_step.clone(),
            owner: ctx.owner_name(&o.owner_ae_id),
        })
        .collect();

    let customer_health = customer_health(ctx, filters, &quarter.key);
    let (leaderboard, coaching_inputs) = leaderboard(ctx, &quarter, &quarter_opps, current.remaining_target);
    let coaching_flags = build_coaching_flags_with(&policy.coaching, &coaching_inputs);

    let quarter_qbrs: Vec<_> = data.qbrs.iter().filter(|q| q.quarter == quarter.key).collect();
    let qbr_count = |status: QbrStatus| quarter_qbrs.iter().filter(|q| q.status == status).count();
    let plan_completeness = if data.account_plans.is_empty() {
        0.0
    } else {
        data.account_plans
            .iter()
            .map(|p| f64::from(account_plan_completeness(Some(p))))
            .sum::<f64>()
            / data.account_plans.len() as f64
    };
    let operating_cadence = OperatingCadence {
        qbr_cadence: QbrCadence {
            completed: qbr_count(QbrStatus::Completed),
            scheduled: qbr_count(QbrStatus::Scheduled),
            overdue: qbr_count(QbrStatus::Overdue),
        },
        account_plan_completeness: plan_completeness,
        guardrails: GuardrailSummary::from_approvals(&policy.guardrails, &data.discount_approvals),
    };

    // Manager actions
    let risks: Vec<RiskSignal> = customer_health
        .rows
        .iter()
        .filter(|row| (row.health_score as f64) < policy.health.watch_min)
        .map(|row| RiskSignal {
            account_id: row.account_id.clone(),
            account_name: row.account.clone(),
            owner: row.owner.clone(),
            health_score: row.health_score,
        })
        .collect();
    let approvals: Vec<PendingApprovalSignal> = data
        .discount_approvals
        .iter()
        .filter(|a| a.approval_status == ApprovalStatus::Pending)
        .map(|a| {
            let opp = data.opportunity(&a.opportunity_id);
            PendingApprovalSignal {
                approval_id: a.id.clone(),
                account_name: opp
                    .map(|o| ctx.account_name(&o.account_id))
                    .unwrap_or_else(|| a.opportunity_id.clone()),
                owner: opp
                    .map(|o| ctx.owner_name(&o.owner_ae_id))
                    .unwrap_or_default(),
                requested_discount: a.requested_discount,
            }
        })
        .collect();
    let candidates = build_action_candidates(&policy.actions, &risks, &coaching_flags, &approvals);
    let manager_actions = rank_manager_actions_with(&policy.actions, &candidates, today);

    let average_error = average_forecast_error(&trend);
    let mut view = DashboardView {
        filters: filters.clone(),
        quarter_key: quarter.key.clone(),
        executive_snapshot: ExecutiveSnapshot {
            nrr: KpiDelta {
                value: current.nrr,
                delta: pct_delta(current.nrr, previous.nrr),
            },
            expansion_arr: KpiDelta {
                value: current.expansion_arr,
                delta: pct_delta(current.expansion_arr, previous.expansion_arr),
            },
            renewal_arr: KpiDelta {
                value: current.renewal_arr,
                delta: pct_delta(current.renewal_arr, previous.renewal_arr),
            },
            pipeline_coverage: KpiDelta {
                value: current.coverage,
                delta: pct_delta(current.coverage, previous.coverage),
            },
            forecast_vs_target: ForecastVsTarget {
                commit: forecast.commit,
                best_case: forecast.best_case,
                upside: forecast.upside,
                target: target.unwrap_or(0.0),
            },
            forecast_accuracy: ForecastAccuracySummary {
                average_error,
                trend: trend.clone(),
            },
        },
        forecast_and_pipeline: ForecastAndPipeline {
            stage_breakdown,
            trend,
            top_deals,
        },
        customer_health,
        team_performance: TeamPerformance {
            leaderboard,
            coaching_flags,
        },
        operating_cadence,
        manager_questions: Vec::new(),
        manager_actions,
    };
    view.manager_questions = manager_questions(ctx, &view);
    view
}

/// Health rows for every scoped account, worst first. At-risk totals cover
/// all scoped accounts, not only the rows shown.
fn customer_health(
    ctx: &DashboardContext<'_>,
    filters: &DashboardFilters,
    quarter_key: &str,
) -> CustomerHealth {
    let policy = ctx.policy;
    let meetings_since = sub_days(ctx.today, MEETING_WINDOW_DAYS);

    let mut meetings: HashMap<&str, u32> = HashMap::new();
    for activity in &ctx.dataset.activities {
        if activity.kind == ActivityKind::Meeting && activity.date >= meetings_since {
            *meetings.entry(activity.account_id.as_str()).or_default() += 1;
        }
    }
    let qbr_completed: HashSet<&str> = ctx
        .dataset
        .qbrs
        .iter()
        .filter(|q| q.quarter == quarter_key && q.status == QbrStatus::Completed)
        .map(|q| q.account_id.as_str())
        .collect();

    let mut rows: Vec<HealthRow> = ctx
        .scoped_accounts(filters)
        .into_iter()
        .map(|account| {
            let health = ctx.account_health(
                account,
                meetings.get(account.id.as_str()).copied().unwrap_or(0),
                qbr_completed.contains(account.id.as_str()),
            );
            HealthRow {
                account_id: account.id.clone(),
                account: account.name.clone(),
                owner: ctx.owner_name(&account.owner_ae_id),
                arr: account.arr,
                renewal_date: account.renewal_date,
                health_score: health.weighted_score.round() as i64,
                health_band: health_band(health.weighted_score, &policy.health),
                breakdown: health,
                actions: HEALTH_PLAYBOOK.to_vec(),
            }
        })
        .collect();
    rows.sort_by_key(|row| row.health_score);

    let at_risk: Vec<&HealthRow> = rows
        .iter()
        .filter(|row| (row.health_score as f64) < policy.health.watch_min)
        .collect();
    let at_risk_count = at_risk.len();
    let arr_at_risk = at_risk.iter().map(|row| row.arr).sum();

    let w = &policy.health.weights;
    let pct = |weight: f64| (weight * 100.0).round();
    rows.truncate(HEALTH_ROWS);

    CustomerHealth {
        at_risk_count,
        arr_at_risk,
        rows,
        weight_transparency: WeightTransparency {
            usage_trend: pct(w.usage_trend),
            support: pct(w.support),
            engagement: pct(w.engagement),
            renewal_proximity: pct(w.renewal),
            payment: pct(w.payment),
        },
    }
}

/// One leaderboard row per AE, plus the matching coaching inputs.
fn leaderboard(
    ctx: &DashboardContext<'_>,
    quarter: &crate::filters::QuarterContext,
    quarter_opps: &[&Opportunity],
    remaining_target: f64,
) -> (Vec<LeaderboardRow>, Vec<AeCoachingInput>) {
    let data = ctx.dataset;
    let today = ctx.today;
    let aes = &data.account_executives;
    let target_per_ae = if aes.is_empty() {
        remaining_target
    } else {
        remaining_target / aes.len() as f64
    };

    let mut activity_volume: HashMap<&str, u32> = HashMap::new();
    for activity in &data.activities {
        if activity.kind.is_touch() && quarter.contains(activity.date) {
            *activity_volume.entry(activity.ae_id.as_str()).or_default() += 1;
        }
    }

    let touch_since = sub_days(today, TOUCH_WINDOW_DAYS);
    let renewal_horizon = add_days(today, RENEWAL_WINDOW_DAYS);
    let mut renewal_touches: HashMap<&str, u32> = HashMap::new();
    for activity in &data.activities {
        let near_renewal = ctx
            .account(&activity.account_id)
            .is_some_and(|a| a.renewal_date <= renewal_horizon);
        if activity.kind.is_touch() && activity.date >= touch_since && near_renewal {
            *renewal_touches.entry(activity.ae_id.as_str()).or_default() += 1;
        }
    }

    let mut rows = Vec::with_capacity(aes.len());
    let mut inputs = Vec::with_capacity(aes.len());

    for ae in aes {
        let ae_opps: Vec<&Opportunity> = quarter_opps.iter().copied().filter(|o| o.owner_ae_id == ae.id).collect();
        let open: Vec<&Opportunity> = ae_opps.iter().copied().filter(|o| o.stage.is_open()).collect();
        let won: Vec<&Opportunity> = ae_opps
            .iter()
            .copied()
            .filter(|o| o.stage == OpportunityStage::ClosedWon)
            .collect();
        let lost = ae_opps
            .iter()
            .filter(|o| o.stage == OpportunityStage::ClosedLost)
            .count();

        let closed = won.len() + lost;
        let win_rate = if closed > 0 {
            won.len() as f64 / closed as f64 * 100.0
        } else {
            0.0
        };
        let cycle_days = if won.is_empty() {
            0.0
        } else {
            won.iter()
                .map(|o| calendar_days_between(o.created_at, o.close_date) as f64)
                .sum::<f64>()
                / won.len() as f64
        };
        let pipeline_coverage = if target_per_ae > 0.0 {
            sum(open.iter().copied()) / target_per_ae
        } else {
            0.0
        };
        let avg_discount = if open.is_empty() {
            0.0
        } else {
            open.iter().map(|o| o.discount_requested).sum::<f64>() / open.len() as f64
        };
        let owned: Vec<&str> = data
            .accounts
            .iter()
            .filter(|a| a.owner_ae_id == ae.id)
            .map(|a| a.id.as_str())
            .collect();
        let stakeholder_count_avg = if owned.is_empty() {
            0.0
        } else {
            owned
                .iter()
                .map(|id| f64::from(ctx.stakeholder_count(id)))
                .sum::<f64>()
                / owned.len() as f64
        };
        let slipping_deals = open.iter().filter(|o| o.close_date < today).count() as u32;
        let renewal_touches_30d = renewal_touches.get(ae.id.as_str()).copied().unwrap_or(0);

        let won_of = |kind: OpportunityKind| sum(won.iter().copied().filter(|o| o.kind == kind));

        rows.push(LeaderboardRow {
            ae_id: ae.id.clone(),
            ae_name: ae.name.clone(),
            region: ae.region.clone(),
            expansion_arr: won_of(OpportunityKind::Expansion),
            retention_arr: won_of(OpportunityKind::Renewal),
            win_rate,
            cycle_days,
            activity_volume: activity_volume.get(ae.id.as_str()).copied().unwrap_or(0),
            pipeline_coverage,
            avg_discount,
            stakeholder_count_avg,
            slipping_deals,
            renewal_touches_30d,
        });
        inputs.push(AeCoachingInput {
            ae_id: ae.id.clone(),
            ae_name: ae.name.clone(),
            pipeline_coverage,
            slipping_deals,
            avg_discount,
            stakeholder_count_avg,
            renewal_touches_30d,
        });
    }

    (rows, inputs)
}

/// The five "are we on track" questions with status and evidence.
pub fn manager_questions(ctx: &DashboardContext<'_>, view: &DashboardView) -> Vec<ManagerQuestion> {
    let q = &ctx.policy.questions;
    let snapshot = &view.executive_snapshot;
    let coverage = snapshot.pipeline_coverage.value;
    let forecast = &snapshot.forecast_vs_target;
    let health = &view.customer_health;
    let flags = view.team_performance.coaching_flags.len();
    let cadence = &view.operating_cadence;

    vec![
        ManagerQuestion {
            id: "q1",
            question: "Are we on track to hit team revenue targets?",
            status: status_from_coverage_with(q, coverage),
            evidence: format!("Coverage {} against remaining target.", format_ratio(coverage)),
        },
        ManagerQuestion {
            id: "q2",
            question: "What will close this quarter and how confident are we?",
            status: status_from_forecast_with(q, forecast.commit, forecast.target),
            evidence: format!(
                "Commit {} | Best {}.",
                format_currency(forecast.commit),
                format_currency(forecast.best_case)
            ),
        },
        ManagerQuestion {
            id: "q3",
            question: "Which accounts are at risk and what is the plan this week?",
            status: status_from_at_risk_count(q, health.at_risk_count),
            evidence: format!(
                "{} accounts at risk, {} ARR exposed.",
                health.at_risk_count,
                format_currency(health.arr_at_risk)
            ),
        },
        ManagerQuestion {
            id: "q4",
            question: "Which AEs need coaching and where in the funnel?",
            status: status_from_coaching_load(q, flags),
            evidence: format!(
                "{flags} active coaching flags across pipeline, discount, and renewal motions."
            ),
        },
        ManagerQuestion {
            id: "q5",
            question: "Which repeatable frameworks are we running?",
            status: status_from_cadence(
                q,
                cadence.qbr_cadence.overdue,
                cadence.account_plan_completeness,
            ),
            evidence: format!(
                "QBR overdue {} | Plan completeness {:.0}%.",
                cadence.qbr_cadence.overdue, cadence.account_plan_completeness
            ),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::fixtures::*;
    use crate::filters::{parse_filters, Quarter};
    use crate::metrics::{ActionStatus, CoachingFlagKind, MetricsPolicy, QuestionStatus};

    fn view() -> DashboardView {
        let data = dataset();
        let policy = MetricsPolicy::DEFAULT;
        let ctx = DashboardContext::new(&data, &policy, today());
        dashboard_view(&ctx, &DashboardFilters::default())
    }

    #[test]
    fn test_executive_snapshot() {
        let view = view();
        assert_eq!(view.quarter_key, "2026-Q1");
        let snap = &view.executive_snapshot;

        assert_eq!(snap.expansion_arr.value, 50_000.0);
        // Prior quarter expansion was 25k.
        assert_eq!(snap.expansion_arr.delta, 100.0);
        assert_eq!(snap.renewal_arr.value, 100_000.0);
        // 100k won of 200k renewable.
        assert_eq!(snap.nrr.value, 50.0);

        // Open: o3 100k, o4 80k, o5 40k, o6 10k. Won 150k of 400k target.
        assert_eq!(snap.pipeline_coverage.value, 230_000.0 / 250_000.0);
        assert_eq!(snap.forecast_vs_target.commit, 100_000.0);
        assert_eq!(snap.forecast_vs_target.best_case, 80_000.0);
        assert_eq!(snap.forecast_vs_target.upside, 40_000.0);
        assert_eq!(snap.forecast_vs_target.target, 400_000.0);
    }

    #[test]
    fn test_accuracy_trend_is_latest_four_oldest_first() {
        let view = view();
        let trend = &view.executive_snapshot.forecast_accuracy.trend;
        let quarters: Vec<_> = trend.iter().map(|p| p.quarter.as_str()).collect();
        assert_eq!(quarters, vec!["q3", "q4", "q5", "q6"]);
        assert!((view.executive_snapshot.forecast_accuracy.average_error - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_stage_breakdown_and_top_deals() {
        let view = view();
        let fp = &view.forecast_and_pipeline;
        let stages: Vec<_> = fp.stage_breakdown.iter().map(|r| r.stage.as_str()).collect();
        assert_eq!(stages, vec!["LEGAL", "NEGOTIATION", "PROSPECT", "DISCOVERY"]);

        let amounts: Vec<_> = fp.top_deals.iter().map(|d| d.amount).collect();
        assert_eq!(amounts, vec![100_000.0, 80_000.0, 40_000.0, 10_000.0]);
        assert_eq!(fp.top_deals[0].deal, "Acme Robotics");
        assert_eq!(fp.top_deals[0].owner, "Jordan Lee");
    }

    #[test]
    fn test_customer_health_sorted_ascending() {
        let view = view();
        let health = &view.customer_health;
        assert_eq!(health.rows.len(), 3);
        assert_eq!(health.rows[0].account_id, "acc3");
        assert!(health.rows.windows(2).all(|w| w[0].health_score <= w[1].health_score));
        assert_eq!(health.at_risk_count, 1);
        assert_eq!(health.arr_at_risk, 250_000.0);
        assert_eq!(health.weight_transparency.usage_trend, 30.0);
        assert_eq!(health.rows[0].actions.len(), 5);
    }

    #[test]
    fn test_leaderboard_and_coaching() {
        let view = view();
        let board = &view.team_performance.leaderboard;
        assert_eq!(board.len(), 2);

        let jordan = &board[0];
        assert_eq!(jordan.win_rate, 100.0);
        assert_eq!(jordan.expansion_arr, 50_000.0);
        assert_eq!(jordan.retention_arr, 100_000.0);
        assert_eq!(jordan.stakeholder_count_avg, 2.0);

        let sam = &board[1];
        assert_eq!(sam.win_rate, 0.0);
        // o5 closed on 2026-01-30 but is still open.
        assert_eq!(sam.slipping_deals, 1);
        // acc3 renews within 90 days and got a call on 2026-02-01.
        assert_eq!(sam.renewal_touches_30d, 1);

        // 130k open against a 125k per-AE share of the remaining target.
        assert!((sam.pipeline_coverage - 1.04).abs() < 1e-9);
        let flags = &view.team_performance.coaching_flags;
        assert!(flags
            .iter()
            .any(|f| f.ae_id == "ae2" && f.flag == CoachingFlagKind::LowPipelineCoverage));
        assert!(!flags.iter().any(|f| f.flag == CoachingFlagKind::HighDiscount));
    }

    #[test]
    fn test_operating_cadence() {
        let view = view();
        let cadence = &view.operating_cadence;
        assert_eq!(cadence.qbr_cadence.completed, 1);
        assert_eq!(cadence.qbr_cadence.overdue, 1);
        assert_eq!(cadence.account_plan_completeness, 86.0);
        assert_eq!(cadence.guardrails.pending, 1);
        assert_eq!(cadence.guardrails.above_threshold, 1);
    }

    #[test]
    fn test_manager_actions_merge_signals() {
        let view = view();
        let actions = &view.manager_actions;
        assert!(actions.len() <= 6);
        assert_eq!(actions[0].id, "risk-acc3");
        assert_eq!(actions[0].due_date, date(2026, 2, 16));
        let approval = actions.iter().find(|a| a.id == "approval-ap1").unwrap();
        assert_eq!(approval.status, ActionStatus::Blocked);
        assert!(approval.title.contains("Beta Labs"));
    }

    #[test]
    fn test_manager_questions() {
        let view = view();
        let questions = &view.manager_questions;
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[0].status, QuestionStatus::Risk);
        assert_eq!(questions[0].evidence, "Coverage 0.92x against remaining target.");
        assert_eq!(questions[1].evidence, "Commit $100,000 | Best $80,000.");
        assert_eq!(questions[2].status, QuestionStatus::OnTrack);
        assert_eq!(questions[4].status, QuestionStatus::OnTrack);
    }

    #[test]
    fn test_region_scope_narrows_everything() {
        let data = dataset();
        let policy = MetricsPolicy::DEFAULT;
        let ctx = DashboardContext::new(&data, &policy, today());
        let filters = parse_filters([("region", "emea"), ("quarter", "Q1")]).unwrap();
        let view = dashboard_view(&ctx, &filters);
        assert_eq!(view.customer_health.rows.len(), 1);
        assert_eq!(view.forecast_and_pipeline.top_deals.len(), 1);
        assert_eq!(view.filters.quarter, Quarter::Q1);
    }

    #[test]
    fn test_missing_target_counts_as_one() {
        let mut data = dataset();
        data.quarter_targets.clear();
        let policy = MetricsPolicy::DEFAULT;
        let ctx = DashboardContext::new(&data, &policy, today());
        let view = dashboard_view(&ctx, &DashboardFilters::default());
        assert_eq!(view.executive_snapshot.forecast_vs_target.target, 0.0);
        // Remaining target floors at 1.
        assert_eq!(view.executive_snapshot.pipeline_coverage.value, 230_000.0);
    }

    #[test]
    fn test_empty_dataset() {
        let data = crate::records::Dataset::default();
        let policy = MetricsPolicy::DEFAULT;
        let ctx = DashboardContext::new(&data, &policy, today());
        let view = dashboard_view(&ctx, &DashboardFilters::default());
        assert!(view.manager_actions.is_empty());
        assert_eq!(view.executive_snapshot.pipeline_coverage.value, 0.0);
        assert_eq!(view.customer_health.at_risk_count, 0);
    }
}
