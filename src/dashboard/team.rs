use super::types::*;
use super::{sum, DashboardContext};
use crate::date_util::{add_days, month_key, sub_months};
use crate::filters::DashboardFilters;
use crate::metrics::CoachingThresholds;
use crate::records::{AccountExecutive, Activity, OpportunityKind, OpportunityStage};

const TREND_MONTHS: u32 = 6;
const RENEWAL_HORIZON_DAYS: i64 = 90;

/// Per-AE scorecards for the filter quarter. Only the quarter filter
/// applies; every AE is listed.
pub fn team_view(ctx: &DashboardContext<'_>, filters: &DashboardFilters) -> Vec<AePerformance> {
    let data = ctx.dataset;
    let quarter = ctx.quarter_context(filters.quarter);
    let window_start = sub_months(ctx.today, TREND_MONTHS);

    let quarter_opps: Vec<_> = data
        .opportunities
        .iter()
        .filter(|o| quarter.contains(o.close_date))
        .collect();
    let activities: Vec<&Activity> = data
        .activities
        .iter()
        .filter(|a| a.date >= window_start && a.date <= quarter.end)
        .collect();

    let target = data
        .quarter_target(&quarter.key)
        .map(|t| t.team_target_arr)
        .unwrap_or(0.0);
    let target_per_ae = if data.account_executives.is_empty() {
        0.0
    } else {
        target / data.account_executives.len() as f64
    };

    data.account_executives
        .iter()
        .map(|ae| {
            let opps: Vec<_> = quarter_opps
                .iter()
                .copied()
                .filter(|o| o.owner_ae_id == ae.id)
                .collect();
            let won: Vec<_> = opps
                .iter()
                .copied()
                .filter(|o| o.stage == OpportunityStage::ClosedWon)
                .collect();
            let lost = opps
                .iter()
                .filter(|o| o.stage == OpportunityStage::ClosedLost)
                .count();
            let open: Vec<_> = opps.iter().copied().filter(|o| o.stage.is_open()).collect();
            let ae_activities: Vec<&Activity> = activities
                .iter()
                .copied()
                .filter(|a| a.ae_id == ae.id)
                .collect();

            let monthly_trend = (0..TREND_MONTHS)
                .map(|i| {
                    let month = sub_months(ctx.today, TREND_MONTHS - 1 - i);
                    let key = month_key(month);
                    let in_month: Vec<_> = opps
                        .iter()
                        .copied()
                        .filter(|o| month_key(o.close_date) == key)
                        .collect();
                    MonthlyTrendPoint {
                        month: month.format("%b").to_string(),
                        won_arr: sum(in_month
                            .iter()
                            .copied()
                            .filter(|o| o.stage == OpportunityStage::ClosedWon)),
                        pipeline_arr: sum(in_month.iter().copied().filter(|o| o.stage.is_open())),
                        activity_count: ae_activities
                            .iter()
                            .filter(|a| month_key(a.date) == key)
                            .count(),
                    }
                })
                .collect();

            let pipeline_coverage = if target_per_ae > 0.0 {
                sum(open.iter().copied()) / target_per_ae
            } else {
                0.0
            };
            let closed = won.len() + lost;
            let win_rate = if closed > 0 {
                won.len() as f64 / closed as f64 * 100.0
            } else {
                0.0
            };
            let avg_discount = if open.is_empty() {
                0.0
            } else {
                open.iter().map(|o| o.discount_requested).sum::<f64>() / open.len() as f64
            };
            let renewal_touchpoints = renewal_touchpoints(ctx, ae, &ae_activities);

            AePerformance {
                ae_id: ae.id.clone(),
                name: ae.name.clone(),
                region: ae.region.clone(),
                pipeline_coverage,
                win_rate,
                avg_discount,
                renewal_touchpoints,
                monthly_trend,
                talking_points: talking_points(
                    &ctx.policy.coaching,
                    win_rate,
                    pipeline_coverage,
                    avg_discount,
                    renewal_touchpoints,
                ),
                expansion_arr: sum(won.iter().copied().filter(|o| o.kind == OpportunityKind::Expansion)),
                retention_arr: sum(won.iter().copied().filter(|o| o.kind == OpportunityKind::Renewal)),
            }
        })
        .collect()
}

/// Customer touches on the AE's own accounts that renew within 90 days.
fn renewal_touchpoints(ctx: &DashboardContext<'_>, ae: &AccountExecutive, activities: &[&Activity]) -> usize {
    let horizon = add_days(ctx.today, RENEWAL_HORIZON_DAYS);
    activities
        .iter()
        .filter(|a| a.kind.is_touch())
        .filter(|a| {
            ctx.account(&a.account_id).is_some_and(|account| {
                account.owner_ae_id == ae.id && account.renewal_date <= horizon
            })
        })
        .count()
}

fn talking_points(
    t: &CoachingThresholds,
    win_rate: f64,
    coverage: f64,
    avg_discount: f64,
    touchpoints: usize,
) -> TalkingPoints {
    let working = if win_rate >= t.strong_win_rate {
        format!("Strong win conversion at {win_rate:.1}% with consistent activity volume.")
    } else {
        "Pipeline generation is active; activity should convert more efficiently in late stages."
            .to_string()
    };
    let stuck = if coverage < t.coverage_goal {
        format!("Coverage is {coverage:.2}x, below {}x target.", t.coverage_goal)
    } else {
        format!(
            "Discount pressure averaging {:.1}% is reducing margin quality.",
            avg_discount * 100.0
        )
    };
    let next_week = if touchpoints < t.renewal_touchpoint_goal as usize {
        "Add executive touch and QBR follow-ups on top 3 near-term renewals."
    } else {
        "Run deal review on slipping opportunities with close-plan milestones."
    };

    TalkingPoints {
        working,
        stuck,
        next_week: next_week.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::fixtures::*;
    use crate::metrics::MetricsPolicy;

    fn view() -> Vec<AePerformance> {
        let data = dataset();
        let policy = MetricsPolicy::DEFAULT;
        let ctx = DashboardContext::new(&data, &policy, today());
        team_view(&ctx, &DashboardFilters::default())
    }

    #[test]
    fn test_scorecard_numbers() {
        let team = view();
        assert_eq!(team.len(), 2);

        let jordan = &team[0];
        assert_eq!(jordan.win_rate, 100.0);
        // 100k open against a 200k per-AE share.
        assert_eq!(jordan.pipeline_coverage, 0.5);
        assert_eq!(jordan.avg_discount, 0.05);
        assert_eq!(jordan.expansion_arr, 50_000.0);
        assert_eq!(jordan.retention_arr, 100_000.0);
        assert_eq!(jordan.renewal_touchpoints, 0);

        let sam = &team[1];
        assert_eq!(sam.win_rate, 0.0);
        assert_eq!(sam.pipeline_coverage, 0.65);
        assert_eq!(sam.renewal_touchpoints, 1);
    }

    #[test]
    fn test_monthly_trend() {
        let team = view();
        let months: Vec<_> = team[0].monthly_trend.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]);

        let jordan = &team[0].monthly_trend;
        assert_eq!(jordan[3].activity_count, 1);
        assert_eq!(jordan[4].won_arr, 50_000.0);
        assert_eq!(jordan[5].won_arr, 100_000.0);
        assert_eq!(jordan[5].activity_count, 1);

        let sam = &team[1].monthly_trend;
        assert_eq!(sam[4].pipeline_arr, 40_000.0);
        assert_eq!(sam[5].won_arr, 0.0);
    }

    #[test]
    fn test_talking_points() {
        let team = view();
        let jordan = &team[0].talking_points;
        assert_eq!(jordan.working, "Strong win conversion at 100.0% with consistent activity volume.");
        assert_eq!(jordan.stuck, "Coverage is 0.50x, below 2.5x target.");
        assert_eq!(
            jordan.next_week,
            "Add executive touch and QBR follow-ups on top 3 near-term renewals."
        );

        let covered = talking_points(&CoachingThresholds::DEFAULT, 20.0, 3.0, 0.125, 5);
        assert!(covered.working.starts_with("Pipeline generation is active"));
        assert_eq!(covered.stuck, "Discount pressure averaging 12.5% is reducing margin quality.");
        assert!(covered.next_week.starts_with("Run deal review"));
    }

    #[test]
    fn test_talking_points_follow_coaching_policy() {
        let mut data = dataset();
        // Sam: 80k + 180k + 10k open against a 100k per-AE share.
        for target in &mut data.quarter_targets {
            target.team_target_arr = 200_000.0;
        }
        let o = data.opportunities.iter_mut().find(|o| o.id == "o5").unwrap();
        o.amount = 180_000.0;
        let mut policy = MetricsPolicy::DEFAULT;
        policy.coaching.coverage_goal = 3.0;
        policy.coaching.strong_win_rate = 0.0;
        policy.coaching.renewal_touchpoint_goal = 1;
        let ctx = DashboardContext::new(&data, &policy, today());
        let team = team_view(&ctx, &DashboardFilters::default());

        let sam = &team[1];
        assert!((sam.pipeline_coverage - 2.7).abs() < 1e-9);
        assert_eq!(sam.talking_points.stuck, "Coverage is 2.70x, below 3x target.");
        assert!(sam.talking_points.working.starts_with("Strong win conversion at 0.0%"));
        assert!(sam.talking_points.next_week.starts_with("Run deal review"));

        let default_policy = MetricsPolicy::DEFAULT;
        let ctx = DashboardContext::new(&data, &default_policy, today());
        let team = team_view(&ctx, &DashboardFilters::default());
        assert!(team[1].talking_points.stuck.starts_with("Discount pressure"));
    }

    #[test]
    fn test_missing_target_gives_zero_coverage() {
        let mut data = dataset();
        data.quarter_targets.clear();
        let policy = MetricsPolicy::DEFAULT;
        let ctx = DashboardContext::new(&data, &policy, today());
        let team = team_view(&ctx, &DashboardFilters::default());
        assert!(team.iter().all(|ae| ae.pipeline_coverage == 0.0));
    }
}
