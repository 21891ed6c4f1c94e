use super::policy::CoachingThresholds;
use super::types::{AeCoachingInput, CoachingFlag, CoachingFlagKind, FlagSeverity};

pub fn build_coaching_flags(inputs: &[AeCoachingInput]) -> Vec<CoachingFlag> {
    build_coaching_flags_with(&CoachingThresholds::DEFAULT, inputs)
}

/// Evaluate every rule for every input. Rules are independent, so one AE
/// can raise several flags; output follows input order, then rule order.
pub fn build_coaching_flags_with(
    t: &CoachingThresholds,
    inputs: &[AeCoachingInput],
) -> Vec<CoachingFlag> {
    let mut flags = Vec::new();

    for input in inputs {
        let mut push = |flag: CoachingFlagKind, severity: FlagSeverity, detail: String| {
            flags.push(CoachingFlag {
                ae_id: input.ae_id.clone(),
                ae_name: input.ae_name.clone(),
                flag,
                severity,
                detail,
            });
        };

        if input.pipeline_coverage < t.coverage_goal {
            push(
                CoachingFlagKind::LowPipelineCoverage,
                high_if(input.pipeline_coverage < t.coverage_high),
                format!(
                    "Coverage {:.2}x is below {}x goal",
                    input.pipeline_coverage, t.coverage_goal
                ),
            );
        }

        if input.slipping_deals >= t.slipping_min {
            push(
                CoachingFlagKind::SlippingDates,
                high_if(input.slipping_deals >= t.slipping_high),
                format!(
                    "{} deals slipped close date in last 30 days",
                    input.slipping_deals
                ),
            );
        }

        if input.avg_discount > t.discount_max {
            push(
                CoachingFlagKind::HighDiscount,
                high_if(input.avg_discount > t.discount_high),
                format!(
                    "Avg requested discount {:.1}% above guardrail",
                    input.avg_discount * 100.0
                ),
            );
        }

        if input.stakeholder_count_avg < t.multithread_goal {
            push(
                CoachingFlagKind::LowMultiThreading,
                high_if(input.stakeholder_count_avg < t.multithread_high),
                format!(
                    "Average {:.1} stakeholder threads",
                    input.stakeholder_count_avg
                ),
            );
        }

        if input.renewal_touches_30d < t.renewal_touch_min {
            push(
                CoachingFlagKind::LowRenewalTouch,
                FlagSeverity::Medium,
                format!(
                    "{} renewal touches in last 30 days",
                    input.renewal_touches_30d
                ),
            );
        }
    }

    flags
}

fn high_if(condition: bool) -> FlagSeverity {
    if condition {
        FlagSeverity::High
    } else {
        FlagSeverity::Medium
    }
}
