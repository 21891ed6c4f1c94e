use chrono::NaiveDate;

use super::clamp;
use super::policy::HealthPolicy;
use super::types::{HealthBand, HealthBreakdownRow, HealthInputs, HealthScoreBreakdown};
use crate::date_util::calendar_days_between;
use crate::records::{PaymentStatus, SupportTicket, TicketSeverity, UsageMetric};

/// Score an account against the default policy.
pub fn compute_health_score(inputs: &HealthInputs, today: NaiveDate) -> HealthScoreBreakdown {
    compute_health_score_with(&HealthPolicy::DEFAULT, inputs, today)
}

pub fn compute_health_score_with(
    policy: &HealthPolicy,
    inputs: &HealthInputs,
    today: NaiveDate,
) -> HealthScoreBreakdown {
    let usage_trend_score = clamp(
        policy.usage_neutral + inputs.usage_trend_pct * policy.usage_points_per_pct,
        0.0,
        100.0,
    );
    let support_score = clamp(
        100.0 - inputs.open_tickets_weighted * policy.support_points_per_weight,
        0.0,
        100.0,
    );

    // Each engagement signal is capped on its own before the sum is capped.
    let meeting_score = clamp(
        f64::from(inputs.meetings_last_45_days) * policy.meeting_points,
        0.0,
        policy.meeting_cap,
    );
    let stakeholder_score = clamp(
        f64::from(inputs.active_stakeholders) * policy.stakeholder_points,
        0.0,
        policy.stakeholder_cap,
    );
    let qbr_score = if inputs.qbr_completed { policy.qbr_bonus } else { 0.0 };
    let engagement_score = clamp(meeting_score + stakeholder_score + qbr_score, 0.0, 100.0);

    let days_to_renewal = calendar_days_between(today, inputs.renewal_date) as f64;
    let renewal_score = clamp(
        days_to_renewal / policy.renewal_horizon_days * 100.0,
        0.0,
        100.0,
    );

    let payment_score = match inputs.payment_status {
        PaymentStatus::Good => policy.payment_good,
        PaymentStatus::Watch => policy.payment_watch,
        PaymentStatus::Overdue => policy.payment_overdue,
    };

    let w = &policy.weights;
    let weighted_score = clamp(
        usage_trend_score * w.usage_trend
            + support_score * w.support
            + engagement_score * w.engagement
            + renewal_score * w.renewal
            + payment_score * w.payment,
        0.0,
        100.0,
    );

    HealthScoreBreakdown {
        usage_trend_score,
        support_score,
        engagement_score,
        renewal_score,
        payment_score,
        weighted_score,
    }
}

pub fn ticket_severity_weight(severity: TicketSeverity) -> f64 {
    match severity {
        TicketSeverity::Low => 1.0,
        TicketSeverity::Medium => 2.0,
        TicketSeverity::High => 3.0,
        TicketSeverity::Critical => 4.0,
    }
}

/// Sum of severity weights over tickets that are not closed.
pub fn open_ticket_weight<'a>(tickets: impl IntoIterator<Item = &'a SupportTicket>) -> f64 {
    tickets
        .into_iter()
        .filter(|t| t.is_open())
        .map(|t| ticket_severity_weight(t.severity))
        .sum()
}

/// Percent change in API calls between the earliest and latest sample.
///
/// Samples may arrive in any order. Returns 0 without samples or when the
/// earliest sample has no calls.
pub fn usage_trend_pct<'a>(metrics: impl IntoIterator<Item = &'a UsageMetric>) -> f64 {
    let mut first: Option<&UsageMetric> = None;
    let mut last: Option<&UsageMetric> = None;
    for m in metrics {
        if first.is_none_or(|f| m.date < f.date) {
            first = Some(m);
        }
        if last.is_none_or(|l| m.date >= l.date) {
            last = Some(m);
        }
    }

    match (first, last) {
        (Some(first), Some(last)) if first.api_calls > 0.0 => {
            (last.api_calls - first.api_calls) / first.api_calls * 100.0
        }
        _ => 0.0,
    }
}

pub fn health_band(score: f64, policy: &HealthPolicy) -> HealthBand {
    if score >= policy.healthy_min {
        HealthBand::Healthy
    } else if score >= policy.watch_min {
        HealthBand::Watch
    } else {
        HealthBand::Risk
    }
}

/// Labelled component rows with their weights as whole percentages.
pub fn health_breakdown_rows(
    breakdown: &HealthScoreBreakdown,
    policy: &HealthPolicy,
) -> Vec<HealthBreakdownRow> {
    let w = &policy.weights;
    let pct = |weight: f64| format!("{}%", (weight * 100.0).round());
    vec![
        HealthBreakdownRow {
            metric: "Usage trend",
            weight: pct(w.usage_trend),
            value: breakdown.usage_trend_score,
        },
        HealthBreakdownRow {
            metric: "Support burden",
            weight: pct(w.support),
            value: breakdown.support_score,
        },
        HealthBreakdownRow {
            metric: "Stakeholder engagement",
            weight: pct(w.engagement),
            value: breakdown.engagement_score,
        },
        HealthBreakdownRow {
            metric: "Renewal proximity",
            weight: pct(w.renewal),
            value: breakdown.renewal_score,
        },
        HealthBreakdownRow {
            metric: "Payment reliability",
            weight: pct(w.payment),
            value: breakdown.payment_score,
        },
    ]
}
