use super::policy::QuestionPolicy;
use super::types::QuestionStatus;

pub fn status_from_coverage(coverage: f64) -> QuestionStatus {
    status_from_coverage_with(&QuestionPolicy::DEFAULT, coverage)
}

pub fn status_from_coverage_with(policy: &QuestionPolicy, coverage: f64) -> QuestionStatus {
    if coverage >= policy.coverage_on_track {
        QuestionStatus::OnTrack
    } else if coverage >= policy.coverage_watch {
        QuestionStatus::Watch
    } else {
        QuestionStatus::Risk
    }
}

pub fn status_from_forecast(commit: f64, target: f64) -> QuestionStatus {
    status_from_forecast_with(&QuestionPolicy::DEFAULT, commit, target)
}

/// Commit as a share of target. Without a positive target there is nothing
/// to measure against, so the answer is `Watch`.
pub fn status_from_forecast_with(
    policy: &QuestionPolicy,
    commit: f64,
    target: f64,
) -> QuestionStatus {
    if target <= 0.0 {
        return QuestionStatus::Watch;
    }
    let ratio = commit / target;
    if ratio >= policy.forecast_on_track {
        QuestionStatus::OnTrack
    } else if ratio >= policy.forecast_watch {
        QuestionStatus::Watch
    } else {
        QuestionStatus::Risk
    }
}

pub fn status_from_at_risk_count(policy: &QuestionPolicy, at_risk: usize) -> QuestionStatus {
    if at_risk < policy.at_risk_on_track_below {
        QuestionStatus::OnTrack
    } else if at_risk < policy.at_risk_watch_below {
        QuestionStatus::Watch
    } else {
        QuestionStatus::Risk
    }
}

pub fn status_from_coaching_load(policy: &QuestionPolicy, flags: usize) -> QuestionStatus {
    if flags <= policy.coaching_on_track_max {
        QuestionStatus::OnTrack
    } else if flags <= policy.coaching_watch_max {
        QuestionStatus::Watch
    } else {
        QuestionStatus::Risk
    }
}

/// Operating cadence never reaches `Risk`; it is either running or not.
pub fn status_from_cadence(
    policy: &QuestionPolicy,
    qbrs_overdue: usize,
    plan_completeness: f64,
) -> QuestionStatus {
    if qbrs_overdue <= policy.qbr_overdue_max && plan_completeness >= policy.plan_completeness_min {
        QuestionStatus::OnTrack
    } else {
        QuestionStatus::Watch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_risk_and_coaching_load() {
        let p = QuestionPolicy::DEFAULT;
        assert_eq!(status_from_at_risk_count(&p, 11), QuestionStatus::OnTrack);
        assert_eq!(status_from_at_risk_count(&p, 12), QuestionStatus::Watch);
        assert_eq!(status_from_at_risk_count(&p, 20), QuestionStatus::Risk);
        assert_eq!(status_from_coaching_load(&p, 8), QuestionStatus::OnTrack);
        assert_eq!(status_from_coaching_load(&p, 14), QuestionStatus::Watch);
        assert_eq!(status_from_coaching_load(&p, 15), QuestionStatus::Risk);
    }

    #[test]
    fn test_cadence() {
        let p = QuestionPolicy::DEFAULT;
        assert_eq!(status_from_cadence(&p, 6, 70.0), QuestionStatus::OnTrack);
        assert_eq!(status_from_cadence(&p, 7, 90.0), QuestionStatus::Watch);
        assert_eq!(status_from_cadence(&p, 0, 69.9), QuestionStatus::Watch);
    }

    #[test]
    fn test_coverage_status() {
        assert_eq!(status_from_coverage(2.6), QuestionStatus::OnTrack);
        assert_eq!(status_from_coverage(2.5), QuestionStatus::OnTrack);
        assert_eq!(status_from_coverage(2.2), QuestionStatus::Watch);
        assert_eq!(status_from_coverage(1.7), QuestionStatus::Risk);
    }

    #[test]
    fn test_forecast_status() {
        assert_eq!(status_from_forecast(920_000.0, 1_000_000.0), QuestionStatus::OnTrack);
        assert_eq!(status_from_forecast(820_000.0, 1_000_000.0), QuestionStatus::Watch);
        assert_eq!(status_from_forecast(620_000.0, 1_000_000.0), QuestionStatus::Risk);
    }

    #[test]
    fn test_forecast_without_target_is_watch() {
        assert_eq!(status_from_forecast(500_000.0, 0.0), QuestionStatus::Watch);
        assert_eq!(status_from_forecast(0.0, -10.0), QuestionStatus::Watch);
    }
}
