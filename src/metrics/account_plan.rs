use crate::records::AccountPlan;

/// The plan fields a complete account plan fills in.
pub const REQUIRED_ACCOUNT_PLAN_FIELDS: [&str; 7] = [
    "businessGoals",
    "successMetrics",
    "stakeholderMap",
    "riskLog",
    "expansionHypothesis",
    "execAlignmentDate",
    "nextQbrDate",
];

/// Percent of required fields filled, rounded. Blank strings do not count;
/// a missing plan scores 0.
pub fn account_plan_completeness(plan: Option<&AccountPlan>) -> u32 {
    let Some(plan) = plan else {
        return 0;
    };

    let text_filled = |value: &Option<String>| value.as_deref().is_some_and(|s| !s.trim().is_empty());
    let filled = [
        text_filled(&plan.business_goals),
        text_filled(&plan.success_metrics),
        text_filled(&plan.stakeholder_map),
        text_filled(&plan.risk_log),
        text_filled(&plan.expansion_hypothesis),
        plan.exec_alignment_date.is_some(),
        plan.next_qbr_date.is_some(),
    ]
    .into_iter()
    .filter(|&f| f)
    .count();

    (filled as f64 / REQUIRED_ACCOUNT_PLAN_FIELDS.len() as f64 * 100.0).round() as u32
}
