use std::collections::HashSet;

use chrono::NaiveDate;

use super::policy::{ActionPolicy, MAX_MANAGER_ACTIONS};
use super::types::{
    ActionCandidate, ActionImpact, ActionStatus, CoachingFlag, FlagSeverity, ManagerAction,
};
use crate::date_util::add_days;

/// An account whose health fell into the risk band.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskSignal {
    pub account_id: String,
    pub account_name: String,
    pub owner: String,
    /// Rounded health score.
    pub health_score: i64,
}

/// A discount approval still waiting on sign-off.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingApprovalSignal {
    pub approval_id: String,
    pub account_name: String,
    pub owner: String,
    pub requested_discount: f64,
}

pub fn rank_manager_actions(candidates: &[ActionCandidate], today: NaiveDate) -> Vec<ManagerAction> {
    rank_manager_actions_with(&ActionPolicy::DEFAULT, candidates, today)
}

/// Rank by impact + urgency (stable, so ties keep input order), drop
/// repeated ids, keep the top `max_actions` and stagger due dates one day
/// apart starting tomorrow.
pub fn rank_manager_actions_with(
    policy: &ActionPolicy,
    candidates: &[ActionCandidate],
    today: NaiveDate,
) -> Vec<ManagerAction> {
    let mut ranked: Vec<&ActionCandidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| b.combined_score().cmp(&a.combined_score()));

    let mut seen: HashSet<&str> = HashSet::new();
    ranked
        .into_iter()
        .filter(|&c| seen.insert(c.id.as_str()))
        .take(policy.max_actions.min(MAX_MANAGER_ACTIONS))
        .enumerate()
        .map(|(rank, candidate)| {
            let total = candidate.combined_score();
            let impact = if total >= policy.high_impact_min {
                ActionImpact::High
            } else if total >= policy.medium_impact_min {
                ActionImpact::Medium
            } else {
                ActionImpact::Low
            };
            let status = if candidate.blocked {
                ActionStatus::Blocked
            } else if rank < policy.new_ranks {
                ActionStatus::New
            } else {
                ActionStatus::InProgress
            };

            ManagerAction {
                id: candidate.id.clone(),
                title: candidate.title.clone(),
                owner: candidate.owner.clone(),
                due_date: add_days(today, rank as i64 + 1),
                impact,
                status,
            }
        })
        .collect()
}

/// Build the candidate list from the three signal sources, each capped and
/// scored by its position within its own source.
pub fn build_action_candidates(
    policy: &ActionPolicy,
    risks: &[RiskSignal],
    flags: &[CoachingFlag],
    approvals: &[PendingApprovalSignal],
) -> Vec<ActionCandidate> {
    let risk = risks
        .iter()
        .take(policy.max_risk_candidates)
        .enumerate()
        .map(|(i, r)| ActionCandidate {
            id: format!("risk-{}", r.account_id),
            title: format!(
                "Stabilize {} renewal risk ({}/100)",
                r.account_name, r.health_score
            ),
            owner: r.owner.clone(),
            impact_score: 9 - i as i32,
            urgency_score: 8,
            blocked: false,
        });

    let coaching = flags
        .iter()
        .take(policy.max_coaching_candidates)
        .enumerate()
        .map(|(i, f)| ActionCandidate {
            id: format!("coach-{}-{}", f.ae_id, f.flag.as_str()),
            title: format!("1:1 coaching: {} on {}", f.ae_name, f.flag.topic()),
            owner: f.ae_name.clone(),
            impact_score: 7 - i as i32,
            urgency_score: if f.severity == FlagSeverity::High { 8 } else { 6 },
            blocked: false,
        });

    let approval = approvals
        .iter()
        .take(policy.max_approval_candidates)
        .enumerate()
        .map(|(i, a)| ActionCandidate {
            id: format!("approval-{}", a.approval_id),
            title: format!(
                "Review {} discount ({:.1}%)",
                a.account_name,
                a.requested_discount * 100.0
            ),
            owner: a.owner.clone(),
            impact_score: 6 - i as i32,
            urgency_score: 7,
            blocked: true,
        });

    risk.chain(coaching).chain(approval).collect()
}
