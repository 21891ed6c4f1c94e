use serde::Serialize;

use super::policy::GuardrailPolicy;
use super::types::DiscountRisk;
use crate::records::{ApprovalStatus, DiscountApproval};

pub const DEFAULT_JUSTIFICATION: &str = "Competitive pressure and term alignment.";

/// Who has to sign off on a requested discount.
pub fn discount_guardrail_label(discount: f64) -> &'static str {
    discount_guardrail_label_with(&GuardrailPolicy::DEFAULT, discount)
}

pub fn discount_guardrail_label_with(policy: &GuardrailPolicy, discount: f64) -> &'static str {
    if discount <= policy.rep_max {
        "Rep Discretion"
    } else if discount <= policy.manager_max {
        "Manager Approval"
    } else if discount <= policy.director_max {
        "Director Approval"
    } else {
        "VP Exception"
    }
}

pub fn discount_risk(discount: f64) -> DiscountRisk {
    discount_risk_with(&GuardrailPolicy::DEFAULT, discount)
}

pub fn discount_risk_with(policy: &GuardrailPolicy, discount: f64) -> DiscountRisk {
    if discount > policy.high_risk_above {
        DiscountRisk::High
    } else if discount > policy.medium_risk_above {
        DiscountRisk::Medium
    } else {
        DiscountRisk::Low
    }
}

/// Counter-offer suggested when an approval carries none of its own.
pub fn default_counter_offer(policy: &GuardrailPolicy, discount: f64) -> &'static str {
    if discount > policy.high_risk_above {
        "Trade 2-year term for discount reduction to 15%."
    } else {
        "Offer enablement package before price concession."
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailSummary {
    pub pending: usize,
    pub above_threshold: usize,
    pub average_requested_discount: f64,
}

impl GuardrailSummary {
    /// Summarise the given approvals. `above_threshold` counts requests in
    /// the high-risk band.
    pub fn from_approvals<'a>(
        policy: &GuardrailPolicy,
        approvals: impl IntoIterator<Item = &'a DiscountApproval>,
    ) -> Self {
        let mut summary = Self::default();
        let mut total = 0.0;
        let mut count = 0usize;

        for approval in approvals {
            count += 1;
            total += approval.requested_discount;
            if approval.approval_status == ApprovalStatus::Pending {
                summary.pending += 1;
            }
            if approval.requested_discount > policy.high_risk_above {
                summary.above_threshold += 1;
            }
        }

        if count > 0 {
            summary.average_requested_discount = total / count as f64;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approval(id: &str, discount: f64, status: ApprovalStatus) -> DiscountApproval {
        DiscountApproval {
            id: id.to_string(),
            opportunity_id: format!("opp-{id}"),
            requested_discount: discount,
            approval_status: status,
            justification: None,
            recommended_counter: None,
        }
    }

    #[test]
    fn test_guardrail_labels() {
        assert_eq!(discount_guardrail_label(0.05), "Rep Discretion");
        assert_eq!(discount_guardrail_label(0.10), "Rep Discretion");
        assert_eq!(discount_guardrail_label(0.15), "Manager Approval");
        assert_eq!(discount_guardrail_label(0.20), "Manager Approval");
        assert_eq!(discount_guardrail_label(0.25), "Director Approval");
        assert_eq!(discount_guardrail_label(0.31), "VP Exception");
    }

    #[test]
    fn test_discount_risk() {
        assert_eq!(discount_risk(0.10), DiscountRisk::Low);
        assert_eq!(discount_risk(0.12), DiscountRisk::Medium);
        assert_eq!(discount_risk(0.20), DiscountRisk::Medium);
        assert_eq!(discount_risk(0.21), DiscountRisk::High);
    }

    #[test]
    fn test_default_counter_offer() {
        let policy = GuardrailPolicy::DEFAULT;
        assert!(default_counter_offer(&policy, 0.25).starts_with("Trade 2-year term"));
        assert!(default_counter_offer(&policy, 0.15).starts_with("Offer enablement"));
    }

    #[test]
    fn test_summary() {
        let approvals = vec![
            approval("a", 0.10, ApprovalStatus::Pending),
            approval("b", 0.25, ApprovalStatus::Pending),
            approval("c", 0.30, ApprovalStatus::Approved),
            approval("d", 0.15, ApprovalStatus::Rejected),
        ];
        let summary = GuardrailSummary::from_approvals(&GuardrailPolicy::DEFAULT, &approvals);
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.above_threshold, 2);
        assert!((summary.average_requested_discount - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = GuardrailSummary::from_approvals(&GuardrailPolicy::DEFAULT, std::iter::empty());
        assert_eq!(summary, GuardrailSummary::default());
    }
}
