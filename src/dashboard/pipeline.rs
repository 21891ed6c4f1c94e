use std::collections::BTreeMap;

use super::types::*;
use super::DashboardContext;
use crate::filters::{DashboardFilters, Quarter};
use crate::metrics::guardrails::{default_counter_offer, DEFAULT_JUSTIFICATION};
use crate::metrics::{
    bucket_forecast_with, discount_guardrail_label_with, discount_risk_with,
    recalculate_scenario_with, scenario_stage_defaults, ScenarioResult, StageProbabilities,
};
use crate::records::{ApprovalStatus, OpportunityStage};

const DEAL_DESK_ROWS: usize = 40;

pub fn pipeline_view(ctx: &DashboardContext<'_>, filters: &DashboardFilters) -> PipelineView {
    let data = ctx.dataset;
    let policy = ctx.policy;
    let quarter = ctx.quarter_context(filters.quarter);

    // The funnel counts every opportunity in the quarter, ignoring scope.
    let mut counts: BTreeMap<OpportunityStage, usize> = BTreeMap::new();
    for opp in data.opportunities.iter().filter(|o| quarter.contains(o.close_date)) {
        *counts.entry(opp.stage).or_default() += 1;
    }
    let mut funnel: Vec<(OpportunityStage, usize)> = counts.into_iter().collect();
    funnel.sort_by(|a, b| b.1.cmp(&a.1));

    let mut open_opps: Vec<_> = ctx
        .scoped_opportunities(filters, &quarter)
        .into_iter()
        .filter(|o| o.stage.is_open() && o.probability >= policy.forecast.upside_min)
        .collect();

    let scenario_defaults = scenario_stage_defaults(&open_opps);
    let buckets = bucket_forecast_with(&policy.forecast, &open_opps);

    open_opps.sort_by(|a, b| b.discount_requested.total_cmp(&a.discount_requested));
    let deal_desk = open_opps
        .iter()
        .take(DEAL_DESK_ROWS)
        .map(|opp| {
            let approval = data
                .discount_approvals
                .iter()
                .find(|a| a.opportunity_id == opp.id);
            let discount = opp.discount_requested;

            DealDeskRow {
                id: opp.id.clone(),
                deal: ctx.account_name(&opp.account_id),
                owner: ctx.owner_name(&opp.owner_ae_id),
                stage: opp.stage,
                amount: opp.amount,
                requested_discount: discount,
                guardrail: discount_guardrail_label_with(&policy.guardrails, discount),
                justification: approval
                    .and_then(|a| a.justification.clone())
                    .unwrap_or_else(|| DEFAULT_JUSTIFICATION.to_string()),
                risk: discount_risk_with(&policy.guardrails, discount),
                approval_status: approval
                    .map(|a| a.approval_status)
                    .unwrap_or(ApprovalStatus::Pending),
                recommended_counter: approval
                    .and_then(|a| a.recommended_counter.clone())
                    .unwrap_or_else(|| default_counter_offer(&policy.guardrails, discount).to_string()),
            }
        })
        .collect();

    PipelineView {
        quarter_key: quarter.key,
        funnel: funnel
            .into_iter()
            .map(|(stage, count)| FunnelRow {
                stage: stage.label(),
                count,
            })
            .collect(),
        scenario_defaults,
        scenario_base: ScenarioBase {
            commit: buckets.commit,
            best_case: buckets.best_case,
            upside: buckets.upside,
        },
        deal_desk,
    }
}

/// Forecast for every open opportunity closing in `quarter`, regardless of
/// filter scope, with `overrides` applied per stage.
pub fn recalculate_pipeline_scenario(
    ctx: &DashboardContext<'_>,
    quarter: Quarter,
    overrides: &StageProbabilities,
) -> ScenarioResult {
    let quarter = ctx.quarter_context(quarter);
    let opps: Vec<_> = ctx
        .dataset
        .opportunities
        .iter()
        .filter(|o| quarter.contains(o.close_date) && o.stage.is_open())
        .collect();
    log::debug!(
        "Recalculating {} with {} open opportunities and {} overrides",
        quarter,
        opps.len(),
        overrides.len()
    );
    recalculate_scenario_with(&ctx.policy.forecast, &opps, overrides)
}
