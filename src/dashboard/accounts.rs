use super::types::*;
use super::DashboardContext;
use crate::date_util::sub_days;
use crate::filters::DashboardFilters;
use crate::metrics::account_plan_completeness;
use crate::metrics::health::{health_band, health_breakdown_rows};
use crate::records::{ActivityKind, Qbr, QbrStatus, TicketSeverity};

const NEXT_ACTIONS: usize = 5;
const RECENT_QBRS: usize = 2;
const MEETING_WINDOW_DAYS: i64 = 45;

/// Scoped accounts, weakest stored health first, larger ARR first on ties.
pub fn accounts_view(ctx: &DashboardContext<'_>, filters: &DashboardFilters) -> Vec<AccountRow> {
    let data = ctx.dataset;
    let mut accounts = ctx.scoped_accounts(filters);
    accounts.sort_by(|a, b| {
        a.health_score
            .total_cmp(&b.health_score)
            .then(b.arr.total_cmp(&a.arr))
    });

    accounts
        .into_iter()
        .map(|account| {
            let open_pipeline = data
                .opportunities
                .iter()
                .filter(|o| o.account_id == account.id && o.stage.is_open())
                .map(|o| o.amount)
                .sum();
            let qbr_status = recent_qbrs(ctx, &account.id)
                .first()
                .map(|q| q.status)
                .unwrap_or(QbrStatus::Scheduled);

            AccountRow {
                id: account.id.clone(),
                name: account.name.clone(),
                segment: account.segment,
                region: account.region.clone(),
                arr: account.arr,
                renewal_date: account.renewal_date,
                ai_maturity: account.ai_maturity.clone(),
                health_score: account.health_score,
                owner: ctx.owner_name(&account.owner_ae_id),
                payment_status: account.payment_status,
                open_pipeline,
                qbr_status,
                account_plan_completeness: account_plan_completeness(data.account_plan(&account.id)),
            }
        })
        .collect()
}

/// Everything known about one account, with a freshly computed health
/// score. `None` when the id is unknown.
pub fn account_detail(ctx: &DashboardContext<'_>, account_id: &str) -> Option<AccountDetail> {
    let data = ctx.dataset;
    let account = ctx.account(account_id)?;

    let meetings_since = sub_days(ctx.today, MEETING_WINDOW_DAYS);
    let meetings = data
        .activities
        .iter()
        .filter(|a| {
            a.account_id == account.id && a.kind == ActivityKind::Meeting && a.date >= meetings_since
        })
        .count() as u32;
    let qbrs = recent_qbrs(ctx, &account.id);
    let qbr_completed = qbrs
        .iter()
        .take(RECENT_QBRS)
        .any(|q| q.status == QbrStatus::Completed);
    let health = ctx.account_health(account, meetings, qbr_completed);

    let mut usage: Vec<UsagePoint> = data
        .usage_metrics
        .iter()
        .filter(|m| m.account_id == account.id)
        .map(|m| UsagePoint {
            date: m.date,
            api_calls: m.api_calls,
            seats_active: m.seats_active,
        })
        .collect();
    usage.sort_by_key(|p| p.date);

    let mut tickets: Vec<_> = data
        .support_tickets
        .iter()
        .filter(|t| t.account_id == account.id)
        .collect();
    tickets.sort_by(|a, b| b.date.cmp(&a.date));
    let risks = tickets
        .into_iter()
        .filter(|t| {
            t.is_open() || matches!(t.severity, TicketSeverity::High | TicketSeverity::Critical)
        })
        .map(|t| RiskItem {
            id: t.id.clone(),
            severity: t.severity,
            status: t.status.clone(),
            date: t.date,
        })
        .collect();

    let mut opps: Vec<_> = data
        .opportunities
        .iter()
        .filter(|o| o.account_id == account.id && o.stage.is_open())
        .collect();
    opps.sort_by_key(|o| o.close_date);
    let next_actions = opps
        .into_iter()
        .take(NEXT_ACTIONS)
        .map(|o| NextAction {
            id: o.id.clone(),
            close_date: o.close_date,
            stage: o.stage,
            next_step: o.next_step.clone(),
            amount: o.amount,
        })
        .collect();

    let plan = data.account_plan(&account.id);

    Some(AccountDetail {
        id: account.id.clone(),
        name: account.name.clone(),
        segment: account.segment,
        region: account.region.clone(),
        arr: account.arr,
        renewal_date: account.renewal_date,
        ai_maturity: account.ai_maturity.clone(),
        owner: ctx.owner_name(&account.owner_ae_id),
        health,
        health_band: health_band(health.weighted_score, &ctx.policy.health),
        health_rows: health_breakdown_rows(&health, &ctx.policy.health),
        usage_metrics: usage,
        stakeholders: data
            .stakeholders
            .iter()
            .filter(|s| s.account_id == account.id)
            .cloned()
            .collect(),
        qbrs: qbrs
            .iter()
            .take(RECENT_QBRS)
            .map(|q| QbrSummary {
                id: q.id.clone(),
                quarter: q.quarter.clone(),
                status: q.status,
            })
            .collect(),
        risks,
        next_actions,
        plan: plan.cloned(),
        plan_completeness: account_plan_completeness(plan),
    })
}

/// An account's QBRs, latest quarter first.
fn recent_qbrs<'a>(ctx: &DashboardContext<'a>, account_id: &str) -> Vec<&'a Qbr> {
    let mut qbrs: Vec<&Qbr> = ctx
        .dataset
        .qbrs
        .iter()
        .filter(|q| q.account_id == account_id)
        .collect();
    qbrs.sort_by(|a, b| b.quarter.cmp(&a.quarter));
    qbrs
}
