pub mod dashboard;
pub mod date_util;
pub mod error;
pub mod filters;
pub mod format;
pub mod metrics;
pub mod records;
pub mod source;

use std::path::Path;

use chrono::NaiveDate;

pub use dashboard::{
    AccountDetail, AccountRow, AePerformance, DashboardContext, DashboardView, PipelineView,
};
pub use error::{Error, Result};
pub use filters::{parse_filters, parse_stage_override, parse_stage_overrides, DashboardFilters, Quarter};
pub use metrics::{MetricsPolicy, ScenarioPreset, ScenarioResult, StageProbabilities};
pub use records::Dataset;

/// Main entry point: one loaded snapshot and the policy it is scored with.
pub struct SalesDash {
    dataset: Dataset,
    policy: MetricsPolicy,
}

impl SalesDash {
    pub fn new(dataset: Dataset, policy: MetricsPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { dataset, policy })
    }

    /// Load the snapshot at `data` and the policy at `policy_path` (or the
    /// default policy location).
    pub async fn open(data: &Path, policy_path: Option<&Path>) -> Result<Self> {
        let (dataset, policy) =
            tokio::try_join!(source::load_dataset(data), source::load_policy(policy_path))?;
        Self::new(dataset, policy)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn policy(&self) -> &MetricsPolicy {
        &self.policy
    }

    fn context(&self, today: NaiveDate) -> DashboardContext<'_> {
        DashboardContext::new(&self.dataset, &self.policy, today)
    }

    pub fn dashboard(&self, filters: &DashboardFilters, today: NaiveDate) -> DashboardView {
        dashboard::dashboard_view(&self.context(today), filters)
    }

    pub fn accounts(&self, filters: &DashboardFilters, today: NaiveDate) -> Vec<AccountRow> {
        dashboard::accounts_view(&self.context(today), filters)
    }

    pub fn account(&self, account_id: &str, today: NaiveDate) -> Result<AccountDetail> {
        dashboard::account_detail(&self.context(today), account_id)
            .ok_or_else(|| Error::NotFound(format!("account {account_id}")))
    }

    pub fn pipeline(&self, filters: &DashboardFilters, today: NaiveDate) -> PipelineView {
        dashboard::pipeline_view(&self.context(today), filters)
    }

    /// Re-run the quarter's forecast under stage overrides.
    ///
    /// With a preset, the pipeline's stage defaults are shifted first and
    /// explicit overrides are laid on top.
    pub fn scenario(
        &self,
        quarter: Quarter,
        overrides: &StageProbabilities,
        preset: Option<ScenarioPreset>,
        today: NaiveDate,
    ) -> ScenarioResult {
        let ctx = self.context(today);
        let mut probabilities = match preset {
            Some(preset) => {
                let filters = DashboardFilters {
                    quarter,
                    ..Default::default()
                };
                let defaults = dashboard::pipeline_view(&ctx, &filters).scenario_defaults;
                metrics::apply_scenario_preset_with(&self.policy.scenario, &defaults, preset)
            }
            None => StageProbabilities::new(),
        };
        probabilities.extend(overrides.iter().map(|(k, v)| (k.clone(), *v)));
        dashboard::recalculate_pipeline_scenario(&ctx, quarter, &probabilities)
    }

    pub fn team(&self, filters: &DashboardFilters, today: NaiveDate) -> Vec<AePerformance> {
        dashboard::team_view(&self.context(today), filters)
    }
}
