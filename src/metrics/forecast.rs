use std::collections::HashMap;

use super::policy::ForecastBands;
use super::types::{ForecastBucket, ForecastBucketResult, ForecastStageRow, ForecastTrendPoint};
use crate::records::{Opportunity, OpportunityStage};

/// The three fields forecasting reads from an opportunity.
pub trait Forecastable {
    fn amount(&self) -> f64;
    fn probability(&self) -> f64;
    fn stage(&self) -> OpportunityStage;
}

impl Forecastable for Opportunity {
    fn amount(&self) -> f64 {
        self.amount
    }

    fn probability(&self) -> f64 {
        self.probability
    }

    fn stage(&self) -> OpportunityStage {
        self.stage
    }
}

impl<T: Forecastable + ?Sized> Forecastable for &T {
    fn amount(&self) -> f64 {
        (**self).amount()
    }

    fn probability(&self) -> f64 {
        (**self).probability()
    }

    fn stage(&self) -> OpportunityStage {
        (**self).stage()
    }
}

/// A bare forecast line, for callers without full opportunity records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastLine {
    pub amount: f64,
    pub probability: f64,
    pub stage: OpportunityStage,
}

impl Forecastable for ForecastLine {
    fn amount(&self) -> f64 {
        self.amount
    }

    fn probability(&self) -> f64 {
        self.probability
    }

    fn stage(&self) -> OpportunityStage {
        self.stage
    }
}

impl ForecastBands {
    /// Band for a win probability; `None` below the upside floor.
    pub fn classify(&self, probability: f64) -> Option<ForecastBucket> {
        if probability >= self.commit_min {
            Some(ForecastBucket::Commit)
        } else if probability >= self.best_case_min {
            Some(ForecastBucket::BestCase)
        } else if probability >= self.upside_min {
            Some(ForecastBucket::Upside)
        } else {
            None
        }
    }
}

pub fn bucket_forecast<T: Forecastable>(opps: &[T]) -> ForecastBucketResult {
    bucket_forecast_with(&ForecastBands::DEFAULT, opps)
}

pub fn bucket_forecast_with<T: Forecastable>(
    bands: &ForecastBands,
    opps: &[T],
) -> ForecastBucketResult {
    opps.iter()
        .fold(ForecastBucketResult::default(), |mut acc, opp| {
            match bands.classify(opp.probability()) {
                Some(ForecastBucket::Commit) => acc.commit += opp.amount(),
                Some(ForecastBucket::BestCase) => acc.best_case += opp.amount(),
                Some(ForecastBucket::Upside) => acc.upside += opp.amount(),
                None => {}
            }
            acc
        })
}

/// Per-stage commit / best case / unconditional pipeline, in first-seen
/// stage order.
pub fn stage_breakdown_by_bucket<T: Forecastable>(opps: &[T]) -> Vec<ForecastStageRow> {
    stage_breakdown_by_bucket_with(&ForecastBands::DEFAULT, opps)
}

pub fn stage_breakdown_by_bucket_with<T: Forecastable>(
    bands: &ForecastBands,
    opps: &[T],
) -> Vec<ForecastStageRow> {
    let mut rows: Vec<ForecastStageRow> = Vec::new();
    let mut index: HashMap<OpportunityStage, usize> = HashMap::new();

    for opp in opps {
        let stage = opp.stage();
        let idx = *index.entry(stage).or_insert_with(|| {
            rows.push(ForecastStageRow {
                stage,
                commit: 0.0,
                best_case: 0.0,
                pipeline: 0.0,
            });
            rows.len() - 1
        });

        let row = &mut rows[idx];
        row.pipeline += opp.amount();
        match bands.classify(opp.probability()) {
            Some(ForecastBucket::Commit) => row.commit += opp.amount(),
            Some(ForecastBucket::BestCase) => row.best_case += opp.amount(),
            _ => {}
        }
    }

    rows
}

/// Open pipeline over remaining target; 0 when nothing remains to cover.
pub fn pipeline_coverage(total_pipeline: f64, remaining_target: f64) -> f64 {
    if remaining_target <= 0.0 {
        return 0.0;
    }
    total_pipeline / remaining_target
}

/// Absolute commit error as a fraction of actual; 0 when actual is 0.
pub fn forecast_accuracy(actual: f64, forecast_commit: f64) -> f64 {
    if actual == 0.0 {
        return 0.0;
    }
    (actual - forecast_commit).abs() / actual
}

pub fn average_forecast_error(trend: &[ForecastTrendPoint]) -> f64 {
    if trend.is_empty() {
        return 0.0;
    }
    trend.iter().map(|p| p.error_pct).sum::<f64>() / trend.len() as f64
}

/// Period-over-period change in percent.
pub fn pct_delta(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current == 0.0 { 0.0 } else { 100.0 };
    }
    (current - previous) / previous * 100.0
}
