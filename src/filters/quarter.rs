use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use super::Quarter;
use crate::date_util::last_day_of_month;
use crate::error::{Error, Result};

static RE_QUARTER_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-[Qq]([1-4])$").expect("valid quarter key regex"));
static RE_QUARTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[Qq]([1-4])$").expect("valid quarter regex"));

/// A fiscal quarter pinned to a year, with its inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterContext {
    pub quarter_number: u8,
    pub year: i32,
    /// Canonical `YYYY-Qn` key used by targets, QBRs and snapshots.
    pub key: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl QuarterContext {
    pub fn new(quarter: Quarter, year: i32) -> Self {
        let quarter_number = quarter.number();
        let start_month = (quarter_number as u32 - 1) * 3 + 1;
        let end_month = quarter_number as u32 * 3;
        let start = NaiveDate::from_ymd_opt(year, start_month, 1).unwrap_or(NaiveDate::MIN);
        let end = last_day_of_month(year, end_month).unwrap_or(NaiveDate::MAX);

        Self {
            quarter_number,
            year,
            key: format!("{year}-Q{quarter_number}"),
            start,
            end,
        }
    }

    /// Parse a quarter string.
    ///
    /// Supported formats:
    /// - `2026-Q3`: explicit year
    /// - `Q3`: quarter of `default_year`
    pub fn parse(s: &str, default_year: i32) -> Result<Self> {
        let s = s.trim();

        if let Some(caps) = RE_QUARTER_KEY.captures(s) {
            let year: i32 = caps[1]
                .parse()
                .map_err(|_| Error::QuarterParse(format!("invalid year: {s}")))?;
            let quarter = Quarter::from_number(caps[2].parse().unwrap_or(0))
                .ok_or_else(|| Error::QuarterParse(s.to_string()))?;
            return Ok(Self::new(quarter, year));
        }

        if let Some(caps) = RE_QUARTER.captures(s) {
            let quarter = Quarter::from_number(caps[1].parse().unwrap_or(0))
                .ok_or_else(|| Error::QuarterParse(s.to_string()))?;
            return Ok(Self::new(quarter, default_year));
        }

        Err(Error::QuarterParse(format!("unrecognized quarter: {s}")))
    }

    pub fn quarter(&self) -> Quarter {
        Quarter::from_number(self.quarter_number).unwrap_or_default()
    }

    /// The quarter before this one; Q1 rolls back to Q4 of the prior year.
    pub fn previous(&self) -> Self {
        match self.quarter() {
            Quarter::Q1 => Self::new(Quarter::Q4, self.year - 1),
            q => Self::new(
                Quarter::from_number(q.number() - 1).unwrap_or_default(),
                self.year,
            ),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl std::fmt::Display for QuarterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}
