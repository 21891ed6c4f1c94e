pub mod overrides;
pub mod quarter;
pub mod table_view;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::records::{Account, Segment};

pub use overrides::{parse_stage_override, parse_stage_overrides};
pub use quarter::QuarterContext;
pub use table_view::{parse_table_view, resolve_density, serialize_table_view, TableViewState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quarter {
    #[default]
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    pub fn number(&self) -> u8 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 2,
            Quarter::Q3 => 3,
            Quarter::Q4 => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Quarter::Q1),
            2 => Some(Quarter::Q2),
            3 => Some(Quarter::Q3),
            4 => Some(Quarter::Q4),
            _ => None,
        }
    }
}

impl std::str::FromStr for Quarter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Q1" => Ok(Quarter::Q1),
            "Q2" => Ok(Quarter::Q2),
            "Q3" => Ok(Quarter::Q3),
            "Q4" => Ok(Quarter::Q4),
            _ => Err(Error::invalid_filter("quarter", s)),
        }
    }
}

impl std::fmt::Display for Quarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentFilter {
    #[default]
    All,
    Seed,
    SeriesA,
    SeriesBPlus,
}

impl SegmentFilter {
    /// The segment to match, or `None` for all segments.
    pub fn segment(&self) -> Option<Segment> {
        match self {
            SegmentFilter::All => None,
            SegmentFilter::Seed => Some(Segment::Seed),
            SegmentFilter::SeriesA => Some(Segment::SeriesA),
            SegmentFilter::SeriesBPlus => Some(Segment::SeriesBPlus),
        }
    }
}

impl std::str::FromStr for SegmentFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "all" => Ok(SegmentFilter::All),
            "seed" => Ok(SegmentFilter::Seed),
            "series_a" => Ok(SegmentFilter::SeriesA),
            "series_b_plus" => Ok(SegmentFilter::SeriesBPlus),
            _ => Err(Error::invalid_filter("segment", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionFilter {
    #[default]
    All,
    Emea,
    Na,
    Apac,
}

impl RegionFilter {
    /// The stored region name to match, or `None` for all regions.
    pub fn region(&self) -> Option<&'static str> {
        match self {
            RegionFilter::All => None,
            RegionFilter::Emea => Some("EMEA"),
            RegionFilter::Na => Some("NA"),
            RegionFilter::Apac => Some("APAC"),
        }
    }
}

impl std::str::FromStr for RegionFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "all" => Ok(RegionFilter::All),
            "emea" => Ok(RegionFilter::Emea),
            "na" => Ok(RegionFilter::Na),
            "apac" => Ok(RegionFilter::Apac),
            _ => Err(Error::invalid_filter("region", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Density {
    Compact,
    #[default]
    Comfortable,
}

impl std::str::FromStr for Density {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "compact" => Ok(Density::Compact),
            "comfortable" => Ok(Density::Comfortable),
            _ => Err(Error::invalid_filter("density", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortDir {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            _ => Err(Error::invalid_filter("dir", s)),
        }
    }
}

/// Scope shared by every dashboard view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardFilters {
    pub quarter: Quarter,
    pub segment: SegmentFilter,
    pub region: RegionFilter,
    pub q: String,
    pub density: Density,
    pub view: String,
    pub sort: String,
    pub dir: SortDir,
}

impl DashboardFilters {
    pub fn search(&self) -> Option<&str> {
        if self.q.is_empty() {
            None
        } else {
            Some(self.q.as_str())
        }
    }

    /// Segment and region match. Search is applied separately because
    /// what it matches against differs per view.
    pub fn matches_account_scope(&self, account: &Account) -> bool {
        self.segment.segment().is_none_or(|s| account.segment == s)
            && self.region.region().is_none_or(|r| account.region == r)
    }
}

/// Build filters from query-style key/value pairs. When a key repeats, the
/// first value wins. Unknown keys are ignored.
pub fn parse_filters<I, K, V>(pairs: I) -> Result<DashboardFilters>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut filters = DashboardFilters::default();
    let mut seen: Vec<String> = Vec::new();

    for (key, value) in pairs {
        let key = key.as_ref();
        let value = value.as_ref();
        if seen.iter().any(|k| k == key) {
            continue;
        }
        seen.push(key.to_string());

        match key {
            "quarter" => filters.quarter = value.parse()?,
            "segment" => filters.segment = value.parse()?,
            "region" => filters.region = value.parse()?,
            "q" => filters.q = value.trim().to_string(),
            "density" => filters.density = value.parse()?,
            "view" => filters.view = value.trim().to_string(),
            "sort" => filters.sort = value.trim().to_string(),
            "dir" => filters.dir = value.parse()?,
            other => log::debug!("Ignoring unknown filter {other}"),
        }
    }

    Ok(filters)
}

/// Case-insensitive substring match.
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_params_missing() {
        let filters = parse_filters(Vec::<(&str, &str)>::new()).unwrap();
        assert_eq!(filters.quarter, Quarter::Q1);
        assert_eq!(filters.segment, SegmentFilter::All);
        assert_eq!(filters.region, RegionFilter::All);
        assert_eq!(filters.density, Density::Comfortable);
        assert_eq!(filters.dir, SortDir::Desc);
        assert_eq!(filters.q, "");
        assert!(filters.search().is_none());
    }

    #[test]
    fn test_explicit_params() {
        let filters = parse_filters([
            ("quarter", "Q3"),
            ("segment", "series_a"),
            ("region", "emea"),
            ("q", "  alpha "),
            ("density", "compact"),
            ("sort", "arr"),
            ("dir", "asc"),
            ("view", "risk-focus"),
        ])
        .unwrap();

        assert_eq!(
            filters,
            DashboardFilters {
                quarter: Quarter::Q3,
                segment: SegmentFilter::SeriesA,
                region: RegionFilter::Emea,
                q: "alpha".into(),
                density: Density::Compact,
                view: "risk-focus".into(),
                sort: "arr".into(),
                dir: SortDir::Asc,
            }
        );
        assert_eq!(filters.segment.segment(), Some(Segment::SeriesA));
        assert_eq!(filters.region.region(), Some("EMEA"));
    }

    #[test]
    fn test_first_value_wins() {
        let filters = parse_filters([("quarter", "Q2"), ("quarter", "Q4")]).unwrap();
        assert_eq!(filters.quarter, Quarter::Q2);
    }

    #[test]
    fn test_invalid_value_is_error() {
        let err = parse_filters([("segment", "enterprise")]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidFilter { ref field, ref value } if field == "segment" && value == "enterprise"
        ));
        assert!(parse_filters([("quarter", "Q5")]).is_err());
        assert!(parse_filters([("dir", "up")]).is_err());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let filters = parse_filters([("page", "2")]).unwrap();
        assert_eq!(filters, DashboardFilters::default());
    }

    #[test]
    fn test_quarter_display_roundtrip() {
        for q in Quarter::ALL {
            assert_eq!(q.to_string().parse::<Quarter>().unwrap(), q);
        }
    }

    #[test]
    fn test_contains_ci() {
        assert!(contains_ci("Acme Robotics", "acme"));
        assert!(contains_ci("Acme Robotics", "ROBO"));
        assert!(!contains_ci("Acme Robotics", "zeta"));
    }
}
