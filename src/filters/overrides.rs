use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::metrics::StageProbabilities;
use crate::records::OpportunityStage;

static RE_OVERRIDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z_ -]*?)\s*=\s*(\d+(?:\.\d+)?)\s*%?\s*$")
        .expect("valid override regex")
});

/// Parse one `STAGE=PCT` pair, e.g. `proposal=45` or `TECH_EVAL=30%`.
///
/// The stage comes back in its wire form (`TECH_EVAL`). Percentages must
/// lie in `[0, 100]`.
pub fn parse_stage_override(raw: &str) -> Result<(String, f64)> {
    let caps = RE_OVERRIDE
        .captures(raw)
        .ok_or_else(|| Error::InvalidOverride(raw.to_string()))?;

    let stage: OpportunityStage = caps[1]
        .parse()
        .map_err(|_| Error::InvalidOverride(format!("unknown stage in {raw}")))?;
    if !stage.is_open() {
        return Err(Error::InvalidOverride(format!("{stage} is not an open stage")));
    }

    let pct: f64 = caps[2]
        .parse()
        .map_err(|_| Error::InvalidOverride(raw.to_string()))?;
    if !(0.0..=100.0).contains(&pct) {
        return Err(Error::InvalidOverride(format!("{raw}: percentage must be 0-100")));
    }

    Ok((stage.as_str().to_string(), pct))
}

/// Parse a list of overrides. A later value for the same stage replaces an
/// earlier one.
pub fn parse_stage_overrides<S: AsRef<str>>(raw: &[S]) -> Result<StageProbabilities> {
    raw.iter()
        .map(|item| parse_stage_override(item.as_ref()))
        .collect()
}
