use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Density;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSort {
    pub id: String,
    pub desc: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableViewState {
    pub density: Density,
    pub global_filter: String,
    pub page_size: u32,
    #[serde(default)]
    pub sorting: Vec<ColumnSort>,
    #[serde(default)]
    pub column_visibility: BTreeMap<String, bool>,
}

/// Decode a stored view. Anything unusable (empty input, bad JSON, an
/// unknown density, a missing filter or page size) yields `None` so the
/// caller falls back to its defaults.
pub fn parse_table_view(raw: Option<&str>) -> Option<TableViewState> {
    let raw = raw.filter(|r| !r.trim().is_empty())?;
    match serde_json::from_str(raw) {
        Ok(view) => Some(view),
        Err(e) => {
            log::debug!("Discarding stored table view: {e}");
            None
        }
    }
}

pub fn serialize_table_view(view: &TableViewState) -> Result<String> {
    Ok(serde_json::to_string(view)?)
}

pub fn resolve_density(requested: Option<&str>, fallback: Density) -> Density {
    requested.and_then(|r| r.parse().ok()).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TableViewState {
        TableViewState {
            density: Density::Compact,
            global_filter: "acme".into(),
            page_size: 20,
            sorting: vec![ColumnSort {
                id: "arr".into(),
                desc: true,
            }],
            column_visibility: BTreeMap::from([("owner".into(), true), ("region".into(), false)]),
        }
    }

    #[test]
    fn test_serialize_then_parse() {
        let raw = serialize_table_view(&sample()).unwrap();
        assert!(raw.contains("\"globalFilter\":\"acme\""));
        let parsed = parse_table_view(Some(&raw)).unwrap();
        assert_eq!(parsed.density, Density::Compact);
        assert_eq!(parsed.global_filter, "acme");
        assert_eq!(parsed.page_size, 20);
    }

    #[test]
    fn test_rejects_unusable_input() {
        assert!(parse_table_view(None).is_none());
        assert!(parse_table_view(Some("")).is_none());
        assert!(parse_table_view(Some("{not json")).is_none());
        assert!(parse_table_view(Some(
            r#"{"density":"cozy","globalFilter":"","pageSize":10}"#
        ))
        .is_none());
        assert!(parse_table_view(Some(r#"{"density":"compact","pageSize":10}"#)).is_none());
        assert!(parse_table_view(Some(r#"{"density":"compact","globalFilter":""}"#)).is_none());
    }

    #[test]
    fn test_optional_parts_default() {
        let parsed = parse_table_view(Some(
            r#"{"density":"comfortable","globalFilter":"","pageSize":50}"#,
        ))
        .unwrap();
        assert!(parsed.sorting.is_empty());
        assert!(parsed.column_visibility.is_empty());
    }

    #[test]
    fn test_resolve_density() {
        assert_eq!(resolve_density(Some("compact"), Density::Comfortable), Density::Compact);
        assert_eq!(resolve_density(Some("comfortable"), Density::Compact), Density::Comfortable);
        assert_eq!(resolve_density(Some("invalid"), Density::Comfortable), Density::Comfortable);
        assert_eq!(resolve_density(None, Density::Compact), Density::Compact);
    }
}
