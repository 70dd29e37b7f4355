//! Bulk viewed-state snapshot from the page's embedded payload.
//!
//! Only used to seed leaf checkboxes the first time they appear. Once a
//! checkbox exists, the host's viewed toggle and user clicks are authoritative
//! and this map is never consulted for it again.

use std::collections::HashMap;

use log::debug;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("page has no embedded payload")]
    Missing,
    #[error("embedded payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("embedded payload has no diff summaries")]
    NoSummaries,
}

/// Immutable map from logical path to its last known viewed state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewedMap {
    entries: HashMap<String, bool>,
}

impl ViewedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail-open parse: any problem yields an empty map.
    pub fn from_payload(raw: Option<&str>) -> Self {
        match raw.ok_or(PayloadError::Missing).and_then(Self::parse) {
            Ok(map) => map,
            Err(err) => {
                debug!("viewed map unavailable, seeding everything unviewed: {err}");
                Self::default()
            }
        }
    }

    /// Reads `{path, markedAsViewed}` records from the first diff summary
    /// list found under `payload`.
    pub fn parse(raw: &str) -> Result<Self, PayloadError> {
        let data: Value = serde_json::from_str(raw)?;
        let payload = &data["payload"];
        let summaries = [
            &payload["pullRequestsChangesRoute"]["diffSummaries"],
            &payload["diffSummaries"],
            &payload["comparison"]["diffSummaries"],
        ]
        .into_iter()
        .find_map(Value::as_array)
        .ok_or(PayloadError::NoSummaries)?;

        let entries = summaries
            .iter()
            .filter_map(|entry| {
                let path = entry.get("path")?.as_str()?;
                let viewed = entry.get("markedAsViewed").is_some_and(is_truthy);
                Some((path.to_owned(), viewed))
            })
            .collect();
        Ok(Self { entries })
    }

    /// Defaults to `false` for paths missing from the snapshot.
    pub fn is_viewed(&self, path: &str) -> bool {
        self.entries.get(path).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Into<String>> FromIterator<(P, bool)> for ViewedMap {
    fn from_iter<I: IntoIterator<Item = (P, bool)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(path, viewed)| (path.into(), viewed)).collect(),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_changes_route_summaries() {
        let raw = r#"{"payload":{"pullRequestsChangesRoute":{"diffSummaries":[
            {"path":"src/a.ts","markedAsViewed":true},
            {"path":"src/b.ts","markedAsViewed":false},
            {"path":"src/c.ts"}
        ]}}}"#;
        let map = ViewedMap::parse(raw).unwrap();
        assert_eq!(map.len(), 3);
        assert!(map.is_viewed("src/a.ts"));
        assert!(!map.is_viewed("src/b.ts"));
        assert!(!map.is_viewed("src/c.ts"));
        assert!(!map.is_viewed("unknown.ts"));
    }

    #[test]
    fn falls_back_through_payload_shapes() {
        let flat = r#"{"payload":{"diffSummaries":[{"path":"x","markedAsViewed":1}]}}"#;
        assert!(ViewedMap::parse(flat).unwrap().is_viewed("x"));

        let comparison =
            r#"{"payload":{"comparison":{"diffSummaries":[{"path":"y","markedAsViewed":"yes"}]}}}"#;
        assert!(ViewedMap::parse(comparison).unwrap().is_viewed("y"));
    }

    #[test]
    fn first_present_list_wins_even_when_empty() {
        let raw = r#"{"payload":{
            "pullRequestsChangesRoute":{"diffSummaries":[]},
            "diffSummaries":[{"path":"z","markedAsViewed":true}]
        }}"#;
        assert!(ViewedMap::parse(raw).unwrap().is_empty());
    }

    #[test]
    fn skips_records_without_path() {
        let raw = r#"{"payload":{"diffSummaries":[{"markedAsViewed":true},{"path":null},{"path":"ok"}]}}"#;
        assert_eq!(ViewedMap::parse(raw).unwrap().len(), 1);
    }

    #[test]
    fn malformed_payloads_fail_open() {
        assert!(matches!(ViewedMap::parse("{not json"), Err(PayloadError::Json(_))));
        assert!(matches!(ViewedMap::parse("{}"), Err(PayloadError::NoSummaries)));
        assert!(ViewedMap::from_payload(Some("{not json")).is_empty());
        assert!(ViewedMap::from_payload(None).is_empty());
    }
}
