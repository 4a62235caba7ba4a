//! Export/import document codec.
//!
//! The document is a JSON object with a `skills` array and a `habits` array,
//! using the same item shapes as the persisted snapshot:
//!
//! ```json
//! {
//!   "skills": [{ "id": "1", "name": "Strength", "abbr": "STR", "exp": 120 }],
//!   "habits": [{ "id": "1", "name": "Exercise", "expGains": [{ "skillId": "1", "exp": 50 }] }]
//! }
//! ```
//!
//! Unknown fields are ignored on import so newer documents still load. The
//! optional `exportedAt` timestamp is informational only.

use crate::{Error, Habit, ProgressionState, Result, Skill};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// On-disk shape of an export document
#[derive(Debug, Serialize, Deserialize)]
struct Document {
    #[serde(rename = "exportedAt", default, skip_serializing_if = "Option::is_none")]
    exported_at: Option<DateTime<Utc>>,
    skills: Vec<Skill>,
    habits: Vec<Habit>,
}

/// Serialize the full state to a compact JSON document
pub fn serialize(state: &ProgressionState) -> Result<String> {
    encode(state, None, false)
}

/// Serialize the full state, stamping the document with its export time
pub fn serialize_with_timestamp(
    state: &ProgressionState,
    exported_at: DateTime<Utc>,
    pretty: bool,
) -> Result<String> {
    encode(state, Some(exported_at), pretty)
}

fn encode(
    state: &ProgressionState,
    exported_at: Option<DateTime<Utc>>,
    pretty: bool,
) -> Result<String> {
    let document = Document {
        exported_at,
        skills: state.skills.clone(),
        habits: state.habits.clone(),
    };

    let encoded = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(encoded)
}

/// Parse a document into a progression state
///
/// Only the document's shape is checked. References between habits and
/// skills are loaded as-is.
pub fn deserialize(document: &str) -> Result<ProgressionState> {
    let parsed: Document = serde_json::from_str(document)
        .map_err(|e| Error::Format(format!("Invalid quest log document: {}", e)))?;

    tracing::debug!(
        "Parsed document with {} skill(s) and {} habit(s)",
        parsed.skills.len(),
        parsed.habits.len()
    );

    Ok(ProgressionState {
        skills: parsed.skills,
        habits: parsed.habits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_default_state, ExpGain};
    use chrono::TimeZone;

    fn create_test_state() -> ProgressionState {
        ProgressionState {
            skills: vec![
                Skill {
                    id: "z".into(),
                    name: "Zeal".into(),
                    abbreviation: "ZEA".into(),
                    exp: 1234,
                },
                Skill {
                    id: "a".into(),
                    name: "Arcana \"quoted\"".into(),
                    abbreviation: "ARC".into(),
                    exp: 0,
                },
            ],
            habits: vec![
                Habit {
                    id: "h".into(),
                    name: "Pray".into(),
                    exp_gains: vec![ExpGain::new("a", 5), ExpGain::new("z", 7)],
                },
                Habit {
                    id: "empty".into(),
                    name: "Idle".into(),
                    exp_gains: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_roundtrip_preserves_everything() {
        let state = create_test_state();
        let encoded = serialize(&state).unwrap();
        let decoded = deserialize(&encoded).unwrap();
        assert_eq!(decoded, state);

        let defaults = build_default_state();
        assert_eq!(deserialize(&serialize(&defaults).unwrap()).unwrap(), defaults);
    }

    #[test]
    fn test_roundtrip_with_timestamp() {
        let state = create_test_state();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let encoded = serialize_with_timestamp(&state, at, true).unwrap();

        assert!(encoded.contains("exportedAt"));
        assert_eq!(deserialize(&encoded).unwrap(), state);
    }

    #[test]
    fn test_stable_field_names() {
        let encoded = serialize(&create_test_state()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();

        let skill = &value["skills"][0];
        assert_eq!(skill["abbr"], "ZEA");
        assert_eq!(skill["exp"], 1234);

        let gain = &value["habits"][0]["expGains"][1];
        assert_eq!(gain["skillId"], "z");
        assert_eq!(gain["exp"], 7);
        assert!(value.get("exportedAt").is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let document = r#"{
            "version": 3,
            "skills": [{"id": "1", "name": "Strength", "abbr": "STR", "exp": 50, "highlight": true}],
            "habits": [{"id": "9", "name": "Lift", "expGains": [{"skillId": "1", "exp": 10, "note": "x"}]}]
        }"#;

        let state = deserialize(document).unwrap();
        assert_eq!(state.skills[0].exp, 50);
        assert_eq!(state.habits[0].exp_gains, vec![ExpGain::new("1", 10)]);
    }

    #[test]
    fn test_dangling_reference_is_accepted() {
        let document = r#"{
            "skills": [],
            "habits": [{"id": "9", "name": "Lift", "expGains": [{"skillId": "missing", "exp": 10}]}]
        }"#;

        let state = deserialize(document).unwrap();
        assert_eq!(state.habits.len(), 1);
    }

    #[test]
    fn test_missing_collections_are_format_errors() {
        assert!(matches!(deserialize(r#"{"skills": []}"#), Err(Error::Format(_))));
        assert!(matches!(deserialize(r#"{"habits": []}"#), Err(Error::Format(_))));
    }

    #[test]
    fn test_malformed_input_is_format_error() {
        for bad in ["", "not json", "[1, 2]", r#"{"skills": {}, "habits": []}"#] {
            assert!(
                matches!(deserialize(bad), Err(Error::Format(_))),
                "expected format error for {:?}",
                bad
            );
        }

        let negative = r#"{"skills": [{"id": "1", "name": "S", "abbr": "S", "exp": -5}], "habits": []}"#;
        assert!(matches!(deserialize(negative), Err(Error::Format(_))));
    }
}
