//! Recursive key diffing.
//!
//! Compares two nested objects and reports keys present in the reference
//! but absent from the candidate, at the exact nesting path where they are
//! missing. Used to check hand-edited data models against freshly inferred
//! ones.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Difference between a reference object and a candidate, keyed by where the
/// discrepancy sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDiff {
    /// The reference value is a mapping but the candidate is not.
    MissingMapping,
    /// Keys missing at this level plus any differences inside shared keys.
    Node {
        missing_keys: Vec<String>,
        nested_diff: BTreeMap<String, KeyDiff>,
    },
}

impl KeyDiff {
    /// JSON rendering of the diff, shaped as
    /// `{"missing_keys": [...], "nested_diff": {...}}` with empty parts
    /// omitted; a missing nested mapping renders as a marker string.
    pub fn to_json(&self) -> Value {
        match self {
            KeyDiff::MissingMapping => Value::String("missing nested mapping".to_string()),
            KeyDiff::Node {
                missing_keys,
                nested_diff,
            } => {
                let mut out = Map::new();
                if !missing_keys.is_empty() {
                    out.insert(
                        "missing_keys".to_string(),
                        Value::Array(
                            missing_keys
                                .iter()
                                .map(|k| Value::String(k.clone()))
                                .collect(),
                        ),
                    );
                }
                if !nested_diff.is_empty() {
                    out.insert(
                        "nested_diff".to_string(),
                        Value::Object(
                            nested_diff
                                .iter()
                                .map(|(k, d)| (k.clone(), d.to_json()))
                                .collect(),
                        ),
                    );
                }
                Value::Object(out)
            }
        }
    }
}

/// Recursively compare two values and identify keys missing from
/// `candidate` relative to `reference`.
///
/// Returns `None` when nothing is missing, which includes the case where
/// neither side is a mapping: only mapping structure is compared, leaf
/// values are never inspected.
pub fn compare_keys(reference: &Value, candidate: &Value) -> Option<KeyDiff> {
    let reference = match reference.as_object() {
        Some(map) => map,
        None => return None,
    };
    let candidate = match candidate.as_object() {
        Some(map) => map,
        None => return Some(KeyDiff::MissingMapping),
    };

    let missing_keys: Vec<String> = reference
        .keys()
        .filter(|k| !candidate.contains_key(*k))
        .cloned()
        .collect();

    let mut nested_diff = BTreeMap::new();
    for (key, ref_value) in reference {
        if let Some(cand_value) = candidate.get(key) {
            if let Some(diff) = compare_keys(ref_value, cand_value) {
                nested_diff.insert(key.clone(), diff);
            }
        }
    }

    if missing_keys.is_empty() && nested_diff.is_empty() {
        None
    } else {
        Some(KeyDiff::Node {
            missing_keys,
            nested_diff,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reference() -> Value {
        json!({
            "a1": 1, "a2": "two", "a3": [3],
            "b1": {"b11": 1, "b12": "two", "b13": [3]},
            "c1": {"c11": {"c111": 1, "c112": "two", "c113": [3]}}
        })
    }

    #[test]
    fn identical_objects_report_nothing() {
        let a = reference();
        let b = reference();
        assert_eq!(compare_keys(&a, &b), None);
    }

    #[test]
    fn missing_top_level_key() {
        let a = reference();
        let mut b = reference();
        b.as_object_mut().unwrap().remove("a1");
        let diff = compare_keys(&a, &b).unwrap();
        assert_eq!(diff.to_json(), json!({"missing_keys": ["a1"]}));
    }

    #[test]
    fn missing_key_at_depth_one() {
        let a = reference();
        let mut b = reference();
        b["b1"].as_object_mut().unwrap().remove("b12");
        let diff = compare_keys(&a, &b).unwrap();
        assert_eq!(
            diff.to_json(),
            json!({"nested_diff": {"b1": {"missing_keys": ["b12"]}}})
        );
    }

    #[test]
    fn missing_key_at_depth_two() {
        let a = reference();
        let mut b = reference();
        b["c1"]["c11"].as_object_mut().unwrap().remove("c113");
        let diff = compare_keys(&a, &b).unwrap();
        assert_eq!(
            diff.to_json(),
            json!({
                "nested_diff": {
                    "c1": {"nested_diff": {"c11": {"missing_keys": ["c113"]}}}
                }
            })
        );
    }

    #[test]
    fn replaced_nested_mapping_is_marked() {
        let a = reference();
        let mut b = reference();
        b["b1"] = json!("flattened");
        let diff = compare_keys(&a, &b).unwrap();
        assert_eq!(
            diff.to_json(),
            json!({"nested_diff": {"b1": "missing nested mapping"}})
        );
    }

    #[test]
    fn non_mappings_compare_equal() {
        assert_eq!(compare_keys(&json!(1), &json!("x")), None);
        assert_eq!(compare_keys(&json!([1, 2]), &json!([3])), None);
    }
}
