//! Nested-value mirrors.
//!
//! Deserialized API responses arrive as arbitrarily nested `serde_json::Value`
//! trees of unknown shape. This module walks such a tree and produces an
//! isomorphic *mirror* in which every scalar leaf has been replaced by some
//! projection of it (its type name, its display form, ...). Sequences are
//! linearized into 1-based positional keys on the way down so the mirror is
//! always a tree of maps over leaves.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::fmt;

/// Hard cap on sampled sequence elements during recursion.
///
/// Large collections (track listings, cast lists) are sampled rather than
/// mirrored in full; five elements are enough to infer a data dictionary.
pub const SAMPLE_CAP: usize = 5;

/// Key of a mirror map entry.
///
/// `Index` keys are produced by [`list_to_dict`] when a sequence is
/// linearized; `Name` keys come from mapping inputs unchanged. Keeping the
/// two cases distinct lets the schema synthesizer tell normalized sequences
/// apart from genuine objects without probing key strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorKey {
    /// 1-based position within a linearized sequence.
    Index(u64),
    /// Field name of a mapping.
    Name(String),
}

impl fmt::Display for MirrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MirrorKey::Index(i) => write!(f, "{i}"),
            MirrorKey::Name(s) => f.write_str(s),
        }
    }
}

impl Serialize for MirrorKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A nested value isomorphic to some input tree, with every scalar leaf
/// replaced by a payload of type `T`.
///
/// Entries keep insertion order, so "first key" and "highest index key" are
/// well-defined for the schema synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mirror<T> {
    Leaf(T),
    Map(Vec<(MirrorKey, Mirror<T>)>),
}

impl<T: Serialize> Serialize for Mirror<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Mirror::Leaf(value) => value.serialize(serializer),
            Mirror::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Linearize a value into key/value pairs with 1-based positional keys.
///
/// - Sequences yield `Index` keys `1..=n`, truncated at `max_items` when a
///   cap is supplied.
/// - Mappings pass through unchanged as `Name` pairs; this is documented
///   behavior, not a silent coercion, so a diagnostic is emitted.
/// - Scalars enumerate nothing.
pub fn list_to_dict(value: &Value, max_items: Option<usize>) -> Vec<(MirrorKey, &Value)> {
    match value {
        Value::Object(map) => {
            tracing::debug!("input is already a mapping; passing it through unchanged");
            map.iter()
                .map(|(k, v)| (MirrorKey::Name(k.clone()), v))
                .collect()
        }
        Value::Array(items) => {
            let cap = max_items.unwrap_or(items.len());
            items
                .iter()
                .take(cap)
                .enumerate()
                .map(|(i, v)| (MirrorKey::Index(i as u64 + 1), v))
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Walk a nested value and apply `f` to every scalar leaf, producing an
/// isomorphic [`Mirror`].
///
/// Mappings recurse per key in insertion order. Sequences are first
/// linearized via [`list_to_dict`] with a hard cap of [`SAMPLE_CAP`]
/// elements. Strings are scalars here: the tagged `Value` union means they
/// never decompose into characters. `f` must be total over scalars; there is
/// no error path.
pub fn apply_recursive<T, F>(f: &F, value: &Value) -> Mirror<T>
where
    F: Fn(&Value) -> T,
{
    match value {
        Value::Object(map) => Mirror::Map(
            map.iter()
                .map(|(k, v)| (MirrorKey::Name(k.clone()), apply_recursive(f, v)))
                .collect(),
        ),
        Value::Array(_) => Mirror::Map(
            list_to_dict(value, Some(SAMPLE_CAP))
                .into_iter()
                .map(|(k, v)| (k, apply_recursive(f, v)))
                .collect(),
        ),
        leaf => Mirror::Leaf(f(leaf)),
    }
}

/// Runtime type name of a scalar, matching the names the schema synthesizer
/// branches on.
///
/// Containers never reach this through [`apply_recursive`]; they are named
/// honestly anyway so the function stays total.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "str",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Display form of a scalar, used to build the serialized mirror for values
/// that are not natively JSON-serializable once mirrored.
pub fn display_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn sequence_gets_one_based_keys() {
        let value = json!([1, "two", [3], {"four": 5}]);
        let keyed = list_to_dict(&value, None);
        let keys: Vec<&MirrorKey> = keyed.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                &MirrorKey::Index(1),
                &MirrorKey::Index(2),
                &MirrorKey::Index(3),
                &MirrorKey::Index(4)
            ]
        );
        assert_eq!(keyed[1].1, &json!("two"));
    }

    #[test]
    fn cap_truncates_long_sequences() {
        let value = json!([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let keyed = list_to_dict(&value, Some(5));
        assert_eq!(keyed.len(), 5);
        assert_eq!(keyed[0], (MirrorKey::Index(1), &json!(1)));
        assert_eq!(keyed[4], (MirrorKey::Index(5), &json!(5)));
    }

    #[test]
    fn mapping_passes_through_unchanged() {
        let value = json!({"a": 1, "b": "two"});
        let keyed = list_to_dict(&value, None);
        assert_eq!(
            keyed,
            vec![
                (MirrorKey::Name("a".to_string()), &json!(1)),
                (MirrorKey::Name("b".to_string()), &json!("two")),
            ]
        );
    }

    #[test]
    fn scalars_enumerate_nothing() {
        assert!(list_to_dict(&json!("hello"), None).is_empty());
        assert!(list_to_dict(&json!(42), Some(3)).is_empty());
    }

    #[test]
    fn type_mirror_of_nested_album() {
        let data = json!({
            "type": "album",
            "audio_features": [
                {"loudness": -11.4, "duration_ms": 251},
                {"loudness": -15.5, "duration_ms": 284}
            ]
        });
        let mirror = apply_recursive(&type_name, &data);
        let as_json = serde_json::to_value(&mirror).unwrap();
        assert_eq!(
            as_json,
            json!({
                "type": "str",
                "audio_features": {
                    "1": {"loudness": "float", "duration_ms": "int"},
                    "2": {"loudness": "float", "duration_ms": "int"}
                }
            })
        );
    }

    #[test]
    fn strings_do_not_decompose() {
        let mirror = apply_recursive(&type_name, &json!("spirited away"));
        assert_eq!(mirror, Mirror::Leaf("str"));
    }

    #[test]
    fn array_branch_samples_at_most_five() {
        let value = json!([0, 1, 2, 3, 4, 5, 6, 7, 8]);
        let mirror = apply_recursive(&type_name, &value);
        let Mirror::Map(entries) = mirror else {
            panic!("expected a map mirror for an array input");
        };
        assert_eq!(entries.len(), SAMPLE_CAP);
        assert_eq!(entries[SAMPLE_CAP - 1].0, MirrorKey::Index(5));
    }

    #[test]
    fn display_forms_are_json_tokens() {
        assert_eq!(display_form(&json!(null)), "null");
        assert_eq!(display_form(&json!(true)), "true");
        assert_eq!(display_form(&json!(-11.4)), "-11.4");
        assert_eq!(display_form(&json!(251)), "251");
        assert_eq!(display_form(&json!("kid A")), "kid A");
    }

    /// Shape of a mirror: per-level entry count and keys, ignoring leaves.
    fn mirror_shape(mirror: &Mirror<String>) -> Value {
        match mirror {
            Mirror::Leaf(_) => Value::Null,
            Mirror::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), mirror_shape(v)))
                    .collect(),
            ),
        }
    }

    /// Shape of a raw value restricted to the sampling cap.
    fn value_shape(value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), value_shape(v)))
                    .collect(),
            ),
            Value::Array(items) => Value::Object(
                items
                    .iter()
                    .take(SAMPLE_CAP)
                    .enumerate()
                    .map(|(i, v)| ((i + 1).to_string(), value_shape(v)))
                    .collect(),
            ),
            _ => Value::Null,
        }
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            // Finite floats only; NaN/inf are not JSON values.
            (-1e9f64..1e9f64).prop_map(Value::from),
            "[a-z ]{0,12}".prop_map(Value::from),
        ];
        leaf.prop_recursive(4, 32, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn mapper_preserves_shape_up_to_cap(value in arb_value()) {
            let mirror = apply_recursive(&|v| type_name(v).to_string(), &value);
            prop_assert_eq!(mirror_shape(&mirror), value_shape(&value));
        }
    }
}
