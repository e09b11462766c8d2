//! Schema synthesis.
//!
//! Turns a type-name mirror (the output of
//! [`apply_recursive`](crate::mirror::apply_recursive) with
//! [`type_name`](crate::mirror::type_name)) into a JSON-Schema-like
//! descriptor. The descriptor is meant for human inspection of API
//! responses, not for spec-compliant validation: array homogeneity is
//! assumed, every object field is marked required, and unrecognized leaves
//! fall through to `null`.

use crate::mirror::{Mirror, MirrorKey};
use serde_json::{json, Map, Value};

/// Synthesize a JSON-Schema-like descriptor from a type-name mirror.
///
/// Priority-ordered cases; the first match wins:
///
/// 1. non-empty map whose first key is positional → `array`. Bounds come
///    from the sampled element count and only the first element is recursed
///    on (homogeneity assumed).
/// 2. non-empty map otherwise → `object`, with every field required so the
///    result is easy to prune by hand afterward.
/// 3. leaf `"str"` → `string`.
/// 4. leaf `"int"` / `"float"` → `number`.
/// 5. anything else → `null`. This absorbs `"bool"`, `"null"`, empty maps,
///    and malformed input rather than raising; callers must be aware that
///    booleans and genuine nulls are conflated here.
pub fn schema_jsonify(mirror: &Mirror<String>) -> Value {
    match mirror {
        Mirror::Map(entries) if !entries.is_empty() => match &entries[0] {
            (MirrorKey::Index(_), first) => {
                // Highest positional key, i.e. the number of sampled elements.
                let max_items = entries
                    .iter()
                    .rev()
                    .find_map(|(k, _)| match k {
                        MirrorKey::Index(i) => Some(*i),
                        MirrorKey::Name(_) => None,
                    })
                    .unwrap_or(1);
                json!({
                    "type": "array",
                    "minItems": 1,
                    "maxItems": max_items,
                    "uniqueItems": true,
                    "items": schema_jsonify(first),
                })
            }
            _ => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for (key, value) in entries {
                    let name = key.to_string();
                    required.push(Value::String(name.clone()));
                    properties.insert(name, schema_jsonify(value));
                }
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                })
            }
        },
        Mirror::Leaf(name) if name == "str" => json!({ "type": "string" }),
        Mirror::Leaf(name) if name == "int" || name == "float" => json!({ "type": "number" }),
        _ => json!({ "type": "null" }),
    }
}
