//! Tabular projection of a mirror.
//!
//! Flattens a serialized mirror into one header row of dot-joined paths and
//! one row of leaf values, in mirror order. The projection is written as CSV
//! for quick inspection in a spreadsheet or dataframe library.

use crate::mirror::Mirror;
use std::io;

/// Flatten a mirror into `(column, value)` pairs.
///
/// Columns are dot-joined paths; positional keys from linearized sequences
/// appear as their decimal form, e.g. `audio_features.1.loudness`.
pub fn flatten(mirror: &Mirror<String>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    walk(mirror, &mut path, &mut out);
    out
}

fn walk(mirror: &Mirror<String>, path: &mut Vec<String>, out: &mut Vec<(String, String)>) {
    match mirror {
        Mirror::Leaf(value) => out.push((path.join("."), value.clone())),
        Mirror::Map(entries) => {
            for (key, value) in entries {
                path.push(key.to_string());
                walk(value, path, out);
                path.pop();
            }
        }
    }
}

/// Write flattened pairs as a two-row CSV table (header + single record).
pub fn write_csv<W: io::Write>(rows: &[(String, String)], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(rows.iter().map(|(column, _)| column.as_str()))?;
    csv_writer.write_record(rows.iter().map(|(_, value)| value.as_str()))?;
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::{apply_recursive, display_form};
    use serde_json::json;

    fn serialized_mirror(value: &serde_json::Value) -> Mirror<String> {
        apply_recursive(&display_form, value)
    }

    #[test]
    fn paths_are_dot_joined() {
        let mirror = serialized_mirror(&json!({
            "genres": ["drama", "romance"],
            "meta": {"year": 2004}
        }));
        assert_eq!(
            flatten(&mirror),
            vec![
                ("genres.1".to_string(), "drama".to_string()),
                ("genres.2".to_string(), "romance".to_string()),
                ("meta.year".to_string(), "2004".to_string()),
            ]
        );
    }

    #[test]
    fn scalar_root_flattens_to_empty_path() {
        let mirror = serialized_mirror(&json!("just a title"));
        assert_eq!(
            flatten(&mirror),
            vec![("".to_string(), "just a title".to_string())]
        );
    }

    #[test]
    fn csv_has_header_and_one_record() {
        let mirror = serialized_mirror(&json!({"title": "kid A", "total_tracks": 11}));
        let rows = flatten(&mirror);
        let mut buffer = Vec::new();
        write_csv(&rows, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "title,total_tracks\nkid A,11\n");
    }
}
