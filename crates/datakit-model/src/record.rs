//! Data model records.
//!
//! One retrieval produces one immutable [`DataModel`]: the original object,
//! its type-schema mirror, the synthesized JSON-Schema descriptor, the
//! serialized-mirror JSON text, and a flattened tabular projection. Records
//! can be persisted as a set of inspection files under a conventional
//! naming scheme.

use crate::flatten::{flatten, write_csv};
use crate::mirror::{apply_recursive, display_form, type_name, Mirror};
use crate::schema::schema_jsonify;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Aggregate result of one retrieval, derived entirely from the original
/// object and regenerated per extraction (no caching).
#[derive(Debug, Clone)]
pub struct DataModel {
    /// The retrieved object, untouched.
    pub obj: Value,
    /// Type-schema mirror: every leaf replaced by its runtime type name.
    pub schema: Mirror<String>,
    /// JSON-Schema-like descriptor synthesized from the type mirror.
    pub json_schema: Value,
    /// Pretty-printed JSON text of the display-form mirror, for objects
    /// that do not round-trip through JSON natively.
    pub serialized: String,
    /// Flattened `(column, value)` projection of the display-form mirror.
    pub normalized: Vec<(String, String)>,
}

impl DataModel {
    /// Extract all derived views from a retrieved object.
    pub fn extract(obj: Value) -> Result<Self> {
        let schema = apply_recursive(&|v| type_name(v).to_string(), &obj);
        let json_schema = schema_jsonify(&schema);
        let serialized_mirror = apply_recursive(&display_form, &obj);
        let serialized = serde_json::to_string_pretty(&serialized_mirror)
            .context("serializing display-form mirror")?;
        let normalized = flatten(&serialized_mirror);
        Ok(DataModel {
            obj,
            schema,
            json_schema,
            serialized,
            normalized,
        })
    }

    /// Persist the record under `out_dir` using the conventional names:
    ///
    /// - `<source>_<kind>_schema.json` — type-schema mirror
    /// - `<source>_<kind>_json_schema.json` — JSON-Schema descriptor
    /// - `<source>_<title>_obj.json` — serialized mirror
    /// - `<source>_<title>_df.csv` — flattened projection
    ///
    /// `title` is slugified (lowercase, spaces to underscores) before use.
    /// The directory is created if absent.
    pub fn save(&self, out_dir: &Path, source: &str, kind: &str, title: &str) -> Result<SavedPaths> {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("creating output directory {}", out_dir.display()))?;

        let title = slugify(title);
        let kind = slugify(kind);

        let schema_path = out_dir.join(format!("{source}_{kind}_schema.json"));
        let schema_text =
            serde_json::to_string_pretty(&self.schema).context("serializing type schema")?;
        fs::write(&schema_path, schema_text)
            .with_context(|| format!("writing {}", schema_path.display()))?;

        let json_schema_path = out_dir.join(format!("{source}_{kind}_json_schema.json"));
        let json_schema_text = serde_json::to_string_pretty(&self.json_schema)
            .context("serializing JSON-Schema descriptor")?;
        fs::write(&json_schema_path, json_schema_text)
            .with_context(|| format!("writing {}", json_schema_path.display()))?;

        let obj_path = out_dir.join(format!("{source}_{title}_obj.json"));
        fs::write(&obj_path, &self.serialized)
            .with_context(|| format!("writing {}", obj_path.display()))?;

        let table_path = out_dir.join(format!("{source}_{title}_df.csv"));
        let mut table_bytes = Vec::new();
        write_csv(&self.normalized, &mut table_bytes).context("building CSV projection")?;
        fs::write(&table_path, table_bytes)
            .with_context(|| format!("writing {}", table_path.display()))?;

        Ok(SavedPaths {
            schema: schema_path,
            json_schema: json_schema_path,
            obj: obj_path,
            table: table_path,
        })
    }
}

/// Paths written by [`DataModel::save`].
#[derive(Debug, Clone)]
pub struct SavedPaths {
    pub schema: PathBuf,
    pub json_schema: PathBuf,
    pub obj: PathBuf,
    pub table: PathBuf,
}

/// Lowercase, space-to-underscore normalization for file names.
pub fn slugify(text: &str) -> String {
    text.to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn album() -> Value {
        json!({
            "type": "album",
            "url": "link.com",
            "audio_features": [
                {"loudness": -11.4, "duration_ms": 251},
                {"loudness": -15.5, "duration_ms": 284}
            ]
        })
    }

    #[test]
    fn extract_produces_consistent_views() {
        let record = DataModel::extract(album()).unwrap();

        let schema_json = serde_json::to_value(&record.schema).unwrap();
        assert_eq!(schema_json["type"], "str");
        assert_eq!(schema_json["audio_features"]["1"]["loudness"], "float");

        assert_eq!(
            record.json_schema["properties"]["audio_features"]["maxItems"],
            2
        );

        // The serialized text parses back into a plain JSON object.
        let reparsed: Value = serde_json::from_str(&record.serialized).unwrap();
        assert_eq!(reparsed["url"], "link.com");
        assert_eq!(reparsed["audio_features"]["2"]["duration_ms"], "284");

        assert!(record
            .normalized
            .contains(&("audio_features.1.loudness".to_string(), "-11.4".to_string())));
    }

    #[test]
    fn save_uses_conventional_names() {
        let dir = tempfile::tempdir().unwrap();
        let record = DataModel::extract(album()).unwrap();
        let paths = record
            .save(dir.path(), "spotify", "Album", "Kid A")
            .unwrap();

        assert_eq!(
            paths.schema.file_name().unwrap(),
            "spotify_album_schema.json"
        );
        assert_eq!(
            paths.json_schema.file_name().unwrap(),
            "spotify_album_json_schema.json"
        );
        assert_eq!(paths.obj.file_name().unwrap(), "spotify_kid_a_obj.json");
        assert_eq!(paths.table.file_name().unwrap(), "spotify_kid_a_df.csv");

        let table = fs::read_to_string(&paths.table).unwrap();
        let header = table.lines().next().unwrap();
        assert!(header.contains("audio_features.1.duration_ms"));
    }

    #[test]
    fn slugify_normalizes_titles() {
        assert_eq!(slugify("Kid A"), "kid_a");
        assert_eq!(
            slugify("Eternal Sunshine of the Spotless Mind"),
            "eternal_sunshine_of_the_spotless_mind"
        );
    }
}
