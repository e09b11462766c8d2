//! Declarative data models and validation.
//!
//! Retrieved data is messy; rather than validating raw API responses
//! against auto-inferred schemas, processed objects are checked against
//! hand-authored models before loading. A model is a flat list of field
//! constraints; validation collects every violation instead of stopping at
//! the first, so a whole record can be fixed in one pass.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Lowercase comma-separated words, no numerics or special characters.
const CSV_STR: &str = r"^[a-z, ]+$";
/// Lowercase comma-separated text, numerics and light punctuation allowed.
const CSV_NUM_STR: &str = r"^[a-z0-9,.! ]+$";

/// A single constraint violation: where, what, and the offending value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub path: String,
    pub constraint: String,
    pub value: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (input: {})",
            self.path, self.constraint, self.value
        )
    }
}

/// Validation failure carrying every violation found, not just the first.
#[derive(Debug, Clone, Error)]
#[error("{} validation error(s) for {model}", .violations.len())]
pub struct ValidationError {
    pub model: String,
    pub violations: Vec<FieldViolation>,
}

/// Expected JSON type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    /// Integer numbers only.
    Int,
    /// Any number, integer or float.
    Number,
    Bool,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::Str => value.is_string(),
            FieldKind::Int => value.as_i64().is_some() || value.as_u64().is_some(),
            FieldKind::Number => value.is_number(),
            FieldKind::Bool => value.is_boolean(),
        }
    }

    fn expectation(self) -> &'static str {
        match self {
            FieldKind::Str => "input should be a string",
            FieldKind::Int => "input should be an integer",
            FieldKind::Number => "input should be a number",
            FieldKind::Bool => "input should be a boolean",
        }
    }
}

/// Bound of a numeric range constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Bound {
    Inclusive(f64),
    Exclusive(f64),
}

/// Declarative constraints for one field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    required: bool,
    pattern: Option<Regex>,
    min: Option<Bound>,
    max: Option<Bound>,
    options: Option<Vec<String>>,
}

impl FieldSpec {
    fn new(name: &str, kind: FieldKind) -> Self {
        FieldSpec {
            name: name.to_string(),
            kind,
            required: true,
            pattern: None,
            min: None,
            max: None,
            options: None,
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, FieldKind::Str)
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, FieldKind::Int)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Regex the whole string value must match. Patterns are programmer
    /// constants, so compilation failure is a programming error.
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(Regex::new(pattern).expect("field pattern must be a valid regex"));
        self
    }

    /// Inclusive lower bound.
    pub fn ge(mut self, min: f64) -> Self {
        self.min = Some(Bound::Inclusive(min));
        self
    }

    /// Exclusive lower bound.
    pub fn gt(mut self, min: f64) -> Self {
        self.min = Some(Bound::Exclusive(min));
        self
    }

    /// Inclusive upper bound.
    pub fn le(mut self, max: f64) -> Self {
        self.max = Some(Bound::Inclusive(max));
        self
    }

    /// Allowed values for a categorical string field.
    pub fn options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|s| s.to_string()).collect());
        self
    }

    fn check(&self, value: &Value, violations: &mut Vec<FieldViolation>) {
        if !self.kind.matches(value) {
            violations.push(FieldViolation {
                path: self.name.clone(),
                constraint: self.kind.expectation().to_string(),
                value: value.to_string(),
            });
            return;
        }

        if let (Some(pattern), Some(text)) = (&self.pattern, value.as_str()) {
            if !pattern.is_match(text) {
                violations.push(FieldViolation {
                    path: self.name.clone(),
                    constraint: format!("string should match pattern '{pattern}'"),
                    value: value.to_string(),
                });
            }
        }

        if let (Some(options), Some(text)) = (&self.options, value.as_str()) {
            if !options.iter().any(|o| o == text) {
                violations.push(FieldViolation {
                    path: self.name.clone(),
                    constraint: format!("input should be one of {options:?}"),
                    value: value.to_string(),
                });
            }
        }

        if let Some(number) = value.as_f64() {
            match self.min {
                Some(Bound::Inclusive(min)) if number < min => {
                    violations.push(FieldViolation {
                        path: self.name.clone(),
                        constraint: format!("input should be greater than or equal to {min}"),
                        value: value.to_string(),
                    });
                }
                Some(Bound::Exclusive(min)) if number <= min => {
                    violations.push(FieldViolation {
                        path: self.name.clone(),
                        constraint: format!("input should be greater than {min}"),
                        value: value.to_string(),
                    });
                }
                _ => {}
            }
            match self.max {
                Some(Bound::Inclusive(max)) if number > max => {
                    violations.push(FieldViolation {
                        path: self.name.clone(),
                        constraint: format!("input should be less than or equal to {max}"),
                        value: value.to_string(),
                    });
                }
                Some(Bound::Exclusive(max)) if number >= max => {
                    violations.push(FieldViolation {
                        path: self.name.clone(),
                        constraint: format!("input should be less than {max}"),
                        value: value.to_string(),
                    });
                }
                _ => {}
            }
        }
    }
}

/// A named collection of field constraints.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl ModelSpec {
    pub fn new(name: &str, fields: Vec<FieldSpec>) -> Self {
        ModelSpec {
            name: name.to_string(),
            fields,
        }
    }

    /// Validate an object against the model, collecting every violation.
    ///
    /// Fields not declared by the model are ignored; a declared optional
    /// field that is absent or null is skipped.
    pub fn validate(&self, obj: &Value) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        for field in &self.fields {
            match obj.get(&field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        violations.push(FieldViolation {
                            path: field.name.clone(),
                            constraint: "field required".to_string(),
                            value: "missing".to_string(),
                        });
                    }
                }
                Some(value) => field.check(value, &mut violations),
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                model: self.name.clone(),
                violations,
            })
        }
    }
}

/// Look up a built-in model by name.
pub fn builtin(name: &str) -> Option<ModelSpec> {
    match name {
        "imdb_film" => Some(imdb_film()),
        "spotify_album" => Some(spotify_album()),
        "wiki_book" => Some(wiki_book()),
        "wiki_film" => Some(wiki_film()),
        "wiki_album" => Some(wiki_album()),
        _ => None,
    }
}

/// Names of all built-in models.
pub fn builtin_names() -> &'static [&'static str] {
    &[
        "imdb_film",
        "spotify_album",
        "wiki_book",
        "wiki_film",
        "wiki_album",
    ]
}

/// Model for processed IMDb film metadata.
pub fn imdb_film() -> ModelSpec {
    ModelSpec::new(
        "imdb_film",
        vec![
            // Identifiers
            FieldSpec::string("title").pattern(CSV_NUM_STR),
            FieldSpec::string("imdb_id").pattern(r"^tt.*\d{7}$"),
            FieldSpec::string("kind").pattern(CSV_STR),
            // Numeric
            FieldSpec::integer("year").ge(1880.0).le(3000.0),
            FieldSpec::number("rating").ge(0.0).le(10.0),
            FieldSpec::integer("votes").ge(0.0),
            FieldSpec::number("runtime_mins").gt(0.0).optional(),
            // String lists
            FieldSpec::string("genres").pattern(CSV_STR).optional(),
            FieldSpec::string("countries").pattern(CSV_STR).optional(),
            FieldSpec::string("director").pattern(CSV_STR).optional(),
            FieldSpec::string("writer").pattern(CSV_STR).optional(),
            FieldSpec::string("composer").pattern(CSV_STR).optional(),
            FieldSpec::string("cast").pattern(CSV_STR).optional(),
            // Free text
            FieldSpec::string("plot").pattern(CSV_NUM_STR).optional(),
            FieldSpec::string("synopsis").pattern(CSV_NUM_STR).optional(),
            FieldSpec::string("plot_outline").pattern(CSV_NUM_STR).optional(),
            // Financial
            FieldSpec::number("budget_mil").ge(0.0).optional(),
            FieldSpec::number("opening_weekend_gross_mil").ge(0.0).optional(),
            FieldSpec::number("cumulative_worldwide_gross_mil")
                .ge(0.0)
                .optional(),
        ],
    )
}

/// Model for processed Spotify album metadata.
pub fn spotify_album() -> ModelSpec {
    ModelSpec::new(
        "spotify_album",
        vec![
            FieldSpec::string("title"),
            FieldSpec::string("album_type").options(&["album", "single", "compilation"]),
        ],
    )
}

/// Model for processed Wikipedia novel metadata.
pub fn wiki_book() -> ModelSpec {
    ModelSpec::new("wiki_book", vec![FieldSpec::string("title")])
}

/// Model for processed Wikipedia film metadata.
pub fn wiki_film() -> ModelSpec {
    ModelSpec::new("wiki_film", vec![FieldSpec::string("title")])
}

/// Model for processed Wikipedia album metadata.
pub fn wiki_album() -> ModelSpec {
    ModelSpec::new("wiki_album", vec![FieldSpec::string("title")])
}
