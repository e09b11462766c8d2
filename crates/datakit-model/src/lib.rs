//! Data modeling for retrieved media metadata
//!
//! Core of the datakit toolkit:
//! - mirror a nested API response with type names or display forms at the leaves
//! - synthesize a JSON-Schema-like data dictionary from the type mirror
//! - diff nested objects by key to audit hand-edited models
//! - flatten a mirror into a one-row table for quick inspection
//! - validate processed objects against declarative field-constraint models
//!
//! Everything here is synchronous and pure per call; retrieval (the network
//! side) lives in `datakit-retrieve`.

pub mod diff;
pub mod flatten;
pub mod mirror;
pub mod record;
pub mod schema;
pub mod validate;

pub use diff::{compare_keys, KeyDiff};
pub use flatten::{flatten, write_csv};
pub use mirror::{
    apply_recursive, display_form, list_to_dict, type_name, Mirror, MirrorKey, SAMPLE_CAP,
};
pub use record::{slugify, DataModel, SavedPaths};
pub use schema::schema_jsonify;
pub use validate::{builtin, builtin_names, FieldSpec, FieldViolation, ModelSpec, ValidationError};
