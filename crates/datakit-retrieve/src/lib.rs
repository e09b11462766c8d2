//! Metadata retrieval for datakit
//!
//! Thin synchronous clients over third-party metadata APIs:
//! - IMDb title search + OMDb record fetch (films)
//! - Spotify Web API (albums, with per-track audio features)
//! - Wikipedia infobox extraction (books, films, albums)
//!
//! Each client performs the network call and hands back a plain
//! `serde_json::Value` tree; all schema inference and validation happens in
//! `datakit-model`. A query with no matching entity is a distinct
//! [`RetrieveError::NotFound`] carrying the attempted query, and is never
//! retried.

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

pub mod imdb;
pub mod spotify;
pub mod wikipedia;

pub use imdb::ImdbClient;
pub use spotify::SpotifyClient;
pub use wikipedia::WikiClient;

/// Search terms for one media lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaQuery {
    Film { title: String },
    Album { artist: String, title: String },
    Book { title: String },
}

impl MediaQuery {
    /// Lowercase kind name, used in output file names.
    pub fn kind(&self) -> &'static str {
        match self {
            MediaQuery::Film { .. } => "film",
            MediaQuery::Album { .. } => "album",
            MediaQuery::Book { .. } => "book",
        }
    }

    /// Primary search term.
    pub fn title(&self) -> &str {
        match self {
            MediaQuery::Film { title }
            | MediaQuery::Album { title, .. }
            | MediaQuery::Book { title } => title,
        }
    }
}

impl fmt::Display for MediaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaQuery::Film { title } => write!(f, "film \"{title}\""),
            MediaQuery::Album { artist, title } => write!(f, "album \"{title}\" by {artist}"),
            MediaQuery::Book { title } => write!(f, "book \"{title}\""),
        }
    }
}

/// Metadata source selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Imdb,
    Spotify,
    Wiki,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Imdb => "imdb",
            Source::Spotify => "spotify",
            Source::Wiki => "wiki",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "imdb" => Ok(Source::Imdb),
            "spotify" => Ok(Source::Spotify),
            "wiki" | "wikipedia" => Ok(Source::Wiki),
            other => Err(format!(
                "unknown source `{other}` (expected imdb, spotify, or wiki)"
            )),
        }
    }
}

/// Retrieval failure kinds. Single-shot; callers decide what to do next.
#[derive(Debug, Error)]
pub enum RetrieveError {
    /// The collaborator found no matching entity for the query.
    #[error("no result found for {query}")]
    NotFound { query: String },

    /// Required credentials are absent from the environment.
    #[error("missing credentials: set {0}")]
    MissingCredentials(&'static str),

    /// The source has no retrieval routine for this query kind.
    #[error("{origin} does not serve {kind} queries")]
    Unsupported {
        origin: &'static str,
        kind: &'static str,
    },

    /// The API answered, but not in the shape we expect.
    #[error("unexpected {origin} response: {message}")]
    Api {
        origin: &'static str,
        message: String,
    },

    #[error("http request failed")]
    Http(#[from] reqwest::Error),
}

impl RetrieveError {
    pub(crate) fn not_found(query: &MediaQuery) -> Self {
        RetrieveError::NotFound {
            query: query.to_string(),
        }
    }
}

/// Dispatch a query to the matching client, built from the environment.
pub fn retrieve(source: Source, query: &MediaQuery) -> Result<Value, RetrieveError> {
    match source {
        Source::Imdb => ImdbClient::from_env()?.retrieve(query),
        Source::Spotify => SpotifyClient::from_env()?.retrieve(query),
        Source::Wiki => WikiClient::new()?.retrieve(query),
    }
}

/// Build a JSON object keyed by 1-based position from a list of values.
///
/// Mirrors the positional keying the schema inference applies to sequences,
/// so merged per-track details land in the retrieved object already keyed.
pub(crate) fn keyed_object(items: Vec<Value>) -> Value {
    let mut map = Map::new();
    for (i, item) in items.into_iter().enumerate() {
        map.insert((i + 1).to_string(), item);
    }
    Value::Object(map)
}

/// Strip a list of literal patterns from a string in one pass.
///
/// Handy for pruning wiki markup (`[[`, `]]`, `{{nowrap|`, ...) out of
/// infobox values before analysis.
pub fn omit_string_patterns(input: &str, patterns: &[&str]) -> String {
    if patterns.is_empty() {
        return input.to_string();
    }
    let alternation = patterns
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    let re = regex::Regex::new(&alternation).expect("escaped literals form a valid regex");
    re.replace_all(input, "").into_owned()
}
