//! Wikipedia infobox retrieval.
//!
//! Fetches a page's wikitext through the MediaWiki action API and extracts
//! its infobox into a flat field map. Infobox values keep their raw wiki
//! markup; [`omit_string_patterns`](crate::omit_string_patterns) can prune
//! it afterward. No credentials required.

use crate::{MediaQuery, RetrieveError};
use serde_json::{Map, Value};

const API_URL: &str = "https://en.wikipedia.org/w/api.php";
const USER_AGENT: &str = concat!("datakit/", env!("CARGO_PKG_VERSION"));

pub struct WikiClient {
    http: reqwest::blocking::Client,
}

impl WikiClient {
    pub fn new() -> Result<Self, RetrieveError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(WikiClient { http })
    }

    /// Retrieve the infobox of the page best matching the query title.
    ///
    /// Serves any query kind; Wikipedia covers films, albums, and books
    /// alike.
    pub fn retrieve(&self, query: &MediaQuery) -> Result<Value, RetrieveError> {
        let body: Value = self
            .http
            .get(API_URL)
            .query(&[
                ("action", "parse"),
                ("page", query.title()),
                ("prop", "wikitext"),
                ("redirects", "1"),
                ("format", "json"),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        if body.get("error").is_some() {
            return Err(RetrieveError::not_found(query));
        }
        let wikitext = body
            .pointer("/parse/wikitext/*")
            .and_then(Value::as_str)
            .ok_or_else(|| RetrieveError::Api {
                origin: "wikipedia",
                message: "parse response has no wikitext".to_string(),
            })?;

        let infobox = parse_infobox(wikitext);
        if infobox.is_empty() {
            return Err(RetrieveError::not_found(query));
        }
        Ok(Value::Object(infobox))
    }
}

/// Extract the first `{{Infobox ...}}` template from wikitext as a flat
/// field map. Values keep their raw markup; fields with empty names or
/// values are dropped.
pub fn parse_infobox(wikitext: &str) -> Map<String, Value> {
    let mut fields = Map::new();
    let Some(block) = infobox_block(wikitext) else {
        return fields;
    };

    // Inner text without the surrounding braces.
    let inner = &block[2..block.len() - 2];

    // The first top-level segment is the template name; the rest are
    // `key = value` fields.
    for segment in top_level_segments(inner).into_iter().skip(1) {
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        fields.insert(key.to_string(), Value::String(value.to_string()));
    }
    fields
}

/// Locate the full `{{Infobox ...}}` block, including nested templates.
fn infobox_block(wikitext: &str) -> Option<&str> {
    // ASCII case-insensitive byte scan; lowercasing the whole text could
    // shift byte offsets for non-ASCII characters.
    let start = wikitext
        .as_bytes()
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"{{infobox"))?;
    let mut depth = 0usize;
    let mut i = start;
    while i < wikitext.len() {
        let rest = &wikitext[i..];
        if rest.starts_with("{{") {
            depth += 1;
            i += 2;
        } else if rest.starts_with("}}") {
            depth = depth.saturating_sub(1);
            i += 2;
            if depth == 0 {
                return Some(&wikitext[start..i]);
            }
        } else {
            i += rest.chars().next()?.len_utf8();
        }
    }
    None
}

/// Split template text on `|` separators that sit outside nested templates
/// and wiki links, so multi-valued markup stays within one field.
fn top_level_segments(inner: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut brace_depth = 0usize;
    let mut bracket_depth = 0usize;
    let mut i = 0;

    while i < inner.len() {
        let rest = &inner[i..];
        if rest.starts_with("{{") {
            brace_depth += 1;
            current.push_str("{{");
            i += 2;
        } else if rest.starts_with("}}") {
            brace_depth = brace_depth.saturating_sub(1);
            current.push_str("}}");
            i += 2;
        } else if rest.starts_with("[[") {
            bracket_depth += 1;
            current.push_str("[[");
            i += 2;
        } else if rest.starts_with("]]") {
            bracket_depth = bracket_depth.saturating_sub(1);
            current.push_str("]]");
            i += 2;
        } else {
            let Some(c) = rest.chars().next() else { break };
            if c == '|' && brace_depth == 0 && bracket_depth == 0 {
                segments.push(std::mem::take(&mut current));
            } else {
                current.push(c);
            }
            i += c.len_utf8();
        }
    }
    segments.push(current);
    segments
}
