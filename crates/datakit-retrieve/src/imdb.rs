//! IMDb film retrieval.
//!
//! Two-step routine: resolve the best-matching title id through the IMDb
//! suggestion endpoint, then fetch the full record from OMDb (which serves
//! IMDb data as plain JSON, keyed by the tt id). Requires `OMDB_API_KEY`.

use crate::{MediaQuery, RetrieveError};
use serde_json::Value;

const SUGGESTION_BASE: &str = "https://v2.sg.media-imdb.com/suggestion";
const OMDB_BASE: &str = "https://www.omdbapi.com/";

pub struct ImdbClient {
    http: reqwest::blocking::Client,
    omdb_api_key: String,
}

impl ImdbClient {
    pub fn from_env() -> Result<Self, RetrieveError> {
        let omdb_api_key = std::env::var("OMDB_API_KEY")
            .map_err(|_| RetrieveError::MissingCredentials("OMDB_API_KEY"))?;
        Ok(ImdbClient {
            http: reqwest::blocking::Client::new(),
            omdb_api_key,
        })
    }

    /// Retrieve full film metadata for the query's title.
    pub fn retrieve(&self, query: &MediaQuery) -> Result<Value, RetrieveError> {
        let MediaQuery::Film { title } = query else {
            return Err(RetrieveError::Unsupported {
                origin: "imdb",
                kind: query.kind(),
            });
        };

        let suggestions = self.search(title)?;
        let Some(title_id) = first_title_id(&suggestions) else {
            return Err(RetrieveError::not_found(query));
        };
        tracing::debug!(%title_id, "resolved imdb title");

        let record = self.omdb_record(&title_id)?;
        if !omdb_found(&record) {
            return Err(RetrieveError::not_found(query));
        }
        Ok(record)
    }

    fn search(&self, title: &str) -> Result<Value, RetrieveError> {
        let slug = title.to_lowercase().replace(' ', "_");
        let first = slug
            .chars()
            .find(|c| c.is_ascii_alphanumeric())
            .unwrap_or('x');
        let url = format!("{SUGGESTION_BASE}/{first}/{slug}.json");
        Ok(self.http.get(url).send()?.error_for_status()?.json()?)
    }

    fn omdb_record(&self, title_id: &str) -> Result<Value, RetrieveError> {
        Ok(self
            .http
            .get(OMDB_BASE)
            .query(&[
                ("apikey", self.omdb_api_key.as_str()),
                ("i", title_id),
                ("plot", "full"),
            ])
            .send()?
            .error_for_status()?
            .json()?)
    }
}

/// First suggestion entry that is a title (tt id), skipping people and
/// keyword entries.
fn first_title_id(suggestions: &Value) -> Option<String> {
    suggestions
        .get("d")?
        .as_array()?
        .iter()
        .filter_map(|entry| entry.get("id")?.as_str())
        .find(|id| id.starts_with("tt"))
        .map(|id| id.to_string())
}

/// OMDb signals a miss with `"Response": "False"` rather than an HTTP error.
fn omdb_found(record: &Value) -> bool {
    record.get("Response").and_then(Value::as_str) != Some("False")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_title_id_skips_non_titles() {
        let suggestions = json!({
            "d": [
                {"id": "nm0350453", "l": "Michel Gondry"},
                {"id": "tt0338013", "l": "Eternal Sunshine of the Spotless Mind"},
                {"id": "tt1234567", "l": "Another Title"}
            ]
        });
        assert_eq!(first_title_id(&suggestions), Some("tt0338013".to_string()));
    }

    #[test]
    fn empty_suggestions_resolve_to_none() {
        assert_eq!(first_title_id(&json!({"d": []})), None);
        assert_eq!(first_title_id(&json!({})), None);
    }

    #[test]
    fn omdb_miss_detection() {
        assert!(!omdb_found(
            &json!({"Response": "False", "Error": "Incorrect IMDb ID."})
        ));
        assert!(omdb_found(&json!({"Response": "True", "Title": "Kid A"})));
    }
}
