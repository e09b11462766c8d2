//! Spotify album retrieval.
//!
//! Client-credentials flow against the Spotify Web API: search for the
//! album, fetch its full detail, then enrich it with per-track audio
//! features and popularity. Track details are merged into the album object
//! under 1-based position keys so the result is one self-contained tree.
//! Requires `SPOTIFY_CLIENT_ID` and `SPOTIFY_CLIENT_SECRET`.

use crate::{keyed_object, MediaQuery, RetrieveError};
use serde_json::Value;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

pub struct SpotifyClient {
    http: reqwest::blocking::Client,
    client_id: String,
    client_secret: String,
}

impl SpotifyClient {
    pub fn from_env() -> Result<Self, RetrieveError> {
        let client_id = std::env::var("SPOTIFY_CLIENT_ID")
            .map_err(|_| RetrieveError::MissingCredentials("SPOTIFY_CLIENT_ID"))?;
        let client_secret = std::env::var("SPOTIFY_CLIENT_SECRET")
            .map_err(|_| RetrieveError::MissingCredentials("SPOTIFY_CLIENT_SECRET"))?;
        Ok(SpotifyClient {
            http: reqwest::blocking::Client::new(),
            client_id,
            client_secret,
        })
    }

    /// Retrieve album metadata merged with per-track details.
    pub fn retrieve(&self, query: &MediaQuery) -> Result<Value, RetrieveError> {
        let MediaQuery::Album { artist, title } = query else {
            return Err(RetrieveError::Unsupported {
                origin: "spotify",
                kind: query.kind(),
            });
        };

        let token = self.access_token()?;

        let results = self.get(
            &token,
            &format!("{API_BASE}/search"),
            &[
                ("q", format!("artist:{artist} album:{title}").as_str()),
                ("type", "album"),
                ("limit", "5"),
            ],
        )?;
        let Some(album_id) = first_album_id(&results) else {
            return Err(RetrieveError::not_found(query));
        };
        tracing::debug!(%album_id, "resolved spotify album");

        let mut album = self.get(&token, &format!("{API_BASE}/albums/{album_id}"), &[])?;
        let tracks = self.get(
            &token,
            &format!("{API_BASE}/albums/{album_id}/tracks"),
            &[],
        )?;

        // Enrich each track with its audio features and popularity.
        let mut track_audio_features = Vec::new();
        let mut track_streams = Vec::new();
        for track_id in track_ids(&tracks) {
            let features = self.get(
                &token,
                &format!("{API_BASE}/audio-features/{track_id}"),
                &[],
            )?;
            track_audio_features.push(features);

            let track = self.get(&token, &format!("{API_BASE}/tracks/{track_id}"), &[])?;
            track_streams.push(track.get("popularity").cloned().unwrap_or(Value::Null));
        }

        merge_track_details(&mut album, track_audio_features, track_streams);
        Ok(album)
    }

    fn access_token(&self) -> Result<String, RetrieveError> {
        let body: Value = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()?
            .error_for_status()?
            .json()?;
        body.get("access_token")
            .and_then(Value::as_str)
            .map(|token| token.to_string())
            .ok_or_else(|| RetrieveError::Api {
                origin: "spotify",
                message: "token response has no access_token".to_string(),
            })
    }

    fn get(&self, token: &str, url: &str, params: &[(&str, &str)]) -> Result<Value, RetrieveError> {
        Ok(self
            .http
            .get(url)
            .bearer_auth(token)
            .query(params)
            .send()?
            .error_for_status()?
            .json()?)
    }
}

/// Id of the first album hit, if the search matched anything.
fn first_album_id(results: &Value) -> Option<String> {
    let albums = results.get("albums")?;
    if albums.get("total").and_then(Value::as_u64) == Some(0) {
        return None;
    }
    albums
        .get("items")?
        .as_array()?
        .first()?
        .get("id")?
        .as_str()
        .map(|id| id.to_string())
}

/// Track ids from an album-tracks page, in listing order.
fn track_ids(tracks: &Value) -> Vec<String> {
    tracks
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|t| t.get("id")?.as_str().map(|id| id.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Merge per-track details into the album object under positional keys.
fn merge_track_details(album: &mut Value, features: Vec<Value>, streams: Vec<Value>) {
    if let Some(map) = album.as_object_mut() {
        map.insert("track_audio_features".to_string(), keyed_object(features));
        map.insert("track_streams".to_string(), keyed_object(streams));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_album_id_respects_total() {
        let empty = json!({"albums": {"total": 0, "items": []}});
        assert_eq!(first_album_id(&empty), None);

        let hit = json!({"albums": {"total": 1, "items": [{"id": "6GjwtEZcfenmOf6l18N7T7"}]}});
        assert_eq!(
            first_album_id(&hit),
            Some("6GjwtEZcfenmOf6l18N7T7".to_string())
        );
    }

    #[test]
    fn track_ids_in_listing_order() {
        let tracks = json!({"items": [{"id": "t1"}, {"id": "t2"}, {"name": "no id"}]});
        assert_eq!(track_ids(&tracks), vec!["t1", "t2"]);
    }

    #[test]
    fn merged_details_are_position_keyed() {
        let mut album = json!({"name": "kid A", "total_tracks": 2});
        merge_track_details(
            &mut album,
            vec![json!({"loudness": -11.4}), json!({"loudness": -15.5})],
            vec![json!(61), json!(59)],
        );
        assert_eq!(album["track_audio_features"]["1"]["loudness"], -11.4);
        assert_eq!(album["track_audio_features"]["2"]["loudness"], -15.5);
        assert_eq!(album["track_streams"], json!({"1": 61, "2": 59}));
    }
}
