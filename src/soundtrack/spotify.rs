use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration as TokenLifetime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::{AlbumCandidate, CatalogTrack, MusicCatalog};
use crate::config::SoundtrackConfig;
use crate::error::{PipelineError, PipelineResult};

const SERVICE: &str = "spotify";

/// Spotify Web API client using the client-credentials flow.
///
/// The access token is cached with its expiry. An expired token is replaced
/// before the next request, and a 401 drops the token and retries. A 429
/// sleeps for the advertised `Retry-After` and retries, up to `max_retries`.
pub struct SpotifyClient {
    agent: ureq::Agent,
    accounts_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
    max_retries: u8,
    tracks_page_size: u32,
    token: Option<AccessToken>,
}

struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct Paging<T> {
    items: Vec<Option<T>>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    albums: Paging<AlbumObject>,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumObject {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistObject>,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    id: Option<String>,
    name: String,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct TrackDetails {
    popularity: i64,
}

impl From<AlbumObject> for AlbumCandidate {
    fn from(album: AlbumObject) -> Self {
        Self {
            id: album.id,
            name: album.name,
            artists: album.artists.into_iter().map(|a| a.name).collect(),
            link: album.external_urls.spotify.unwrap_or_default(),
        }
    }
}

impl From<TrackObject> for CatalogTrack {
    fn from(track: TrackObject) -> Self {
        Self {
            id: track.id.unwrap_or_default(),
            name: track.name,
            link: track.external_urls.spotify.unwrap_or_default(),
        }
    }
}

/// Wait before retrying a 429: `Retry-After` plus one second plus the retry
/// count, or five seconds when the header is missing.
fn retry_delay(retry_after: Option<&str>, retry: u8) -> Duration {
    match retry_after.and_then(|v| v.trim().parse::<u64>().ok()) {
        Some(seconds) => Duration::from_secs(seconds + 1 + u64::from(retry)),
        None => Duration::from_secs(5),
    }
}

impl SpotifyClient {
    /// Build the client and fetch the first access token. Rejected
    /// credentials surface here as `Auth`.
    pub fn connect(config: &SoundtrackConfig, client_id: String, client_secret: String) -> PipelineResult<Self> {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();

        let mut client = Self {
            agent,
            accounts_url: config.accounts_url.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
            max_retries: config.max_retries,
            tracks_page_size: config.tracks_page_size,
            token: None,
        };
        client.access_token()?;
        Ok(client)
    }

    fn request_token(&self) -> PipelineResult<AccessToken> {
        let credentials = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));

        let response = self
            .agent
            .post(&self.accounts_url)
            .set("Authorization", &format!("Basic {}", credentials))
            .send_form(&[("grant_type", "client_credentials")])
            .map_err(|e| match e {
                ureq::Error::Status(status, response) => PipelineError::Auth {
                    service: SERVICE,
                    message: format!("token endpoint answered {}: {}", status, response.into_string().unwrap_or_default()),
                },
                other => PipelineError::from_http(SERVICE, other),
            })?;

        let token: TokenResponse = response
            .into_json()
            .map_err(|e| PipelineError::malformed("token response", e.to_string()))?;

        tracing::debug!(expires_in = token.expires_in, "Access token obtained");

        Ok(AccessToken {
            value: token.access_token,
            expires_at: Utc::now() + TokenLifetime::seconds(token.expires_in),
        })
    }

    fn access_token(&mut self) -> PipelineResult<String> {
        match &self.token {
            Some(token) if Utc::now() < token.expires_at => Ok(token.value.clone()),
            _ => {
                let token = self.request_token()?;
                let value = token.value.clone();
                self.token = Some(token);
                Ok(value)
            }
        }
    }

    fn get_json<T: DeserializeOwned>(&mut self, url: &str, query: &[(&str, &str)]) -> PipelineResult<T> {
        let mut retry: u8 = 0;

        loop {
            let token = self.access_token()?;
            let mut request = self
                .agent
                .get(url)
                .set("Authorization", &format!("Bearer {}", token));
            for (name, value) in query {
                request = request.query(name, value);
            }

            match request.call() {
                Ok(response) => {
                    return response
                        .into_json()
                        .map_err(|e| PipelineError::malformed("spotify response", e.to_string()));
                }
                Err(ureq::Error::Status(401, _)) if retry < self.max_retries => {
                    tracing::debug!(retry, "Unauthorized; requesting a new access token");
                    self.token = None;
                }
                Err(ureq::Error::Status(429, response)) => {
                    if retry >= self.max_retries {
                        return Err(PipelineError::RateLimited { service: SERVICE, retries: retry });
                    }
                    let delay = retry_delay(response.header("Retry-After"), retry);
                    tracing::warn!(?delay, retry, "Rate limited; backing off");
                    std::thread::sleep(delay);
                }
                Err(e) => return Err(PipelineError::from_http(SERVICE, e)),
            }

            retry += 1;
        }
    }
}

impl MusicCatalog for SpotifyClient {
    fn search_albums(&mut self, query: &str, limit: u32) -> PipelineResult<Vec<AlbumCandidate>> {
        let url = format!("{}/search", self.api_url);
        let limit = limit.to_string();
        let response: SearchResponse = self.get_json(
            &url,
            &[("q", query), ("type", "album"), ("limit", limit.as_str())],
        )?;
        Ok(response
            .albums
            .items
            .into_iter()
            .flatten()
            .map(AlbumCandidate::from)
            .collect())
    }

    fn album_tracks(&mut self, album_id: &str) -> PipelineResult<Vec<CatalogTrack>> {
        let first = format!("{}/albums/{}/tracks", self.api_url, album_id);
        let limit = self.tracks_page_size.to_string();

        let mut page: Paging<TrackObject> =
            self.get_json(&first, &[("limit", limit.as_str()), ("offset", "0")])?;
        let mut tracks = Vec::new();

        loop {
            tracks.extend(page.items.into_iter().flatten().map(CatalogTrack::from));
            match page.next {
                // `next` already carries limit and offset.
                Some(next) => page = self.get_json(&next, &[])?,
                None => break,
            }
        }

        tracing::debug!(album_id, tracks = tracks.len(), "Album tracks fetched");
        Ok(tracks)
    }

    fn track_popularity(&mut self, track_id: &str) -> PipelineResult<i64> {
        let url = format!("{}/tracks/{}", self.api_url, track_id);
        let details: TrackDetails = self.get_json(&url, &[])?;
        Ok(details.popularity)
    }
}
