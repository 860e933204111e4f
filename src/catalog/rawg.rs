use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::{CatalogDeveloper, CatalogGame, GameCatalog, GamePage};
use crate::config::CatalogConfig;
use crate::error::{PipelineError, PipelineResult};

const SERVICE: &str = "rawg";

/// Client for the RAWG video game database.
pub struct RawgClient {
    agent: ureq::Agent,
    base_url: String,
    key: String,
    page_size: u32,
    ordering: String,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeveloperResult {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct GameResult {
    name: String,
    released: Option<String>,
    #[serde(default)]
    genres: Option<Vec<GenreTag>>,
}

#[derive(Debug, Deserialize)]
struct GenreTag {
    name: String,
}

impl From<GameResult> for CatalogGame {
    fn from(game: GameResult) -> Self {
        Self {
            title: game.name,
            released: game.released,
            tags: game
                .genres
                .unwrap_or_default()
                .into_iter()
                .map(|g| g.name)
                .collect(),
        }
    }
}

impl From<Page<GameResult>> for GamePage {
    fn from(page: Page<GameResult>) -> Self {
        Self {
            has_next: page.next.is_some(),
            games: page.results.into_iter().map(CatalogGame::from).collect(),
        }
    }
}

fn first_developer(page: Page<DeveloperResult>, searched: &str) -> PipelineResult<CatalogDeveloper> {
    page.results
        .into_iter()
        .next()
        .map(|d| CatalogDeveloper { id: d.id, name: d.name })
        .ok_or_else(|| PipelineError::NotFound(format!("developer '{}'", searched)))
}

impl RawgClient {
    pub fn new(config: &CatalogConfig, key: String) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key,
            page_size: config.page_size,
            ordering: config.ordering.clone(),
        }
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> PipelineResult<T> {
        let url = format!("{}/{}", self.base_url, path);

        let mut request = self.agent.get(&url).query("key", &self.key);
        for (name, value) in query {
            request = request.query(name, value);
        }

        let response = request
            .call()
            .map_err(|e| PipelineError::from_http(SERVICE, e))?;
        let body = response.into_string().map_err(|e| PipelineError::Transport {
            service: SERVICE,
            message: e.to_string(),
        })?;

        serde_json::from_str(&body).map_err(|e| PipelineError::malformed("rawg response", e.to_string()))
    }
}

impl GameCatalog for RawgClient {
    fn find_developer(&self, name: &str) -> PipelineResult<CatalogDeveloper> {
        let page: Page<DeveloperResult> =
            self.get("developers", &[("search", name), ("page_size", "1")])?;
        let developer = first_developer(page, name)?;
        tracing::debug!(developer = %developer.name, id = developer.id, "Developer resolved");
        Ok(developer)
    }

    fn games_page(&self, developer_id: i64, page: u32) -> PipelineResult<GamePage> {
        let developer = developer_id.to_string();
        let page_number = page.to_string();
        let page_size = self.page_size.to_string();

        let body: Page<GameResult> = self.get(
            "games",
            &[
                ("developers", developer.as_str()),
                ("page", page_number.as_str()),
                ("page_size", page_size.as_str()),
                ("ordering", self.ordering.as_str()),
            ],
        )?;

        Ok(GamePage::from(body))
    }
}
