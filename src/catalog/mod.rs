//! Game metadata: the developer/game catalog API and the importer that
//! records developers and games.

pub mod genres;
mod importer;
mod rawg;

pub use importer::{parse_release_date, CatalogImporter, ImportSummary};
pub use rawg::RawgClient;

use crate::error::PipelineResult;

/// A developer as the catalog API knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogDeveloper {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogGame {
    pub title: String,
    /// `YYYY-MM-DD` as sent by the API, unparsed.
    pub released: Option<String>,
    /// Raw genre tag names.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamePage {
    pub games: Vec<CatalogGame>,
    pub has_next: bool,
}

/// Source of developer and game metadata.
pub trait GameCatalog {
    /// Best match for a developer display name. `NotFound` when the search
    /// returns nothing.
    fn find_developer(&self, name: &str) -> PipelineResult<CatalogDeveloper>;

    /// One page (1-based) of the developer's games.
    fn games_page(&self, developer_id: i64, page: u32) -> PipelineResult<GamePage>;
}

impl<T: GameCatalog + ?Sized> GameCatalog for &T {
    fn find_developer(&self, name: &str) -> PipelineResult<CatalogDeveloper> {
        (**self).find_developer(name)
    }

    fn games_page(&self, developer_id: i64, page: u32) -> PipelineResult<GamePage> {
        (**self).games_page(developer_id, page)
    }
}
