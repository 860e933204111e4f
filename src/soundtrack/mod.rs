//! Soundtrack albums: the music catalog API, the human album choice and
//! the resolver that records artists and albums.

mod chooser;
pub mod links;
mod resolver;
mod spotify;

pub use chooser::{AlbumChooser, Choice, ConsoleChooser};
pub use resolver::{record, AlbumSelection, RecordedAlbum, SoundtrackResolver};
pub use spotify::SpotifyClient;

use crate::error::PipelineResult;

/// One album search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumCandidate {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    /// Public album URL.
    pub link: String,
}

impl AlbumCandidate {
    /// All artist names joined into one display name.
    pub fn artist_display(&self) -> String {
        self.artists.join(", ")
    }
}

/// One track of an album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTrack {
    pub id: String,
    pub name: String,
    /// Public track URL; may be empty for local or unavailable tracks.
    pub link: String,
}

/// The music catalog the soundtracks come from.
pub trait MusicCatalog {
    fn search_albums(&mut self, query: &str, limit: u32) -> PipelineResult<Vec<AlbumCandidate>>;

    /// Every track of the album, all pages.
    fn album_tracks(&mut self, album_id: &str) -> PipelineResult<Vec<CatalogTrack>>;

    fn track_popularity(&mut self, track_id: &str) -> PipelineResult<i64>;
}

impl<T: MusicCatalog + ?Sized> MusicCatalog for &mut T {
    fn search_albums(&mut self, query: &str, limit: u32) -> PipelineResult<Vec<AlbumCandidate>> {
        (**self).search_albums(query, limit)
    }

    fn album_tracks(&mut self, album_id: &str) -> PipelineResult<Vec<CatalogTrack>> {
        (**self).album_tracks(album_id)
    }

    fn track_popularity(&mut self, track_id: &str) -> PipelineResult<i64> {
        (**self).track_popularity(track_id)
    }
}
