use super::{AlbumChooser, Choice, MusicCatalog};
use crate::config::SoundtrackConfig;
use crate::db::{Database, Upsert};
use crate::error::PipelineResult;

/// The album picked for a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumSelection {
    pub name: String,
    /// Artist names joined with ", ".
    pub artist: String,
    pub link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedAlbum {
    pub artist_id: i64,
    pub album: Upsert,
}

/// Finds soundtrack candidates for a game title and asks the chooser which
/// one is right.
pub struct SoundtrackResolver<M, C> {
    catalog: M,
    chooser: C,
    suffix: String,
    limit: u32,
}

impl<M: MusicCatalog, C: AlbumChooser> SoundtrackResolver<M, C> {
    pub fn new(catalog: M, chooser: C, config: &SoundtrackConfig) -> Self {
        Self {
            catalog,
            chooser,
            suffix: config.search_suffix.clone(),
            limit: config.search_limit,
        }
    }

    fn query(&self, game_title: &str) -> String {
        if self.suffix.is_empty() {
            game_title.to_string()
        } else {
            format!("{} {}", game_title, self.suffix)
        }
    }

    /// `None` when nothing was found or the chooser skipped. Failed searches
    /// count as nothing found unless their kind aborts the run.
    pub fn resolve(&mut self, game_title: &str) -> PipelineResult<Option<AlbumSelection>> {
        let query = self.query(game_title);

        let candidates = match self.catalog.search_albums(&query, self.limit) {
            Ok(candidates) => candidates,
            Err(e) if e.is_skip() => {
                tracing::warn!(game = %game_title, error = %e, "Album search failed");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        if candidates.is_empty() {
            tracing::info!(game = %game_title, "No soundtrack candidates");
            return Ok(None);
        }

        match self.chooser.choose(game_title, &candidates)? {
            Choice::Select(index) => {
                let Some(candidate) = candidates.get(index) else {
                    tracing::warn!(game = %game_title, index, "Chooser returned an index out of range");
                    return Ok(None);
                };
                Ok(Some(AlbumSelection {
                    name: candidate.name.clone(),
                    artist: candidate.artist_display(),
                    link: candidate.link.clone(),
                }))
            }
            Choice::Skip => {
                tracing::info!(game = %game_title, "Soundtrack skipped");
                Ok(None)
            }
        }
    }
}

/// Store the artist and album of a selection for `game_id`.
pub fn record(db: &Database, selection: &AlbumSelection, game_id: i64) -> PipelineResult<RecordedAlbum> {
    let artist_id = db.upsert_artist(&selection.artist)?.id();
    let album = db.upsert_album(&selection.name, artist_id, game_id, &selection.link)?;

    if album.was_created() {
        tracing::info!(album = %selection.name, artist = %selection.artist, "Album recorded");
    } else {
        tracing::info!(album = %selection.name, "Album already stored");
    }

    Ok(RecordedAlbum { artist_id, album })
}
