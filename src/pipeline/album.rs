use super::{TrackOutcome, TrackProcessor};
use crate::acquire::{ClipSource, Transcoder};
use crate::db::PendingAlbum;
use crate::error::PipelineResult;
use crate::features::FeatureExtractor;
use crate::soundtrack::{links, MusicCatalog};

/// Track outcomes for one album.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlbumTally {
    pub persisted: usize,
    pub already: usize,
    pub skipped: usize,
}

impl AlbumTally {
    fn record(&mut self, outcome: TrackOutcome) {
        match outcome {
            TrackOutcome::Persisted => self.persisted += 1,
            TrackOutcome::AlreadyPersisted => self.already += 1,
            TrackOutcome::Skipped(_) => self.skipped += 1,
        }
    }

    fn add(&mut self, other: AlbumTally) {
        self.persisted += other.persisted;
        self.already += other.already;
        self.skipped += other.skipped;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub albums_processed: usize,
    /// Albums left unprocessed for a later run.
    pub albums_skipped: usize,
    pub tracks: AlbumTally,
}

impl<M, S, T, F> TrackProcessor<'_, M, S, T, F>
where
    M: MusicCatalog,
    S: ClipSource,
    T: Transcoder,
    F: FeatureExtractor,
{
    /// Attempt every track of `album`, then set its checkpoint.
    ///
    /// Returns `None` when the album could not be listed; it stays pending.
    pub fn process_album(&mut self, album: &PendingAlbum) -> PipelineResult<Option<AlbumTally>> {
        tracing::info!(album_id = album.id, album = %album.title, game = %album.game_title, "Processing album");

        let catalog_id = match links::album_id(&album.link) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(album_id = album.id, error = %e, "Album skipped");
                return Ok(None);
            }
        };

        let tracks = match self.catalog.album_tracks(&catalog_id) {
            Ok(tracks) => tracks,
            Err(e) if e.is_skip() => {
                tracing::warn!(album_id = album.id, error = %e, "Could not list album tracks");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let dirs = self.paths.game_dirs(&album.developer_name, &album.game_title);
        let mut tally = AlbumTally::default();

        for track in &tracks {
            tally.record(self.process_track(album, &dirs, track)?);
        }

        self.db.mark_album_processed(album.id)?;

        tracing::info!(
            album_id = album.id,
            persisted = tally.persisted,
            already = tally.already,
            skipped = tally.skipped,
            "Album processed"
        );

        Ok(Some(tally))
    }

    /// Process every pending album, or only `only` when given.
    pub fn process_pending(&mut self, only: Option<i64>) -> PipelineResult<RunSummary> {
        let albums: Vec<PendingAlbum> = self
            .db
            .pending_albums()?
            .into_iter()
            .filter(|a| only.map_or(true, |id| a.id == id))
            .collect();

        if albums.is_empty() {
            tracing::info!("No pending albums");
        }

        let mut summary = RunSummary::default();
        for album in &albums {
            match self.process_album(album)? {
                Some(tally) => {
                    summary.albums_processed += 1;
                    summary.tracks.add(tally);
                }
                None => summary.albums_skipped += 1,
            }
        }

        Ok(summary)
    }
}
