use std::fmt;
use std::path::Path;

use super::TrackProcessor;
use crate::acquire::{check_size, sanitize, ClipSource, GameDirs, Transcoder};
use crate::db::{NewSong, PendingAlbum};
use crate::error::{ErrorKind, PipelineError, PipelineResult};
use crate::features::FeatureExtractor;
use crate::soundtrack::{links, CatalogTrack, MusicCatalog};

/// How far a track got. Transitions only move forward; `Skipped` can be
/// reached from any other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Pending,
    Downloaded,
    FeaturesExtracted,
    Persisted,
    Skipped,
}

impl TrackState {
    fn rank(self) -> u8 {
        match self {
            TrackState::Pending => 0,
            TrackState::Downloaded => 1,
            TrackState::FeaturesExtracted => 2,
            TrackState::Persisted => 3,
            TrackState::Skipped => 4,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TrackState::Persisted | TrackState::Skipped)
    }

    /// Move to `next` if that is a forward step.
    pub fn advance(&mut self, next: TrackState) -> bool {
        let allowed = !self.is_terminal()
            && (next == TrackState::Skipped || next.rank() > self.rank());
        if allowed {
            *self = next;
        }
        allowed
    }
}

impl fmt::Display for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackState::Pending => "pending",
            TrackState::Downloaded => "downloaded",
            TrackState::FeaturesExtracted => "features_extracted",
            TrackState::Persisted => "persisted",
            TrackState::Skipped => "skipped",
        };
        f.write_str(name)
    }
}

/// What happened to one track in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    /// A new song row was written.
    Persisted,
    /// A song row for this name, game and album already existed.
    AlreadyPersisted,
    /// Given up on for this album; the reason is logged.
    Skipped(ErrorKind),
}

/// File stem and stored name for a track. Falls back to the catalog id, then
/// to `track`, when the name has nothing left after sanitizing.
pub fn track_stem(track: &CatalogTrack) -> String {
    let name = sanitize(&track.name);
    if !name.trim().is_empty() {
        return name;
    }
    let id = sanitize(&track.id);
    if !id.trim().is_empty() {
        return id;
    }
    "track".to_string()
}

/// Query handed to the clip source.
pub fn clip_query(game_title: &str, track_name: &str) -> String {
    format!("{} OST {}", game_title, track_name)
}

impl<M, S, T, F> TrackProcessor<'_, M, S, T, F>
where
    M: MusicCatalog,
    S: ClipSource,
    T: Transcoder,
    F: FeatureExtractor,
{
    /// Run one track to a terminal state. Skippable failures become
    /// [`TrackOutcome::Skipped`]; anything else aborts the run.
    pub fn process_track(
        &mut self,
        album: &PendingAlbum,
        dirs: &GameDirs,
        track: &CatalogTrack,
    ) -> PipelineResult<TrackOutcome> {
        let stem = track_stem(track);
        let mut state = TrackState::Pending;

        match self.run_track(album, dirs, track, &stem, &mut state) {
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_skip() => {
                tracing::warn!(
                    track = %track.name,
                    state = %state,
                    kind = e.kind().name(),
                    error = %e,
                    "Track skipped"
                );
                state.advance(TrackState::Skipped);
                Ok(TrackOutcome::Skipped(e.kind()))
            }
            Err(e) => {
                tracing::error!(track = %track.name, state = %state, error = %e, "Aborting run");
                Err(e)
            }
        }
    }

    fn run_track(
        &mut self,
        album: &PendingAlbum,
        dirs: &GameDirs,
        track: &CatalogTrack,
        stem: &str,
        state: &mut TrackState,
    ) -> PipelineResult<TrackOutcome> {
        if self.db.song_exists(stem, album.game_id, album.id)? {
            tracing::info!(track = %track.name, "Song already stored");
            state.advance(TrackState::Persisted);
            return Ok(TrackOutcome::AlreadyPersisted);
        }

        let popularity = self.popularity(track)?;

        let wav = dirs.wav_file(stem);
        if wav.exists() {
            tracing::info!(track = %track.name, "Waveform cached, skipping download");
        } else {
            self.acquire(album, dirs, track, stem, &wav)?;
            state.advance(TrackState::Downloaded);
        }

        let features = self.extractor.extract(&wav)?;
        state.advance(TrackState::FeaturesExtracted);

        let song = NewSong {
            name: stem.to_string(),
            genre: features.genre,
            scores: features.scores.rounded(),
            popularity,
            album_id: album.id,
            game_id: album.game_id,
            artist_id: album.artist_id,
        };
        let written = self.db.insert_song_if_absent(&song)?;
        state.advance(TrackState::Persisted);

        if written {
            tracing::info!(track = %track.name, genre = %song.genre, "Song stored");
            Ok(TrackOutcome::Persisted)
        } else {
            Ok(TrackOutcome::AlreadyPersisted)
        }
    }

    /// Popularity from the track endpoint. A malformed link skips the track;
    /// a failed lookup only leaves the score empty.
    fn popularity(&mut self, track: &CatalogTrack) -> PipelineResult<Option<i64>> {
        let track_id = links::track_id(&track.link)?;
        match self.catalog.track_popularity(&track_id) {
            Ok(popularity) => Ok(Some(popularity)),
            Err(e) if e.is_skip() => {
                tracing::warn!(track = %track.name, error = %e, "Popularity unavailable");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn acquire(
        &mut self,
        album: &PendingAlbum,
        dirs: &GameDirs,
        track: &CatalogTrack,
        stem: &str,
        wav: &Path,
    ) -> PipelineResult<()> {
        let query = clip_query(&album.game_title, &track.name);
        let url = self
            .clips
            .search(&query)?
            .ok_or_else(|| PipelineError::NotFound(format!("no clip for '{}'", query)))?;

        tracing::debug!(track = %track.name, %url, "Downloading clip");
        let container = self.clips.download(&url, &dirs.raw, stem)?;

        let size = check_size(&container, self.max_container_bytes)?;
        tracing::debug!(track = %track.name, size, "Transcoding");

        self.transcoder.transcode(&container, wav)
    }
}
