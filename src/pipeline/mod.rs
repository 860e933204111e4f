//! Track acquisition and feature extraction over pending albums.

mod album;
mod track;

pub use album::{AlbumTally, RunSummary};
pub use track::{clip_query, track_stem, TrackOutcome, TrackState};

use crate::acquire::MediaPaths;
use crate::config::AcquireConfig;
use crate::db::Database;

/// Drives every track of a pending album through download, transcoding,
/// feature extraction and storage, then sets the album checkpoint.
pub struct TrackProcessor<'a, M, S, T, F> {
    db: &'a Database,
    catalog: M,
    clips: S,
    transcoder: T,
    extractor: F,
    paths: MediaPaths,
    max_container_bytes: u64,
}

impl<'a, M, S, T, F> TrackProcessor<'a, M, S, T, F> {
    pub fn new(
        db: &'a Database,
        catalog: M,
        clips: S,
        transcoder: T,
        extractor: F,
        config: &AcquireConfig,
    ) -> Self {
        Self {
            db,
            catalog,
            clips,
            transcoder,
            extractor,
            paths: MediaPaths::from_config(config),
            max_container_bytes: config.max_container_bytes,
        }
    }
}
