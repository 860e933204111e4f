//! Audio-derived genre and mood features.

pub mod heads;
mod model;
pub mod pooling;
pub mod waveform;

use std::path::Path;

use crate::error::PipelineResult;

pub use heads::{MoodHead, MoodKind, MoodScores, MOOD_HEADS};
pub use model::OnnxExtractor;

/// Features of one track before rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackFeatures {
    /// Discogs-style `Parent---Sub` genre label.
    pub genre: String,
    pub scores: MoodScores,
}

/// Turns a normalized waveform file into [`TrackFeatures`]. Any failure is
/// reported as `ErrorKind::InferenceFailure`.
pub trait FeatureExtractor {
    fn extract(&mut self, waveform: &Path) -> PipelineResult<TrackFeatures>;
}

impl<T: FeatureExtractor + ?Sized> FeatureExtractor for &mut T {
    fn extract(&mut self, waveform: &Path) -> PipelineResult<TrackFeatures> {
        (**self).extract(waveform)
    }
}
