use std::path::{Path, PathBuf};

use super::sanitize::sanitize_component;
use crate::config::AcquireConfig;

/// The two parallel media trees: downloaded containers under `raw_root`,
/// normalized waveforms under `wav_root`, both keyed
/// `<developer>/<game>/<track>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPaths {
    raw_root: PathBuf,
    wav_root: PathBuf,
}

/// Directories for one game's tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameDirs {
    pub raw: PathBuf,
    pub wav: PathBuf,
}

impl GameDirs {
    /// Where the normalized waveform of `stem` lives.
    pub fn wav_file(&self, stem: &str) -> PathBuf {
        self.wav.join(format!("{}.wav", stem))
    }
}

impl MediaPaths {
    pub fn new(raw_root: impl Into<PathBuf>, wav_root: impl Into<PathBuf>) -> Self {
        Self {
            raw_root: raw_root.into(),
            wav_root: wav_root.into(),
        }
    }

    pub fn from_config(config: &AcquireConfig) -> Self {
        Self::new(&config.raw_dir, &config.wav_dir)
    }

    pub fn wav_root(&self) -> &Path {
        &self.wav_root
    }

    pub fn game_dirs(&self, developer: &str, game: &str) -> GameDirs {
        let relative = Path::new(&sanitize_component(developer)).join(sanitize_component(game));
        GameDirs {
            raw: self.raw_root.join(&relative),
            wav: self.wav_root.join(&relative),
        }
    }
}
