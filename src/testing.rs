//! In-memory stand-ins for the external services, used by unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use crate::acquire::{ClipSource, Transcoder};
use crate::catalog::{CatalogDeveloper, CatalogGame, GameCatalog, GamePage};
use crate::db::Database;
use crate::error::{PipelineError, PipelineResult};
use crate::features::{FeatureExtractor, MoodKind, MoodScores, TrackFeatures};
use crate::soundtrack::{AlbumCandidate, AlbumChooser, CatalogTrack, Choice, MusicCatalog};

pub fn memory_db() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.initialize().unwrap();
    db
}

pub fn game(title: &str, released: Option<&str>, tags: &[&str]) -> CatalogGame {
    CatalogGame {
        title: title.to_string(),
        released: released.map(str::to_string),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn album(id: &str, name: &str, artists: &[&str]) -> AlbumCandidate {
    AlbumCandidate {
        id: id.to_string(),
        name: name.to_string(),
        artists: artists.iter().map(|a| a.to_string()).collect(),
        link: format!("https://open.spotify.com/album/{}", id),
    }
}

pub fn track(id: &str, name: &str) -> CatalogTrack {
    CatalogTrack {
        id: id.to_string(),
        name: name.to_string(),
        link: format!("https://open.spotify.com/track/{}", id),
    }
}

#[derive(Default)]
pub struct FakeGameCatalog {
    pub developer: Option<CatalogDeveloper>,
    /// Page `n` is `pages[n - 1]`.
    pub pages: Vec<GamePage>,
    pub requested_pages: RefCell<Vec<u32>>,
}

impl GameCatalog for FakeGameCatalog {
    fn find_developer(&self, name: &str) -> PipelineResult<CatalogDeveloper> {
        self.developer
            .clone()
            .ok_or_else(|| PipelineError::NotFound(format!("developer '{}'", name)))
    }

    fn games_page(&self, _developer_id: i64, page: u32) -> PipelineResult<GamePage> {
        self.requested_pages.borrow_mut().push(page);
        Ok(self.pages.get(page as usize - 1).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeMusicCatalog {
    pub search_results: HashMap<String, Vec<AlbumCandidate>>,
    pub search_error: Option<fn() -> PipelineError>,
    pub searches: Vec<(String, u32)>,
    pub tracks: HashMap<String, Vec<CatalogTrack>>,
    pub popularity: HashMap<String, i64>,
    pub popularity_error: Option<fn() -> PipelineError>,
    pub popularity_requests: Vec<String>,
}

impl MusicCatalog for FakeMusicCatalog {
    fn search_albums(&mut self, query: &str, limit: u32) -> PipelineResult<Vec<AlbumCandidate>> {
        self.searches.push((query.to_string(), limit));
        if let Some(error) = self.search_error {
            return Err(error());
        }
        Ok(self.search_results.get(query).cloned().unwrap_or_default())
    }

    fn album_tracks(&mut self, album_id: &str) -> PipelineResult<Vec<CatalogTrack>> {
        self.tracks
            .get(album_id)
            .cloned()
            .ok_or_else(|| PipelineError::NotFound(format!("album {}", album_id)))
    }

    fn track_popularity(&mut self, track_id: &str) -> PipelineResult<i64> {
        self.popularity_requests.push(track_id.to_string());
        if let Some(error) = self.popularity_error {
            return Err(error());
        }
        self.popularity
            .get(track_id)
            .copied()
            .ok_or_else(|| PipelineError::NotFound(format!("track {}", track_id)))
    }
}

/// Answers with a fixed script, then skips.
pub struct ScriptedChooser {
    answers: VecDeque<Choice>,
    pub asked: usize,
    pub offered: Vec<(String, usize)>,
}

impl ScriptedChooser {
    pub fn new(answers: Vec<Choice>) -> Self {
        Self {
            answers: answers.into(),
            asked: 0,
            offered: Vec::new(),
        }
    }
}

impl AlbumChooser for ScriptedChooser {
    fn choose(&mut self, game_title: &str, candidates: &[AlbumCandidate]) -> PipelineResult<Choice> {
        self.asked += 1;
        self.offered.push((game_title.to_string(), candidates.len()));
        Ok(self.answers.pop_front().unwrap_or(Choice::Skip))
    }
}

/// Search results by query and download sizes by URL.
#[derive(Default)]
pub struct FakeClipSource {
    pub results: HashMap<String, String>,
    pub sizes: HashMap<String, usize>,
    pub searches: Vec<String>,
    pub downloads: Vec<String>,
}

impl ClipSource for FakeClipSource {
    fn search(&mut self, query: &str) -> PipelineResult<Option<String>> {
        self.searches.push(query.to_string());
        Ok(self.results.get(query).cloned())
    }

    fn download(&mut self, url: &str, dir: &Path, stem: &str) -> PipelineResult<PathBuf> {
        self.downloads.push(url.to_string());
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.webm", stem));
        let size = self.sizes.get(url).copied().unwrap_or(1024);
        std::fs::write(&path, vec![0u8; size])?;
        Ok(path)
    }
}

#[derive(Default)]
pub struct FakeTranscoder {
    pub calls: Vec<(PathBuf, PathBuf)>,
}

impl Transcoder for FakeTranscoder {
    fn transcode(&mut self, input: &Path, output: &Path) -> PipelineResult<()> {
        self.calls.push((input.to_path_buf(), output.to_path_buf()));
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_silence(output);
        Ok(())
    }
}

/// One second of mono 16 kHz silence.
pub fn write_silence(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for _ in 0..16_000 {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// Returns the same unrounded features for every file except the stems
/// listed in `fail_for`.
#[derive(Default)]
pub struct FakeExtractor {
    pub fail_for: Vec<String>,
    pub extracted: Vec<PathBuf>,
}

impl FakeExtractor {
    pub fn features() -> TrackFeatures {
        let mut scores = MoodScores::default();
        for (i, kind) in MoodKind::ALL.iter().enumerate() {
            scores.set(*kind, 0.1234 + i as f64 * 0.05);
        }
        TrackFeatures {
            genre: "Stage & Screen---Video Game Music".to_string(),
            scores,
        }
    }
}

impl FeatureExtractor for FakeExtractor {
    fn extract(&mut self, waveform: &Path) -> PipelineResult<TrackFeatures> {
        self.extracted.push(waveform.to_path_buf());
        let stem = waveform.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        if self.fail_for.iter().any(|f| f == stem) {
            return Err(PipelineError::Inference(format!("no frames in {}", stem)));
        }
        Ok(Self::features())
    }
}
