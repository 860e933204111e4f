use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// JSON file holding the API keys and secrets.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub soundtrack: SoundtrackConfig,

    #[serde(default)]
    pub acquire: AcquireConfig,

    #[serde(default)]
    pub models: ModelsConfig,
}

/// Game-metadata API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_url")]
    pub base_url: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(default = "default_ordering")]
    pub ordering: String,

    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

fn default_catalog_url() -> String {
    "https://api.rawg.io/api".to_string()
}

fn default_page_size() -> u32 {
    30
}

fn default_max_pages() -> u32 {
    1
}

fn default_ordering() -> String {
    "-added".to_string()
}

fn default_http_timeout() -> u64 {
    30
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_url(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            ordering: default_ordering(),
            timeout_secs: default_http_timeout(),
        }
    }
}

/// Music catalog API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundtrackConfig {
    #[serde(default = "default_accounts_url")]
    pub accounts_url: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Appended to the game title when searching for albums.
    #[serde(default = "default_search_suffix")]
    pub search_suffix: String,

    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    #[serde(default = "default_tracks_page_size")]
    pub tracks_page_size: u32,

    /// Retries on 401 and 429 before giving up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u8,

    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

fn default_accounts_url() -> String {
    "https://accounts.spotify.com/api/token".to_string()
}

fn default_api_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_search_suffix() -> String {
    "soundtrack".to_string()
}

fn default_search_limit() -> u32 {
    20
}

fn default_tracks_page_size() -> u32 {
    50 // max allowed by the album tracks endpoint
}

fn default_max_retries() -> u8 {
    2
}

impl Default for SoundtrackConfig {
    fn default() -> Self {
        Self {
            accounts_url: default_accounts_url(),
            api_url: default_api_url(),
            search_suffix: default_search_suffix(),
            search_limit: default_search_limit(),
            tracks_page_size: default_tracks_page_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_http_timeout(),
        }
    }
}

/// Download and transcoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquireConfig {
    /// Root of the downloaded container tree (`<raw_dir>/<developer>/<game>/`).
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,

    /// Root of the normalized waveform tree, keyed like `raw_dir`.
    #[serde(default = "default_wav_dir")]
    pub wav_dir: PathBuf,

    #[serde(default = "default_ytdlp_bin")]
    pub ytdlp_bin: String,

    #[serde(default = "default_ffmpeg_bin")]
    pub ffmpeg_bin: String,

    /// Netscape cookie file handed to the downloader, if any.
    #[serde(default)]
    pub cookies: Option<PathBuf>,

    #[serde(default = "default_clip_seconds")]
    pub clip_seconds: u32,

    #[serde(default = "default_download_retries")]
    pub retries: u32,

    #[serde(default = "default_retry_sleep")]
    pub retry_sleep_secs: u32,

    #[serde(default = "default_socket_timeout")]
    pub socket_timeout_secs: u32,

    /// Containers at or above this size are not transcoded.
    #[serde(default = "default_max_container_bytes")]
    pub max_container_bytes: u64,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_raw_dir() -> PathBuf {
    data_dir().join("webm")
}

fn default_wav_dir() -> PathBuf {
    data_dir().join("wav")
}

fn default_ytdlp_bin() -> String {
    "yt-dlp".to_string()
}

fn default_ffmpeg_bin() -> String {
    "ffmpeg".to_string()
}

fn default_clip_seconds() -> u32 {
    300
}

fn default_download_retries() -> u32 {
    5
}

fn default_retry_sleep() -> u32 {
    30
}

fn default_socket_timeout() -> u32 {
    120
}

fn default_max_container_bytes() -> u64 {
    31 * 1024 * 1024
}

fn default_sample_rate() -> u32 {
    16_000
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            wav_dir: default_wav_dir(),
            ytdlp_bin: default_ytdlp_bin(),
            ffmpeg_bin: default_ffmpeg_bin(),
            cookies: None,
            clip_seconds: default_clip_seconds(),
            retries: default_download_retries(),
            retry_sleep_secs: default_retry_sleep(),
            socket_timeout_secs: default_socket_timeout(),
            max_container_bytes: default_max_container_bytes(),
            sample_rate: default_sample_rate(),
        }
    }
}

/// One ONNX graph: file name inside `ModelsConfig::dir` plus tensor names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelSpec {
    pub file: String,
    pub input: String,
    pub output: String,
}

impl ModelSpec {
    fn head(file: &str) -> Self {
        Self {
            file: file.to_string(),
            input: "embeddings".to_string(),
            output: "activations".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_models_dir")]
    pub dir: PathBuf,

    /// Must take the raw waveform as `[1, samples]`. Graphs that expect
    /// mel-spectrogram patches are rejected at load time.
    #[serde(default = "default_embedding_model")]
    pub embedding: ModelSpec,

    #[serde(default = "default_genre_model")]
    pub genre: ModelSpec,

    #[serde(default = "default_approachability_model")]
    pub approachability: ModelSpec,

    #[serde(default = "default_engagement_model")]
    pub engagement: ModelSpec,

    #[serde(default = "default_danceability_model")]
    pub danceability: ModelSpec,

    #[serde(default = "default_aggressiveness_model")]
    pub aggressiveness: ModelSpec,

    #[serde(default = "default_happiness_model")]
    pub happiness: ModelSpec,

    #[serde(default = "default_party_model")]
    pub party: ModelSpec,

    #[serde(default = "default_relaxed_model")]
    pub relaxed: ModelSpec,

    #[serde(default = "default_sadness_model")]
    pub sadness: ModelSpec,

    #[serde(default = "default_electronic_model")]
    pub electronic: ModelSpec,

    #[serde(default = "default_acoustic_model")]
    pub acoustic: ModelSpec,
}

fn default_models_dir() -> PathBuf {
    data_dir().join("models")
}

fn default_embedding_model() -> ModelSpec {
    ModelSpec {
        file: "discogs-effnet-bs64-1.onnx".to_string(),
        input: "waveform".to_string(),
        output: "embeddings".to_string(),
    }
}

fn default_genre_model() -> ModelSpec {
    ModelSpec::head("genre_discogs400-discogs-effnet-1.onnx")
}

fn default_approachability_model() -> ModelSpec {
    ModelSpec::head("approachability_2c-discogs-effnet-1.onnx")
}

fn default_engagement_model() -> ModelSpec {
    ModelSpec::head("engagement_2c-discogs-effnet-1.onnx")
}

fn default_danceability_model() -> ModelSpec {
    ModelSpec::head("danceability-discogs-effnet-1.onnx")
}

fn default_aggressiveness_model() -> ModelSpec {
    ModelSpec::head("mood_aggressive-discogs-effnet-1.onnx")
}

fn default_happiness_model() -> ModelSpec {
    ModelSpec::head("mood_happy-discogs-effnet-1.onnx")
}

fn default_party_model() -> ModelSpec {
    ModelSpec::head("mood_party-discogs-effnet-1.onnx")
}

fn default_relaxed_model() -> ModelSpec {
    ModelSpec::head("mood_relaxed-discogs-effnet-1.onnx")
}

fn default_sadness_model() -> ModelSpec {
    ModelSpec::head("mood_sad-discogs-effnet-1.onnx")
}

fn default_electronic_model() -> ModelSpec {
    ModelSpec::head("mood_electronic-discogs-effnet-1.onnx")
}

fn default_acoustic_model() -> ModelSpec {
    ModelSpec::head("mood_acoustic-discogs-effnet-1.onnx")
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: default_models_dir(),
            embedding: default_embedding_model(),
            genre: default_genre_model(),
            approachability: default_approachability_model(),
            engagement: default_engagement_model(),
            danceability: default_danceability_model(),
            aggressiveness: default_aggressiveness_model(),
            happiness: default_happiness_model(),
            party: default_party_model(),
            relaxed: default_relaxed_model(),
            sadness: default_sadness_model(),
            electronic: default_electronic_model(),
            acoustic: default_acoustic_model(),
        }
    }
}

/// API keys read from the credentials file.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(rename = "rawg")]
    pub rawg_key: String,

    #[serde(rename = "spotify_id")]
    pub spotify_client_id: String,

    #[serde(rename = "spotify_secret")]
    pub spotify_client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("spotify_client_id", &self.spotify_client_id)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file {}", path.display()))?;
        let credentials: Credentials = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse credentials file {}", path.display()))?;
        Ok(credentials)
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ostdb")
}

fn default_db_path() -> PathBuf {
    data_dir().join("games.db")
}

fn default_credentials_path() -> PathBuf {
    Config::config_dir().join("api_keys.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            credentials_path: default_credentials_path(),
            catalog: CatalogConfig::default(),
            soundtrack: SoundtrackConfig::default(),
            acquire: AcquireConfig::default(),
            models: ModelsConfig::default(),
        }
    }
}

impl Config {
    /// Load from `OSTDB_CONFIG` or the default location, writing a default
    /// file on first use.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("OSTDB_CONFIG") {
            return Self::load_from(Path::new(&path));
        }

        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::load(&self.credentials_path)
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ostdb")
    }

    pub fn log_dir() -> PathBuf {
        data_dir().join("logs")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}
