//! Track acquisition and feature extraction for pending albums.
//!
//! For every album whose tracks have not all been attempted, each track is
//! downloaded, transcoded to a mono waveform, analysed by the genre and mood
//! models and stored as a song. Interrupted runs resume at the first album
//! still marked pending.
//!
//! ## Usage
//!
//! ```bash
//! ostdb-tracks              # Process every pending album
//! ostdb-tracks --album 12   # Process one album
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{error, info};

use ostdb::acquire::{Ffmpeg, YtDlp};
use ostdb::config::Config;
use ostdb::db::Database;
use ostdb::features::OnnxExtractor;
use ostdb::logging;
use ostdb::pipeline::TrackProcessor;
use ostdb::soundtrack::SpotifyClient;

#[derive(Default)]
struct Args {
    album: Option<i64>,
    config_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = parse_args();

    let _ = logging::init(Some(Config::log_dir()));

    let config = match &args.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Models first: a missing or mismatched model stops the run before any
    // album is touched.
    let mut extractor = OnnxExtractor::load(&config.models, config.acquire.sample_rate)
        .context("Failed to load feature models")?;

    let db = Database::open(&config.db_path)?;
    db.initialize()?;
    info!("Database opened at {:?}", config.db_path);

    let credentials = config.credentials()?;
    let mut music = SpotifyClient::connect(
        &config.soundtrack,
        credentials.spotify_client_id,
        credentials.spotify_client_secret,
    )
    .context("Could not authenticate with the music catalog")?;
    let mut clips = YtDlp::from_config(&config.acquire);
    let mut transcoder = Ffmpeg::from_config(&config.acquire);

    let mut processor = TrackProcessor::new(
        &db,
        &mut music,
        &mut clips,
        &mut transcoder,
        &mut extractor,
        &config.acquire,
    );

    match processor.process_pending(args.album) {
        Ok(summary) => {
            info!(
                albums = summary.albums_processed,
                albums_skipped = summary.albums_skipped,
                persisted = summary.tracks.persisted,
                already = summary.tracks.already,
                skipped = summary.tracks.skipped,
                "Run complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(kind = e.kind().name(), error = %e, "Run aborted");
            Err(e.into())
        }
    }
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--album" | "-a" => {
                match args.get(i + 1).map(|v| v.parse::<i64>()) {
                    Some(Ok(id)) => parsed.album = Some(id),
                    _ => {
                        eprintln!("Error: --album requires a numeric album id");
                        std::process::exit(1);
                    }
                }
                i += 1;
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    parsed.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--version" | "-V" => {
                println!("ostdb-tracks {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    parsed
}

fn print_help() {
    println!(
        r#"ostdb-tracks - download and analyse the tracks of pending soundtrack albums

USAGE:
    ostdb-tracks [OPTIONS]

OPTIONS:
    --album, -a ID      Only process this album
    --config, -c PATH   Path to config file
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    OSTDB_CONFIG        Path to config file (overrides default location)
    OSTDB_LOG           Log level (trace, debug, info, warn, error)

Requires yt-dlp and ffmpeg on PATH (or configured under [acquire]) and the
ONNX models listed under [models]."#
    );
}
