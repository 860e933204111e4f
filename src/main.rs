use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use ostdb::acquire::MediaPaths;
use ostdb::catalog::{CatalogImporter, RawgClient};
use ostdb::config::Config;
use ostdb::db::Database;
use ostdb::export::{export_songs, ExportFormat};
use ostdb::logging;
use ostdb::soundtrack::{ConsoleChooser, SoundtrackResolver, SpotifyClient};

enum Command {
    Import { developer: String, pages: Option<u32> },
    Export { path: PathBuf, format: Option<ExportFormat> },
    Status,
}

struct Args {
    config_path: Option<PathBuf>,
    command: Command,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = None;
    let mut positional = Vec::new();
    let mut pages = None;
    let mut format = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("ostdb {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                config_path = Some(PathBuf::from(require_value(&args, i, "--config")));
                i += 1;
            }
            "--pages" | "-p" => {
                let value = require_value(&args, i, "--pages");
                match value.parse::<u32>() {
                    Ok(n) if n > 0 => pages = Some(n),
                    _ => fail(&format!("--pages expects a positive number, got '{}'", value)),
                }
                i += 1;
            }
            "--format" | "-f" => {
                let value = require_value(&args, i, "--format");
                match ExportFormat::parse(value) {
                    Ok(f) => format = Some(f),
                    Err(e) => fail(&e.to_string()),
                }
                i += 1;
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
            arg => positional.push(arg.to_string()),
        }
        i += 1;
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("import") => match positional.next() {
            Some(developer) => Command::Import { developer, pages },
            None => fail("import requires a developer name"),
        },
        Some("export") => match positional.next() {
            Some(path) => Command::Export {
                path: PathBuf::from(path),
                format,
            },
            None => fail("export requires an output path"),
        },
        Some("status") => Command::Status,
        Some(other) => fail(&format!("Unknown command: {}", other)),
        None => {
            print_help();
            std::process::exit(1);
        }
    };

    if let Some(extra) = positional.next() {
        fail(&format!("Unexpected argument: {}", extra));
    }

    Args { config_path, command }
}

fn require_value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i + 1) {
        Some(value) => value,
        None => fail(&format!("{} requires an argument", flag)),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn print_help() {
    println!(
        r#"ostdb - game soundtrack database builder

USAGE:
    ostdb [OPTIONS] <COMMAND>

COMMANDS:
    import <DEVELOPER>  Import a developer's games and choose a soundtrack album for each
    export <PATH>       Write every stored song with its game, album and artist
    status              Show row counts and cached waveforms

OPTIONS:
    --config, -c PATH   Path to config file
    --pages, -p N       Game pages to import (default from config)
    --format, -f FMT    Export format: csv or json (default from the file extension)
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    OSTDB_CONFIG        Path to config file (overrides default location)
    OSTDB_LOG           Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/ostdb/config.toml

See also: ostdb-tracks --help"#
    );
}

fn main() -> Result<()> {
    let args = parse_args();

    let _ = logging::init(Some(Config::log_dir()));

    let config = match &args.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let db = Database::open(&config.db_path)?;
    db.initialize()?;

    match args.command {
        Command::Import { developer, pages } => run_import(&config, &db, &developer, pages),
        Command::Export { path, format } => {
            let format = format.unwrap_or_else(|| ExportFormat::from_path(&path));
            let count = export_songs(&db, &path, format)?;
            println!("Exported {} songs to {} ({})", count, path.display(), format.name());
            Ok(())
        }
        Command::Status => print_status(&config, &db),
    }
}

fn run_import(config: &Config, db: &Database, developer: &str, pages: Option<u32>) -> Result<()> {
    let credentials = config.credentials()?;

    let games = RawgClient::new(&config.catalog, credentials.rawg_key);
    let mut music = SpotifyClient::connect(
        &config.soundtrack,
        credentials.spotify_client_id,
        credentials.spotify_client_secret,
    )
    .context("Could not authenticate with the music catalog")?;
    let mut chooser = ConsoleChooser::stdio();

    let resolver = SoundtrackResolver::new(&mut music, &mut chooser, &config.soundtrack);
    let max_pages = pages.unwrap_or(config.catalog.max_pages);
    let mut importer = CatalogImporter::new(db, &games, resolver, max_pages);

    let summary = importer
        .import(developer)
        .with_context(|| format!("Import of '{}' failed", developer))?;

    println!(
        "{}: {} games seen, {} added, {} already stored, {} albums recorded, {} skipped",
        developer,
        summary.games_seen,
        summary.games_added,
        summary.already_stored,
        summary.albums_added,
        summary.skipped,
    );
    Ok(())
}

fn print_status(config: &Config, db: &Database) -> Result<()> {
    let stats = db.stats()?;
    let paths = MediaPaths::from_config(&config.acquire);
    let waveforms = count_waveforms(paths.wav_root());

    println!("Database:   {}", config.db_path.display());
    println!("Developers: {}", stats.developers);
    println!("Games:      {}", stats.games);
    println!("Artists:    {}", stats.artists);
    println!(
        "Albums:     {} ({} pending, {} processed)",
        stats.albums_pending + stats.albums_processed,
        stats.albums_pending,
        stats.albums_processed
    );
    println!("Songs:      {}", stats.songs);
    println!("Waveforms:  {} under {}", waveforms, paths.wav_root().display());
    Ok(())
}

fn count_waveforms(root: &Path) -> usize {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        })
        .count()
}
