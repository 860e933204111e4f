use anyhow::{bail, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::db::Database;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => bail!("Unknown export format '{}' (expected csv or json)", other),
        }
    }

    /// Format implied by the file extension, CSV when there is none.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Csv => "CSV",
        }
    }
}

/// One song with its game, album, artist and developer.
#[derive(Debug, Serialize)]
pub struct ExportedSong {
    pub developer: String,
    pub game: String,
    pub release_date: Option<String>,
    pub album: String,
    pub artist: String,
    pub album_link: Option<String>,
    pub song: String,
    pub genre: Option<String>,
    pub approachability: Option<f64>,
    pub engagement: Option<f64>,
    pub danceability: Option<f64>,
    pub aggressiveness: Option<f64>,
    pub happiness: Option<f64>,
    pub party: Option<f64>,
    pub relaxed: Option<f64>,
    pub sadness: Option<f64>,
    pub electronic: Option<f64>,
    pub acoustic: Option<f64>,
    pub popularity: Option<i64>,
}

const CSV_HEADERS: [&str; 19] = [
    "developer",
    "game",
    "release_date",
    "album",
    "artist",
    "album_link",
    "song",
    "genre",
    "approachability",
    "engagement",
    "danceability",
    "aggressiveness",
    "happiness",
    "party",
    "relaxed",
    "sadness",
    "electronic",
    "acoustic",
    "popularity",
];

/// Export every stored song to a file. Returns the number of rows written.
pub fn export_songs(db: &Database, output_path: &Path, format: ExportFormat) -> Result<usize> {
    let songs = get_songs_for_export(db)?;
    let count = songs.len();

    match format {
        ExportFormat::Json => export_json(&songs, output_path)?,
        ExportFormat::Csv => export_csv(&songs, output_path)?,
    }

    tracing::info!(count, format = format.name(), path = %output_path.display(), "Exported songs");
    Ok(count)
}

fn get_songs_for_export(db: &Database) -> Result<Vec<ExportedSong>> {
    let mut stmt = db.conn.prepare(
        r#"
        SELECT
            developer.developer_name,
            game.game_title,
            game.release_date,
            album.album_title,
            artist.artist_name,
            album.spotify_link,
            song.song_name,
            song.song_genre,
            song.approachability_score,
            song.engagement_score,
            song.danceability_score,
            song.aggressiveness_score,
            song.happiness_score,
            song.party_score,
            song.relaxed_score,
            song.sadness_score,
            song.electronic_score,
            song.acoustic_score,
            song.popularity_score
        FROM song
        JOIN album ON song.album_id = album.id
        JOIN game ON song.game_id = game.id
        JOIN artist ON song.artist_id = artist.id
        LEFT JOIN developer ON game.developer_id = developer.id
        ORDER BY developer.developer_name, game.game_title, album.album_title, song.id
        "#,
    )?;

    let songs = stmt
        .query_map([], |row| {
            Ok(ExportedSong {
                developer: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                game: row.get(1)?,
                release_date: row.get(2)?,
                album: row.get(3)?,
                artist: row.get(4)?,
                album_link: row.get(5)?,
                song: row.get(6)?,
                genre: row.get(7)?,
                approachability: row.get(8)?,
                engagement: row.get(9)?,
                danceability: row.get(10)?,
                aggressiveness: row.get(11)?,
                happiness: row.get(12)?,
                party: row.get(13)?,
                relaxed: row.get(14)?,
                sadness: row.get(15)?,
                electronic: row.get(16)?,
                acoustic: row.get(17)?,
                popularity: row.get(18)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(songs)
}

fn export_json(songs: &[ExportedSong], output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(songs)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn export_csv(songs: &[ExportedSong], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    wtr.write_record(CSV_HEADERS)?;

    let score = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_default();

    for song in songs {
        wtr.write_record([
            song.developer.clone(),
            song.game.clone(),
            song.release_date.clone().unwrap_or_default(),
            song.album.clone(),
            song.artist.clone(),
            song.album_link.clone().unwrap_or_default(),
            song.song.clone(),
            song.genre.clone().unwrap_or_default(),
            score(song.approachability),
            score(song.engagement),
            score(song.danceability),
            score(song.aggressiveness),
            score(song.happiness),
            score(song.party),
            score(song.relaxed),
            score(song.sadness),
            score(song.electronic),
            score(song.acoustic),
            song.popularity.map(|v| v.to_string()).unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::genres::genre_vector;
    use crate::db::{NewGame, NewSong};
    use crate::features::{MoodKind, MoodScores};
    use crate::testing::memory_db;
    use tempfile::tempdir;

    fn seeded() -> Database {
        let db = memory_db();
        let dev = db.upsert_developer("Capcom").unwrap().id();
        let game = db
            .insert_game_if_absent(&NewGame {
                developer_id: dev,
                title: "Okami".into(),
                release_date: chrono::NaiveDate::from_ymd_opt(2006, 4, 20),
                genres: genre_vector(&["Action", "Adventure"]),
            })
            .unwrap()
            .id();
        let artist = db.upsert_artist("Masami Ueda, Hiroshi Yamaguchi").unwrap().id();
        let album = db
            .upsert_album("Okami Original Soundtrack", artist, game, "https://open.spotify.com/album/ok1")
            .unwrap()
            .id();

        let mut scores = MoodScores::default();
        scores.set(MoodKind::Happiness, 0.81);
        scores.set(MoodKind::Sadness, 0.07);
        for (name, popularity) in [("The Sun Rises", Some(48)), ("Reset", None)] {
            db.insert_song_if_absent(&NewSong {
                name: name.into(),
                genre: "Stage & Screen---Video Game Music".into(),
                scores,
                popularity,
                album_id: album,
                game_id: game,
                artist_id: artist,
            })
            .unwrap();
        }
        db
    }

    #[test]
    fn test_export_csv() {
        let db = seeded();
        let dir = tempdir().unwrap();
        let path = dir.path().join("songs.csv");

        assert_eq!(export_songs(&db, &path, ExportFormat::Csv).unwrap(), 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap().len(), CSV_HEADERS.len());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][0], "Capcom");
        assert_eq!(&rows[0][2], "2006-04-20");
        assert_eq!(&rows[0][4], "Masami Ueda, Hiroshi Yamaguchi");
        assert_eq!(&rows[0][6], "The Sun Rises");
        assert_eq!(&rows[0][12], "0.81");
        assert_eq!(&rows[0][18], "48");
        assert_eq!(&rows[1][18], "");
    }

    #[test]
    fn test_export_json() {
        let db = seeded();
        let dir = tempdir().unwrap();
        let path = dir.path().join("songs.json");

        export_songs(&db, &path, ExportFormat::Json).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let songs = value.as_array().unwrap();
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0]["game"], "Okami");
        assert_eq!(songs[0]["sadness"], 0.07);
        assert!(songs[1]["popularity"].is_null());
    }

    #[test]
    fn test_format_selection() {
        assert_eq!(ExportFormat::parse("JSON").unwrap(), ExportFormat::Json);
        assert!(ExportFormat::parse("html").is_err());
        assert_eq!(ExportFormat::from_path(Path::new("out.json")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out")), ExportFormat::Csv);
    }
}
