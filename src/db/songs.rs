//! Song rows, keyed by (song_name, game_id, album_id).

use rusqlite::OptionalExtension;

use super::Database;
use crate::features::{MoodKind, MoodScores};

/// A scored track ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSong {
    /// Sanitized track name.
    pub name: String,
    pub genre: String,
    pub scores: MoodScores,
    pub popularity: Option<i64>,
    pub album_id: i64,
    pub game_id: i64,
    pub artist_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SongRow {
    pub id: i64,
    pub name: String,
    pub genre: Option<String>,
    pub scores: Vec<Option<f64>>,
    pub popularity: Option<i64>,
    pub album_id: i64,
    pub game_id: i64,
    pub artist_id: i64,
}

fn score_columns() -> Vec<&'static str> {
    MoodKind::ALL.iter().map(|k| k.column()).collect()
}

impl Database {
    pub fn song_exists(&self, name: &str, game_id: i64, album_id: i64) -> rusqlite::Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM song WHERE song_name = ? AND game_id = ? AND album_id = ?",
                rusqlite::params![name, game_id, album_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Insert unless a row with the same (name, game, album) exists.
    /// Returns whether a row was written.
    pub fn insert_song_if_absent(&self, song: &NewSong) -> rusqlite::Result<bool> {
        if self.song_exists(&song.name, song.game_id, song.album_id)? {
            return Ok(false);
        }

        let columns = score_columns();
        let sql = format!(
            "INSERT INTO song (song_name, song_genre, {}, popularity_score, album_id, game_id, artist_id) \
             VALUES (?, ?, {}, ?, ?, ?, ?)",
            columns.join(", "),
            vec!["?"; columns.len()].join(", "),
        );

        let mut values: Vec<rusqlite::types::Value> = Vec::with_capacity(columns.len() + 6);
        values.push(song.name.clone().into());
        values.push(song.genre.clone().into());
        for kind in MoodKind::ALL {
            values.push(song.scores.get(kind).into());
        }
        values.push(song.popularity.into());
        values.push(song.album_id.into());
        values.push(song.game_id.into());
        values.push(song.artist_id.into());

        self.conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(true)
    }

    pub fn songs_for_album(&self, album_id: i64) -> rusqlite::Result<Vec<SongRow>> {
        let columns = score_columns();
        let sql = format!(
            "SELECT id, song_name, song_genre, popularity_score, album_id, game_id, artist_id, {} \
             FROM song WHERE album_id = ? ORDER BY id",
            columns.join(", "),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([album_id], |row| {
                let mut scores = Vec::with_capacity(columns.len());
                for i in 0..columns.len() {
                    scores.push(row.get::<_, Option<f64>>(7 + i)?);
                }
                Ok(SongRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    genre: row.get(2)?,
                    popularity: row.get(3)?,
                    album_id: row.get(4)?,
                    game_id: row.get(5)?,
                    artist_id: row.get(6)?,
                    scores,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewGame;

    fn seeded() -> (Database, i64, i64, i64) {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let dev = db.upsert_developer("Capcom").unwrap().id();
        let game = db
            .insert_game_if_absent(&NewGame {
                developer_id: dev,
                title: "Devil May Cry 5".to_string(),
                release_date: None,
                genres: Default::default(),
            })
            .unwrap()
            .id();
        let artist = db.upsert_artist("Casey Edwards").unwrap().id();
        let album = db
            .upsert_album("DMC5 OST", artist, game, "https://open.spotify.com/album/x1")
            .unwrap()
            .id();
        (db, game, album, artist)
    }

    fn song(name: &str, game: i64, album: i64, artist: i64) -> NewSong {
        let mut scores = MoodScores::default();
        scores.set(MoodKind::Aggressiveness, 0.91);
        scores.set(MoodKind::Sadness, 0.12);
        NewSong {
            name: name.to_string(),
            genre: "Rock---Nu Metal".to_string(),
            scores,
            popularity: Some(57),
            album_id: album,
            game_id: game,
            artist_id: artist,
        }
    }

    #[test]
    fn test_song_natural_key_is_unique_across_runs() {
        let (db, game, album, artist) = seeded();
        let devil_trigger = song("Devil Trigger", game, album, artist);

        assert!(db.insert_song_if_absent(&devil_trigger).unwrap());
        assert!(!db.insert_song_if_absent(&devil_trigger).unwrap());
        assert!(db.song_exists("Devil Trigger", game, album).unwrap());

        let rows = db.songs_for_album(album).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].genre.as_deref(), Some("Rock---Nu Metal"));
        assert_eq!(rows[0].popularity, Some(57));

        let aggressive = MoodKind::ALL.iter().position(|k| *k == MoodKind::Aggressiveness).unwrap();
        let stored = rows[0].scores[aggressive].unwrap();
        assert!((stored - 0.91).abs() < 1e-6);
    }

    #[test]
    fn test_same_name_in_other_album_is_a_new_song() {
        let (db, game, album, artist) = seeded();
        let other = db
            .upsert_album("DMC5 Special Edition OST", artist, game, "https://open.spotify.com/album/x2")
            .unwrap()
            .id();
        assert!(db.insert_song_if_absent(&song("Subhuman", game, album, artist)).unwrap());
        assert!(db.insert_song_if_absent(&song("Subhuman", game, other, artist)).unwrap());
    }
}
