//! Artist and album rows, and the per-album checkpoint.

use rusqlite::OptionalExtension;

use super::{Database, Upsert};

/// An album whose tracks have not all been attempted yet, with the names
/// needed to build its media paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAlbum {
    pub id: i64,
    pub title: String,
    pub artist_id: i64,
    pub game_id: i64,
    pub link: String,
    pub game_title: String,
    pub developer_name: String,
}

impl Database {
    pub fn upsert_artist(&self, name: &str) -> rusqlite::Result<Upsert> {
        let existing: Option<i64> = self
            .conn
            .query_row("SELECT id FROM artist WHERE artist_name = ?", [name], |row| row.get(0))
            .optional()?;
        if let Some(id) = existing {
            return Ok(Upsert::Existing(id));
        }
        self.conn.execute("INSERT INTO artist (artist_name) VALUES (?)", [name])?;
        Ok(Upsert::Created(self.conn.last_insert_rowid()))
    }

    /// Insert an album by unique title with `songs_processed = 0`. An album
    /// already stored keeps its artist, game, link and checkpoint.
    pub fn upsert_album(
        &self,
        title: &str,
        artist_id: i64,
        game_id: i64,
        link: &str,
    ) -> rusqlite::Result<Upsert> {
        let existing: Option<i64> = self
            .conn
            .query_row("SELECT id FROM album WHERE album_title = ?", [title], |row| row.get(0))
            .optional()?;
        if let Some(id) = existing {
            return Ok(Upsert::Existing(id));
        }
        self.conn.execute(
            r#"
            INSERT INTO album (album_title, artist_id, game_id, spotify_link, songs_processed)
            VALUES (?, ?, ?, ?, 0)
            "#,
            rusqlite::params![title, artist_id, game_id, link],
        )?;
        Ok(Upsert::Created(self.conn.last_insert_rowid()))
    }

    pub fn pending_albums(&self) -> rusqlite::Result<Vec<PendingAlbum>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT album.id, album.album_title, album.artist_id, album.game_id, album.spotify_link,
                   game.game_title, developer.developer_name
            FROM album
            JOIN game ON album.game_id = game.id
            JOIN developer ON game.developer_id = developer.id
            WHERE album.songs_processed = 0
            ORDER BY album.id
            "#,
        )?;
        let albums = stmt
            .query_map([], |row| {
                Ok(PendingAlbum {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    artist_id: row.get(2)?,
                    game_id: row.get(3)?,
                    link: row.get(4)?,
                    game_title: row.get(5)?,
                    developer_name: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(albums)
    }

    /// Set the checkpoint. It only ever moves from 0 to 1.
    pub fn mark_album_processed(&self, album_id: i64) -> rusqlite::Result<()> {
        self.conn.execute(
            "UPDATE album SET songs_processed = 1 WHERE id = ?",
            [album_id],
        )?;
        Ok(())
    }

    pub fn album_processed(&self, album_id: i64) -> rusqlite::Result<Option<bool>> {
        self.conn
            .query_row(
                "SELECT songs_processed FROM album WHERE id = ?",
                [album_id],
                |row| Ok(row.get::<_, Option<i64>>(0)?.unwrap_or(0) != 0),
            )
            .optional()
    }
}
