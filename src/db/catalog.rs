//! Developer and game rows.

use chrono::NaiveDate;
use rusqlite::{params_from_iter, types::Value, OptionalExtension};

use super::{Database, Upsert};
use crate::catalog::genres::{genre_columns, GenreVector, GENRES};

/// A game ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub developer_id: i64,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub genres: GenreVector,
}

/// Stored game as read back for tests and export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRow {
    pub id: i64,
    pub developer_id: Option<i64>,
    pub title: String,
    pub release_date: Option<String>,
    pub genres: Vec<u8>,
}

impl Database {
    pub fn upsert_developer(&self, name: &str) -> rusqlite::Result<Upsert> {
        if let Some(id) = self.developer_id(name)? {
            return Ok(Upsert::Existing(id));
        }
        self.conn.execute(
            "INSERT INTO developer (developer_name) VALUES (?)",
            [name],
        )?;
        Ok(Upsert::Created(self.conn.last_insert_rowid()))
    }

    pub fn developer_id(&self, name: &str) -> rusqlite::Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM developer WHERE developer_name = ?",
                [name],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn game_id(&self, title: &str) -> rusqlite::Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM game WHERE game_title = ?",
                [title],
                |row| row.get(0),
            )
            .optional()
    }

    /// Insert a game unless its title is already stored. An existing row is
    /// never updated.
    pub fn insert_game_if_absent(&self, game: &NewGame) -> rusqlite::Result<Upsert> {
        if let Some(id) = self.game_id(&game.title)? {
            return Ok(Upsert::Existing(id));
        }

        let columns: Vec<&str> = genre_columns().collect();
        let sql = format!(
            "INSERT INTO game (developer_id, game_title, release_date, {}) VALUES (?, ?, ?, {})",
            columns.join(", "),
            vec!["?"; columns.len()].join(", "),
        );

        let mut values: Vec<Value> = Vec::with_capacity(3 + GENRES.len());
        values.push(Value::Integer(game.developer_id));
        values.push(Value::Text(game.title.clone()));
        values.push(match game.release_date {
            Some(date) => Value::Text(date.format("%Y-%m-%d").to_string()),
            None => Value::Null,
        });
        values.extend(game.genres.iter().map(|g| Value::Integer(i64::from(*g))));

        self.conn.execute(&sql, params_from_iter(values))?;
        Ok(Upsert::Created(self.conn.last_insert_rowid()))
    }

    pub fn get_game(&self, title: &str) -> rusqlite::Result<Option<GameRow>> {
        let sql = format!(
            "SELECT id, developer_id, game_title, release_date, {} FROM game WHERE game_title = ?",
            genre_columns().collect::<Vec<_>>().join(", "),
        );
        self.conn
            .query_row(&sql, [title], |row| {
                let mut genres = Vec::with_capacity(GENRES.len());
                for i in 0..GENRES.len() {
                    genres.push(row.get::<_, Option<u8>>(4 + i)?.unwrap_or(0));
                }
                Ok(GameRow {
                    id: row.get(0)?,
                    developer_id: row.get(1)?,
                    title: row.get(2)?,
                    release_date: row.get(3)?,
                    genres,
                })
            })
            .optional()
    }
}
