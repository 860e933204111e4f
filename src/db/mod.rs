mod schema;
pub mod albums;
pub mod catalog;
pub mod songs;
pub mod stats;

use rusqlite::Connection;
use std::path::Path;

pub use schema::{SCHEMA, MIGRATIONS};
pub use albums::PendingAlbum;
pub use catalog::NewGame;
pub use songs::{NewSong, SongRow};
pub use stats::StoreStats;

/// Result of an insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created(i64),
    Existing(i64),
}

impl Upsert {
    pub fn id(self) -> i64 {
        match self {
            Upsert::Created(id) | Upsert::Existing(id) => id,
        }
    }

    pub fn was_created(self) -> bool {
        matches!(self, Upsert::Created(_))
    }
}

/// The relational store. One connection is reused for the whole run and
/// every statement commits on its own.
pub struct Database {
    pub(crate) conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self::with_connection(conn)?)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> rusqlite::Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        Ok(Self { conn })
    }

    pub fn initialize(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        self.run_migrations();
        Ok(())
    }

    fn run_migrations(&self) {
        for migration in MIGRATIONS {
            if let Err(e) = self.conn.execute(migration, []) {
                tracing::trace!(%migration, error = %e, "Migration skipped");
            }
        }
    }
}
