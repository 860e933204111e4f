use super::Database;

/// Row counts for the status command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub developers: i64,
    pub games: i64,
    pub artists: i64,
    pub albums_pending: i64,
    pub albums_processed: i64,
    pub songs: i64,
}

impl Database {
    pub fn stats(&self) -> rusqlite::Result<StoreStats> {
        let count = |sql: &str| -> rusqlite::Result<i64> { self.conn.query_row(sql, [], |row| row.get(0)) };

        Ok(StoreStats {
            developers: count("SELECT COUNT(*) FROM developer")?,
            games: count("SELECT COUNT(*) FROM game")?,
            artists: count("SELECT COUNT(*) FROM artist")?,
            albums_pending: count("SELECT COUNT(*) FROM album WHERE songs_processed = 0")?,
            albums_processed: count("SELECT COUNT(*) FROM album WHERE songs_processed = 1")?,
            songs: count("SELECT COUNT(*) FROM song")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        assert_eq!(db.stats().unwrap(), StoreStats::default());
    }
}
