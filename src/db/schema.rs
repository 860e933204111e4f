pub const SCHEMA: &str = r#"
-- Developers: one row per imported developer name
CREATE TABLE IF NOT EXISTS developer (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    developer_name TEXT UNIQUE
);

-- Games: genre columns follow catalog::genres::GENRES exactly
CREATE TABLE IF NOT EXISTS game (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    developer_id INTEGER,
    game_title TEXT UNIQUE,
    release_date DATE,
    action INTEGER,
    indie INTEGER,
    adventure INTEGER,
    rpg INTEGER,
    strategy INTEGER,
    shooter INTEGER,
    casual INTEGER,
    simulation INTEGER,
    puzzle INTEGER,
    arcade INTEGER,
    platformer INTEGER,
    massively_multiplayer INTEGER,
    racing INTEGER,
    sports INTEGER,
    fighting INTEGER,
    family INTEGER,
    board_games INTEGER,
    card INTEGER,
    educational INTEGER,
    FOREIGN KEY (developer_id) REFERENCES developer(id)
);

-- Artists: display name, several credited artists joined with ", "
CREATE TABLE IF NOT EXISTS artist (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    artist_name TEXT UNIQUE
);

-- Albums: songs_processed is 0 until every track was attempted
CREATE TABLE IF NOT EXISTS album (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    album_title TEXT UNIQUE,
    artist_id INTEGER,
    game_id INTEGER,
    spotify_link TEXT,
    songs_processed INTEGER,
    FOREIGN KEY (artist_id) REFERENCES artist(id),
    FOREIGN KEY (game_id) REFERENCES game(id)
);

CREATE INDEX IF NOT EXISTS idx_album_processed ON album(songs_processed);

-- Songs: (song_name, game_id, album_id) is checked before every insert
CREATE TABLE IF NOT EXISTS song (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    song_name TEXT,
    song_genre TEXT,
    approachability_score REAL,
    engagement_score REAL,
    danceability_score REAL,
    aggressiveness_score REAL,
    happiness_score REAL,
    party_score REAL,
    relaxed_score REAL,
    sadness_score REAL,
    electronic_score REAL,
    acoustic_score REAL,
    popularity_score INTEGER,
    album_id INTEGER,
    game_id INTEGER,
    artist_id INTEGER,
    FOREIGN KEY (album_id) REFERENCES album(id),
    FOREIGN KEY (game_id) REFERENCES game(id),
    FOREIGN KEY (artist_id) REFERENCES artist(id)
);

CREATE INDEX IF NOT EXISTS idx_song_natural_key ON song(song_name, game_id, album_id);
"#;

/// Applied after `SCHEMA`; failures (column already present or already
/// renamed) are ignored.
pub const MIGRATIONS: &[&str] = &[
    // Song tables written by the earlier scripts: misspelled sadness column
    // and no popularity.
    "ALTER TABLE song RENAME COLUMN saddness_score TO sadness_score",
    "ALTER TABLE song ADD COLUMN popularity_score INTEGER",
];
