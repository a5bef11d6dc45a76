use rusqlite::Connection;

pub mod tables {
    pub const TRACKS: &str = "tracks";

    pub const ALL_TABLES: &[&str] = &[TRACKS];
}

pub mod columns {
    pub const ID: &str = "id";
    pub const SONG_NAME: &str = "song_name";
    pub const ARTIST: &str = "artist";
    pub const ALBUM: &str = "album";
    pub const RELEASE_YEAR: &str = "release_year";
}

pub use columns::*;
pub use tables::*;

// AUTOINCREMENT keeps ids from being reused after deletion
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tracks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    song_name TEXT,
    artist TEXT,
    album TEXT,
    release_year INTEGER
);
"#;

pub fn init(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}

/// Drops every table and forgets allocated ids, then recreates the schema
pub fn reset(conn: &Connection) -> Result<(), rusqlite::Error> {
    for table in ALL_TABLES {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {table}"))?;
    }
    let has_sequence: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence')",
        [],
        |row| row.get(0),
    )?;
    if has_sequence {
        conn.execute("DELETE FROM sqlite_sequence", [])?;
    }
    init(conn)
}
