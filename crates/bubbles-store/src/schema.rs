use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 1;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    // The five ranking queries may open their own connections concurrently.
    conn.pragma_update(None, "busy_timeout", 5000)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS ideas (
            id                   TEXT PRIMARY KEY,
            title                TEXT NOT NULL,
            description          TEXT NOT NULL,
            submitter_name       TEXT,
            lightning_address    TEXT,
            created_at           TEXT NOT NULL,
            score                INTEGER NOT NULL DEFAULT 0 CHECK (score >= 0),
            exclude_from_display INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS idea_tags (
            idea_id  TEXT NOT NULL REFERENCES ideas(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            tag      TEXT NOT NULL,
            PRIMARY KEY (idea_id, position)
        );

        CREATE INDEX IF NOT EXISTS idx_ideas_created ON ideas(created_at);
        CREATE INDEX IF NOT EXISTS idx_ideas_score ON ideas(score, created_at);
        ",
    )?;

    let stored: Option<i64> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get::<_, String>(0),
        )
        .ok()
        .and_then(|v| v.parse().ok());
    if stored != Some(SCHEMA_VERSION) {
        tracing::debug!(?stored, "stamping schema version {SCHEMA_VERSION}");
        conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
            [SCHEMA_VERSION.to_string()],
        )?;
    }

    Ok(())
}
