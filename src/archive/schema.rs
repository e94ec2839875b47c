//! Database schema definitions for the document archive

/// SQL schema for the archive
pub const SCHEMA_SQL: &str = r#"
-- Track harvest runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    start_id INTEGER NOT NULL,
    id_count INTEGER NOT NULL,
    chunk_size INTEGER NOT NULL,
    commit_every INTEGER NOT NULL,
    status TEXT NOT NULL
);

-- One segment per commit
CREATE TABLE IF NOT EXISTS segments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    committed_at TEXT NOT NULL,
    record_count INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_segments_run ON segments(run_id);

-- Document text plus its metadata sidecar
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    segment_id INTEGER NOT NULL REFERENCES segments(id),
    doc_id INTEGER NOT NULL,
    views REAL NOT NULL,
    comments REAL NOT NULL,
    likes REAL NOT NULL,
    text TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_segment ON documents(segment_id);
CREATE INDEX IF NOT EXISTS idx_documents_doc_id ON documents(doc_id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
