//! SQL schema for the PenPal SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    gender        TEXT,
    photo         TEXT,
    language      TEXT NOT NULL,
    country       TEXT,
    interests     TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    allow_details INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL                -- ISO 8601 UTC
);

-- The body columns are written once. Only is_read and translation are ever
-- updated, and is_read never goes back to 0.
CREATE TABLE IF NOT EXISTS letters (
    letter_id   TEXT PRIMARY KEY,
    sender_id   TEXT NOT NULL,
    receiver_id TEXT NOT NULL,
    content     TEXT NOT NULL,
    sent_at     TEXT NOT NULL,
    is_read     INTEGER NOT NULL DEFAULT 0,
    translation TEXT                           -- JSON Translation or NULL
);

-- Strictly append-only.
CREATE TABLE IF NOT EXISTS comments (
    comment_id TEXT PRIMARY KEY,
    letter_id  TEXT NOT NULL REFERENCES letters(letter_id),
    author_id  TEXT NOT NULL,
    content    TEXT NOT NULL,
    kind       TEXT NOT NULL DEFAULT 'comment', -- 'correction' | 'suggestion' | 'comment'
    created_at TEXT NOT NULL
);

-- Strictly append-only.
CREATE TABLE IF NOT EXISTS evaluations (
    evaluation_id TEXT PRIMARY KEY,
    letter_id     TEXT NOT NULL REFERENCES letters(letter_id),
    sender_id     TEXT NOT NULL,
    receiver_id   TEXT NOT NULL,
    intimacy      INTEGER NOT NULL CHECK (intimacy    BETWEEN 1 AND 5),
    naturalness   INTEGER NOT NULL CHECK (naturalness BETWEEN 1 AND 5),
    grammar       INTEGER NOT NULL CHECK (grammar     BETWEEN 1 AND 5),
    corrections   TEXT NOT NULL DEFAULT '',
    comments      TEXT NOT NULL DEFAULT '',
    sent_at       TEXT NOT NULL
);

-- Letters sent from viewer to subject.
CREATE TABLE IF NOT EXISTS interactions (
    viewer_id  TEXT NOT NULL,
    subject_id TEXT NOT NULL,
    count      INTEGER NOT NULL CHECK (count >= 0),
    PRIMARY KEY (viewer_id, subject_id)
);

CREATE INDEX IF NOT EXISTS letters_receiver_idx    ON letters(receiver_id);
CREATE INDEX IF NOT EXISTS letters_sender_idx      ON letters(sender_id);
CREATE INDEX IF NOT EXISTS comments_letter_idx     ON comments(letter_id);
CREATE INDEX IF NOT EXISTS evaluations_receiver_idx ON evaluations(receiver_id);

PRAGMA user_version = 1;
";
