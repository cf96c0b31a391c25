//! SQL schema for the Folio SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS books (
    book_id         TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    code            TEXT NOT NULL UNIQUE,
    language        TEXT NOT NULL DEFAULT 'es',
    total_changes   INTEGER NOT NULL DEFAULT 0 CHECK (total_changes >= 0),
    last_check_date TEXT,
    imported_at     TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chapters (
    chapter_id   TEXT PRIMARY KEY,
    book_id      TEXT NOT NULL REFERENCES books(book_id) ON DELETE CASCADE,
    number       INTEGER NOT NULL,
    title        TEXT NOT NULL,
    change_count INTEGER NOT NULL DEFAULT 0 CHECK (change_count >= 0),
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    UNIQUE (book_id, number)
);

CREATE TABLE IF NOT EXISTS paragraphs (
    paragraph_id     TEXT PRIMARY KEY,
    chapter_id       TEXT NOT NULL REFERENCES chapters(chapter_id) ON DELETE CASCADE,
    paragraph_number INTEGER NOT NULL,  -- position at creation; not an identity
    refcode          TEXT,              -- e.g. 'DTG 46.1'; the identity key
    base_text        TEXT NOT NULL,
    latest_text      TEXT NOT NULL,
    has_changed      INTEGER NOT NULL DEFAULT 0,
    change_history   TEXT NOT NULL,     -- {\"schema_version\":1,\"entries\":[...]}
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

-- 'initial-import' | 'periodic-recheck' | 'manual-historical' | 'test-seed'
CREATE TABLE IF NOT EXISTS book_versions (
    version_id     TEXT PRIMARY KEY,
    book_id        TEXT NOT NULL REFERENCES books(book_id) ON DELETE CASCADE,
    version_number INTEGER NOT NULL,
    source_type    TEXT NOT NULL,
    is_baseline    INTEGER NOT NULL DEFAULT 0,
    edition_date   TEXT,
    notes          TEXT,
    imported_at    TEXT NOT NULL,
    UNIQUE (book_id, version_number)
);

-- At most one baseline per book.
CREATE UNIQUE INDEX IF NOT EXISTS book_versions_one_baseline
    ON book_versions(book_id) WHERE is_baseline = 1;

-- Snapshots are never updated.
CREATE TABLE IF NOT EXISTS version_snapshots (
    snapshot_id  TEXT PRIMARY KEY,
    version_id   TEXT NOT NULL REFERENCES book_versions(version_id) ON DELETE CASCADE,
    paragraph_id TEXT NOT NULL REFERENCES paragraphs(paragraph_id) ON DELETE CASCADE,
    text         TEXT NOT NULL
);

-- Append-only ledger; only `notes` is ever updated.
CREATE TABLE IF NOT EXISTS comparisons (
    comparison_id           TEXT PRIMARY KEY,
    book_id                 TEXT NOT NULL REFERENCES books(book_id) ON DELETE CASCADE,
    comparison_date         TEXT NOT NULL,
    comparison_type         TEXT NOT NULL,
    total_changes           INTEGER NOT NULL,
    changed_paragraph_count INTEGER NOT NULL,
    chapters_affected       TEXT NOT NULL DEFAULT '[]',
    notes                   TEXT
);

CREATE INDEX IF NOT EXISTS chapters_book_idx        ON chapters(book_id);
CREATE INDEX IF NOT EXISTS paragraphs_chapter_idx   ON paragraphs(chapter_id);
CREATE INDEX IF NOT EXISTS paragraphs_refcode_idx   ON paragraphs(refcode);
CREATE INDEX IF NOT EXISTS versions_book_idx        ON book_versions(book_id);
CREATE INDEX IF NOT EXISTS snapshots_version_idx    ON version_snapshots(version_id);
CREATE INDEX IF NOT EXISTS comparisons_book_idx     ON comparisons(book_id);

PRAGMA user_version = 1;
";
