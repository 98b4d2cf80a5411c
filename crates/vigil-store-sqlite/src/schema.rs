//! SQL schema for the Vigil SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One intended patrol visit: site x shift x route x date.
-- Uniqueness on (date, shift, route, site_id) is enforced by
-- dedup-before-write in the store, not by a constraint.
CREATE TABLE IF NOT EXISTS plans (
    plan_id     TEXT PRIMARY KEY,
    date        TEXT NOT NULL,   -- YYYY-MM-DD
    shift       TEXT NOT NULL,   -- 'morning' | 'evening' | 'night'
    route       TEXT NOT NULL,   -- 'A' | 'B'
    site_id     TEXT NOT NULL,
    site_name   TEXT NOT NULL,
    created_by  TEXT NOT NULL,
    created_at  TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- The visit log is strictly append-only and never validated at ingest:
-- every column except the rowid is free text from the field app.
CREATE TABLE IF NOT EXISTS visit_log (
    timestamp       TEXT NOT NULL,   -- verbatim, possibly malformed
    inspector_name  TEXT NOT NULL,
    route_text      TEXT NOT NULL,
    site_name_text  TEXT NOT NULL,
    guard_name      TEXT NOT NULL,
    shift_code      TEXT NOT NULL,
    score           REAL,
    gps_text        TEXT,
    event_date      TEXT             -- YYYY-MM-DD salvaged at append, or NULL
);

CREATE TABLE IF NOT EXISTS sites (
    site_id  TEXT PRIMARY KEY,
    code     TEXT NOT NULL,
    name_en  TEXT NOT NULL,
    name_th  TEXT NOT NULL,
    route    TEXT             -- 'A' | 'B' | NULL
);

CREATE TABLE IF NOT EXISTS inspectors (
    name            TEXT PRIMARY KEY,
    declared_shift  TEXT             -- 'morning' | 'evening' | 'night' | NULL
);

CREATE INDEX IF NOT EXISTS plans_date_idx      ON plans(date);
CREATE INDEX IF NOT EXISTS visit_log_date_idx  ON visit_log(event_date);

PRAGMA user_version = 1;
";
