//! SQL schema for the FieldOps SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Each entity table keeps the whole record as JSON in `body` and copies the
/// columns worth indexing next to it.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS managers (
    manager_id  INTEGER PRIMARY KEY,
    body        TEXT NOT NULL,
    deleted_at  TEXT,              -- RFC 3339 UTC or NULL
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS technicians (
    technician_id INTEGER PRIMARY KEY,
    body          TEXT NOT NULL,
    specialty     TEXT NOT NULL,
    availability  TEXT NOT NULL,   -- 'available' | 'busy' | 'on_leave'
    deleted_at    TEXT,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sites (
    site_id     INTEGER PRIMARY KEY,
    body        TEXT NOT NULL,
    manager_id  INTEGER NOT NULL,
    deleted_at  TEXT,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS interventions (
    intervention_id INTEGER PRIMARY KEY,
    body            TEXT NOT NULL,
    status          TEXT NOT NULL,  -- 'unresolved' | 'in_progress' | 'resolved'
    technician_id   INTEGER,
    version         INTEGER NOT NULL,
    updated_at      TEXT NOT NULL
);

-- The soft-deletion audit log is append-only.
CREATE TABLE IF NOT EXISTS deletions (
    audit_id     TEXT PRIMARY KEY,
    target_kind  TEXT NOT NULL,    -- 'manager' | 'technician' | 'site'
    target_id    INTEGER NOT NULL,
    reason       TEXT NOT NULL,    -- JSON-encoded DeletionReason
    recorded_at  TEXT NOT NULL,
    UNIQUE (target_kind, target_id)
);

CREATE INDEX IF NOT EXISTS interventions_status_idx     ON interventions(status);
CREATE INDEX IF NOT EXISTS interventions_technician_idx ON interventions(technician_id);
CREATE INDEX IF NOT EXISTS technicians_specialty_idx    ON technicians(specialty);

PRAGMA user_version = 1;
";
