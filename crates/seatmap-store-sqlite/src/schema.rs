//! SQL schema for the seat inventory store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per event. The seat map, pricing and hold table live in
-- record_json; the scalar columns are copies kept for inspection.
CREATE TABLE IF NOT EXISTS inventories (
    event_id    TEXT PRIMARY KEY,
    version     INTEGER NOT NULL,  -- optimistic concurrency counter
    total_seats INTEGER NOT NULL,
    active      INTEGER NOT NULL DEFAULT 1,
    record_json TEXT NOT NULL,
    created_at  TEXT NOT NULL,     -- ISO 8601 UTC
    updated_at  TEXT NOT NULL
);

-- Strictly append-only; written in the same transaction as the
-- inventories row it describes.
CREATE TABLE IF NOT EXISTS inventory_audit (
    audit_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id    TEXT NOT NULL REFERENCES inventories(event_id),
    action      TEXT NOT NULL,     -- 'held' | 'confirmed' | 'expired' | ...
    hold_id     TEXT,
    seats       TEXT NOT NULL DEFAULT '[]',
    recorded_at TEXT NOT NULL
);

-- Booking ledger. hold_id is the idempotency key.
CREATE TABLE IF NOT EXISTS bookings (
    hold_id     TEXT PRIMARY KEY,
    event_id    TEXT NOT NULL,
    seats       TEXT NOT NULL,     -- JSON array of seat labels
    user_id     TEXT NOT NULL,
    price       INTEGER NOT NULL,  -- minor currency units
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS audit_event_idx    ON inventory_audit(event_id);
CREATE INDEX IF NOT EXISTS bookings_event_idx ON bookings(event_id);

PRAGMA user_version = 1;
";
