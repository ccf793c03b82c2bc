//! [`SqliteStore`]: the SQLite implementation of [`InventoryStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use seatmap_core::{
  audit::AuditEntry,
  ids::EventId,
  inventory::SeatInventory,
  store::{InventoryStore, SaveOutcome},
};

use crate::{
  Error, Result,
  encode::{
    RawAuditEntry, decode_event_id, decode_inventory, encode_action, encode_dt,
    encode_event_id, encode_hold_id, encode_inventory, encode_labels,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A seat inventory store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

/// Audit columns encoded ahead of time so the database closure never has to
/// deal with serialisation errors.
struct AuditRow {
  event_id:    String,
  action:      &'static str,
  hold_id:     Option<String>,
  seats:       String,
  recorded_at: String,
}

fn encode_audit(entries: Vec<AuditEntry>) -> Result<Vec<AuditRow>> {
  entries
    .into_iter()
    .map(|e| {
      Ok(AuditRow {
        event_id:    encode_event_id(e.event_id),
        action:      encode_action(e.action),
        hold_id:     e.hold_id.map(encode_hold_id),
        seats:       encode_labels(&e.seats)?,
        recorded_at: encode_dt(e.recorded_at),
      })
    })
    .collect()
}

fn insert_audit(
  tx: &rusqlite::Transaction<'_>,
  rows: &[AuditRow],
) -> rusqlite::Result<()> {
  let mut stmt = tx.prepare(
    "INSERT INTO inventory_audit (event_id, action, hold_id, seats, recorded_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
  )?;
  for row in rows {
    stmt.execute(rusqlite::params![
      row.event_id,
      row.action,
      row.hold_id,
      row.seats,
      row.recorded_at,
    ])?;
  }
  Ok(())
}

/// What the save transaction saw.
enum RawSave {
  Saved,
  Conflict(i64),
  Missing,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── InventoryStore impl ─────────────────────────────────────────────────────

impl InventoryStore for SqliteStore {
  type Error = Error;

  async fn create(
    &self,
    inventory: &SeatInventory,
    audit: Vec<AuditEntry>,
  ) -> Result<bool> {
    let event_id_str = encode_event_id(inventory.event_id);
    let version      = inventory.version as i64;
    let total        = inventory.total_seats() as i64;
    let active       = inventory.is_active();
    let record_json  = encode_inventory(inventory)?;
    let created_str  = encode_dt(inventory.created_at);
    let updated_str  = encode_dt(Utc::now());
    let audit_rows   = encode_audit(audit)?;

    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let inserted = tx.execute(
          "INSERT INTO inventories (
             event_id, version, total_seats, active, record_json,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT(event_id) DO NOTHING",
          rusqlite::params![
            event_id_str,
            version,
            total,
            active,
            record_json,
            created_str,
            updated_str,
          ],
        )?;
        if inserted == 0 {
          return Ok(false);
        }
        insert_audit(&tx, &audit_rows)?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(created)
  }

  async fn load(&self, event_id: EventId) -> Result<Option<SeatInventory>> {
    let id_str = encode_event_id(event_id);

    let raw: Option<(i64, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT version, record_json FROM inventories WHERE event_id = ?1",
              rusqlite::params![id_str],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(version, json)| decode_inventory(version, &json))
      .transpose()
  }

  async fn save(
    &self,
    inventory: &SeatInventory,
    audit: Vec<AuditEntry>,
  ) -> Result<SaveOutcome> {
    let expected = inventory.version;
    let mut next = inventory.clone();
    next.version = expected + 1;

    let event_id_str = encode_event_id(inventory.event_id);
    let expected_i64 = expected as i64;
    let next_i64     = next.version as i64;
    let active       = next.is_active();
    let record_json  = encode_inventory(&next)?;
    let updated_str  = encode_dt(Utc::now());
    let audit_rows   = encode_audit(audit)?;

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE inventories
              SET version = ?1, active = ?2, record_json = ?3, updated_at = ?4
            WHERE event_id = ?5 AND version = ?6",
          rusqlite::params![
            next_i64,
            active,
            record_json,
            updated_str,
            event_id_str,
            expected_i64,
          ],
        )?;

        if changed == 0 {
          // Dropping `tx` rolls back; nothing was written anyway.
          let current: Option<i64> = tx
            .query_row(
              "SELECT version FROM inventories WHERE event_id = ?1",
              rusqlite::params![event_id_str],
              |row| row.get(0),
            )
            .optional()?;
          return Ok(match current {
            Some(v) => RawSave::Conflict(v),
            None => RawSave::Missing,
          });
        }

        insert_audit(&tx, &audit_rows)?;
        tx.commit()?;
        Ok(RawSave::Saved)
      })
      .await?;

    match raw {
      RawSave::Saved => Ok(SaveOutcome::Saved { version: next.version }),
      RawSave::Conflict(current) => {
        tracing::debug!(
          event_id = %inventory.event_id,
          expected,
          current,
          "inventory version conflict"
        );
        Ok(SaveOutcome::VersionConflict { current: current.max(0) as u64 })
      }
      RawSave::Missing => Err(Error::EventNotFound(inventory.event_id)),
    }
  }

  async fn list_events(&self) -> Result<Vec<EventId>> {
    let ids: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT event_id FROM inventories ORDER BY created_at, event_id",
        )?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| decode_event_id(s)).collect()
  }

  async fn audit_log(&self, event_id: EventId) -> Result<Vec<AuditEntry>> {
    let id_str = encode_event_id(event_id);

    let raws: Vec<RawAuditEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT event_id, action, hold_id, seats, recorded_at
             FROM inventory_audit
            WHERE event_id = ?1
            ORDER BY audit_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawAuditEntry {
              event_id:    row.get(0)?,
              action:      row.get(1)?,
              hold_id:     row.get(2)?,
              seats:       row.get(3)?,
              recorded_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuditEntry::into_entry).collect()
  }
}
