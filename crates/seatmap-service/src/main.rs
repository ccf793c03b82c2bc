//! `seatmap`: administer seat inventories from the command line.
//!
//! Reads `seatmap.toml` (or the path given with `--config`), opens the SQLite
//! store and runs one command against it. Output is JSON on stdout.
//!
//! # Usage
//!
//! ```
//! seatmap create <EVENT_ID>
//! seatmap hold <EVENT_ID> A1,A2 --secs 600
//! seatmap confirm <EVENT_ID> <HOLD_ID> A1,A2 --user alice
//! seatmap run
//! ```

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use seatmap_core::ids::{EventId, HoldId, SeatLabel, parse_labels};
use seatmap_service::{SeatService, ServiceConfig, StaticCatalog};
use seatmap_store_sqlite::SqliteStore;
use serde::Serialize;
use serde_json::json;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

type Service = SeatService<SqliteStore, SqliteStore, StaticCatalog>;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Seat inventory administration")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "seatmap.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create an event's inventory from its configured seat plan.
  Create { event_id: EventId },

  /// Show availability counts and the available seats.
  Seats { event_id: EventId },

  /// Hold seats (comma-separated labels).
  Hold {
    event_id: EventId,
    #[arg(value_delimiter = ',', required = true)]
    seats:    Vec<String>,
    /// Hold length in seconds; the configured default if omitted.
    #[arg(long)]
    secs:     Option<u64>,
  },

  /// Confirm a hold, booking the listed seats.
  Confirm {
    event_id: EventId,
    hold_id:  HoldId,
    #[arg(value_delimiter = ',', required = true)]
    seats:    Vec<String>,
    #[arg(long)]
    user:     String,
  },

  /// Release reserved seats, or a whole hold with `--hold`.
  Release {
    event_id: EventId,
    #[arg(value_delimiter = ',')]
    seats:    Vec<String>,
    #[arg(long, conflicts_with = "seats")]
    hold:     Option<HoldId>,
  },

  /// Cancel booked seats.
  Cancel {
    event_id: EventId,
    #[arg(value_delimiter = ',', required = true)]
    seats:    Vec<String>,
  },

  /// Take seats out of service.
  Disable {
    event_id: EventId,
    #[arg(value_delimiter = ',', required = true)]
    seats:    Vec<String>,
  },

  /// Put disabled seats back into service.
  Enable {
    event_id: EventId,
    #[arg(value_delimiter = ',', required = true)]
    seats:    Vec<String>,
  },

  /// Stop accepting holds and bookings for an event.
  Deactivate { event_id: EventId },

  /// Print an event's audit log.
  Audit { event_id: EventId },

  /// Recover, then expire lapsed holds on an interval until Ctrl-C.
  Run,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so stdout stays machine-readable.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let config = ServiceConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  let catalog = StaticCatalog::from_config(&config.events)
    .context("invalid seat plan in config")?;
  if catalog.is_empty() {
    tracing::warn!(config = ?cli.config, "no events configured");
  } else {
    tracing::debug!(events = catalog.len(), "seat plans loaded");
  }

  let store_path = config.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let service: Service =
    SeatService::new(store.clone(), store, catalog, config);

  match cli.command {
    Command::Create { event_id } => {
      let inventory = service.create_inventory(event_id).await?;
      print_json(&json!({
        "event_id": event_id,
        "availability": inventory.availability(),
      }))
    }
    Command::Seats { event_id } => {
      let inventory = service.inventory(event_id).await?;
      print_json(&json!({
        "event_id": event_id,
        "active": inventory.is_active(),
        "availability": inventory.availability(),
        "available": inventory.available_seats(),
        "reserved": inventory.reserved_seats(),
        "booked": inventory.booked_seats(),
      }))
    }
    Command::Hold { event_id, seats, secs } => {
      let receipt = service
        .hold_seats(event_id, &labels(&seats)?, secs)
        .await?;
      print_json(&receipt)
    }
    Command::Confirm { event_id, hold_id, seats, user } => {
      let confirmation = service
        .confirm_booking(event_id, hold_id, &labels(&seats)?, &user)
        .await?;
      print_json(&confirmation)
    }
    Command::Release { event_id, seats, hold } => {
      let released = match hold {
        Some(hold_id) => service.release_hold(event_id, hold_id).await?,
        None => service.release_seats(event_id, &labels(&seats)?).await?,
      };
      print_json(&json!({ "released": released }))
    }
    Command::Cancel { event_id, seats } => {
      let cancelled = service.cancel_booking(event_id, &labels(&seats)?).await?;
      print_json(&json!({ "cancelled": cancelled }))
    }
    Command::Disable { event_id, seats } => {
      let changed = service.disable_seats(event_id, &labels(&seats)?).await?;
      print_json(&json!({ "disabled": changed }))
    }
    Command::Enable { event_id, seats } => {
      let changed = service.enable_seats(event_id, &labels(&seats)?).await?;
      print_json(&json!({ "enabled": changed }))
    }
    Command::Deactivate { event_id } => {
      let changed = service.deactivate(event_id).await?;
      print_json(&json!({ "deactivated": changed }))
    }
    Command::Audit { event_id } => print_json(&service.audit_log(event_id).await?),
    Command::Run => run(&service).await,
  }
}

async fn run(service: &Service) -> anyhow::Result<()> {
  let report = service.recover().await.context("recovery failed")?;
  print_json(&report)?;

  let every = Duration::from_secs(service.config().sweep_interval_secs.max(1));
  let mut interval = tokio::time::interval(every);
  tracing::info!(?every, "sweeping for lapsed holds");

  loop {
    tokio::select! {
      _ = interval.tick() => {
        if let Err(e) = service.sweep_expired().await {
          tracing::warn!(error = %e, "sweep failed");
        }
      }
      signal = tokio::signal::ctrl_c() => {
        signal.context("failed to listen for Ctrl-C")?;
        tracing::info!("shutting down");
        return Ok(());
      }
    }
  }
}

fn labels(raw: &[String]) -> anyhow::Result<Vec<SeatLabel>> {
  Ok(parse_labels(raw)?)
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
