//! Core types and trait definitions for the seat inventory.
//!
//! This crate is deliberately free of runtime and database dependencies. The
//! seat/hold state machine lives here as plain synchronous code; the service
//! crate adds serialization, timers and persistence around it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod audit;
pub mod clock;
pub mod error;
pub mod hold;
pub mod ids;
pub mod inventory;
pub mod plan;
pub mod seat;
pub mod store;

pub use error::{Error, ErrorKind, Result};
