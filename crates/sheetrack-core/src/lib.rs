//! sheetrack-core library.
//!
//! Catalog hierarchy (Sheet → Topic → SubPattern → Problem), sibling
//! reordering, the per-user streak state machine and progress aggregation,
//! all backed by a single SQLite store.
//!
//! # Conventions
//!
//! - **Errors**: Use [`error::CatalogError`] for domain failures and
//!   `anyhow::Result` at bootstrap boundaries (config, opening the store).
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod notes;
pub mod progress;
