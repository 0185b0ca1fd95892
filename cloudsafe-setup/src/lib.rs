//! # cloudsafe-setup
//!
//! Interactive builder for the CloudSafe archiver's `config.json`.
//!
//! The operator is walked through every storage provider and the default
//! settings, one prompt per value. Disabled providers are dropped before the
//! file is written, and the result can be inspected later the way the
//! archiver reads it.
//!
//! ## Modules
//!
//! - [`schema`] - The compiled-in CloudSafe schema
//! - [`filter`] - Removal of disabled providers
//! - [`writer`] - Atomic JSON/TOML output
//! - [`summary`] - End-of-run summary
//! - [`setup`] - The interactive run
//! - [`settings`] - Reading a generated config back

/// Removal of disabled storage providers.
pub mod filter;

/// Settings resolution for an existing config file.
///
/// Mirrors how the archiver reads `default_settings` and the selected
/// provider section.
pub mod settings;

/// The compiled-in CloudSafe schema.
pub mod schema;

/// The interactive config-building run.
pub mod setup;

/// End-of-run summary.
pub mod summary;

/// Atomic config output.
pub mod writer;

#[macro_use]
extern crate log;

pub use schema::{DEFAULT_CONFIG_FILE, ProviderSelection, cloudsafe_schema};
pub use setup::{SetupOptions, SetupOutcome, run_setup};
