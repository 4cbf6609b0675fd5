//! HoundTrainer: a client for BloodHound custom node types and saved Cypher queries.
//!
//! The library holds everything the `houndtrainer` binary does, so the same
//! operations can be driven from code and tests.
//!
//! # Modules
//!
//! - `session`: bearer token acquisition and memoization
//! - `transport`: the authenticated HTTP dispatcher
//! - `tabular`, `synthesizer`: CSV to model document conversion
//! - `resources`: get, list, upload, export and delete for both resource kinds
//! - `commands`, `actions`, `cli`: CLI definitions and handlers
//! - `configuration`: the YAML configuration file
//! - `format`: JSON and CSV output rendering
//! - `error`, `exit_codes`: error types and process exit codes

pub mod actions;
pub mod cli;
pub mod commands;
pub mod configuration;
pub mod error;
pub mod exit_codes;
pub mod format;
pub mod model;
pub mod resources;
pub mod session;
pub mod synthesizer;
pub mod tabular;
pub mod transport;
