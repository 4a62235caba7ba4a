#![forbid(unsafe_code)]

//! Core domain model and business logic for the Quest Log system.
//!
//! This crate provides:
//! - Domain types (skills, habits, completion results)
//! - Leveling curve
//! - Progression store with referential consistency
//! - Export/import codec
//! - Snapshot persistence and the built-in starter state

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod leveling;
pub mod store;
pub mod codec;
pub mod snapshot;
pub mod defaults;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use leveling::{level_of, threshold_exp, LevelInfo};
pub use store::ProgressionStore;
pub use codec::{deserialize, serialize, serialize_with_timestamp};
pub use snapshot::SnapshotStore;
pub use defaults::{build_default_state, get_default_state};
