//! # Pipely - local production tracking
//!
//! Persistence layer for a single-user production tracker.
//!
//! Pipely provides:
//! - One SQLite file holding projects, shots, assets, tasks, approvals and schedules
//! - Forward-only, versioned schema migrations that are safe to re-run
//! - Typed repositories with explicit existence gates (no engine-level foreign keys)
//! - Transactional purge of a project and everything beneath it
//! - Count and status reports across every table

pub mod config;
pub mod model;
pub mod output;
pub mod status;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use config::{DbLocation, PipelyConfig};
pub use model::{Approval, Asset, EntityKind, Project, Schedule, Shot, Task};
pub use status::StatusSet;
pub use storage::{PurgeReport, PurgeScope, SqliteStore, Summary};

/// Result type alias for Pipely operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Pipely operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Migration {version} ({name}) failed")]
    Migration {
        version: i64,
        name: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{} ID not found: {id}", kind.label())]
    NotFound { kind: EntityKind, id: i64 },

    #[error("No updates provided.")]
    NoUpdates,

    #[error("Invalid {kind} status '{value}'. Allowed: {allowed}")]
    InvalidStatus {
        kind: &'static str,
        value: String,
        allowed: String,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Could not determine the home directory")]
    HomeDirNotFound,
}
