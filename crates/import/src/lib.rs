//! Library import (removable → local mirror) and cache teardown.
//!
//! [`ImportEngine`] copies a removable library's games database and
//! asset tree into the local cache, reporting progress per manifest
//! entry and honoring cooperative cancellation. At most one import runs
//! at a time; the persisted `import_finished` flag is `true` only when
//! a copy actually completed, so an interrupted import is observable on
//! the next launch.

mod engine;
mod teardown;

pub use engine::{ImportEngine, MIRROR_DIR};

use launchpass_config::ConfigError;
use launchpass_library::LibraryError;
use launchpass_source::SourceError;

/// Progress/lifecycle notifications observable by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportEvent {
    Started,
    /// Percentage of manifest entries processed, `0.0..=100.0`.
    Progress { percent: f32 },
    /// Fired exactly once per import, on every outcome.
    Finished { success: bool },
    /// Unrecoverable failure while resolving the source; the import
    /// never reached the copy phase.
    Error { message: String },
}

/// Errors produced by an import run.
///
/// Cancellation is an outcome, not an I/O failure; it surfaces to
/// observers only as `Finished { success: false }`.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("no removable library to import")]
    NoRemovableSource,

    #[error("import cancelled")]
    Cancelled,
}
