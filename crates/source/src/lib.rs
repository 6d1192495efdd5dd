//! Data-source discovery and active-source state.
//!
//! A **source** is a storage root (the local cache directory or a
//! removable volume) carrying a library descriptor. [`SourceLocator`]
//! finds them, [`ActiveSource`] owns the one library handle the
//! front-end browses from, and [`AppSettings`] persists the choice
//! across restarts through an injectable key-value store.

mod active;
mod bootstrap;
mod locator;
mod settings;

pub use active::{ActiveSource, NullThumbnails, ThumbnailSink};
pub use bootstrap::{bootstrap_removable, bootstrap_removable_roots};
pub use locator::{ResolvedRoot, SourceLocation, SourceLocator, StorageRoots, removable_mounts};
pub use settings::{AppSettings, JsonSettings, MemorySettings, SettingsStore};

use launchpass_config::ConfigError;
use launchpass_library::LibraryError;

/// Errors produced while scanning for or activating sources.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Library(#[from] LibraryError),
}
