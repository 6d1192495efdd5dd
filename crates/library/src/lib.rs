//! Library adapter boundary and LaunchBox catalog reader.
//!
//! This crate defines the seam between the sync/activation engine and a
//! concrete library format. A [`Library`] enumerates its games,
//! playlists, and an ordered **asset manifest** — the relative paths
//! that must be mirrored for the library to work from a copy. The
//! manifest is derived from the library's own catalog, never from a
//! blind filesystem crawl, so unrelated files on the same volume are
//! never copied.
//!
//! One adapter exists today ([`LaunchBoxLibrary`]); new formats plug in
//! through [`LibraryRegistry`] without touching engine call sites.

mod adapter;
mod launchbox;
mod playlist;
mod types;
mod xml;

pub use adapter::{Library, LibraryRegistry, normalize_path};
pub use launchbox::LaunchBoxLibrary;
pub use playlist::{PLAY_LATER_FILE, PlayLaterPlaylist};
pub use types::{Game, Playlist};

use launchpass_config::LibraryKind;

/// Errors produced while opening or reading a library.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed catalog {path}: {reason}")]
    Catalog { path: String, reason: String },

    #[error("malformed playlist: {0}")]
    Playlist(#[from] serde_json::Error),

    #[error("no adapter registered for library kind {0:?}")]
    Unsupported(LibraryKind),
}
