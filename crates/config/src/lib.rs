//! Library descriptor store and theme settings for LaunchPass.
//!
//! A **descriptor** is a small persisted record at the top of a storage
//! root that identifies which library format lives there and where its
//! data folder is, relative to the descriptor file itself. Scanning for
//! descriptors is how the engine discovers libraries on removable media
//! and in the local cache.
//!
//! Theme settings follow the same find-or-create discovery pattern under
//! a dedicated subfolder of the storage root.

mod descriptor;
mod theme;

pub use descriptor::{
    DESCRIPTOR_FILE, Descriptor, LibraryKind, descriptor_path, read_descriptor, write_descriptor,
};
pub use theme::{PageBackground, THEME_DIR, THEME_SETTINGS_FILE, ThemeSettings};

/// Errors produced by the config crate.
///
/// A missing descriptor is *not* an error — [`read_descriptor`] returns
/// `Ok(None)` for that. `Malformed` means a file was present but did not
/// parse, which always propagates to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Malformed(#[from] serde_json::Error),
}
