//! The library adapter seam and kind-based dispatch.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use launchpass_config::{Descriptor, LibraryKind};
use tracing::debug;

use crate::types::{Game, Playlist};
use crate::{LaunchBoxLibrary, LibraryError};

/// A loaded (or loadable) game library of some concrete format.
///
/// The sync engine and the active-source service consume libraries only
/// through this trait, so new formats slot in without touching either.
/// `games`, `playlists` and `assets` are empty until [`load`](Self::load)
/// has run.
pub trait Library: Send + Sync {
    /// Absolute root of the library's data folder.
    fn root(&self) -> &Path;

    /// The descriptor this library was opened from.
    fn descriptor(&self) -> &Descriptor;

    /// Reads the library catalog from disk.
    fn load(&mut self) -> Result<(), LibraryError>;

    fn games(&self) -> &[Game];

    fn playlists(&self) -> &[Playlist];

    /// Ordered manifest of relative paths (files or directories) that
    /// must be mirrored for this library. Derived from the catalog, not
    /// a filesystem crawl; entries may be absent on disk.
    fn assets(&self) -> Vec<String>;

    /// Location of the "play later" queue tied to this library.
    /// Deleted during cache teardown.
    fn play_later_path(&self) -> PathBuf;
}

type Constructor = fn(PathBuf, Descriptor) -> Box<dyn Library>;

/// Maps a [`LibraryKind`] to an adapter constructor.
///
/// Open for extension: registering a new kind requires no change to any
/// engine call site.
pub struct LibraryRegistry {
    constructors: HashMap<LibraryKind, Constructor>,
}

impl Default for LibraryRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl LibraryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Creates a registry with all built-in adapters registered.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(LibraryKind::LaunchBox, |root, descriptor| {
            Box::new(LaunchBoxLibrary::new(root, descriptor))
        });
        registry
    }

    /// Registers (or replaces) the constructor for a library kind.
    pub fn register(&mut self, kind: LibraryKind, constructor: Constructor) {
        self.constructors.insert(kind, constructor);
    }

    /// Opens a library for a descriptor found at `descriptor_dir`.
    ///
    /// The descriptor's relative path is resolved against the directory
    /// holding the descriptor file, with `.`/`..` segments normalized
    /// away. The returned library is not yet loaded.
    pub fn open(
        &self,
        descriptor_dir: &Path,
        descriptor: &Descriptor,
    ) -> Result<Box<dyn Library>, LibraryError> {
        let root = normalize_path(&descriptor_dir.join(&descriptor.relative_path));

        let constructor = self
            .constructors
            .get(&descriptor.kind)
            .ok_or(LibraryError::Unsupported(descriptor.kind))?;

        debug!(root = %root.display(), kind = ?descriptor.kind, "opening library");
        Ok(constructor(root, descriptor.clone()))
    }
}

/// Lexically normalizes `.` and `..` segments out of a path.
///
/// Unlike `std::fs::canonicalize` this does not touch the filesystem,
/// so it works for destinations that do not exist yet.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                out.push(component.as_os_str());
            }
        }
    }

    out
}
