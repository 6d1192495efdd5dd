//! Storage-root scanning.
//!
//! The locator checks a fixed set of storage roots for a descriptor
//! file: the single local cache root, then every removable root in
//! enumeration order. The first removable root with a valid descriptor
//! wins; multiple removable libraries are never aggregated.

use std::fmt;
use std::path::PathBuf;

use launchpass_config::{ConfigError, Descriptor, read_descriptor};
use tracing::{debug, info};

use crate::SourceError;

/// Which storage root a library was found at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceLocation {
    #[default]
    None,
    Local,
    Removable,
}

impl SourceLocation {
    /// Stable string form used for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLocation::None => "none",
            SourceLocation::Local => "local",
            SourceLocation::Removable => "removable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(SourceLocation::None),
            "local" => Some(SourceLocation::Local),
            "removable" => Some(SourceLocation::Removable),
            _ => None,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of storage roots a locator scans.
#[derive(Debug, Clone)]
pub struct StorageRoots {
    /// The local cache directory.
    pub local: PathBuf,
    /// Mount points of removable volumes, in enumeration order.
    pub removable: Vec<PathBuf>,
}

impl StorageRoots {
    pub fn new(local: PathBuf, removable: Vec<PathBuf>) -> Self {
        Self { local, removable }
    }

    /// Roots with removable volumes detected from the running system.
    pub fn detect(local: PathBuf) -> Self {
        Self::new(local, removable_mounts())
    }
}

/// Enumerates mounted removable volumes.
///
/// On Linux these live under `/run/media/<user>/` or `/media/`. The
/// order is whatever the directory enumeration yields, sorted for
/// stability across repeated scans.
pub fn removable_mounts() -> Vec<PathBuf> {
    let mut mounts = Vec::new();

    let mut bases = vec![PathBuf::from("/media")];
    if let Ok(user) = std::env::var("USER") {
        bases.insert(0, PathBuf::from("/run/media").join(user));
    }

    for base in bases {
        let Ok(entries) = std::fs::read_dir(&base) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                mounts.push(path);
            }
        }
    }

    mounts.sort();
    mounts
}

/// A descriptor successfully found and parsed at a storage root.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoot {
    pub location: SourceLocation,
    /// The storage root holding the descriptor file.
    pub root: PathBuf,
    pub descriptor: Descriptor,
}

/// Scans storage roots for descriptors and caches the result.
///
/// Scanning has no side effects and is safe to repeat on every app
/// resume; [`has_source`](Self::has_source) reflects only the last scan.
pub struct SourceLocator {
    roots: StorageRoots,
    local: Option<ResolvedRoot>,
    removable: Option<ResolvedRoot>,
}

impl SourceLocator {
    pub fn new(roots: StorageRoots) -> Self {
        Self {
            roots,
            local: None,
            removable: None,
        }
    }

    pub fn roots(&self) -> &StorageRoots {
        &self.roots
    }

    /// Scans the local root and every removable root.
    ///
    /// Each location is scanned independently: a malformed descriptor
    /// at one location does not stop the other from resolving, but the
    /// error is still returned. Removable scanning stops at the first
    /// root that has a descriptor at all, valid or not.
    pub async fn scan_all(&mut self) -> Result<(), SourceError> {
        self.local = None;
        self.removable = None;

        let mut first_err: Option<ConfigError> = None;

        match read_descriptor(&self.roots.local).await {
            Ok(Some(descriptor)) => {
                self.local = Some(ResolvedRoot {
                    location: SourceLocation::Local,
                    root: self.roots.local.clone(),
                    descriptor,
                });
            }
            Ok(None) => debug!(root = %self.roots.local.display(), "no local descriptor"),
            Err(e) => first_err = Some(e),
        }

        for root in &self.roots.removable {
            match read_descriptor(root).await {
                Ok(Some(descriptor)) => {
                    info!(root = %root.display(), "found removable library");
                    self.removable = Some(ResolvedRoot {
                        location: SourceLocation::Removable,
                        root: root.clone(),
                        descriptor,
                    });
                    break;
                }
                Ok(None) => continue,
                Err(e) => {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                    break;
                }
            }
        }

        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Whether the last scan found a descriptor at `location`.
    /// Does not re-scan.
    pub fn has_source(&self, location: SourceLocation) -> bool {
        self.resolved(location).is_some()
    }

    /// The last scan's result for `location`.
    pub fn resolved(&self, location: SourceLocation) -> Option<&ResolvedRoot> {
        match location {
            SourceLocation::None => None,
            SourceLocation::Local => self.local.as_ref(),
            SourceLocation::Removable => self.removable.as_ref(),
        }
    }

    /// Forgets the scan result for `location` (used after teardown
    /// deletes the local descriptor).
    pub fn clear(&mut self, location: SourceLocation) {
        match location {
            SourceLocation::None => {}
            SourceLocation::Local => self.local = None,
            SourceLocation::Removable => self.removable = None,
        }
    }
}
