//! First-use preparation of removable media.
//!
//! A removable volume with a `LaunchBox` folder but no descriptor gets
//! a default descriptor pointing at that folder, and theme settings are
//! created if missing. This is what lets a drive prepared on a PC work
//! without any manual configuration.

use std::path::{Path, PathBuf};

use launchpass_config::{Descriptor, LibraryKind, ThemeSettings, read_descriptor, write_descriptor};
use tracing::info;

use crate::SourceError;

/// Prepares one removable root for use.
///
/// Returns `None` if the root does not look like a library volume
/// (no `LaunchBox` folder). Otherwise ensures a descriptor and theme
/// settings exist and returns the settings.
pub async fn bootstrap_removable(root: &Path) -> Result<Option<ThemeSettings>, SourceError> {
    let launchbox = root.join("LaunchBox");
    if !launchbox.is_dir() {
        return Ok(None);
    }

    if read_descriptor(root).await?.is_none() {
        let descriptor = Descriptor {
            kind: LibraryKind::LaunchBox,
            relative_path: "./LaunchBox".into(),
            emulator_settings: None,
        };
        write_descriptor(root, &descriptor).await?;
        info!(root = %root.display(), "created default descriptor next to LaunchBox folder");
    }

    let theme = ThemeSettings::load_or_create(root).await?;
    Ok(Some(theme))
}

/// Prepares the first removable root that carries a library, mirroring
/// the locator's first-match-wins rule.
pub async fn bootstrap_removable_roots(
    roots: &[PathBuf],
) -> Result<Option<(PathBuf, ThemeSettings)>, SourceError> {
    for root in roots {
        if let Some(theme) = bootstrap_removable(root).await? {
            return Ok(Some((root.clone(), theme)));
        }
    }
    Ok(None)
}
