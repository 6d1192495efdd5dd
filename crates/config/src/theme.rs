//! Theme/user-settings record with find-or-create discovery.
//!
//! Lives under a dedicated subfolder of the storage root
//! (`<root>/LaunchPass/settings.json`). When the file is absent a
//! default settings record is written and returned, so first launch on
//! fresh media always yields a usable theme.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ConfigError;

/// Subfolder of the storage root holding theme assets and settings.
pub const THEME_DIR: &str = "LaunchPass";

/// Theme settings filename within [`THEME_DIR`].
pub const THEME_SETTINGS_FILE: &str = "settings.json";

const DEFAULT_FONT: &str = "Xbox.ttf";
const DEFAULT_BACKGROUND: &str = "LaunchPass-LP.mp4";
const DEFAULT_BOX_ART: &str = "Box - Front";

/// Pages that carry a configurable background video.
const PAGES: [&str; 6] = [
    "MainPage",
    "GamePage",
    "DetailsPage",
    "SearchPage",
    "CustomizePage",
    "SettingsPage",
];

/// Background video assignment for one named page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBackground {
    pub page: String,
    pub file: String,
}

/// User-facing theme preferences stored alongside a library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeSettings {
    pub font: String,
    pub backgrounds: Vec<PageBackground>,
    pub box_art_type: String,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            font: DEFAULT_FONT.into(),
            backgrounds: PAGES
                .iter()
                .map(|page| PageBackground {
                    page: (*page).into(),
                    file: DEFAULT_BACKGROUND.into(),
                })
                .collect(),
            box_art_type: DEFAULT_BOX_ART.into(),
        }
    }
}

impl ThemeSettings {
    /// Loads theme settings from `<root>/LaunchPass/settings.json`,
    /// creating the folder and a default settings file if absent.
    pub async fn load_or_create(storage_root: &Path) -> Result<Self, ConfigError> {
        let dir = storage_root.join(THEME_DIR);
        let path = dir.join(THEME_SETTINGS_FILE);

        match tokio::fs::read(&path).await {
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                tokio::fs::create_dir_all(&dir).await?;

                let tmp = dir.join(format!("{THEME_SETTINGS_FILE}.tmp"));
                tokio::fs::write(&tmp, serde_json::to_vec_pretty(&settings)?).await?;
                tokio::fs::rename(&tmp, &path).await?;

                info!(path = %path.display(), "created default theme settings");
                Ok(settings)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Background video path for a named page, if one is configured.
    pub fn media_path(&self, storage_root: &Path, page: &str) -> Option<PathBuf> {
        self.backgrounds.iter().find(|b| b.page == page).map(|b| {
            storage_root
                .join(THEME_DIR)
                .join("Backgrounds")
                .join(&b.file)
        })
    }

    /// Path of the configured font file.
    pub fn font_path(&self, storage_root: &Path) -> PathBuf {
        storage_root.join(THEME_DIR).join("Fonts").join(&self.font)
    }
}
