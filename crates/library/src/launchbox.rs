//! LaunchBox library adapter.
//!
//! Reads the LaunchBox catalog layout:
//!
//! ```text
//! <root>/Data/Platforms.xml          list of platforms
//! <root>/Data/Platforms/<name>.xml   games per platform
//! <root>/Data/Playlists/*.xml        optional playlists
//! ```
//!
//! The asset manifest it produces covers the catalog files themselves,
//! every game's application path, and the per-platform artwork and
//! video folders.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use launchpass_config::Descriptor;
use tracing::{debug, warn};

use crate::playlist::PLAY_LATER_FILE;
use crate::types::{Game, Playlist};
use crate::xml;
use crate::{Library, LibraryError};

pub struct LaunchBoxLibrary {
    root: PathBuf,
    descriptor: Descriptor,
    platforms: Vec<String>,
    games: Vec<Game>,
    playlists: Vec<Playlist>,
}

impl LaunchBoxLibrary {
    pub fn new(root: PathBuf, descriptor: Descriptor) -> Self {
        Self {
            root,
            descriptor,
            platforms: Vec::new(),
            games: Vec::new(),
            playlists: Vec::new(),
        }
    }

    fn load_platforms(&mut self) -> Result<(), LibraryError> {
        let path = self.root.join("Data").join("Platforms.xml");
        let raw = std::fs::read_to_string(&path)?;

        self.platforms = xml::blocks(&raw, "Platform")
            .iter()
            .filter_map(|block| xml::child_text(block, "Name"))
            .collect();

        if self.platforms.is_empty() {
            return Err(LibraryError::Catalog {
                path: path.display().to_string(),
                reason: "no platforms listed".into(),
            });
        }

        Ok(())
    }

    fn load_games(&mut self) -> Result<(), LibraryError> {
        for platform in &self.platforms {
            let path = self
                .root
                .join("Data")
                .join("Platforms")
                .join(format!("{platform}.xml"));

            let raw = match std::fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(platform = %platform, "platform listed but catalog file missing");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            for block in xml::blocks(&raw, "Game") {
                let Some(application_path) = xml::child_text(block, "ApplicationPath") else {
                    continue;
                };

                self.games.push(Game {
                    id: xml::child_text(block, "ID").unwrap_or_default(),
                    title: xml::child_text(block, "Title").unwrap_or_default(),
                    platform: platform.clone(),
                    application_path: normalize_rel(&application_path),
                });
            }
        }

        Ok(())
    }

    /// Playlists are optional; a missing folder or an unreadable file is
    /// not an error.
    fn load_playlists(&mut self) {
        let dir = self.root.join("Data").join("Playlists");
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return;
        };

        let mut files: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        files.sort();

        for path in files {
            let Ok(raw) = std::fs::read_to_string(&path) else {
                warn!(path = %path.display(), "unreadable playlist file, skipping");
                continue;
            };

            let Some(name) = xml::blocks(&raw, "Playlist")
                .first()
                .and_then(|block| xml::child_text(block, "Name"))
            else {
                continue;
            };

            let game_ids = xml::blocks(&raw, "PlaylistGame")
                .iter()
                .filter_map(|block| xml::child_text(block, "GameId"))
                .collect();

            self.playlists.push(Playlist { name, game_ids });
        }
    }
}

impl Library for LaunchBoxLibrary {
    fn root(&self) -> &Path {
        &self.root
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn load(&mut self) -> Result<(), LibraryError> {
        self.platforms.clear();
        self.games.clear();
        self.playlists.clear();

        self.load_platforms()?;
        self.load_games()?;
        self.load_playlists();

        debug!(
            root = %self.root.display(),
            platforms = self.platforms.len(),
            games = self.games.len(),
            playlists = self.playlists.len(),
            "loaded LaunchBox library"
        );
        Ok(())
    }

    fn games(&self) -> &[Game] {
        &self.games
    }

    fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    fn assets(&self) -> Vec<String> {
        let mut assets = Vec::new();
        let mut seen = HashSet::new();
        let mut push = |asset: String, assets: &mut Vec<String>| {
            if seen.insert(asset.clone()) {
                assets.push(asset);
            }
        };

        push("Data/Platforms.xml".into(), &mut assets);
        for platform in &self.platforms {
            push(format!("Data/Platforms/{platform}.xml"), &mut assets);
        }
        push("Data/Playlists".into(), &mut assets);

        for game in &self.games {
            push(game.application_path.clone(), &mut assets);
        }

        for platform in &self.platforms {
            push(format!("Images/{platform}"), &mut assets);
            push(format!("Videos/{platform}"), &mut assets);
        }

        assets
    }

    fn play_later_path(&self) -> PathBuf {
        // Next to the descriptor, outside the library data folder, so
        // it survives library re-imports but not cache teardown.
        let base = self.root.parent().unwrap_or(&self.root);
        base.join(PLAY_LATER_FILE)
    }
}

/// Normalizes a catalog-relative path: LaunchBox writes Windows
/// separators and `./` prefixes.
fn normalize_rel(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").unwrap_or(&path).to_string()
}
