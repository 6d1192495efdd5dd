//! The persisted "play later" queue.
//!
//! A small JSON file of game IDs kept next to the descriptor of the
//! storage root the library was loaded from. Cache teardown deletes the
//! local copy via [`Library::play_later_path`](crate::Library::play_later_path).

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::LibraryError;

/// Play-later queue filename.
pub const PLAY_LATER_FILE: &str = "PlayLater.json";

/// An ordered queue of game IDs the user marked to play later.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayLaterPlaylist {
    path: PathBuf,
    game_ids: Vec<String>,
}

impl PlayLaterPlaylist {
    /// Opens the queue at `path`, empty if the file does not exist.
    pub fn open(path: PathBuf) -> Result<Self, LibraryError> {
        let game_ids = match std::fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, game_ids })
    }

    pub fn game_ids(&self) -> &[String] {
        &self.game_ids
    }

    /// Adds a game, moving it to the end if already queued.
    pub fn add(&mut self, game_id: &str) {
        self.game_ids.retain(|id| id != game_id);
        self.game_ids.push(game_id.to_string());
    }

    pub fn remove(&mut self, game_id: &str) {
        self.game_ids.retain(|id| id != game_id);
    }

    /// Persists the queue, fully replacing the file.
    pub fn save(&self) -> Result<(), LibraryError> {
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&self.game_ids)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Deletes the backing file. A missing file is not an error.
    pub fn delete(&self) -> Result<(), LibraryError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "deleted play-later queue");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
