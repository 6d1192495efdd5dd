//! Data types shared by library adapters.

use serde::{Deserialize, Serialize};

/// One game entry from a library catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Catalog-assigned identifier.
    pub id: String,
    pub title: String,
    /// Platform (system) the game belongs to.
    pub platform: String,
    /// Path of the game binary/ROM, relative to the library root.
    pub application_path: String,
}

/// A named, ordered collection of games from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    /// Catalog IDs of the member games, in playlist order.
    pub game_ids: Vec<String>,
}
