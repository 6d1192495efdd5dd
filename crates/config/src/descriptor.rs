//! Library descriptor records and the on-disk descriptor store.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ConfigError;

/// Fixed descriptor filename at the top level of a storage root.
pub const DESCRIPTOR_FILE: &str = "launchpass.json";

/// Supported library formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LibraryKind {
    LaunchBox,
}

/// A persisted record identifying a library's format and location.
///
/// `relative_path` is resolved against the directory holding the
/// descriptor file. `emulator_settings` is an opaque blob carried
/// through verbatim when a mirror descriptor is written; the engine
/// never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub kind: LibraryKind,
    pub relative_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emulator_settings: Option<serde_json::Value>,
}

/// Returns the descriptor file path within a storage root.
pub fn descriptor_path(dir: &Path) -> PathBuf {
    dir.join(DESCRIPTOR_FILE)
}

/// Reads the descriptor at `dir`, if one exists.
///
/// Absence is a normal outcome during scanning and returns `Ok(None)`.
/// A descriptor that exists but fails to parse is an error.
pub async fn read_descriptor(dir: &Path) -> Result<Option<Descriptor>, ConfigError> {
    let path = descriptor_path(dir);
    let raw = match tokio::fs::read(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let descriptor = serde_json::from_slice(&raw)?;
    debug!(path = %path.display(), "read descriptor");
    Ok(Some(descriptor))
}

/// Writes the descriptor at `dir`, fully replacing any existing file.
///
/// Writes to a temporary name and renames into place so a reader never
/// observes a partially written descriptor.
pub async fn write_descriptor(dir: &Path, descriptor: &Descriptor) -> Result<(), ConfigError> {
    let path = descriptor_path(dir);
    let tmp = dir.join(format!("{DESCRIPTOR_FILE}.tmp"));

    let raw = serde_json::to_vec_pretty(descriptor)?;
    tokio::fs::write(&tmp, raw).await?;
    tokio::fs::rename(&tmp, &path).await?;

    debug!(path = %path.display(), "wrote descriptor");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Descriptor {
        Descriptor {
            kind: LibraryKind::LaunchBox,
            relative_path: "./LaunchBox".into(),
            emulator_settings: None,
        }
    }

    #[tokio::test]
    async fn roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = sample();

        write_descriptor(dir.path(), &descriptor).await.unwrap();
        let read = read_descriptor(dir.path()).await.unwrap().unwrap();
        assert_eq!(read, descriptor);
    }

    #[tokio::test]
    async fn absent_is_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let read = read_descriptor(dir.path()).await.unwrap();
        assert!(read.is_none());
    }

    #[tokio::test]
    async fn malformed_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(descriptor_path(dir.path()), b"{not json").unwrap();

        let result = read_descriptor(dir.path()).await;
        assert!(matches!(result, Err(ConfigError::Malformed(_))));
    }

    #[tokio::test]
    async fn write_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();

        let mut descriptor = sample();
        write_descriptor(dir.path(), &descriptor).await.unwrap();

        descriptor.relative_path = "./DataSource".into();
        write_descriptor(dir.path(), &descriptor).await.unwrap();

        let read = read_descriptor(dir.path()).await.unwrap().unwrap();
        assert_eq!(read.relative_path, "./DataSource");
        // No temp file left behind.
        assert!(!dir.path().join(format!("{DESCRIPTOR_FILE}.tmp")).exists());
    }

    #[tokio::test]
    async fn unknown_fields_are_ignored() {
        // Older readers must tolerate new optional fields.
        let dir = tempfile::tempdir().unwrap();
        let raw = r#"{
            "kind": "LaunchBox",
            "relative_path": "./LaunchBox",
            "future_field": 42
        }"#;
        std::fs::write(descriptor_path(dir.path()), raw).unwrap();

        let read = read_descriptor(dir.path()).await.unwrap().unwrap();
        assert_eq!(read.relative_path, "./LaunchBox");
    }

    #[tokio::test]
    async fn emulator_settings_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = Descriptor {
            emulator_settings: Some(serde_json::json!({
                "retroarch": { "corePath": "cores/nes.dll" }
            })),
            ..sample()
        };

        write_descriptor(dir.path(), &descriptor).await.unwrap();
        let read = read_descriptor(dir.path()).await.unwrap().unwrap();
        assert_eq!(read.emulator_settings, descriptor.emulator_settings);
    }
}
