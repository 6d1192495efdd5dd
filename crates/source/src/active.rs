//! The active-source service.
//!
//! Owns the single in-memory library handle the front-end browses from.
//! Only [`activate`](ActiveSource::activate) and
//! [`get_active`](ActiveSource::get_active) write that handle; everyone
//! else borrows it.

use std::sync::Arc;

use launchpass_library::{Library, LibraryRegistry};
use tracing::{debug, info};

use crate::locator::{SourceLocation, SourceLocator};
use crate::settings::AppSettings;
use crate::SourceError;

/// External thumbnail-cache collaborator.
///
/// Notified whenever the active source changes and when a location's
/// cache must be invalidated. Calls are fire-and-forget; the engine
/// consumes no result.
pub trait ThumbnailSink: Send + Sync {
    fn set_active(&self, library: Option<&dyn Library>, location: SourceLocation);
    fn invalidate(&self, location: SourceLocation);
}

/// A sink that ignores all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullThumbnails;

impl ThumbnailSink for NullThumbnails {
    fn set_active(&self, _library: Option<&dyn Library>, _location: SourceLocation) {}
    fn invalidate(&self, _location: SourceLocation) {}
}

/// Process-wide record of which source is active, plus the loaded
/// library handle for it.
pub struct ActiveSource {
    settings: AppSettings,
    locator: SourceLocator,
    registry: Arc<LibraryRegistry>,
    thumbnails: Arc<dyn ThumbnailSink>,
    current: Option<Box<dyn Library>>,
}

impl ActiveSource {
    pub fn new(
        settings: AppSettings,
        locator: SourceLocator,
        registry: Arc<LibraryRegistry>,
        thumbnails: Arc<dyn ThumbnailSink>,
    ) -> Self {
        Self {
            settings,
            locator,
            registry,
            thumbnails,
            current: None,
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn locator(&self) -> &SourceLocator {
        &self.locator
    }

    pub fn locator_mut(&mut self) -> &mut SourceLocator {
        &mut self.locator
    }

    pub fn thumbnails(&self) -> &dyn ThumbnailSink {
        self.thumbnails.as_ref()
    }

    /// Re-scans all storage roots. Safe to call repeatedly.
    pub async fn scan(&mut self) -> Result<(), SourceError> {
        self.locator.scan_all().await
    }

    pub fn has_source(&self, location: SourceLocation) -> bool {
        self.locator.has_source(location)
    }

    /// The persisted active location.
    pub fn active_location(&self) -> SourceLocation {
        self.settings.active_location()
    }

    /// Persists `location` as active, loads its library (replacing any
    /// previously active handle), and notifies the thumbnail sink.
    pub async fn activate(&mut self, location: SourceLocation) -> Result<(), SourceError> {
        self.settings.set_active_location(location);
        self.current = self.open_resolved(location)?;
        self.thumbnails.set_active(self.current.as_deref(), location);

        info!(location = %location, loaded = self.current.is_some(), "activated data source");
        Ok(())
    }

    /// Returns the active library handle, lazily scanning and loading
    /// it on first use.
    pub async fn get_active(&mut self) -> Result<Option<&dyn Library>, SourceError> {
        if self.current.is_none() {
            self.locator.scan_all().await?;
            let location = self.settings.active_location();
            self.current = self.open_resolved(location)?;
            self.thumbnails.set_active(self.current.as_deref(), location);
            debug!(location = %location, loaded = self.current.is_some(), "lazily resolved active source");
        }

        Ok(self.current.as_deref())
    }

    /// Drops the in-memory handle and persists `None` as the active
    /// location. Called by teardown before any files are deleted so no
    /// stale handle survives mid-deletion.
    pub fn reset(&mut self) {
        self.settings.set_active_location(SourceLocation::None);
        self.current = None;
    }

    fn open_resolved(
        &self,
        location: SourceLocation,
    ) -> Result<Option<Box<dyn Library>>, SourceError> {
        let Some(resolved) = self.locator.resolved(location) else {
            return Ok(None);
        };

        let mut library = self.registry.open(&resolved.root, &resolved.descriptor)?;
        library.load()?;
        Ok(Some(library))
    }
}
