//! Cache teardown: deleting the local mirror.
//!
//! Deletion is best-effort per item — one missing or stuck item never
//! blocks cleanup of the rest — and the whole operation is safe to call
//! when no local source exists at all.

use std::io::ErrorKind;
use std::path::Path;

use launchpass_config::descriptor_path;
use launchpass_library::PlayLaterPlaylist;
use launchpass_source::SourceLocation;
use tracing::{info, warn};

use crate::ImportEngine;
use crate::engine::MIRROR_DIR;

impl ImportEngine {
    /// Deletes the local mirror, its descriptor, and dependent state.
    ///
    /// Marks the import flag finished (the cache is back in a clean,
    /// non-importing state), drops the active handle *before* any files
    /// go away if the local source was active, then removes the mirror
    /// tree and descriptor and invalidates the thumbnail cache.
    pub async fn delete_local_source(&self) {
        self.settings().set_import_finished(true);

        let mut state = self.state_handle().lock().await;

        // Delete the play-later queue tied to the local library.
        if let Some(resolved) = state.locator().resolved(SourceLocation::Local).cloned() {
            match self.registry().open(&resolved.root, &resolved.descriptor) {
                Ok(library) => delete_play_later(&library.play_later_path()),
                Err(e) => warn!(error = %e, "could not open local library during teardown"),
            }
        }

        // No stale handle may survive into the deletion below.
        if state.active_location() == SourceLocation::Local {
            state.reset();
        }

        let local_root = state.locator().roots().local.clone();

        let mirror = local_root.join(MIRROR_DIR);
        match tokio::fs::remove_dir_all(&mirror).await {
            Ok(()) => info!(path = %mirror.display(), "deleted local mirror"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %mirror.display(), error = %e, "failed to delete local mirror"),
        }

        let descriptor = descriptor_path(&local_root);
        match tokio::fs::remove_file(&descriptor).await {
            Ok(()) => info!(path = %descriptor.display(), "deleted local descriptor"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %descriptor.display(), error = %e, "failed to delete local descriptor")
            }
        }

        state.locator_mut().clear(SourceLocation::Local);
        state.thumbnails().invalidate(SourceLocation::Local);
    }
}

fn delete_play_later(path: &Path) {
    match PlayLaterPlaylist::open(path.to_path_buf()) {
        Ok(queue) => {
            if let Err(e) = queue.delete() {
                warn!(path = %path.display(), error = %e, "failed to delete play-later queue");
            }
        }
        Err(e) => warn!(path = %path.display(), error = %e, "unreadable play-later queue"),
    }
}
