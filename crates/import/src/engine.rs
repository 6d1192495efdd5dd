//! The import engine.
//!
//! The copy body runs on a spawned task under a fresh cancellation
//! scope. Assets are processed strictly in manifest order, one at a
//! time, so a cancellation request is honored within roughly one
//! asset's copy time.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use launchpass_config::{Descriptor, write_descriptor};
use launchpass_library::LibraryRegistry;
use launchpass_source::{ActiveSource, AppSettings, ResolvedRoot, SourceLocation};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{ImportError, ImportEvent};

/// Subfolder of the local cache root holding the mirrored library.
pub const MIRROR_DIR: &str = "DataSource";

/// Everything the copy body needs, resolved up front so the shared
/// [`ActiveSource`] lock is not held during the copy.
struct ImportJob {
    source: ResolvedRoot,
    local_root: PathBuf,
}

/// Copies a removable library into the local cache.
pub struct ImportEngine {
    state: Arc<tokio::sync::Mutex<ActiveSource>>,
    settings: AppSettings,
    registry: Arc<LibraryRegistry>,
    events_tx: mpsc::Sender<ImportEvent>,
    events_rx: Option<mpsc::Receiver<ImportEvent>>,
    /// The single in-flight import slot. Non-empty iff a job is running.
    job: Mutex<Option<CancellationToken>>,
}

impl ImportEngine {
    pub fn new(
        state: Arc<tokio::sync::Mutex<ActiveSource>>,
        settings: AppSettings,
        registry: Arc<LibraryRegistry>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            state,
            settings,
            registry,
            events_tx,
            events_rx: Some(events_rx),
            job: Mutex::new(None),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<ImportEvent>> {
        self.events_rx.take()
    }

    /// Runs one import to completion and returns whether it finished.
    ///
    /// A call while another import is running is rejected immediately
    /// and returns `false` without firing any events. Otherwise the
    /// persisted finished-flag is lowered before any copying starts, so
    /// a crash mid-copy reads as unfinished on the next launch.
    pub async fn start_import(&self) -> bool {
        let cancel = CancellationToken::new();
        {
            let mut job = self.job.lock().unwrap();
            if job.is_some() {
                warn!("import already in progress, rejecting start request");
                return false;
            }
            *job = Some(cancel.clone());
        }

        self.settings.set_import_finished(false);
        let _ = self.events_tx.send(ImportEvent::Started).await;

        let prepared = {
            let mut state = self.state.lock().await;
            self.prepare(&mut state).await
        };

        let finished = match prepared {
            Ok(job) => {
                let registry = Arc::clone(&self.registry);
                let events_tx = self.events_tx.clone();
                let token = cancel.clone();
                let handle = tokio::spawn(async move {
                    copy_to_local(job, registry, events_tx, token).await
                });

                match handle.await {
                    Ok(Ok(())) => true,
                    Ok(Err(ImportError::Cancelled)) => {
                        info!("import cancelled");
                        false
                    }
                    Ok(Err(e)) => {
                        error!(error = %e, "import failed");
                        false
                    }
                    Err(e) => {
                        error!(error = %e, "import task aborted");
                        false
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "import could not start");
                let _ = self
                    .events_tx
                    .send(ImportEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
                false
            }
        };

        self.settings.set_import_finished(finished);
        self.job.lock().unwrap().take();
        let _ = self
            .events_tx
            .send(ImportEvent::Finished { success: finished })
            .await;

        finished
    }

    /// Requests cancellation of the running import, if any.
    pub fn cancel_import(&self) {
        match self.job.lock().unwrap().as_ref() {
            Some(token) => {
                info!("import cancellation requested");
                token.cancel();
            }
            None => debug!("cancel requested with no import running"),
        }
    }

    /// Whether an import job currently occupies the slot.
    pub fn is_import_in_progress(&self) -> bool {
        self.job.lock().unwrap().is_some()
    }

    /// Shared handle to the active-source state this engine feeds.
    pub fn state_handle(&self) -> &Arc<tokio::sync::Mutex<ActiveSource>> {
        &self.state
    }

    pub(crate) fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub(crate) fn registry(&self) -> &Arc<LibraryRegistry> {
        &self.registry
    }

    /// Resolves the removable source and the local cache root.
    async fn prepare(&self, state: &mut ActiveSource) -> Result<ImportJob, ImportError> {
        state.scan().await?;

        let source = state
            .locator()
            .resolved(SourceLocation::Removable)
            .cloned()
            .ok_or(ImportError::NoRemovableSource)?;

        let local_root = state.locator().roots().local.clone();
        tokio::fs::create_dir_all(&local_root).await?;

        Ok(ImportJob { source, local_root })
    }
}

/// The copy body. Runs on its own task; owns everything it touches.
async fn copy_to_local(
    job: ImportJob,
    registry: Arc<LibraryRegistry>,
    events_tx: mpsc::Sender<ImportEvent>,
    cancel: CancellationToken,
) -> Result<(), ImportError> {
    let mut library = registry.open(&job.source.root, &job.source.descriptor)?;
    library.load()?;

    let source_root = library.root().to_path_buf();
    let assets = library.assets();
    let total = assets.len();

    // A valid local descriptor exists before any bulk copy, so an
    // interrupted import still leaves a loadable (if incomplete) mirror.
    let mirror_descriptor = Descriptor {
        kind: job.source.descriptor.kind,
        relative_path: format!("./{MIRROR_DIR}"),
        emulator_settings: job.source.descriptor.emulator_settings.clone(),
    };
    write_descriptor(&job.local_root, &mirror_descriptor).await?;

    let dest_root = job.local_root.join(MIRROR_DIR);
    tokio::fs::create_dir_all(&dest_root).await?;

    info!(
        source = %source_root.display(),
        dest = %dest_root.display(),
        assets = total,
        "import copy started"
    );

    for (index, asset) in assets.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(ImportError::Cancelled);
        }

        let src_item = source_root.join(asset);

        // Create parent directories so the asset can be copied into them.
        let mut dst_dir = dest_root.clone();
        if let Some(parent) = Path::new(asset).parent()
            && !parent.as_os_str().is_empty()
        {
            dst_dir = dest_root.join(parent);
            tokio::fs::create_dir_all(&dst_dir).await?;
        }

        match tokio::fs::metadata(&src_item).await {
            Ok(meta) if meta.is_dir() => {
                let Some(name) = src_item.file_name() else {
                    continue;
                };
                copy_dir(&src_item, &dst_dir.join(name), &cancel).await?;
            }
            Ok(_) => {
                copy_file(&src_item, &dst_dir, true, &cancel).await?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Manifests may reference optional assets.
                debug!(asset = %asset, "manifest entry missing on source, skipping");
            }
            Err(e) => return Err(e.into()),
        }

        let percent = (index + 1) as f32 / total as f32 * 100.0;
        let _ = events_tx.send(ImportEvent::Progress { percent }).await;
    }

    info!(assets = total, "import copy finished");
    Ok(())
}

/// Copies one file into `dst_dir` under its own name.
///
/// With `overwrite_if_newer`, an existing destination is replaced only
/// when the source is strictly newer; equal timestamps do not overwrite,
/// so a repeat import of an unchanged library performs no writes.
async fn copy_file(
    src: &Path,
    dst_dir: &Path,
    overwrite_if_newer: bool,
    cancel: &CancellationToken,
) -> Result<(), ImportError> {
    if cancel.is_cancelled() {
        return Err(ImportError::Cancelled);
    }

    let Some(name) = src.file_name() else {
        return Err(std::io::Error::other(format!("no file name in {}", src.display())).into());
    };
    let dst = dst_dir.join(name);

    if overwrite_if_newer && let Ok(existing) = tokio::fs::metadata(&dst).await {
        let src_meta = tokio::fs::metadata(src).await?;
        if let (Ok(src_mtime), Ok(dst_mtime)) = (src_meta.modified(), existing.modified())
            && src_mtime <= dst_mtime
        {
            return Ok(());
        }
    }

    tokio::fs::copy(src, &dst).await?;
    Ok(())
}

/// Recursively mirrors a directory: files first, then subfolders.
///
/// An existing destination folder is reused, never a conflict. Entries
/// are processed in sorted order so repeat runs are deterministic.
fn copy_dir<'a>(
    src: &'a Path,
    dst: &'a Path,
    cancel: &'a CancellationToken,
) -> Pin<Box<dyn Future<Output = Result<(), ImportError>> + Send + 'a>> {
    Box::pin(async move {
        tokio::fs::create_dir_all(dst).await?;

        let mut files = Vec::new();
        let mut dirs = Vec::new();
        let mut entries = tokio::fs::read_dir(src).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                dirs.push(entry.path());
            } else {
                files.push(entry.path());
            }
        }
        files.sort();
        dirs.sort();

        for file in files {
            copy_file(&file, dst, true, cancel).await?;
        }
        for dir in dirs {
            let Some(name) = dir.file_name() else {
                continue;
            };
            copy_dir(&dir, &dst.join(name), cancel).await?;
        }

        Ok(())
    })
}
