fn main() {
    println!("Run `cargo test -p import-e2e` to execute the end-to-end import tests.");
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use launchpass_config::{Descriptor, LibraryKind, read_descriptor, write_descriptor};
    use launchpass_import::{ImportEngine, ImportEvent, MIRROR_DIR};
    use launchpass_library::{LibraryRegistry, PLAY_LATER_FILE, PlayLaterPlaylist};
    use launchpass_source::{
        ActiveSource, AppSettings, MemorySettings, NullThumbnails, SourceLocation, SourceLocator,
        StorageRoots,
    };
    use tokio::sync::mpsc;

    /// Builds a complete removable library: a descriptor at the root, a
    /// LaunchBox catalog with one platform and two games, a playlist,
    /// artwork, and videos.
    async fn write_removable_library(root: &Path) {
        let lb = root.join("LaunchBox");
        std::fs::create_dir_all(lb.join("Data").join("Platforms")).unwrap();
        std::fs::create_dir_all(lb.join("Data").join("Playlists")).unwrap();
        std::fs::create_dir_all(lb.join("Games")).unwrap();
        std::fs::create_dir_all(lb.join("Images").join("NES").join("Box - Front")).unwrap();
        std::fs::create_dir_all(lb.join("Videos").join("NES")).unwrap();

        std::fs::write(
            lb.join("Data").join("Platforms.xml"),
            "<LaunchBox><Platform><Name>NES</Name></Platform></LaunchBox>",
        )
        .unwrap();
        std::fs::write(
            lb.join("Data").join("Platforms").join("NES.xml"),
            "<LaunchBox>\
             <Game><ID>g1</ID><Title>Mario</Title>\
             <ApplicationPath>Games/mario.nes</ApplicationPath></Game>\
             <Game><ID>g2</ID><Title>Zelda</Title>\
             <ApplicationPath>Games/zelda.nes</ApplicationPath></Game>\
             </LaunchBox>",
        )
        .unwrap();
        std::fs::write(
            lb.join("Data").join("Playlists").join("Favorites.xml"),
            "<LaunchBox>\
             <Playlist><Name>Favorites</Name></Playlist>\
             <PlaylistGame><GameId>g2</GameId></PlaylistGame>\
             </LaunchBox>",
        )
        .unwrap();
        std::fs::write(lb.join("Games").join("mario.nes"), b"MARIO").unwrap();
        std::fs::write(lb.join("Games").join("zelda.nes"), b"ZELDA").unwrap();
        std::fs::write(
            lb.join("Images").join("NES").join("Box - Front").join("mario.png"),
            b"PNG",
        )
        .unwrap();
        std::fs::write(lb.join("Videos").join("NES").join("mario.mp4"), b"MP4").unwrap();

        write_descriptor(
            root,
            &Descriptor {
                kind: LibraryKind::LaunchBox,
                relative_path: "./LaunchBox".into(),
                emulator_settings: Some(serde_json::json!({"core": "nestopia"})),
            },
        )
        .await
        .unwrap();
    }

    struct Harness {
        engine: ImportEngine,
        events: mpsc::Receiver<ImportEvent>,
        settings: AppSettings,
    }

    fn harness(local: &Path, removable: Vec<PathBuf>) -> Harness {
        let settings = AppSettings::new(Arc::new(MemorySettings::new()));
        let registry = Arc::new(LibraryRegistry::with_builtin());
        let state = ActiveSource::new(
            settings.clone(),
            SourceLocator::new(StorageRoots::new(local.to_path_buf(), removable)),
            Arc::clone(&registry),
            Arc::new(NullThumbnails),
        );
        let mut engine = ImportEngine::new(
            Arc::new(tokio::sync::Mutex::new(state)),
            settings.clone(),
            registry,
        );
        let events = engine.take_events().unwrap();
        Harness {
            engine,
            events,
            settings,
        }
    }

    fn drain(events: &mut mpsc::Receiver<ImportEvent>) -> Vec<ImportEvent> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }

    fn percents(events: &[ImportEvent]) -> Vec<f32> {
        events
            .iter()
            .filter_map(|e| match e {
                ImportEvent::Progress { percent } => Some(*percent),
                _ => None,
            })
            .collect()
    }

    /// The full user journey: plug in a drive, import it, browse the
    /// local copy, re-import, tear the cache down.
    #[tokio::test]
    async fn import_browse_reimport_teardown() {
        let local = tempfile::tempdir().unwrap();
        let removable = tempfile::tempdir().unwrap();
        write_removable_library(removable.path()).await;

        let mut h = harness(local.path(), vec![removable.path().to_path_buf()]);

        // Discovery: the removable library is found, no local copy yet.
        {
            let mut state = h.engine.state_handle().lock().await;
            state.scan().await.unwrap();
            assert!(state.has_source(SourceLocation::Removable));
            assert!(!state.has_source(SourceLocation::Local));
        }

        // First import copies everything and raises the finished flag.
        assert!(h.engine.start_import().await);
        assert!(h.settings.import_finished());

        let events = drain(&mut h.events);
        assert_eq!(events.first(), Some(&ImportEvent::Started));
        assert_eq!(events.last(), Some(&ImportEvent::Finished { success: true }));

        // Manifest: 2 catalog files, Data/Playlists, 2 ROMs, Images/NES,
        // Videos/NES.
        let progress = percents(&events);
        assert_eq!(progress.len(), 7);
        assert!(progress.windows(2).all(|w| w[0] < w[1]), "{progress:?}");
        assert_eq!(*progress.last().unwrap(), 100.0);

        let mirror = local.path().join(MIRROR_DIR);
        assert!(mirror.join("Data/Platforms.xml").exists());
        assert!(mirror.join("Data/Playlists/Favorites.xml").exists());
        assert!(mirror.join("Games/mario.nes").exists());
        assert!(mirror.join("Games/zelda.nes").exists());
        assert!(mirror.join("Images/NES/Box - Front/mario.png").exists());
        assert!(mirror.join("Videos/NES/mario.mp4").exists());

        let descriptor = read_descriptor(local.path()).await.unwrap().unwrap();
        assert_eq!(descriptor.relative_path, format!("./{MIRROR_DIR}"));
        assert_eq!(
            descriptor.emulator_settings,
            Some(serde_json::json!({"core": "nestopia"}))
        );

        // Browse the local copy: activate it and read the catalog back.
        {
            let mut state = h.engine.state_handle().lock().await;
            state.scan().await.unwrap();
            assert!(state.has_source(SourceLocation::Local));

            state.activate(SourceLocation::Local).await.unwrap();
            let library = state.get_active().await.unwrap().unwrap();
            assert_eq!(library.games().len(), 2);
            assert_eq!(library.playlists().len(), 1);
            assert_eq!(library.playlists()[0].game_ids, vec!["g2"]);

            // Queue a game for later against the local library.
            let mut queue = PlayLaterPlaylist::open(library.play_later_path()).unwrap();
            queue.add("g1");
            queue.save().unwrap();
        }
        assert!(local.path().join(PLAY_LATER_FILE).exists());

        // Re-import with nothing changed on the drive: no file is
        // rewritten and the play-later queue survives.
        let rom = mirror.join("Games/mario.nes");
        let mtime_before = std::fs::metadata(&rom).unwrap().modified().unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert!(h.engine.start_import().await);
        let mtime_after = std::fs::metadata(&rom).unwrap().modified().unwrap();
        assert_eq!(mtime_before, mtime_after, "unchanged ROM was re-copied");
        assert!(local.path().join(PLAY_LATER_FILE).exists());

        // Teardown deletes the mirror, the descriptor, the queue, and
        // deactivates the local source.
        h.engine.delete_local_source().await;

        assert!(!mirror.exists());
        assert!(read_descriptor(local.path()).await.unwrap().is_none());
        assert!(!local.path().join(PLAY_LATER_FILE).exists());
        assert!(h.settings.import_finished());
        assert_eq!(h.settings.active_location(), SourceLocation::None);

        {
            let mut state = h.engine.state_handle().lock().await;
            state.scan().await.unwrap();
            assert!(!state.has_source(SourceLocation::Local));
            // The drive itself is untouched.
            assert!(state.has_source(SourceLocation::Removable));
        }
        assert!(removable.path().join("LaunchBox/Games/mario.nes").exists());

        // A second teardown against the empty cache is a no-op.
        h.engine.delete_local_source().await;
        assert!(h.settings.import_finished());
    }

    /// The imported copy is self-sufficient: with the drive gone, the
    /// local source still resolves and loads.
    #[tokio::test]
    async fn local_copy_outlives_the_drive() {
        let local = tempfile::tempdir().unwrap();
        let removable = tempfile::tempdir().unwrap();
        write_removable_library(removable.path()).await;

        let h = harness(local.path(), vec![removable.path().to_path_buf()]);
        assert!(h.engine.start_import().await);

        // A fresh session with no removable roots at all.
        let offline = harness(local.path(), vec![]);
        {
            let mut state = offline.engine.state_handle().lock().await;
            state.scan().await.unwrap();
            assert!(!state.has_source(SourceLocation::Removable));
            assert!(state.has_source(SourceLocation::Local));

            state.activate(SourceLocation::Local).await.unwrap();
            let library = state.get_active().await.unwrap().unwrap();
            assert_eq!(library.games().len(), 2);
        }
        // The import that produced this cache finished cleanly.
        assert!(offline.settings.active_location() == SourceLocation::Local);
    }

    /// Cancelling mid-run leaves the finished flag down so the next
    /// launch can prompt for a fresh import.
    #[tokio::test]
    async fn cancelled_import_reads_as_unfinished() {
        let local = tempfile::tempdir().unwrap();
        let removable = tempfile::tempdir().unwrap();
        write_removable_library(removable.path()).await;

        let mut h = harness(local.path(), vec![removable.path().to_path_buf()]);
        let engine = Arc::new(h.engine);

        let canceller = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                while !engine.is_import_in_progress() {
                    tokio::task::yield_now().await;
                }
                engine.cancel_import();
            })
        };

        let finished = engine.start_import().await;
        canceller.await.unwrap();

        assert!(!finished);
        assert!(!h.settings.import_finished());

        let events = drain(&mut h.events);
        assert_eq!(
            events.last(),
            Some(&ImportEvent::Finished { success: false })
        );
    }
}
