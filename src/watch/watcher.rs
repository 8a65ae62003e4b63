// src/watch/watcher.rs

use std::path::PathBuf;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::engine::RuntimeEvent;
use crate::watch::event_handler::process_event;
use crate::watch::patterns::WatchProfile;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `root` recursively and forward matching changes to the runtime.
///
/// `RuntimeEvent::WatcherReady` is sent once, after the recursive watch is
/// registered and before any `FileChanged`.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    profile: WatchProfile,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                // Fails only once the forwarding task is gone.
                let _ = event_tx.send(event);
            }
            Err(err) => error!("file watch error: {err}"),
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", root);

    tokio::spawn(async move {
        if runtime_tx.send(RuntimeEvent::WatcherReady).await.is_err() {
            return;
        }

        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");
            process_event(&root, &event, &profile, &runtime_tx).await;
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
