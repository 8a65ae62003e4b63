// src/watch/event_handler.rs

//! Turning notify events into scheduler events.

use std::path::Path;

use notify::event::{EventKind, ModifyKind};
use notify::Event;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::engine::RuntimeEvent;
use crate::fs::RealFileSystem;
use crate::resolve::relative_path;
use crate::types::ChangeKind;
use crate::watch::patterns::WatchProfile;

/// Classify a notify event kind.
///
/// Creates, removes and renames are structural. Data and other
/// modifications are content changes. Access and metadata-only events are
/// ignored (`None`). `Any` is reported by backends that cannot tell what
/// happened, so it is treated as structural.
pub fn classify(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Any => Some(ChangeKind::Structural),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Structural),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) => Some(ChangeKind::Content),
        EventKind::Access(_) | EventKind::Other => None,
    }
}

/// Forward every path of `event` that `profile` accepts. Returns how many
/// changes were sent.
pub async fn process_event(
    root: &Path,
    event: &Event,
    profile: &WatchProfile,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> usize {
    let Some(kind) = classify(&event.kind) else {
        trace!(kind = ?event.kind, "ignoring notify event");
        return 0;
    };

    let mut sent = 0;
    for path in &event.paths {
        let Some(rel) = relative_path(&RealFileSystem, root, path) else {
            warn!("could not relativize path {:?} against root {:?}", path, root);
            continue;
        };
        if !profile.matches(&rel) {
            continue;
        }

        debug!(rel = %rel, ?kind, "file changed");
        let change = RuntimeEvent::FileChanged {
            path: path.clone(),
            kind,
        };
        if runtime_tx.send(change).await.is_err() {
            debug!("runtime gone; dropping file change");
            break;
        }
        sent += 1;
    }
    sent
}
