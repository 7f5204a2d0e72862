//! File system watcher for rebuilding the catalog when stories change.
//!
//! Only top-level, non-hidden `.html` files produce events; the title list
//! and editor swap files are ignored.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use story_core::codec::EXTENSION;
use story_core::error::{Result, StoryError};

/// Events emitted by the store watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A story file was created, modified, or renamed into place.
    Changed(PathBuf),
    /// A story file was deleted or renamed away.
    Removed(PathBuf),
}

/// Watches a store directory and emits events for story files.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    receiver: mpsc::Receiver<StoreEvent>,
}

impl StoreWatcher {
    /// Start watching `root`, creating it first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::Storage`] if the directory cannot be created or
    /// the watcher cannot be started.
    pub fn start(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        let (tx, rx) = mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res: std::result::Result<Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(error = %e, "store watcher error");
                    return;
                }
            };
            for (index, path) in event.paths.iter().enumerate() {
                if !is_story_path(path) {
                    continue;
                }
                if let Some(store_event) = classify(&event.kind, index, path) {
                    let _ = tx.send(store_event);
                }
            }
        })
        .map_err(|e| StoryError::Storage(std::io::Error::other(e)))?;

        watcher
            .watch(root, RecursiveMode::NonRecursive)
            .map_err(|e| StoryError::Storage(std::io::Error::other(e)))?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<StoreEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Next event if one is already queued.
    pub fn try_recv(&self) -> Option<StoreEvent> {
        self.receiver.try_recv().ok()
    }
}

/// Map the `index`-th path of a notify event to a store event. A rename
/// reporting both names lists the old name first.
fn classify(kind: &EventKind, index: usize, path: &Path) -> Option<StoreEvent> {
    match kind {
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            Some(StoreEvent::Removed(path.to_path_buf()))
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if index == 0 => {
            Some(StoreEvent::Removed(path.to_path_buf()))
        }
        EventKind::Create(_) | EventKind::Modify(_) => Some(StoreEvent::Changed(path.to_path_buf())),
        _ => None,
    }
}

// Hidden names cover the `.tmp*` files used for atomic writes.
fn is_story_path(path: &Path) -> bool {
    let visible = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| !n.starts_with('.'));
    visible && path.extension().and_then(|e| e.to_str()) == Some(EXTENSION)
}
