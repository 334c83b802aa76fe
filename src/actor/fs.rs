//! FileSystem Actor
//!
//! Watches the source directories and tells the pipeline runner of every
//! affected kind to re-run.
//!
//! ```text
//! Watcher → Debouncer (timing) → PathTable::kinds_watching → RunMsg per kind
//! ```
//!
//! The watcher starts in [`FsActor::new`], so edits made during the initial
//! build are buffered rather than lost.

mod debouncer;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use super::messages::RunMsg;
use crate::core::AssetKind;
use crate::paths::PathTable;
use debouncer::{ChangeKind, Debouncer};

/// Runner inboxes, one per asset kind.
pub type RunnerInboxes = FxHashMap<AssetKind, mpsc::Sender<RunMsg>>;

pub struct FsActor {
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Must stay alive for events to flow.
    _watcher: RecommendedWatcher,
    paths: Arc<PathTable>,
    runners: RunnerInboxes,
    debouncer: Debouncer,
}

impl FsActor {
    pub fn new(
        paths: Arc<PathTable>,
        runners: RunnerInboxes,
        debounce: Duration,
    ) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        for dir in paths.watch_dirs() {
            if dir.is_dir() {
                watcher.watch(&dir, RecursiveMode::Recursive)?;
                crate::debug!("watch"; "watching {}", dir.display());
            } else {
                crate::log!("watch"; "{} does not exist, not watching", dir.display());
            }
        }

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            paths,
            runners,
            debouncer: Debouncer::new(debounce),
        })
    }

    /// Run the actor event loop until every runner is gone.
    pub async fn run(self) {
        let Self {
            notify_rx,
            _watcher,
            paths,
            runners,
            mut debouncer,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // notify delivers on a sync channel; bridge it into the runtime.
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                () = tokio::time::sleep(debouncer.sleep_duration()) => {
                    let Some(changes) = debouncer.take_if_ready() else { continue };
                    if dispatch(&paths, &runners, changes).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Send one `Run` per affected kind. `Err` once a runner has shut down.
async fn dispatch(
    paths: &PathTable,
    runners: &RunnerInboxes,
    changes: FxHashMap<PathBuf, ChangeKind>,
) -> Result<(), ()> {
    let counts = affected_kinds(paths, changes.keys());
    for (kind, changed) in counts {
        crate::debug!("watch"; "{}: {} changed", kind, changed);
        if let Some(tx) = runners.get(&kind) {
            tx.send(RunMsg::Run { changed }).await.map_err(|_| ())?;
        }
    }
    Ok(())
}

/// Number of changed paths per kind, in pipeline start order.
fn affected_kinds<'a>(
    paths: &PathTable,
    changed: impl IntoIterator<Item = &'a PathBuf>,
) -> Vec<(AssetKind, usize)> {
    let mut counts: FxHashMap<AssetKind, usize> = FxHashMap::default();
    for path in changed {
        for kind in paths.kinds_watching(path) {
            *counts.entry(kind).or_default() += 1;
        }
    }
    AssetKind::ALL
        .into_iter()
        .filter_map(|kind| counts.get(&kind).map(|n| (kind, *n)))
        .collect()
}
