//! Pipeline Runner - one per asset kind
//!
//! Runs of the same kind are serialized: a run requested while another is
//! in progress waits, and requests that pile up meanwhile collapse into a
//! single run. Different kinds run concurrently in their own runners.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::RunMsg;
use crate::config::SiteConfig;
use crate::core::{AssetKind, BuildOptions};
use crate::logger::{status_error, status_success, status_warning};
use crate::paths::PathTable;
use crate::pipeline::{LiveReload, Pipeline};

pub struct PipelineRunner {
    kind: AssetKind,
    rx: mpsc::Receiver<RunMsg>,
    pipeline: Pipeline,
    reload: LiveReload,
}

impl PipelineRunner {
    pub fn new(
        kind: AssetKind,
        rx: mpsc::Receiver<RunMsg>,
        config: &SiteConfig,
        paths: &PathTable,
        options: BuildOptions,
        reload: LiveReload,
    ) -> Self {
        Self {
            kind,
            rx,
            pipeline: Pipeline::for_kind(kind, config, paths, options),
            reload,
        }
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            let RunMsg::Run { mut changed } = msg else { break };

            // Coalesce requests queued behind this one.
            let mut shutdown = false;
            while let Ok(next) = self.rx.try_recv() {
                match next {
                    RunMsg::Run { changed: more } => changed += more,
                    RunMsg::Shutdown => shutdown = true,
                }
            }
            if shutdown {
                break;
            }

            crate::debug!(self.kind.name(); "{} changed, re-running", changed);
            self.run_once().await;
        }
        crate::debug!(self.kind.name(); "runner stopped");
    }

    async fn run_once(&self) {
        match self.pipeline.run(&self.reload).await {
            Ok(report) if report.skipped.is_empty() || self.kind == AssetKind::Images => {
                status_success(&report.summary());
            }
            Ok(report) => status_warning(&report.summary()),
            Err(err) => status_error(
                &format!("{} failed: {}", self.kind, err.path().display()),
                &err.to_string(),
            ),
        }
    }
}

/// Spawn one runner per asset kind; returns their inboxes.
pub fn spawn_runners(
    config: &Arc<SiteConfig>,
    paths: &Arc<PathTable>,
    options: BuildOptions,
    reload: &LiveReload,
    buffer: usize,
) -> super::fs::RunnerInboxes {
    let mut inboxes = super::fs::RunnerInboxes::default();
    for kind in AssetKind::ALL {
        let (tx, rx) = mpsc::channel(buffer);
        let runner = PipelineRunner::new(kind, rx, config, paths, options, reload.clone());
        tokio::spawn(runner.run());
        inboxes.insert(kind, tx);
    }
    inboxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::messages::WsMsg;
    use crate::core::BuildMode;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_notifies_browsers() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("app")).unwrap();
        fs::write(dir.path().join("app/index.html"), "<p>hi</p>").unwrap();

        let config = Arc::new(SiteConfig::for_root(dir.path()));
        let paths = Arc::new(PathTable::from_config(&config).unwrap());
        let (ws_tx, mut ws_rx) = mpsc::channel(4);
        let (tx, rx) = mpsc::channel(4);
        let runner = PipelineRunner::new(
            AssetKind::Markup,
            rx,
            &config,
            &paths,
            BuildOptions::new(BuildMode::Development, false),
            LiveReload::new(ws_tx),
        );
        let handle = tokio::spawn(runner.run());

        tx.send(RunMsg::Run { changed: 1 }).await.unwrap();
        let msg = ws_rx.recv().await.unwrap();
        assert!(matches!(msg, WsMsg::Reload { reason } if reason == "markup: 1 written"));
        assert!(dir.path().join("dist/index.html").exists());

        tx.send(RunMsg::Shutdown).await.unwrap();
        handle.await.unwrap();
    }
}
