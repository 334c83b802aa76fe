//! Actor Coordinator - wires up watch mode
//!
//! ```text
//! FsActor --Run--> PipelineRunner × 4 --Reload/Css--> WsActor --> Browsers
//! ```
//!
//! The watcher is created before the initial build so no edit is missed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::{FsActor, RunnerInboxes};
use super::messages::{RunMsg, WsMsg};
use super::runner::spawn_runners;
use super::ws::WsActor;
use crate::cli::build::run_all;
use crate::config::SiteConfig;
use crate::core::BuildOptions;
use crate::logger::{status_error, status_success};
use crate::paths::PathTable;
use crate::pipeline::LiveReload;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<SiteConfig>,
    paths: Arc<PathTable>,
    options: BuildOptions,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(config: Arc<SiteConfig>, paths: Arc<PathTable>, options: BuildOptions) -> Self {
        Self {
            config,
            paths,
            options,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run until the shutdown signal arrives.
    pub async fn run(mut self) -> Result<()> {
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        let serve = &self.config.serve;
        match crate::reload::server::start_ws_server(serve.interface, serve.ws_port, ws_tx.clone()) {
            Ok(port) => {
                crate::cli::serve::set_actual_ws_port(port);
                crate::debug!("reload"; "ws://{}:{}", serve.interface, port);
            }
            Err(e) => crate::log!("reload"; "websocket server failed: {}", e),
        }

        let reload = LiveReload::new(ws_tx.clone());
        let runners = spawn_runners(
            &self.config,
            &self.paths,
            self.options,
            &reload,
            CHANNEL_BUFFER,
        );
        let fs_actor = FsActor::new(
            Arc::clone(&self.paths),
            runners.clone(),
            Duration::from_millis(self.config.watch.debounce_ms),
        )
        .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;

        if self.config.watch.initial_build {
            self.initial_build().await;
        }

        let fs_handle = tokio::spawn(fs_actor.run());
        let ws_handle = tokio::spawn(WsActor::new(ws_rx).run());
        crate::log!("watch"; "watching for changes");

        match self.shutdown_rx.take() {
            Some(rx) => {
                while rx.try_recv().is_err() {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
                crate::debug!("actor"; "shutdown signal received");
            }
            None => {
                let _ = fs_handle.await;
            }
        }

        shutdown(&runners, &ws_tx).await;
        let _ = tokio::time::timeout(Duration::from_millis(500), ws_handle).await;
        crate::debug!("actor"; "stopped");
        Ok(())
    }

    async fn initial_build(&self) {
        match run_all(&self.config, &self.paths, self.options, &LiveReload::disabled()).await {
            Ok(reports) => {
                let written: usize = reports.iter().map(|r| r.written.len()).sum();
                status_success(&format!("initial build: {written} files written"));
            }
            Err(err) => status_error("initial build failed", &format!("{err:#}")),
        }
    }
}

async fn shutdown(runners: &RunnerInboxes, ws_tx: &mpsc::Sender<WsMsg>) {
    for tx in runners.values() {
        let _ = tx.send(RunMsg::Shutdown).await;
    }
    let _ = ws_tx.send(WsMsg::Shutdown).await;
}
