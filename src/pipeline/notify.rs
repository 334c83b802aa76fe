//! Live-reload notification, the last stage of every pipeline run.

use tokio::sync::mpsc;

use super::{RunReport, Task};
use crate::actor::messages::WsMsg;

/// Handle pipelines use to signal connected browsers.
///
/// Disabled outside watch mode, where notifying is a no-op.
#[derive(Debug, Clone, Default)]
pub struct LiveReload {
    tx: Option<mpsc::Sender<WsMsg>>,
}

impl LiveReload {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn new(tx: mpsc::Sender<WsMsg>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Tell browsers about a finished run. Runs that wrote nothing are silent.
    pub async fn notify(&self, report: &RunReport) {
        let Some(tx) = &self.tx else { return };
        if report.written.is_empty() {
            return;
        }
        let msg = match report.task {
            Task::Asset(kind) => WsMsg::after_run(kind, report.written.len()),
            Task::Vendor => WsMsg::Reload {
                reason: format!("vendor: {} written", report.written.len()),
            },
        };
        if tx.send(msg).await.is_err() {
            crate::debug!("reload"; "websocket actor gone, dropping notification");
        }
    }
}
