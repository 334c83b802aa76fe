//! Actor Message Definitions
//!
//! ```text
//! FsActor --Run--> PipelineRunner (one per kind) --Reload/Css--> WsActor
//! ```

use std::net::TcpStream;

use crate::core::AssetKind;

/// Messages to a pipeline runner.
#[derive(Debug)]
pub enum RunMsg {
    /// Re-run the runner's pipeline.
    Run {
        /// Number of changed files that triggered this run (for logging).
        changed: usize,
    },
    Shutdown,
}

/// Messages to the WebSocket actor.
#[derive(Debug)]
pub enum WsMsg {
    /// Reload every connected page.
    Reload { reason: String },
    /// Refresh stylesheets only.
    Css { reason: String },
    /// Newly accepted TCP connection, handshake pending.
    AddClient(TcpStream),
    Shutdown,
}

impl WsMsg {
    /// Notification for a finished run of `kind`.
    pub fn after_run(kind: AssetKind, written: usize) -> Self {
        let reason = format!("{kind}: {written} written");
        match kind {
            AssetKind::Styles => Self::Css { reason },
            _ => Self::Reload { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles_refresh_css_only() {
        assert!(matches!(
            WsMsg::after_run(AssetKind::Styles, 2),
            WsMsg::Css { .. }
        ));
        assert!(matches!(
            WsMsg::after_run(AssetKind::Markup, 1),
            WsMsg::Reload { reason } if reason == "markup: 1 written"
        ));
    }
}
