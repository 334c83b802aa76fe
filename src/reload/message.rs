//! Live reload message protocol.
//!
//! Every message is a JSON object tagged by `type`:
//!
//! ```json
//! {"type":"connected","version":"0.1.0"}
//! {"type":"reload","reason":"markup: 1 written"}
//! {"type":"css","reason":"styles: 2 written"}
//! ```
//!
//! The client reloads the page on `reload` and re-fetches same-origin
//! stylesheets on `css`.

use serde::{Deserialize, Serialize};

use crate::actor::messages::WsMsg;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Sent once after the handshake.
    Connected { version: String },
    /// Full page reload.
    Reload {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Stylesheet refresh without reloading the page.
    Css {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl ReloadMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Browser-facing form of an actor message, if it has one.
    pub fn from_ws(msg: &WsMsg) -> Option<Self> {
        match msg {
            WsMsg::Reload { reason } => Some(Self::Reload {
                reason: Some(reason.clone()),
            }),
            WsMsg::Css { reason } => Some(Self::Css {
                reason: Some(reason.clone()),
            }),
            WsMsg::AddClient(_) | WsMsg::Shutdown => None,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}
