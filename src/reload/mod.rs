//! Live reload over WebSocket.
//!
//! ```text
//! PipelineRunner --WsMsg--> WsActor --ReloadMessage (JSON)--> Browser
//!                              ^
//!                 server ------+ (accepted TcpStream)
//! ```
//!
//! - `message` - JSON messages understood by the injected client
//! - `server` - TCP listener handing connections to the WebSocket actor

pub mod message;
pub mod server;
