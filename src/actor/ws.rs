//! WebSocket Actor - Live Reload Broadcast
//!
//! Owns every connected browser. Runners send `Reload`/`Css`, the
//! listener sends freshly accepted connections.
//!
//! ```text
//! PipelineRunner --[Reload/Css]--> WsActor --[broadcast]--> Clients
//! reload::server --[AddClient]-------^
//! ```

use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::WsMsg;
use crate::reload::message::ReloadMessage;

/// How often the reader thread polls clients for close frames.
const READ_POLL: Duration = Duration::from_millis(100);

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    clients: Clients,
    stopped: Arc<AtomicBool>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients = Arc::clone(&self.clients);
        let stopped = Arc::clone(&self.stopped);
        std::thread::spawn(move || reader_loop(&clients, &stopped));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::AddClient(stream) => self.add_client(stream),
                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    self.stopped.store(true, Ordering::SeqCst);
                    for mut client in self.clients.lock().drain(..) {
                        let _ = client.close(None);
                    }
                    break;
                }
                msg => {
                    if let Some(reload) = ReloadMessage::from_ws(&msg) {
                        crate::debug!("ws"; "sending {}", reload.to_json());
                        self.broadcast(&reload);
                    }
                }
            }
        }
    }

    fn add_client(&self, stream: TcpStream) {
        // Handshake in blocking mode, then poll reads without blocking.
        match tungstenite::accept(stream) {
            Ok(mut ws) => {
                let _ = ws.get_ref().set_nonblocking(true);
                let hello = ReloadMessage::connected().to_json();
                if let Err(e) = ws.send(Message::Text(hello.into())) {
                    crate::log!("ws"; "failed to send connected message: {}", e);
                    return;
                }
                let mut clients = self.clients.lock();
                clients.push(ws);
                crate::debug!("ws"; "client connected (total: {})", clients.len());
            }
            Err(e) => crate::log!("ws"; "handshake failed: {}", e),
        }
    }

    /// Send to every client, dropping the ones that fail.
    fn broadcast(&self, msg: &ReloadMessage) {
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        let frame = Message::Text(msg.to_json().into());
        clients.retain_mut(|client| match client.send(frame.clone()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("ws"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {} clients", clients.len());
    }
}

/// Drain incoming frames so close handshakes and pings are answered.
fn reader_loop(clients: &Clients, stopped: &AtomicBool) {
    while !stopped.load(Ordering::SeqCst) {
        std::thread::sleep(READ_POLL);

        clients.lock().retain_mut(|client| match client.read() {
            Ok(Message::Close(_)) => false,
            Ok(_) => true,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                true
            }
            Err(_) => false,
        });
    }
}
