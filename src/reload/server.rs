//! WebSocket listener for live reload.
//!
//! Accepted connections are handed to the WebSocket actor, which performs
//! the handshake and owns the client from then on.

use std::net::{IpAddr, SocketAddr, TcpListener};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::actor::messages::WsMsg;
use crate::core::is_shutdown;

/// Ports tried upward from the configured one.
const MAX_PORT_RETRIES: u16 = 10;

/// Poll interval of the non-blocking accept loop.
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Bind the listener and start accepting on a background thread.
///
/// Returns the bound port, which differs from `base_port` when that one is
/// taken.
pub fn start_ws_server(
    interface: IpAddr,
    base_port: u16,
    ws_tx: mpsc::Sender<WsMsg>,
) -> Result<u16> {
    let (listener, port) = bind_with_retry(interface, base_port)?;
    listener.set_nonblocking(true)?;
    if port != base_port {
        crate::log!("reload"; "port {} in use, using {} instead", base_port, port);
    }

    std::thread::spawn(move || {
        while !is_shutdown() {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connected: {}", addr);
                    let _ = stream.set_nonblocking(false);
                    if ws_tx.blocking_send(WsMsg::AddClient(stream)).is_err() {
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(ACCEPT_POLL);
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(ACCEPT_POLL);
                }
            }
        }
    });

    Ok(port)
}

fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let addr = SocketAddr::new(interface, base_port.saturating_add(offset));
        match TcpListener::bind(addr) {
            Ok(listener) => {
                let port = listener.local_addr()?.port();
                return Ok((listener, port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_bind_skips_taken_port() {
        let local = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let taken = TcpListener::bind(SocketAddr::new(local, 0)).unwrap();
        let port = taken.local_addr().unwrap().port();

        let (_listener, bound) = bind_with_retry(local, port).unwrap();
        assert_ne!(bound, port);
        assert!(bound > port && bound < port.saturating_add(MAX_PORT_RETRIES));
    }
}
