//! Development server with live reload support.
//!
//! Serves the selected mode's output root. HTML responses get the live
//! reload `<script>` injected; the script itself is served from memory.

mod content;
mod lifecycle;
mod path;
mod response;

use crate::{
    actor::Coordinator, config::SiteConfig, core::register_server, debug,
    embed::serve::LIVERELOAD_URL, log,
};
use anyhow::Result;
use crossbeam::channel;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use tiny_http::{Request, Server};

/// Bound WebSocket port, 0 until the live reload server is up.
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(0);

/// Record the bound WebSocket port (called by the coordinator).
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

fn actual_ws_port() -> Option<u16> {
    match ACTUAL_WS_PORT.load(Ordering::Relaxed) {
        0 => None,
        port => Some(port),
    }
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    serve_root: PathBuf,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server and register it with the Ctrl+C handler.
pub fn bind_server(config: &SiteConfig, serve_root: PathBuf) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);
    debug!("serve"; "serving {}", serve_root.display());

    Ok(BoundServer {
        server,
        serve_root,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Start the actors, then serve until shutdown (blocking).
    pub fn run(self, coordinator: Coordinator) -> Result<()> {
        let actors = lifecycle::spawn_actors(coordinator.with_shutdown_signal(self.shutdown_rx));
        run_request_loop(&self.server, &self.serve_root);
        lifecycle::wait_for_shutdown(actors);
        Ok(())
    }
}

fn run_request_loop(server: &Server, serve_root: &Path) {
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, serve_root) {
            log!("serve"; "request error: {e}");
        }
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, serve_root: &Path) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let ws_port = actual_ws_port();
    let url_path = request.url().split(['?', '#']).next().unwrap_or_default();
    if url_path == LIVERELOAD_URL
        && let Some(port) = ws_port
    {
        return response::respond_livereload_js(request, port);
    }

    let livereload = ws_port.is_some();
    match path::resolve_path(request.url(), serve_root) {
        Some(file) => response::respond_file(request, &file, livereload),
        None => response::respond_not_found(request, serve_root, livereload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::net::SocketAddr;
    use tempfile::TempDir;

    /// Serve `count` requests from `root` on an ephemeral port.
    fn serve(root: PathBuf, count: usize) -> SocketAddr {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        std::thread::spawn(move || {
            for request in server.incoming_requests().take(count) {
                handle_request(request, &root).unwrap();
            }
        });
        addr
    }

    fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        write!(stream, "GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn test_serves_output_tree_with_livereload() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<body><p>home</p></body>").unwrap();
        set_actual_ws_port(35729);

        let addr = serve(dir.path().to_path_buf(), 3);
        let page = get(addr, "/");
        assert!(page.starts_with("HTTP/1.1 200"), "{page}");
        assert!(page.contains(&format!("src=\"{LIVERELOAD_URL}\"")), "{page}");

        let script = get(addr, LIVERELOAD_URL);
        assert!(script.contains("35729"), "{script}");

        let missing = get(addr, "/../Cargo.toml");
        assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");
    }
}
