//! Live reload script injection.

use crate::embed::serve::script_tag;

/// Inject the live reload `<script>` into HTML bodies.
pub fn maybe_inject_livereload(body: Vec<u8>, content_type: &str, enabled: bool) -> Vec<u8> {
    if enabled && content_type.starts_with("text/html") {
        inject_before_body_end(body, script_tag().as_bytes())
    } else {
        body
    }
}

/// Insert `snippet` before the last `</body>`, or append it when there is none.
fn inject_before_body_end(mut body: Vec<u8>, snippet: &[u8]) -> Vec<u8> {
    const CLOSE: &[u8] = b"</body>";

    let at = body
        .windows(CLOSE.len())
        .rposition(|w| w.eq_ignore_ascii_case(CLOSE))
        .unwrap_or(body.len());
    body.splice(at..at, snippet.iter().copied());
    body
}
