//! URL to filesystem path resolution.

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

/// File under `serve_root` a request URL refers to.
///
/// Directories resolve to their `index.html`. Anything that would leave
/// the root, including through symlinks, resolves to `None`.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let relative = url_to_relative(url)?;
    let root = serve_root.canonicalize().ok()?;
    let target = root.join(relative).canonicalize().ok()?;
    if !target.starts_with(&root) {
        return None;
    }

    if target.is_dir() {
        let index = target.join("index.html");
        return index.is_file().then_some(index);
    }
    target.is_file().then_some(target)
}

/// Decoded URL path as a relative path; `None` for `..` or absolute parts.
fn url_to_relative(url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path).decode_utf8().ok()?;

    let mut relative = PathBuf::new();
    for segment in decoded.split('/').filter(|s| !s.is_empty()) {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => relative.push(part),
            (Some(Component::CurDir), None) => {}
            _ => return None,
        }
    }
    Some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn root() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("dist/style")).unwrap();
        fs::write(dir.path().join("dist/index.html"), "<p>home</p>").unwrap();
        fs::write(dir.path().join("dist/style/main.css"), "body{}").unwrap();
        fs::write(dir.path().join("secret.txt"), "nope").unwrap();
        dir
    }

    #[test]
    fn test_directory_maps_to_index() {
        let dir = root();
        let dist = dir.path().join("dist");
        let index = dist.canonicalize().unwrap().join("index.html");
        assert_eq!(resolve_path("/", &dist), Some(index.clone()));
        assert_eq!(resolve_path("/?v=2", &dist), Some(index));
    }

    #[test]
    fn test_file_with_encoded_query() {
        let dir = root();
        let dist = dir.path().join("dist");
        assert!(resolve_path("/style/main.css?_reload=1", &dist).is_some());
        assert!(resolve_path("/style%2Fmain.css", &dist).is_some());
        assert!(resolve_path("/style/missing.css", &dist).is_none());
    }

    #[test]
    fn test_traversal_rejected() {
        let dir = root();
        let dist = dir.path().join("dist");
        assert!(resolve_path("/../secret.txt", &dist).is_none());
        assert!(resolve_path("/%2e%2e/secret.txt", &dist).is_none());
        assert!(resolve_path("/style/..%2F..%2Fsecret.txt", &dist).is_none());
    }
}
