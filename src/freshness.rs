//! Mtime-based freshness detection for pipeline outputs.
//!
//! An output is fresh when it exists and was modified no earlier than its
//! source. Only the image pipeline consults this; text pipelines always
//! rebuild because their outputs depend on partials.

use std::path::Path;
use std::time::SystemTime;

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Check if `output` exists and is not older than `source`.
///
/// A missing or unreadable source is never fresh, so the caller surfaces
/// the read error instead of silently skipping.
pub fn is_output_fresh(output: &Path, source: &Path) -> bool {
    let (Some(output_time), Some(source_time)) = (get_mtime(output), get_mtime(source)) else {
        return false;
    };
    output_time >= source_time
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(path: &Path, time: SystemTime) {
        fs::write(path, b"x").unwrap();
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    #[test]
    fn test_missing_output_is_stale() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.png");
        touch(&source, SystemTime::now());
        assert!(!is_output_fresh(&dir.path().join("out.png"), &source));
    }

    #[test]
    fn test_newer_or_equal_output_is_fresh() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.png");
        let output = dir.path().join("b.png");
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        touch(&source, t);
        touch(&output, t);
        assert!(is_output_fresh(&output, &source));

        touch(&output, t + Duration::from_secs(10));
        assert!(is_output_fresh(&output, &source));
    }

    #[test]
    fn test_older_output_is_stale() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.png");
        let output = dir.path().join("b.png");
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        touch(&output, t);
        touch(&source, t + Duration::from_secs(10));
        assert!(!is_output_fresh(&output, &source));
    }

    #[test]
    fn test_missing_source_is_stale() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("b.png");
        touch(&output, SystemTime::now());
        assert!(!is_output_fresh(&output, &dir.path().join("gone.png")));
    }
}
