//! Source sets: ordered glob lists with `!` negation.
//!
//! Patterns are relative to the project root and always use `/`.
//! `*` never crosses a directory separator, `**` spans any depth and
//! `{a,b}` alternates.

use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use jwalk::WalkDir;

/// Characters that end the literal base of a glob.
const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// A file selected by a source set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    /// Absolute path of the source file.
    pub path: PathBuf,
    /// Path below the literal base of the glob that matched it.
    pub rel: PathBuf,
}

#[derive(Debug, Clone)]
struct Include {
    base: PathBuf,
    matcher: GlobMatcher,
}

/// Compiled glob list for one asset kind.
#[derive(Debug, Clone)]
pub struct SourceSet {
    root: PathBuf,
    patterns: Vec<String>,
    include: Vec<Include>,
    exclude: GlobSet,
}

impl SourceSet {
    /// Compile `patterns` rooted at `root`. Entries starting with `!` exclude.
    pub fn new(root: &Path, patterns: &[String]) -> Result<Self, globset::Error> {
        let mut include = Vec::new();
        let mut exclude = GlobSetBuilder::new();

        for pattern in patterns {
            match pattern.strip_prefix('!') {
                Some(negated) => {
                    exclude.add(build_glob(negated)?);
                }
                None => include.push(Include {
                    base: glob_base(pattern),
                    matcher: build_glob(pattern)?.compile_matcher(),
                }),
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            patterns: patterns.to_vec(),
            include,
            exclude: exclude.build()?,
        })
    }

    /// The patterns this set was compiled from.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Literal base directories of the positive patterns (absolute, deduped).
    pub fn base_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .include
            .iter()
            .map(|inc| self.root.join(&inc.base))
            .collect();
        dirs.sort();
        dirs.dedup();
        // A base nested under another base is already covered by the walk.
        let covered = dirs.clone();
        dirs.retain(|d| !covered.iter().any(|o| o != d && d.starts_with(o)));
        dirs
    }

    /// Test an absolute path; returns the output-relative path if selected.
    pub fn select(&self, path: &Path) -> Option<PathBuf> {
        let rel_root = path.strip_prefix(&self.root).ok()?;
        let key = to_slash(rel_root);

        if self.exclude.is_match(&key) {
            return None;
        }

        self.include
            .iter()
            .find(|inc| inc.matcher.is_match(&key))
            .map(|inc| {
                rel_root
                    .strip_prefix(&inc.base)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| rel_root.to_path_buf())
            })
    }

    /// Whether an absolute path is selected by this set.
    pub fn contains(&self, path: &Path) -> bool {
        self.select(path).is_some()
    }

    /// Walk the base directories and collect every selected file, sorted.
    pub fn scan(&self) -> Vec<SourceFile> {
        let mut files = Vec::new();

        for dir in self.base_dirs() {
            if !dir.is_dir() {
                continue;
            }
            for entry in WalkDir::new(&dir).skip_hidden(false).sort(true) {
                let Ok(entry) = entry else { continue };
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                if let Some(rel) = self.select(&path) {
                    files.push(SourceFile { path, rel });
                }
            }
        }

        files.sort();
        files.dedup();
        files
    }
}

fn build_glob(pattern: &str) -> Result<globset::Glob, globset::Error> {
    GlobBuilder::new(pattern).literal_separator(true).build()
}

/// Leading path components that contain no glob metacharacters.
///
/// `app/style/**/*.scss` → `app/style`, `app/*.html` → `app`.
pub fn glob_base(pattern: &str) -> PathBuf {
    let parts: Vec<&str> = pattern
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();
    let literal = parts.iter().take_while(|p| !p.contains(GLOB_META)).count();
    // A pattern without metacharacters names a file; its base is the parent.
    let depth = if literal == parts.len() {
        literal.saturating_sub(1)
    } else {
        literal
    };
    parts[..depth].iter().collect()
}

/// Render a relative path with `/` separators for glob matching.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
