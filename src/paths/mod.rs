//! Path table: where each asset kind is read from and written to.
//!
//! ```text
//! kind      sources                                   dev            prod
//! markup    app/*.html  !app/_*.html                  dist/          prod/
//! styles    app/style/**/*.scss  !**/_*.scss          dist/style/    prod/style/
//! scripts   app/js/**/*.js  !app/js/**/_*.js          dist/js/       prod/js/
//! images    app/images/**/*.{jpg,png,gif}             dist/images/   prod/images/
//! vendor    node_modules/<allow-list>                 dist/lib/      prod/lib/
//! ```
//!
//! The table is pure data, built once from the configuration.

mod glob;

pub use glob::{SourceFile, SourceSet, to_slash};

use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::core::{AssetKind, BuildMode};

/// Where one asset kind lives.
#[derive(Debug, Clone)]
pub struct PathSpec {
    /// Files the pipeline builds.
    pub sources: SourceSet,
    /// Files whose change re-runs the pipeline (includes partials).
    pub watch: SourceSet,
    pub dev_dir: PathBuf,
    pub prod_dir: PathBuf,
}

impl PathSpec {
    pub fn output_dir(&self, mode: BuildMode) -> &Path {
        match mode {
            BuildMode::Development => &self.dev_dir,
            BuildMode::Production => &self.prod_dir,
        }
    }
}

/// Source globs and output directory for one kind in one mode.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub sources: &'a SourceSet,
    pub output_dir: &'a Path,
}

/// Static mapping from asset kind to its paths.
#[derive(Debug, Clone)]
pub struct PathTable {
    dev_root: PathBuf,
    prod_root: PathBuf,
    vendor_store: PathBuf,
    markup: PathSpec,
    styles: PathSpec,
    scripts: PathSpec,
    images: PathSpec,
}

/// Output subdirectory of each kind below the mode root.
const fn subdir(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Markup => "",
        AssetKind::Styles => "style",
        AssetKind::Scripts => "js",
        AssetKind::Images => "images",
    }
}

/// Vendored modules subdirectory below the mode root.
const LIB_DIR: &str = "lib";

impl PathTable {
    pub fn from_config(config: &SiteConfig) -> Result<Self, globset::Error> {
        let root = config.get_root().to_path_buf();
        let app = to_slash(&config.paths.app);
        let dev_root = root.join(&config.paths.dist);
        let prod_root = root.join(&config.paths.prod);

        let spec = |kind: AssetKind,
                    sources: Vec<String>,
                    watch: Vec<String>|
         -> Result<PathSpec, globset::Error> {
            Ok(PathSpec {
                sources: SourceSet::new(&root, &sources)?,
                watch: SourceSet::new(&root, &watch)?,
                dev_dir: dev_root.join(subdir(kind)),
                prod_dir: prod_root.join(subdir(kind)),
            })
        };

        let markup = spec(
            AssetKind::Markup,
            vec![format!("{app}/*.html"), format!("!{app}/_*.html")],
            vec![format!("{app}/**/*.html")],
        )?;
        // Partials are compiled through the files that import them.
        let styles = spec(
            AssetKind::Styles,
            vec![
                format!("{app}/style/**/*.scss"),
                format!("!{app}/style/**/_*.scss"),
            ],
            vec![format!("{app}/style/**/*.scss")],
        )?;
        let scripts = spec(
            AssetKind::Scripts,
            vec![format!("{app}/js/**/*.js"), format!("!{app}/js/**/_*.js")],
            vec![format!("{app}/js/**/*.js")],
        )?;
        let images = spec(
            AssetKind::Images,
            vec![format!("{app}/images/**/*.{{jpg,png,gif}}")],
            vec![format!("{app}/images/**/*.{{jpg,png,gif}}")],
        )?;

        Ok(Self {
            vendor_store: root.join(&config.paths.node_modules),
            dev_root,
            prod_root,
            markup,
            styles,
            scripts,
            images,
        })
    }

    pub fn spec(&self, kind: AssetKind) -> &PathSpec {
        match kind {
            AssetKind::Markup => &self.markup,
            AssetKind::Styles => &self.styles,
            AssetKind::Scripts => &self.scripts,
            AssetKind::Images => &self.images,
        }
    }

    /// Source globs and output directory of `kind` in `mode`.
    pub fn resolve(&self, kind: AssetKind, mode: BuildMode) -> Resolved<'_> {
        let spec = self.spec(kind);
        Resolved {
            sources: &spec.sources,
            output_dir: spec.output_dir(mode),
        }
    }

    /// Output root of a mode (`dist/` or `prod/`).
    pub fn output_root(&self, mode: BuildMode) -> &Path {
        match mode {
            BuildMode::Development => &self.dev_root,
            BuildMode::Production => &self.prod_root,
        }
    }

    /// Destination of vendored modules in a mode.
    pub fn lib_dir(&self, mode: BuildMode) -> PathBuf {
        self.output_root(mode).join(LIB_DIR)
    }

    /// Dependency store vendored modules are copied from.
    pub fn vendor_store(&self) -> &Path {
        &self.vendor_store
    }

    /// Kinds whose watch globs select `path`.
    pub fn kinds_watching(&self, path: &Path) -> Vec<AssetKind> {
        AssetKind::ALL
            .into_iter()
            .filter(|kind| self.spec(*kind).watch.contains(path))
            .collect()
    }

    /// Directories the watcher has to observe.
    pub fn watch_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = AssetKind::ALL
            .into_iter()
            .flat_map(|kind| self.spec(kind).watch.base_dirs())
            .collect();
        dirs.sort();
        dirs.dedup();
        let all = dirs.clone();
        dirs.retain(|d| !all.iter().any(|o| o != d && d.starts_with(o)));
        dirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PathTable {
        PathTable::from_config(&SiteConfig::for_root(Path::new("/site"))).unwrap()
    }

    #[test]
    fn test_resolve_output_dirs() {
        let table = table();
        let dev = table.resolve(AssetKind::Styles, BuildMode::Development);
        let prod = table.resolve(AssetKind::Styles, BuildMode::Production);
        assert_eq!(dev.output_dir, Path::new("/site/dist/style"));
        assert_eq!(prod.output_dir, Path::new("/site/prod/style"));
        assert_eq!(
            table.resolve(AssetKind::Markup, BuildMode::Development).output_dir,
            Path::new("/site/dist")
        );
    }

    #[test]
    fn test_dev_and_prod_never_overlap() {
        let table = table();
        for kind in AssetKind::ALL {
            let dev = table.resolve(kind, BuildMode::Development).output_dir;
            let prod = table.resolve(kind, BuildMode::Production).output_dir;
            assert!(!dev.starts_with(prod) && !prod.starts_with(dev));
        }
        assert_eq!(table.lib_dir(BuildMode::Production), Path::new("/site/prod/lib"));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let table = table();
        let a = table.resolve(AssetKind::Scripts, BuildMode::Production);
        let b = table.resolve(AssetKind::Scripts, BuildMode::Production);
        assert_eq!(a.output_dir, b.output_dir);
        assert_eq!(a.sources.patterns(), b.sources.patterns());
    }

    #[test]
    fn test_source_globs() {
        let table = table();
        let markup = &table.spec(AssetKind::Markup).sources;
        assert!(markup.contains(Path::new("/site/app/index.html")));
        assert!(!markup.contains(Path::new("/site/app/_header.html")));

        let styles = &table.spec(AssetKind::Styles).sources;
        assert_eq!(
            styles.select(Path::new("/site/app/style/pages/home.scss")),
            Some(PathBuf::from("pages/home.scss"))
        );
        assert!(!styles.contains(Path::new("/site/app/style/_vars.scss")));
    }

    #[test]
    fn test_watch_includes_partials() {
        let table = table();
        assert_eq!(
            table.kinds_watching(Path::new("/site/app/_header.html")),
            vec![AssetKind::Markup]
        );
        assert_eq!(
            table.kinds_watching(Path::new("/site/app/js/_util.js")),
            vec![AssetKind::Scripts]
        );
        assert!(table.kinds_watching(Path::new("/site/dist/index.html")).is_empty());
    }

    #[test]
    fn test_watch_dirs() {
        let table = table();
        assert_eq!(table.watch_dirs(), vec![PathBuf::from("/site/app")]);
    }
}
