//! Vendored module copy.
//!
//! Allow-listed files from the dependency store land in `<root>/lib/`,
//! minus everything up to and including the last `dist` directory:
//!
//! ```text
//! node_modules/imask/dist/imask.min.js  →  dist/lib/imask.min.js
//! node_modules/pkg/esm/pkg.js           →  dist/lib/pkg/esm/pkg.js
//! ```

use std::path::{Component, Path, PathBuf};

use super::{BuildError, LiveReload, RunReport, Task, write_file};
use crate::config::SiteConfig;
use crate::core::BuildOptions;
use crate::paths::PathTable;

#[derive(Debug)]
pub struct VendorCopy {
    store: PathBuf,
    lib_dir: PathBuf,
    modules: Vec<PathBuf>,
}

impl VendorCopy {
    pub fn new(config: &SiteConfig, paths: &PathTable, options: BuildOptions) -> Self {
        Self {
            store: paths.vendor_store().to_path_buf(),
            lib_dir: paths.lib_dir(options.mode),
            modules: config.vendor.modules.clone(),
        }
    }

    /// Copy every allow-listed module that exists; missing ones are skipped.
    pub async fn run(&self, reload: &LiveReload) -> Result<RunReport, BuildError> {
        let mut report = RunReport::new(Task::Vendor);

        for module in &self.modules {
            let source = self.store.join(module);
            let bytes = match tokio::fs::read(&source).await {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    crate::debug!("vendor"; "{} not installed, skipping", module.display());
                    report.skipped.push(source);
                    continue;
                }
                Err(err) => return Err(BuildError::io(&source, err)),
            };

            let dest = self.lib_dir.join(vendor_dest(module));
            write_file(&dest, &bytes).await?;
            report.written.push(dest);
        }

        reload.notify(&report).await;
        Ok(report)
    }
}

/// Path of a vendored module below `lib/`.
pub fn vendor_dest(module: &Path) -> PathBuf {
    let parts: Vec<Component<'_>> = module
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    let after_dist = parts
        .iter()
        .rposition(|c| c.as_os_str() == "dist")
        .map(|i| &parts[i + 1..])
        .filter(|rest| !rest.is_empty());

    after_dist.unwrap_or(&parts).iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BuildMode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_vendor_dest() {
        assert_eq!(
            vendor_dest(Path::new("imask/dist/imask.min.js")),
            Path::new("imask.min.js")
        );
        assert_eq!(
            vendor_dest(Path::new("swiper/dist/esm/swiper.js")),
            Path::new("esm/swiper.js")
        );
        assert_eq!(vendor_dest(Path::new("pkg/esm/pkg.js")), Path::new("pkg/esm/pkg.js"));
        assert_eq!(vendor_dest(Path::new("pkg/dist")), Path::new("pkg/dist"));
    }

    #[tokio::test]
    async fn test_copy_and_missing_skipped() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("node_modules/imask/dist");
        fs::create_dir_all(&store).unwrap();
        fs::write(store.join("imask.min.js"), b"!function(){}();").unwrap();

        let mut config = SiteConfig::for_root(dir.path());
        config.vendor.modules.push(PathBuf::from("missing/dist/missing.js"));
        let table = PathTable::from_config(&config).unwrap();

        let copy = VendorCopy::new(&config, &table, BuildOptions::new(BuildMode::Production, false));
        let report = copy.run(&LiveReload::disabled()).await.unwrap();

        let dest = dir.path().join("prod/lib/imask.min.js");
        assert_eq!(report.written, vec![dest.clone()]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(fs::read(dest).unwrap(), b"!function(){}();");
    }
}
