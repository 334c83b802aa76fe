//! Incremental image pipeline.
//!
//! A source is skipped while its output is at least as new as the source,
//! so a second run over unchanged inputs touches nothing.

use std::path::PathBuf;

use super::{BuildError, LiveReload, RunReport, Task, write_file};
use crate::config::{ImagesConfig, SiteConfig};
use crate::core::{AssetKind, BuildOptions};
use crate::freshness::is_output_fresh;
use crate::paths::{PathTable, SourceFile, SourceSet};
use crate::transform::compress_image;

#[derive(Debug)]
pub struct ImagePipeline {
    sources: SourceSet,
    output_dir: PathBuf,
    config: ImagesConfig,
}

impl ImagePipeline {
    pub fn new(config: &SiteConfig, paths: &PathTable, options: BuildOptions) -> Self {
        let resolved = paths.resolve(AssetKind::Images, options.mode);
        Self {
            sources: resolved.sources.clone(),
            output_dir: resolved.output_dir.to_path_buf(),
            config: config.images,
        }
    }

    pub async fn run(&self, reload: &LiveReload) -> Result<RunReport, BuildError> {
        let mut report = RunReport::new(Task::Asset(AssetKind::Images));

        for file in self.sources.scan() {
            let output = self.output_dir.join(&file.rel);
            if is_output_fresh(&output, &file.path) {
                report.skipped.push(file.path);
                continue;
            }
            self.process(&file, &output).await?;
            report.written.push(output);
        }

        crate::debug!("images"; "{}", report.summary());
        reload.notify(&report).await;
        Ok(report)
    }

    async fn process(&self, file: &SourceFile, output: &std::path::Path) -> Result<(), BuildError> {
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|err| BuildError::io(&file.path, err))?;
        let compressed = compress_image(&file.path, &bytes, self.config)?;
        write_file(output, &compressed).await
    }
}
