//! Runner shared by the text pipelines (markup, styles, scripts).

use std::path::{Path, PathBuf};

use super::{Asset, BuildError, LiveReload, RunReport, StageChain, Task, write_file};
use crate::core::AssetKind;
use crate::paths::{SourceFile, SourceSet};
use crate::transform::min_path;

/// Produces the `.min` artifact from the final text.
pub type MinifyFn = fn(&Path, &str) -> Result<String, BuildError>;

/// A stage chain bound to its sources and output directory.
#[derive(Debug)]
pub struct TextPipeline {
    kind: AssetKind,
    sources: SourceSet,
    output_dir: PathBuf,
    chain: StageChain,
    minify: Option<MinifyFn>,
    skip_syntax_errors: bool,
}

impl TextPipeline {
    pub fn new(kind: AssetKind, sources: SourceSet, output_dir: PathBuf, chain: StageChain) -> Self {
        Self {
            kind,
            sources,
            output_dir,
            chain,
            minify: None,
            skip_syntax_errors: false,
        }
    }

    /// Write a `.min` sibling produced by `minify`.
    pub fn with_minify(mut self, minify: MinifyFn) -> Self {
        self.minify = Some(minify);
        self
    }

    /// Log and skip files that fail with [`BuildError::Syntax`].
    pub fn skip_syntax_errors(mut self) -> Self {
        self.skip_syntax_errors = true;
        self
    }

    /// Build every source file, then notify live reload.
    pub async fn run(&self, reload: &LiveReload) -> Result<RunReport, BuildError> {
        let mut report = RunReport::new(Task::Asset(self.kind));
        crate::debug!(self.kind.name(); "sources: {}", self.sources.patterns().join(" "));
        crate::debug!(self.kind.name(); "stages: {}", self.chain.names().join(" -> "));

        for file in self.sources.scan() {
            match self.process(&file).await {
                Ok(written) => report.written.extend(written),
                Err(err) if self.skip_syntax_errors && err.is_syntax() => {
                    crate::log!("error"; "{}", err);
                    report.skipped.push(file.path);
                }
                Err(err) => return Err(err),
            }
        }

        crate::debug!(self.kind.name(); "{}", report.summary());
        reload.notify(&report).await;
        Ok(report)
    }

    async fn process(&self, file: &SourceFile) -> Result<Vec<PathBuf>, BuildError> {
        let text = tokio::fs::read_to_string(&file.path)
            .await
            .map_err(|err| BuildError::io(&file.path, err))?;

        let rel = match self.kind.output_ext() {
            Some(ext) => file.rel.with_extension(ext),
            None => file.rel.clone(),
        };
        let asset = self.chain.run(Asset::new(file.path.clone(), rel, text))?;

        let output = self.output_dir.join(&asset.rel);
        write_file(&output, asset.text.as_bytes()).await?;
        let mut written = vec![output.clone()];

        if let Some(map) = &asset.map {
            let map_path = map_path(&output);
            write_file(&map_path, map.as_bytes()).await?;
            written.push(map_path);
        }

        if let Some(minify) = self.minify {
            let minified = minify(&output, &asset.text)?;
            let min = min_path(&output);
            write_file(&min, minified.as_bytes()).await?;
            written.push(min);
        }

        Ok(written)
    }
}

/// `main.js` → `main.js.map`.
pub fn map_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".map");
    output.with_file_name(name)
}

#[cfg(test)]
impl TextPipeline {
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn chain(&self) -> &StageChain {
        &self.chain
    }

    pub fn minifies(&self) -> bool {
        self.minify.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::FnStage;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SourceSet) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("app/nested")).unwrap();
        fs::write(dir.path().join("app/a.txt"), "a").unwrap();
        fs::write(dir.path().join("app/nested/b.txt"), "b").unwrap();
        fs::write(dir.path().join("app/bad.txt"), "bad").unwrap();
        let sources = SourceSet::new(dir.path(), &["app/**/*.txt".to_string()]).unwrap();
        (dir, sources)
    }

    fn failing_on_bad() -> StageChain {
        StageChain::new().pipe(FnStage::new("check", |mut asset: Asset| {
            if asset.text == "bad" {
                return Err(BuildError::syntax(&asset.source, "bad input"));
            }
            asset.text = asset.text.to_uppercase();
            Ok(asset)
        }))
    }

    #[tokio::test]
    async fn test_syntax_errors_skipped() {
        let (dir, sources) = setup();
        let out = dir.path().join("out");
        let pipeline =
            TextPipeline::new(AssetKind::Markup, sources, out.clone(), failing_on_bad())
                .skip_syntax_errors();

        let report = pipeline.run(&LiveReload::disabled()).await.unwrap();
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.skipped, vec![dir.path().join("app/bad.txt")]);
        assert_eq!(fs::read_to_string(out.join("nested/b.txt")).unwrap(), "B");
        assert!(!out.join("bad.txt").exists());
    }

    #[tokio::test]
    async fn test_syntax_errors_propagate_by_default() {
        let (dir, sources) = setup();
        let pipeline = TextPipeline::new(
            AssetKind::Markup,
            sources,
            dir.path().join("out"),
            failing_on_bad(),
        );
        assert!(pipeline.run(&LiveReload::disabled()).await.is_err());
    }

    #[tokio::test]
    async fn test_min_and_map_siblings() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("app")).unwrap();
        fs::write(dir.path().join("app/main.js"), "x").unwrap();
        let sources = SourceSet::new(dir.path(), &["app/*.js".to_string()]).unwrap();
        let chain = StageChain::new().pipe(FnStage::new("map", |mut asset: Asset| {
            asset.map = Some("{}".into());
            Ok(asset)
        }));
        let out = dir.path().join("out");
        let pipeline = TextPipeline::new(AssetKind::Scripts, sources, out.clone(), chain)
            .with_minify(|_, text| Ok(text.trim().to_string()));

        let report = pipeline.run(&LiveReload::disabled()).await.unwrap();
        assert_eq!(
            report.written,
            vec![
                out.join("main.js"),
                out.join("main.js.map"),
                out.join("main.min.js")
            ]
        );
    }

    #[test]
    fn test_map_path() {
        assert_eq!(map_path(Path::new("/o/js/main.js")), Path::new("/o/js/main.js.map"));
    }
}
