//! Scripts: include → rewrite (production) → transpile, `.min` with `--min`.
//!
//! Rewriting ahead of transpilation keeps source map columns in line with
//! the written code.

use super::markup::Include;
use super::text::map_path;
use super::{Asset, BuildError, Rewrite, Stage, StageChain, TextPipeline};
use crate::config::SiteConfig;
use crate::core::{AssetKind, BuildOptions};
use crate::paths::PathTable;
use crate::transform::{minify_js, transpile};

pub fn pipeline(config: &SiteConfig, paths: &PathTable, options: BuildOptions) -> TextPipeline {
    let resolved = paths.resolve(AssetKind::Scripts, options.mode);
    let chain = StageChain::new()
        .pipe(Include)
        .when(options.mode.is_production(), || Rewrite(AssetKind::Scripts))
        .pipe(Transpile {
            target: config.scripts.target.clone(),
            source_maps: config.scripts.source_maps,
        });

    let pipeline = TextPipeline::new(
        AssetKind::Scripts,
        resolved.sources.clone(),
        resolved.output_dir.to_path_buf(),
        chain,
    );
    if options.minify_scripts {
        pipeline.with_minify(minify_js)
    } else {
        pipeline
    }
}

struct Transpile {
    target: String,
    source_maps: bool,
}

impl Stage for Transpile {
    fn name(&self) -> &'static str {
        "transpile"
    }

    fn apply(&self, mut asset: Asset) -> Result<Asset, BuildError> {
        let out = transpile(&asset.source, &asset.text, &self.target, self.source_maps)?;
        asset.text = out.code;
        if let Some(map) = out.map {
            let map_name = map_path(&asset.rel);
            let map_name = map_name.file_name().unwrap_or_default().to_string_lossy();
            asset.text.push_str(&format!("//# sourceMappingURL={map_name}\n"));
            asset.map = Some(map);
        }
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BuildMode;
    use crate::pipeline::LiveReload;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let js = dir.path().join("app/js");
        fs::create_dir_all(&js).unwrap();
        fs::write(js.join("_util.js"), "function twice(x) { return x * 2; }\n").unwrap();
        fs::write(
            js.join("main.js"),
            "@@include('_util.js')\nfetch('/api/items').then(() => twice(2 ** 2));\n",
        )
        .unwrap();
        dir
    }

    #[tokio::test]
    async fn test_dev_build_with_map() {
        let dir = project();
        let config = SiteConfig::for_root(dir.path());
        let table = PathTable::from_config(&config).unwrap();
        let report = pipeline(&config, &table, BuildOptions::new(BuildMode::Development, false))
            .run(&LiveReload::disabled())
            .await
            .unwrap();

        let out = dir.path().join("dist/js");
        assert_eq!(report.written, vec![out.join("main.js"), out.join("main.js.map")]);
        assert!(!out.join("_util.js").exists());

        let main = fs::read_to_string(out.join("main.js")).unwrap();
        assert!(main.contains("function twice"));
        assert!(main.contains("'/api/items'") || main.contains("\"/api/items\""));
        assert!(main.ends_with("//# sourceMappingURL=main.js.map\n"));
    }

    #[tokio::test]
    async fn test_prod_build_rewrites_and_minifies() {
        let dir = project();
        let config = SiteConfig::for_root(dir.path());
        let table = PathTable::from_config(&config).unwrap();
        pipeline(&config, &table, BuildOptions::new(BuildMode::Production, true))
            .run(&LiveReload::disabled())
            .await
            .unwrap();

        let out = dir.path().join("prod/js");
        let main = fs::read_to_string(out.join("main.js")).unwrap();
        assert!(main.contains("/assets/api/items"));
        let min = fs::read_to_string(out.join("main.min.js")).unwrap();
        assert!(min.len() < main.len());
        assert!(!dir.path().join("dist").exists());

        let map = fs::read_to_string(out.join("main.js.map")).unwrap();
        let map: serde_json::Value = serde_json::from_str(&map).unwrap();
        assert_eq!(map["sources"], serde_json::json!(["main.js"]));
        assert!(map["sourcesContent"][0].as_str().unwrap().contains("/assets/api/items"));
        assert!(!map.to_string().contains(&*dir.path().to_string_lossy()));
    }

    #[test]
    fn test_rewrite_runs_before_transpile() {
        let config = SiteConfig::for_root(Path::new("/site"));
        let table = PathTable::from_config(&config).unwrap();
        let prod = pipeline(&config, &table, BuildOptions::new(BuildMode::Production, false));
        assert_eq!(prod.chain().names(), vec!["include", "rewrite", "transpile"]);
    }
}
