//! Styles: scss → fonts → prefix + media → rewrite (production), `.min` always.

use std::path::PathBuf;

use lightningcss::targets::Browsers;

use super::{Asset, BuildError, FnStage, Rewrite, Stage, StageChain, TextPipeline};
use crate::config::{FontConfig, SiteConfig};
use crate::core::{AssetKind, BuildOptions};
use crate::paths::PathTable;
use crate::transform::{browsers_from_targets, compile_scss, inject_font_faces, minify_css, process_css};

pub fn pipeline(config: &SiteConfig, paths: &PathTable, options: BuildOptions) -> TextPipeline {
    let resolved = paths.resolve(AssetKind::Styles, options.mode);
    let chain = StageChain::new()
        .pipe(Scss {
            load_paths: resolved.sources.base_dirs(),
        })
        .pipe(fonts(config.styles.fonts.clone()))
        .pipe(PostProcess {
            browsers: browsers_from_targets(&config.styles.targets),
        })
        .when(options.mode.is_production(), || Rewrite(AssetKind::Styles));

    TextPipeline::new(
        AssetKind::Styles,
        resolved.sources.clone(),
        resolved.output_dir.to_path_buf(),
        chain,
    )
    .with_minify(minify_css)
    .skip_syntax_errors()
}

struct Scss {
    load_paths: Vec<PathBuf>,
}

impl Stage for Scss {
    fn name(&self) -> &'static str {
        "scss"
    }

    fn apply(&self, mut asset: Asset) -> Result<Asset, BuildError> {
        asset.text = compile_scss(&asset.source, &asset.text, &self.load_paths)?;
        Ok(asset)
    }
}

/// `@font-face` declarations for referenced families.
fn fonts(fonts: Vec<FontConfig>) -> impl Stage {
    FnStage::new("fonts", move |mut asset: Asset| {
        asset.text = inject_font_faces(&asset.text, &fonts);
        Ok(asset)
    })
}

/// Vendor prefixing and media query consolidation.
struct PostProcess {
    browsers: Browsers,
}

impl Stage for PostProcess {
    fn name(&self) -> &'static str {
        "postcss"
    }

    fn apply(&self, mut asset: Asset) -> Result<Asset, BuildError> {
        asset.text = process_css(&asset.source, &asset.text, self.browsers)?;
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

    #[test]
    fn test_chain_shape() {
        let config = SiteConfig::for_root(Path::new("/site"));
        let table = PathTable::from_config(&config).unwrap();
        let dev = pipeline(&config, &table, BuildOptions::new(BuildMode::Development, false));
        assert_eq!(dev.chain().names(), vec!["scss", "fonts", "postcss"]);
        assert!(dev.minifies());

        let prod = pipeline(&config, &table, BuildOptions::new(BuildMode::Production, false));
        assert_eq!(prod.chain().names(), vec!["scss", "fonts", "postcss", "rewrite"]);
        assert_eq!(prod.output_dir(), Path::new("/site/prod/style"));
    }

    #[tokio::test]
    async fn test_broken_file_skipped_others_built() {
        let dir = TempDir::new().unwrap();
        let style = dir.path().join("app/style");
        fs::create_dir_all(style.join("pages")).unwrap();
        fs::write(style.join("_vars.scss"), "$bg: url(/images/bg.png);").unwrap();
        fs::write(
            style.join("main.scss"),
            "@use 'vars';\nbody { background: vars.$bg; font-family: Montserrat; }",
        )
        .unwrap();
        fs::write(style.join("pages/home.scss"), ".home { color: red; }").unwrap();
        fs::write(style.join("broken.scss"), ".a { color: red").unwrap();

        let config = SiteConfig::for_root(dir.path());
        let table = PathTable::from_config(&config).unwrap();
        let options = BuildOptions::new(BuildMode::Production, false);
        let report = pipeline(&config, &table, options)
            .run(&LiveReload::disabled())
            .await
            .unwrap();

        let out = dir.path().join("prod/style");
        assert_eq!(report.skipped, vec![style.join("broken.scss")]);
        assert!(out.join("pages/home.css").exists());
        assert!(out.join("pages/home.min.css").exists());
        assert!(!out.join("_vars.css").exists());
        assert!(!out.join("broken.css").exists());

        let main = fs::read_to_string(out.join("main.css")).unwrap();
        assert!(main.contains("/assets/images/bg.png"), "{main}");
        assert!(main.contains("@font-face"), "{main}");
    }

    #[tokio::test]
    async fn test_legacy_hack_still_written() {
        let dir = TempDir::new().unwrap();
        let style = dir.path().join("app/style");
        fs::create_dir_all(&style).unwrap();
        fs::write(style.join("main.scss"), ".a { color: red; *zoom: 1; }\n.b { margin: 0; }\n").unwrap();

        let config = SiteConfig::for_root(dir.path());
        let table = PathTable::from_config(&config).unwrap();
        let report = pipeline(&config, &table, BuildOptions::new(BuildMode::Development, false))
            .run(&LiveReload::disabled())
            .await
            .unwrap();

        let out = dir.path().join("dist/style");
        assert!(report.skipped.is_empty());
        let main = fs::read_to_string(out.join("main.css")).unwrap();
        assert!(main.contains(".b {"), "{main}");
        assert!(out.join("main.min.css").exists());
    }
}
