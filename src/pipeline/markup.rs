//! Markup: include → beautify → rewrite (production).

use super::{Asset, BuildError, Rewrite, Stage, StageChain, TextPipeline};
use crate::core::{AssetKind, BuildOptions};
use crate::paths::PathTable;
use crate::transform::{beautify_html, resolve_includes};

pub fn pipeline(paths: &PathTable, options: BuildOptions) -> TextPipeline {
    let resolved = paths.resolve(AssetKind::Markup, options.mode);
    let chain = StageChain::new()
        .pipe(Include)
        .pipe(Beautify)
        .when(options.mode.is_production(), || Rewrite(AssetKind::Markup));

    TextPipeline::new(
        AssetKind::Markup,
        resolved.sources.clone(),
        resolved.output_dir.to_path_buf(),
        chain,
    )
}

/// Resolves `@@include` directives.
pub struct Include;

impl Stage for Include {
    fn name(&self) -> &'static str {
        "include"
    }

    fn apply(&self, mut asset: Asset) -> Result<Asset, BuildError> {
        asset.text = resolve_includes(&asset.source, &asset.text)?;
        Ok(asset)
    }
}

struct Beautify;

impl Stage for Beautify {
    fn name(&self) -> &'static str {
        "beautify"
    }

    fn apply(&self, mut asset: Asset) -> Result<Asset, BuildError> {
        asset.text = beautify_html(&asset.text);
        Ok(asset)
    }
}
