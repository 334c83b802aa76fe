//! Stage chain: an ordered list of transforms applied to one file.
//!
//! ```ignore
//! let chain = StageChain::new()
//!     .pipe(Include)
//!     .pipe(Beautify)
//!     .when(mode.is_production(), || Rewrite(AssetKind::Markup));
//! ```

use std::fmt;
use std::path::PathBuf;

use super::BuildError;

/// One file flowing through a chain.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Absolute source path.
    pub source: PathBuf,
    /// Output path relative to the kind's output directory.
    pub rel: PathBuf,
    pub text: String,
    /// Source map (JSON) produced by a transform, written as `<rel>.map`.
    pub map: Option<String>,
}

impl Asset {
    pub fn new(source: PathBuf, rel: PathBuf, text: String) -> Self {
        Self {
            source,
            rel,
            text,
            map: None,
        }
    }
}

/// A single transform step.
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, asset: Asset) -> Result<Asset, BuildError>;
}

/// Ordered stages, applied first to last.
#[derive(Default)]
pub struct StageChain {
    stages: Vec<Box<dyn Stage>>,
}

impl StageChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn pipe(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append the stage built by `make`, only if `condition` holds.
    ///
    /// `make` is not called for a branch that is not taken.
    pub fn when<S, F>(self, condition: bool, make: F) -> Self
    where
        S: Stage + 'static,
        F: FnOnce() -> S,
    {
        if condition { self.pipe(make()) } else { self }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn run(&self, asset: Asset) -> Result<Asset, BuildError> {
        self.stages.iter().try_fold(asset, |asset, stage| stage.apply(asset))
    }
}

impl fmt::Debug for StageChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// A closure used as a stage.
pub struct FnStage<F> {
    name: &'static str,
    f: F,
}

impl<F> FnStage<F>
where
    F: Fn(Asset) -> Result<Asset, BuildError> + Send + Sync,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> Stage for FnStage<F>
where
    F: Fn(Asset) -> Result<Asset, BuildError> + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, asset: Asset) -> Result<Asset, BuildError> {
        (self.f)(asset)
    }
}
