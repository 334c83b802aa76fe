//! Build orchestration.
//!
//! Build phases:
//! - **Clean** - Remove the selected mode's output root
//! - **Pipelines** - Styles, markup, scripts, images and vendor, concurrently
//! - **Report** - One summary line per task; any failed task fails the build

use crate::{
    config::SiteConfig,
    core::{AssetKind, BuildOptions},
    log,
    paths::PathTable,
    pipeline::{self, BuildError, LiveReload, Pipeline, RunReport, Task, VendorCopy},
};
use anyhow::{Context, Result, anyhow, bail};
use std::time::Instant;

/// Current-thread runtime driving the pipelines of one invocation.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

/// `stagecraft build`: clean, then every pipeline.
pub fn build(config: &SiteConfig, options: BuildOptions) -> Result<()> {
    let paths = PathTable::from_config(config).context("Invalid source glob")?;
    let started = Instant::now();

    log!("build"; "{} build of {}", options.mode.label(), config.root_relative(paths.output_root(options.mode)).display());
    let reports = runtime()?.block_on(build_all(config, &paths, options, &LiveReload::disabled()))?;

    let written: usize = reports.iter().map(|r| r.written.len()).sum();
    log!("build"; "{} files written in {:.2?}", written, started.elapsed());
    Ok(())
}

/// `stagecraft run <task>`: one pipeline, without cleaning.
pub fn run_task(config: &SiteConfig, options: BuildOptions, task: Task) -> Result<()> {
    let paths = PathTable::from_config(config).context("Invalid source glob")?;
    let report = runtime()?
        .block_on(run_one(config, &paths, options, task, &LiveReload::disabled()))
        .map_err(|err| anyhow!("{task} failed: {err}"))?;
    log!(task.name(); "{}", report.summary());
    Ok(())
}

/// `stagecraft clean`: remove the selected mode's output root.
pub fn clean(config: &SiteConfig, options: BuildOptions) -> Result<()> {
    let paths = PathTable::from_config(config).context("Invalid source glob")?;
    runtime()?.block_on(pipeline::clean(&paths, options.mode))?;
    log!("clean"; "removed {}", config.root_relative(paths.output_root(options.mode)).display());
    Ok(())
}

/// Clean the output root, then run all pipelines concurrently.
pub async fn build_all(
    config: &SiteConfig,
    paths: &PathTable,
    options: BuildOptions,
    reload: &LiveReload,
) -> Result<Vec<RunReport>> {
    pipeline::clean(paths, options.mode).await?;
    run_all(config, paths, options, reload).await
}

/// Run all pipelines concurrently over the existing output root.
///
/// Every task runs to completion even when another fails; failures are
/// logged as they are collected and reported together.
pub async fn run_all(
    config: &SiteConfig,
    paths: &PathTable,
    options: BuildOptions,
    reload: &LiveReload,
) -> Result<Vec<RunReport>> {
    let (styles, markup, scripts, images, vendor) = tokio::join!(
        run_one(config, paths, options, Task::Asset(AssetKind::Styles), reload),
        run_one(config, paths, options, Task::Asset(AssetKind::Markup), reload),
        run_one(config, paths, options, Task::Asset(AssetKind::Scripts), reload),
        run_one(config, paths, options, Task::Asset(AssetKind::Images), reload),
        run_one(config, paths, options, Task::Vendor, reload),
    );

    let mut reports = Vec::new();
    let mut failed = Vec::new();
    for (task, result) in [
        (Task::Asset(AssetKind::Styles), styles),
        (Task::Asset(AssetKind::Markup), markup),
        (Task::Asset(AssetKind::Scripts), scripts),
        (Task::Asset(AssetKind::Images), images),
        (Task::Vendor, vendor),
    ] {
        match result {
            Ok(report) => {
                log!(task.name(); "{}", report.summary());
                reports.push(report);
            }
            Err(err) => {
                log!("error"; "{task}: {err}");
                failed.push(task.name());
            }
        }
    }

    if !failed.is_empty() {
        bail!("build failed: {}", failed.join(", "));
    }
    Ok(reports)
}

/// Run a single task's pipeline.
pub async fn run_one(
    config: &SiteConfig,
    paths: &PathTable,
    options: BuildOptions,
    task: Task,
    reload: &LiveReload,
) -> Result<RunReport, BuildError> {
    match task {
        Task::Asset(kind) => Pipeline::for_kind(kind, config, paths, options).run(reload).await,
        Task::Vendor => VendorCopy::new(config, paths, options).run(reload).await,
    }
}
