//! CRUD script command
//!
//! Replays the action sequence against each engine, printing the tutorial
//! output on stdout.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use ormtour_core::script::{self, Action, RunSummary, DEFAULT_SCRIPT};
use ormtour_core::TourConfig;
use tracing::info;

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Database URL to run against (repeatable, replaces configured engines)
    #[arg(long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Actions to run instead of the default script (comma-separated)
    #[arg(long = "action", value_name = "ACTION", value_delimiter = ',')]
    pub actions: Vec<Action>,

    /// Use the synchronous (blocking) store
    #[arg(long)]
    pub sync: bool,

    /// Stop at the first engine that fails
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the action sequence and exit without connecting
    #[arg(long)]
    pub list: bool,
}

/// Engines, actions and flags for one run.
///
/// Explicit `--url`s replace the configured engines, so the config file is
/// only read when no URL was given.
fn resolve_settings(
    args: RunArgs,
    config_path: Option<&Path>,
) -> Result<(Vec<String>, Vec<Action>, bool, bool)> {
    let config = if args.urls.is_empty() {
        Some(TourConfig::load(config_path).context("failed to load configuration")?)
    } else {
        None
    };
    let run = config.as_ref().map(|c| c.run.clone()).unwrap_or_default();

    let actions = if !args.actions.is_empty() {
        args.actions
    } else {
        run.actions.unwrap_or_else(|| DEFAULT_SCRIPT.to_vec())
    };
    let urls = match &config {
        Some(config) => config.engine_urls(),
        None => args.urls,
    };

    Ok((urls, actions, args.sync || run.sync, args.fail_fast || run.fail_fast))
}

pub fn run_tour(args: RunArgs, config_path: Option<&Path>) -> Result<()> {
    let list = args.list;
    let (urls, actions, sync, fail_fast) = resolve_settings(args, config_path)?;

    if list {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for action in &actions {
            writeln!(out, "{action}")?;
        }
        return Ok(());
    }

    info!(
        engines = urls.len(),
        actions = actions.len(),
        sync,
        "starting CRUD script"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = if sync {
        script::run_engines_blocking(&urls, &actions, fail_fast, &mut out)?
    } else {
        let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
        rt.block_on(script::run_engines(&urls, &actions, fail_fast, &mut out))?
    };
    out.flush()?;

    report_failures(&summary)
}

fn report_failures(summary: &RunSummary) -> Result<()> {
    if summary.all_succeeded() {
        return Ok(());
    }

    let failed: Vec<_> = summary.failures().collect();
    for report in &failed {
        if let Some(err) = &report.error {
            eprintln!("✗ {}: {}", report.url, err);
        }
    }
    Err(anyhow!(
        "{} of {} engine(s) failed",
        failed.len(),
        summary.reports.len()
    ))
}
