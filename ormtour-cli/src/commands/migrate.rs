//! Schema migration commands
//!
//! Commands: upgrade, downgrade, current, history

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ormtour_core::migrate::{self, label};
use ormtour_core::{redact_url, TourConfig};

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommands,
}

#[derive(Subcommand, Debug)]
pub enum MigrateCommands {
    /// Upgrade to a later revision (default: head)
    Upgrade(UpgradeArgs),
    /// Revert to an earlier revision
    Downgrade(DowngradeArgs),
    /// Show the current revision
    Current(UrlArgs),
    /// List revisions and whether they are applied
    History(HistoryArgs),
}

#[derive(Parser, Debug)]
pub struct UrlArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "ORMTOUR_MIGRATION_URL")]
    pub url: Option<String>,
}

#[derive(Parser, Debug)]
pub struct UpgradeArgs {
    /// Target revision: head, a version, or +N
    #[arg(default_value = "head", allow_hyphen_values = true)]
    pub target: String,

    #[command(flatten)]
    pub db: UrlArgs,
}

#[derive(Parser, Debug)]
pub struct DowngradeArgs {
    /// Target revision: base, a version, or -N
    #[arg(allow_hyphen_values = true)]
    pub target: String,

    #[command(flatten)]
    pub db: UrlArgs,
}

#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub db: UrlArgs,
}

pub fn run_migrate(args: MigrateArgs, config_path: Option<&Path>) -> Result<()> {
    match args.command {
        MigrateCommands::Upgrade(args) => {
            let url = resolve_url(args.db, config_path)?;
            let reached = migrate::upgrade_blocking(&url, &args.target)
                .with_context(|| format!("upgrade of {} failed", redact_url(&url)))?;
            println!("at revision {}", label(reached));
        }
        MigrateCommands::Downgrade(args) => {
            let url = resolve_url(args.db, config_path)?;
            let reached = migrate::downgrade_blocking(&url, &args.target)
                .with_context(|| format!("downgrade of {} failed", redact_url(&url)))?;
            println!("at revision {}", label(reached));
        }
        MigrateCommands::Current(db) => {
            let url = resolve_url(db, config_path)?;
            let current = migrate::current_blocking(&url)
                .with_context(|| format!("could not read revision of {}", redact_url(&url)))?;
            println!("{}", label(current));
        }
        MigrateCommands::History(args) => {
            let url = resolve_url(args.db, config_path)?;
            let revisions = migrate::history_blocking(&url)
                .with_context(|| format!("could not read history of {}", redact_url(&url)))?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&revisions)?);
            } else {
                for revision in &revisions {
                    println!("{revision}");
                }
            }
        }
    }
    Ok(())
}

fn resolve_url(db: UrlArgs, config_path: Option<&Path>) -> Result<String> {
    match db.url {
        Some(url) => Ok(url),
        None => {
            let config = TourConfig::load(config_path).context("failed to load configuration")?;
            Ok(config.migrations.url)
        }
    }
}
