use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ormtour_core::{redact_url, Engine, TourConfig};

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a starter config to ~/.ormtour/config.toml
    Init(InitArgs),
    /// Show the effective config (after environment overrides)
    Show(ShowArgs),
    /// Check that every configured URL names a supported engine
    Validate,
    /// Show config file path
    Path,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Print passwords instead of ***
    #[arg(long)]
    pub reveal: bool,
}

pub fn run_config(args: ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args, config_path),
        ConfigCommands::Show(args) => run_show(args, config_path),
        ConfigCommands::Validate => run_validate(config_path),
        ConfigCommands::Path => run_path(config_path),
    }
}

fn run_init(args: InitArgs, config_path: Option<&Path>) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(TourConfig::config_path);

    if path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {:?}\n\nUse --force to overwrite",
            path
        ));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, TourConfig::template())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    println!("✅ Created config at: {:?}", path);
    println!("\nNext steps:");
    println!("  1. Edit the engine URLs: $EDITOR {:?}", path);
    println!("  2. Run: ormtour config validate");
    println!("  3. Run: ormtour run");

    Ok(())
}

fn run_show(args: ShowArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = TourConfig::load(config_path).context("failed to load configuration")?;

    if !args.reveal {
        for engine in &mut config.engines {
            engine.url = redact_url(&engine.url);
        }
        config.migrations.url = redact_url(&config.migrations.url);
    }

    let toml_str =
        toml::to_string_pretty(&config).context("Failed to serialize config to TOML")?;
    println!("{}", toml_str);

    Ok(())
}

fn run_validate(config_path: Option<&Path>) -> Result<()> {
    let config = TourConfig::load(config_path).context("failed to load configuration")?;

    let mut problems = 0;
    for engine in config.engines.iter().filter(|e| e.enabled) {
        let shown = redact_url(&engine.url);
        match Engine::from_url(&engine.url) {
            Ok(kind) => println!("   ✓ {} ({})", shown, kind),
            Err(e) => {
                problems += 1;
                eprintln!("   ✗ {}", e);
            }
        }
    }
    match Engine::from_url(&config.migrations.url) {
        Ok(kind) => println!(
            "   ✓ migrations: {} ({})",
            redact_url(&config.migrations.url),
            kind
        ),
        Err(e) => {
            problems += 1;
            eprintln!("   ✗ migrations: {}", e);
        }
    }

    if problems > 0 {
        anyhow::bail!("{} invalid URL(s) in configuration", problems);
    }
    println!("\n✅ Configuration valid!");
    Ok(())
}

fn run_path(config_path: Option<&Path>) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(TourConfig::config_path);
    println!("{}", path.display());
    Ok(())
}
