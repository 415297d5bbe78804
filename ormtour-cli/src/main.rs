//! ormtour CLI - CRUD walkthrough and schema migrations over sqlx
//!
//! - `run`: replay the CRUD script against every configured engine
//!   (async by default, `--sync` for the blocking store)
//! - `migrate`: upgrade/downgrade the `account` schema, show current revision and history
//! - `config`: inspect or create ~/.ormtour/config.toml

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "ormtour",
    author,
    version,
    about = "CRUD walkthrough and schema migrations across PostgreSQL, MySQL and SQLite",
    long_about = "Replays a fixed create/read/update/delete script against each configured \
                  database through sqlx, synchronously or asynchronously, and manages the \
                  reversible `account` schema migrations."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.ormtour/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the CRUD script against each database engine
    Run(commands::run::RunArgs),
    /// Apply, revert and inspect schema migrations
    Migrate(commands::migrate::MigrateArgs),
    /// Manage ormtour configuration (path, show, init)
    Config(commands::config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// Not #[tokio::main]: `run --sync` and the migrate commands drive their own
// current-thread runtime and refuse to nest inside another one.
fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    ormtour_core::load_dotenv();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Run(args) => commands::run_tour(args, config)?,
        Commands::Migrate(args) => commands::run_migrate(args, config)?,
        Commands::Config(args) => commands::run_config(args, config)?,
        Commands::Completions(args) => run_completions(args)?,
    }
    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
