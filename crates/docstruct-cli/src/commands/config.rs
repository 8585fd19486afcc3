//! Config command - manage configuration.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use docstruct_core::EngineConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show configuration (the given file, or defaults)
    Show {
        /// Path to an existing configuration file
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Initialize a new configuration file with defaults
    Init(InitArgs),
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long, default_value = "docstruct.json")]
    output: PathBuf,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show { path } => show_config(path),
        ConfigCommand::Init(init_args) => init_config(init_args),
    }
}

fn show_config(path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = match path {
        Some(path) => EngineConfig::from_file(&path)?,
        None => {
            println!(
                "{} No config file given, showing defaults.",
                style("ℹ").blue()
            );
            EngineConfig::default()
        }
    };

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists: {} (use --force to overwrite)",
            args.output.display()
        );
    }

    EngineConfig::default().save(&args.output)?;
    println!(
        "{} Default configuration written to {}",
        style("✓").green(),
        args.output.display()
    );
    Ok(())
}
