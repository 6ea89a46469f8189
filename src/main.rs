use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::debug;

use pattern_catalogue::catalogue::{self, Category, DemoEntry};
use pattern_catalogue::{logging, AppConfig};

#[derive(Parser)]
#[command(name = "patterns")]
#[command(about = "Run design pattern and low level design demos")]
#[command(version)]
struct Cli {
    /// TOML config file (falls back to $PATTERNS_CONFIG, then defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List demos grouped by category
    List,

    /// Run the named demos
    Run {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Run every demo in catalogue order
    All,
}

fn run_entry(entry: &DemoEntry, config: &AppConfig) -> anyhow::Result<()> {
    debug!(demo = entry.name, "running demo");
    let transcript = (entry.run)(config).with_context(|| format!("demo '{}' failed", entry.name))?;
    println!("{}", format!("### {} ###", entry.name).bold().yellow());
    print!("{}", transcript.render_colored());
    println!();
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    logging::init(&config.logging.level, cli.verbose);
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::List => {
            for category in Category::ALL {
                println!("{}", category.to_string().bold().cyan());
                for entry in catalogue::by_category(category) {
                    println!("  {:<26} {}", entry.name.green(), entry.summary);
                }
            }
        }
        Commands::Run { names } => {
            let mut entries = Vec::with_capacity(names.len());
            for name in &names {
                match catalogue::find(name) {
                    Some(entry) => entries.push(entry),
                    None => bail!(
                        "unknown demo '{}'; available: {}",
                        name,
                        catalogue::names().join(", ")
                    ),
                }
            }
            for entry in entries {
                run_entry(entry, &config)?;
            }
        }
        Commands::All => {
            for entry in catalogue::DEMOS {
                run_entry(entry, &config)?;
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
