mod cli;
mod core;

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::core::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "billing-notify",
    about = "Post this month's AWS spend to a chat webhook",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: $XDG_CONFIG_HOME/billing-notify/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Report as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Shorthand for JSON output
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the report and post it to the webhook
    Run,
    /// Build the report and print it without posting
    Preview,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init,
    /// Validate config file
    Check,
    /// Print the effective configuration
    Show,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli::logging::init(cli.verbose);

    let output_opts = cli::output::OutputOptions {
        format: if cli.json {
            cli::output::OutputFormat::Json
        } else {
            cli::output::OutputFormat::Text
        },
        pretty: cli.pretty,
        use_color: cli::output::detect_color(!cli.no_color),
    };

    let config_path = cli.config.as_deref();
    let today = cli
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    match cli.command {
        None | Some(Commands::Run) => {
            let config = AppConfig::load(config_path).context("Failed to load config")?;
            cli::run_cmd::run(&config, today, &output_opts).await?;
        }
        Some(Commands::Preview) => {
            let config = AppConfig::load(config_path).context("Failed to load config")?;
            cli::run_cmd::preview(&config, today, &output_opts).await?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init => cli::config_cmd::init(config_path, &output_opts)?,
            ConfigAction::Check => cli::config_cmd::check(config_path, &output_opts)?,
            ConfigAction::Show => {
                let config = AppConfig::load(config_path).context("Failed to load config")?;
                cli::config_cmd::show(&config, &output_opts)?
            }
        },
    }

    Ok(())
}
