use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::core::config::AppConfig;

fn resolve_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path)
}

pub fn init(path: Option<&Path>, _opts: &OutputOptions) -> Result<()> {
    let path = resolve_path(path);
    if path.exists() {
        eprintln!("Config file already exists at {}", path.display());
        eprintln!("Remove it first if you want to regenerate.");
        return Ok(());
    }

    AppConfig::default()
        .save(&path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    println!("Generated config at {}", path.display());
    Ok(())
}

pub fn check(path: Option<&Path>, opts: &OutputOptions) -> Result<()> {
    let shown = resolve_path(path);
    let config = AppConfig::load(path)
        .with_context(|| format!("Failed to load config from {}", shown.display()))?;
    let issues = config.validate();

    if opts.format == OutputFormat::Json {
        let payload = serde_json::json!({
            "path": shown.display().to_string(),
            "valid": issues.is_empty(),
            "issues": issues,
        });
        println!("{}", opts.to_json(&payload)?);
    } else if issues.is_empty() {
        println!("Config OK ({})", shown.display());
    } else {
        eprintln!("Config has {} issue(s) ({}):", issues.len(), shown.display());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
    }

    if !issues.is_empty() {
        anyhow::bail!("invalid config");
    }
    Ok(())
}

pub fn show(config: &AppConfig, opts: &OutputOptions) -> Result<()> {
    match opts.format {
        OutputFormat::Text => print!("{}", config.to_toml()?),
        OutputFormat::Json => println!("{}", opts.to_json(config)?),
    }
    Ok(())
}
