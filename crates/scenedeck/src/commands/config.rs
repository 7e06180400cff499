use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".dimmed());
    }
    println!();

    let row = |key: &str, value: Option<String>, default: &str| {
        let shown = match value {
            Some(v) => v.green().to_string(),
            None => format!("{default} {}", "(default)".dimmed()),
        };
        println!("  {:<24} {shown}", key.cyan());
    };
    row("defaults.theme", config.theme().map(str::to_string), "light");
    row(
        "defaults.trigger_mode",
        config.trigger_mode().map(|m| m.to_string()),
        "from deck",
    );
    row("defaults.start_mode", config.start_mode().map(str::to_string), "first");
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    tracing::debug!(key, value, path = %path.display(), "Config updated");
    println!("{} {key} = {value}", "Set".green().bold());
    Ok(())
}
