use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use crate::core::config::Config;
use crate::core::system_monitor::SamplerKind;
use crate::ui;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", sub_matches)) => show(sub_matches.get_flag("json")),
        Some(("path", _)) => path(),
        Some(("reset", _)) => reset(),
        Some(("set", sub_matches)) => set(sub_matches),
        _ => {
            println!("Use 'sysdeck config --help' for more information.");
            Ok(())
        }
    }
}

fn show(json: bool) -> Result<()> {
    let config = Config::load()?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&config).context("Failed to serialize config")?
        );
        return Ok(());
    }

    println!("{}", "Sampler periods:".white().bold());
    for kind in SamplerKind::ALL {
        println!(
            "  {:<12} {} ms",
            kind.to_string().cyan(),
            config.periods.get(kind)
        );
    }

    println!();
    println!("{}", "Settings:".white().bold());
    let rows = [
        ("stop_timeout_ms", config.stop_timeout_ms.to_string()),
        ("error_policy", format!("{:?}", config.error_policy)),
        ("rate_clock", format!("{:?}", config.rate_clock)),
        ("ip_endpoint", config.ip_endpoint.clone()),
        ("ip_timeout_ms", config.ip_timeout_ms.to_string()),
        ("update_manifest_url", config.update_manifest_url.clone()),
        ("update_timeout_ms", config.update_timeout_ms.to_string()),
        ("top_processes", config.top_processes.to_string()),
    ];
    for (key, value) in rows {
        println!("  {:<20} {}", key.cyan(), value);
    }

    Ok(())
}

fn path() -> Result<()> {
    let path = Config::get_config_path()?;
    println!("{}", path.display().to_string().cyan().bold());
    if !path.exists() {
        ui::dimmed("(not created yet, defaults are in use)");
    }
    Ok(())
}

fn reset() -> Result<()> {
    Config::default().save()?;
    ui::success("Configuration reset to defaults");
    Ok(())
}

fn set(matches: &ArgMatches) -> Result<()> {
    let key = matches
        .get_one::<String>("key")
        .context("Key argument is required")?;
    let value = matches
        .get_one::<String>("value")
        .context("Value argument is required")?;

    let mut config = Config::load()?;
    config
        .set_value(key, value)
        .with_context(|| format!("Cannot set '{}'", key))?;
    config.save()?;

    ui::success(&format!("{} set to {}", key, value));
    Ok(())
}
