//! Initialize a new NRM project.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::Config;

pub fn run(path: Option<String>) -> Result<()> {
    let base_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };

    println!("{} Initializing NRM project...", "→".blue());

    let config = Config::default();

    // Create run output directory
    let runs_dir = base_path.join(&config.run.output_dir);
    std::fs::create_dir_all(&runs_dir)
        .with_context(|| format!("Failed to create {}", runs_dir.display()))?;
    println!("  {} Created {}", "✓".green(), runs_dir.display());

    // Create default config
    let config_path = base_path.join("nrm.toml");
    if !config_path.exists() {
        config.save(&config_path)?;
        println!("  {} Created {}", "✓".green(), config_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    }

    // Keep run output out of version control
    let gitignore_path = base_path.join(".nrm").join(".gitignore");
    if !gitignore_path.exists() {
        std::fs::write(&gitignore_path, "runs/\n")
            .with_context(|| format!("Failed to write {}", gitignore_path.display()))?;
        println!("  {} Created {}", "✓".green(), gitignore_path.display());
    }

    println!();
    println!("{} NRM project initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!("  {} edit nrm.toml", "1.".blue());
    println!("  {} nrm run --seed 7", "2.".blue());
    println!("  {} nrm sweep --seeds 1,2,3", "3.".blue());

    Ok(())
}
