//! Re-label recorded runs without re-simulating.

use anyhow::{Context, Result};
use colored::Colorize;
use nrm::prelude::*;
use std::path::PathBuf;

use crate::config::Config;

pub fn run(paths: &[PathBuf], write: bool) -> Result<()> {
    let config = Config::load()?;
    let thresholds = config.basin;

    let mut changed = 0usize;
    for path in paths {
        let mut summary = RunSummary::load(path)
            .with_context(|| format!("Failed to load run summary: {}", path.display()))?;
        let before = summary.basin;
        let after = summary.reclassify(&thresholds);

        let marker = if before == after { "•".dimmed() } else { "→".yellow() };
        println!(
            "  {} {} (seed {}): {} {} {}",
            marker,
            path.display(),
            summary.seed,
            super::basin_label(before),
            "→".dimmed(),
            super::basin_label(after)
        );

        if before != after {
            changed += 1;
        }
        if write {
            summary.relabel(thresholds);
            summary
                .save(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }

    println!();
    println!(
        "{} {} of {} runs changed basin",
        "✓".green().bold(),
        changed.to_string().cyan(),
        paths.len()
    );
    if changed > 0 && !write {
        println!("  Re-run with {} to store the new labels.", "--write".cyan());
    }

    Ok(())
}
