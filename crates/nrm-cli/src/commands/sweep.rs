//! Run one experiment per seed.

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use nrm::prelude::*;
use std::collections::BTreeMap;

use crate::config::Config;

pub fn run(seeds: &[u64], cycles: Option<u64>) -> Result<()> {
    let config = Config::load()?;
    let base = config.experiment(cycles, None);
    let out_dir = config.run.output_dir.clone();
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    println!(
        "{} Sweeping {} seeds, {} cycles each...",
        "→".blue(),
        seeds.len().to_string().cyan(),
        base.cycles.to_string().cyan()
    );

    let pb = ProgressBar::new(seeds.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} runs")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    // Each seed gets its own swarm and run id; nothing is shared between runs.
    let mut records = Vec::with_capacity(seeds.len());
    for &seed in seeds {
        let record = Experiment::new(base.clone().with_seed(seed))
            .run()
            .with_context(|| format!("Run for seed {seed} failed"))?;
        super::run::write_record(&out_dir, &record)?;
        pb.inc(1);
        records.push(record);
    }
    pb.finish_and_clear();

    println!();
    println!(
        "  {:>8}  {:>8}  {:>10}  {:>7}  {:>9}  {}",
        "seed", "cycles", "mean pop", "CV %", "spawn ok", "basin"
    );
    let mut counts: BTreeMap<Basin, usize> = BTreeMap::new();
    for record in &records {
        let s = &record.summary;
        *counts.entry(s.basin).or_default() += 1;
        println!(
            "  {:>8}  {:>8}  {:>10.1}  {:>7.1}  {:>9.3}  {}",
            s.seed,
            s.cycles_run,
            s.statistics.mean_population,
            s.statistics.cv_percent,
            s.statistics.spawn_success,
            super::basin_label(s.basin)
        );
    }

    println!();
    println!("{} Sweep complete!", "✓".green().bold());
    for (basin, count) in counts {
        println!("  {}: {} runs", super::basin_label(basin), count);
    }
    println!("  {} {}", "Output:".dimmed(), out_dir.display());

    Ok(())
}
