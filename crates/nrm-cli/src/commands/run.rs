//! Run a single experiment.

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use nrm::prelude::*;
use std::path::Path;

use crate::config::Config;

/// Where swarm events go besides the run summary.
pub struct Sinks {
    pub events: bool,
    #[cfg(feature = "sqlite")]
    pub db: Option<std::path::PathBuf>,
}

pub fn run(cycles: Option<u64>, seed: Option<u64>, sinks: Sinks, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let experiment = config.experiment(cycles, seed);
    let out_dir = config.run.output_dir.clone();
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let run_id = RunId::new();
    let sample_every = experiment.sample_every.max(1);
    println!(
        "{} Running {} cycles across {} populations (seed {})...",
        "→".blue(),
        experiment.cycles.to_string().cyan(),
        experiment.swarm.num_populations.to_string().cyan(),
        experiment.swarm.seed.to_string().cyan()
    );

    let mut jsonl = if sinks.events {
        Some(JsonlEventLog::create(&out_dir, run_id)?)
    } else {
        None
    };
    #[cfg(feature = "sqlite")]
    let mut sqlite = match &sinks.db {
        Some(path) => {
            if jsonl.is_some() {
                anyhow::bail!("Choose either --events or --db, not both");
            }
            Some(SqliteEventLog::open(path)?)
        }
        None => None,
    };

    let pb = ProgressBar::new(experiment.cycles);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} cycles")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let mut observe = |summary: &CycleSummary| {
        if verbose && summary.cycle % sample_every == 0 {
            pb.println(format!(
                "  cycle {:>6}: {} agents, {:.1} energy, {} merges, {} bursts",
                summary.cycle,
                summary.population,
                summary.total_energy,
                summary.counters.compositions,
                summary.counters.decompositions
            ));
        }
        pb.inc(1);
    };

    let mut driver = Experiment::new(experiment)
        .with_run_id(run_id)
        .with_observer(&mut observe);
    if let Some(log) = jsonl.as_mut() {
        driver = driver.with_event_log(log);
    }
    #[cfg(feature = "sqlite")]
    if let Some(log) = sqlite.as_mut() {
        driver = driver.with_event_log(log);
    }
    let record = driver.run().context("Experiment failed")?;
    pb.finish_and_clear();

    let (summary_path, samples_path) = write_record(&out_dir, &record)?;

    println!();
    println!("{} Run complete!", "✓".green().bold());
    super::print_summary(&record.summary);
    println!();
    println!("  {} {}", "Summary:".dimmed(), summary_path.display());
    println!("  {} {}", "Samples:".dimmed(), samples_path.display());
    if let Some(log) = &jsonl {
        println!("  {} {}", "Events: ".dimmed(), log.path().display());
    }

    Ok(())
}

/// Write the summary and the sampled cycles of a run into `out_dir`.
pub(crate) fn write_record(
    out_dir: &Path,
    record: &RunRecord,
) -> Result<(std::path::PathBuf, std::path::PathBuf)> {
    let summary_path = out_dir.join(record.summary.file_name());
    record
        .summary
        .save(&summary_path)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;

    let samples_path = out_dir.join(format!("{}.samples.json", record.summary.run_id));
    let json = serde_json::to_string_pretty(&record.samples).context("Failed to serialize samples")?;
    std::fs::write(&samples_path, json)
        .with_context(|| format!("Failed to write {}", samples_path.display()))?;

    Ok((summary_path, samples_path))
}
