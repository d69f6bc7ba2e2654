//! CLI command implementations.

pub mod classify;
pub mod init;
pub mod run;
pub mod sweep;

use colored::Colorize;
use nrm::prelude::*;

/// Print the headline numbers of a finished run.
pub(crate) fn print_summary(summary: &RunSummary) {
    let termination = match summary.termination {
        Termination::Completed => "completed".green(),
        Termination::Extinct { cycle } => format!("extinct at cycle {cycle}").red(),
    };
    println!("  Run:         {}", summary.run_id.to_string().cyan());
    println!("  Seed:        {}", summary.seed);
    println!("  Cycles:      {} ({})", summary.cycles_run, termination);
    println!(
        "  Population:  {} (mean {:.1}, CV {:.1}%)",
        summary.final_population.to_string().cyan(),
        summary.statistics.mean_population,
        summary.statistics.cv_percent
    );
    println!(
        "  Energy:      {:.1} total, {:.2} per agent",
        summary.final_energy, summary.final_mean_energy
    );
    println!(
        "  Events:      {} compositions, {} decompositions, {} migrations",
        summary.totals.compositions, summary.totals.decompositions, summary.totals.migrations
    );
    println!(
        "  Spawning:    {}/{} succeeded",
        summary.totals.spawns, summary.totals.spawn_attempts
    );
    println!("  Basin:       {}", basin_label(summary.basin));
}

pub(crate) fn basin_label(basin: Basin) -> colored::ColoredString {
    match basin {
        Basin::A => "A".green().bold(),
        Basin::B => "B".yellow().bold(),
        Basin::C => "C".red().bold(),
    }
}
