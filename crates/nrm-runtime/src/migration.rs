//! Migration Module: agents move between sibling populations.
//!
//! The number of attempts per cycle is `floor(total * rate)` plus one more
//! with probability equal to the dropped fraction, so the realized rate is
//! unbiased over many cycles. Migration only moves agents; it never creates
//! or destroys them.

use crate::context::StepContext;
use crate::events::SwarmEvent;
use crate::population::Population;
use nrm_core::types::PopulationId;
use rand::Rng;
use tracing::trace;

/// Number of attempts this cycle for `total` agents.
pub fn attempts(total: usize, rate: f64, rng: &mut impl Rng) -> usize {
    if rate <= 0.0 || total == 0 {
        return 0;
    }
    let expected = total as f64 * rate;
    let whole = expected.floor();
    let fraction = expected - whole;
    let extra = fraction > 0.0 && rng.random_bool(fraction.min(1.0));
    whole as usize + usize::from(extra)
}

/// Run the migration phase.
pub fn migrate(populations: &mut [Population], ctx: &mut StepContext<'_>) {
    let n = populations.len();
    let rate = ctx.config.migration_rate;
    if n < 2 || rate <= 0.0 {
        return;
    }

    let total: usize = populations.iter().map(Population::len).sum();
    let economy = ctx.config.energy();

    for _ in 0..attempts(total, rate, &mut *ctx.rng) {
        let sources: Vec<usize> = populations
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_empty() && p.total_energy() >= ctx.config.migrate_threshold)
            .map(|(i, _)| i)
            .collect();
        if sources.is_empty() {
            ctx.counters.failed_migrations += 1;
            continue;
        }

        let src = sources[ctx.rng.random_range(0..sources.len())];
        let idx = ctx.rng.random_range(0..populations[src].len());
        let drawn = ctx.rng.random_range(0..n - 1);
        let dst = if drawn >= src { drawn + 1 } else { drawn };

        let Some(remaining) = economy.pay_migration(populations[src].agents()[idx].energy) else {
            ctx.counters.failed_migrations += 1;
            continue;
        };

        let mut agent = populations[src].remove_at(idx);
        agent.energy = remaining;
        let id = agent.id;
        populations[dst].admit(agent);
        ctx.counters.migrations += 1;

        let (from, to) = (PopulationId(src), PopulationId(dst));
        trace!(agent = %id, %from, %to, "migrated");
        ctx.record(|| SwarmEvent::Migrated { agent: id, from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{SwarmRng, TestBed};
    use nrm_core::agent::Agent;
    use nrm_core::config::SwarmConfig;
    use nrm_core::types::AgentId;
    use rand::SeedableRng;

    fn populations(counts: &[usize], energy: f64) -> Vec<Population> {
        let mut next = 0u64;
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let mut pop = Population::new(PopulationId(i));
                for _ in 0..count {
                    pop.admit(Agent::new(AgentId(next), PopulationId(i), energy, 0.0, 0));
                    next += 1;
                }
                pop
            })
            .collect()
    }

    fn config(rate: f64) -> SwarmConfig {
        SwarmConfig {
            num_populations: 3,
            migration_rate: rate,
            migration_cost: 1.0,
            migrate_threshold: 10.0,
            ..SwarmConfig::default()
        }
    }

    #[test]
    fn attempts_are_unbiased_in_expectation() {
        let mut rng = SwarmRng::seed_from_u64(7);
        let total: usize = (0..10_000).map(|_| attempts(10, 0.25, &mut rng)).sum();
        // expectation is 2.5 per cycle
        let mean = total as f64 / 10_000.0;
        assert!((mean - 2.5).abs() < 0.05, "mean {mean}");
        assert_eq!(attempts(0, 0.5, &mut rng), 0);
        assert_eq!(attempts(40, 0.0, &mut rng), 0);
        assert_eq!(attempts(40, 0.5, &mut rng), 20);
    }

    #[test]
    fn migration_conserves_agents() {
        let mut bed = TestBed::new(config(0.5));
        let mut pops = populations(&[10, 5, 0], 20.0);
        migrate(&mut pops, &mut bed.ctx());

        let total: usize = pops.iter().map(Population::len).sum();
        assert_eq!(total, 15);
        assert!(bed.counters.migrations > 0);
        for pop in &pops {
            assert!(pop.agents().iter().all(|a| a.population == pop.id));
        }
    }

    #[test]
    fn migrant_pays_cost() {
        let mut bed = TestBed::new(config(1.0));
        let mut pops = populations(&[1, 0, 0], 20.0);
        pops[0].agents[0].energy = 15.0;
        // one attempt: the only agent moves
        migrate(&mut pops, &mut bed.ctx());
        let moved: Vec<&Agent> = pops.iter().flat_map(|p| p.agents()).collect();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].energy, 14.0);
        assert_ne!(moved[0].population, PopulationId(0));
        assert_eq!(bed.counters.migrations, 1);
    }

    #[test]
    fn single_population_is_noop() {
        let mut bed = TestBed::new(SwarmConfig {
            migration_rate: 1.0,
            ..SwarmConfig::single_population()
        });
        let mut pops = populations(&[5], 20.0);
        migrate(&mut pops, &mut bed.ctx());
        assert_eq!(pops[0].len(), 5);
        assert_eq!(bed.counters, Default::default());
    }

    #[test]
    fn poor_populations_are_not_sources() {
        let mut bed = TestBed::new(config(1.0));
        // total energy 4.0 per population, below the threshold
        let mut pops = populations(&[2, 2, 0], 2.0);
        migrate(&mut pops, &mut bed.ctx());
        assert_eq!(pops[0].len(), 2);
        assert_eq!(pops[1].len(), 2);
        assert_eq!(bed.counters.migrations, 0);
        assert_eq!(bed.counters.failed_migrations, 4);
    }
}
