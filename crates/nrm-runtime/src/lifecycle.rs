//! Intra-population metabolism and spawning, the first phase of a step.
//!
//! For every agent, in population order: drift its phase, run the energy
//! economy (removing it if depleted), then draw one spawn trial. Offspring
//! join the population after the pass, so they do not metabolize or spawn
//! in the cycle they were born.

use crate::context::StepContext;
use crate::events::{CreationCause, RemovalCause, SwarmEvent};
use crate::population::Population;
use nrm_core::agent::Agent;
use nrm_core::energy::Metabolism;
use nrm_core::similarity::wrap_phase;
use rand::Rng;
use std::f64::consts::TAU;
use tracing::trace;

/// Run the metabolism and spawning phase over every population.
pub fn update_populations(populations: &mut [Population], ctx: &mut StepContext<'_>) {
    for population in populations.iter_mut() {
        update_population(population, ctx);
    }
}

/// Run the metabolism and spawning phase over one population.
pub fn update_population(population: &mut Population, ctx: &mut StepContext<'_>) {
    if population.is_empty() {
        return;
    }

    let economy = ctx.config.energy();
    let drift = ctx.config.phase_drift;
    let spawn_rate = ctx.config.spawn_rate;
    let cap = ctx.config.agent_cap;

    let starting = population.agents.len();
    let mut deaths = 0usize;
    let mut survivors: Vec<Agent> = Vec::with_capacity(starting);
    let mut offspring: Vec<Agent> = Vec::new();

    for mut agent in population.agents.drain(..) {
        if drift > 0.0 {
            agent.phase = wrap_phase(agent.phase + ctx.rng.random_range(-drift..=drift));
        }

        match economy.metabolize(agent.energy, agent.depth) {
            Metabolism::Depleted => {
                deaths += 1;
                ctx.counters.deaths += 1;
                let (id, pop) = (agent.id, agent.population);
                ctx.record(|| SwarmEvent::Removed {
                    agent: id,
                    population: pop,
                    cause: RemovalCause::Depleted,
                });
                continue;
            }
            Metabolism::Alive(energy) => agent.energy = energy,
        }

        if spawn_rate > 0.0 && ctx.rng.random_bool(spawn_rate) {
            ctx.counters.spawn_attempts += 1;
            let projected = starting - deaths + offspring.len();
            let paid = if projected < cap {
                economy.pay_spawn(agent.energy)
            } else {
                None
            };
            match paid {
                Some(remaining) => {
                    agent.energy = remaining;
                    let child = Agent::new(
                        ctx.ids.next_id(),
                        agent.population,
                        economy.clamp(economy.spawn_cost),
                        ctx.rng.random_range(0.0..TAU),
                        ctx.tick,
                    );
                    ctx.counters.spawns += 1;
                    let (parent, child_id, pop, energy) =
                        (agent.id, child.id, child.population, child.energy);
                    ctx.record(|| SwarmEvent::Created {
                        agent: child_id,
                        population: pop,
                        energy,
                        cause: CreationCause::Spawn { parent },
                    });
                    offspring.push(child);
                }
                None => {
                    ctx.counters.failed_spawns += 1;
                    trace!(agent = %agent.id, energy = agent.energy, "spawn failed");
                }
            }
        }

        survivors.push(agent);
    }

    survivors.extend(offspring);
    population.agents = survivors;
}
