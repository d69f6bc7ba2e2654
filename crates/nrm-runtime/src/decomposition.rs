//! Decomposition Engine: over-energized agents burst into two shallower ones.
//!
//! Depth 0 agents never burst; they keep accumulating energy until some
//! other mechanism consumes them.

use crate::composition::target_population;
use crate::context::StepContext;
use crate::events::SwarmEvent;
use crate::population::Population;
use nrm_core::agent::Agent;
use nrm_core::config::SwarmConfig;
use nrm_core::pattern::{Pattern, PatternOrigin};
use nrm_core::similarity::wrap_phase;
use nrm_core::types::PopulationId;
use std::f64::consts::PI;
use tracing::trace;

/// Whether an agent bursts this cycle.
pub fn is_eligible(config: &SwarmConfig, agent: &Agent) -> bool {
    agent.depth >= config.min_burst_depth.max(1) && agent.energy > config.burst_threshold
}

/// Run decomposition over every population.
///
/// Children are placed after the pass, so they cannot burst again in the
/// cycle they were created.
pub fn decompose(populations: &mut [Population], ctx: &mut StepContext<'_>) {
    let n = populations.len();
    let mut products: Vec<(PopulationId, Agent)> = Vec::new();

    for population in populations.iter_mut() {
        let bursting: Vec<bool> = population
            .agents()
            .iter()
            .map(|a| is_eligible(ctx.config, a))
            .collect();
        if !bursting.contains(&true) {
            continue;
        }

        for parent in population.remove_flagged(&bursting) {
            let [left, right] = split(&parent, ctx);
            let to = target_population(ctx.config.placement, population.id, left.depth, n);

            ctx.memory.insert(Pattern::new(
                parent.energy,
                parent.signature(),
                PatternOrigin::Decomposition,
                ctx.tick,
            ));
            ctx.counters.decompositions += 1;
            ctx.counters.patterns_emitted += 1;

            trace!(parent = %parent.id, energy = parent.energy, depth = parent.depth, "burst");
            let from = population.id;
            let (children, child_energy) = ([left.id, right.id], [left.energy, right.energy]);
            ctx.record(|| SwarmEvent::Burst {
                parent: parent.id,
                children,
                from,
                to,
                parent_energy: parent.energy,
                child_energy,
            });

            products.push((to, left));
            products.push((to, right));
        }
    }

    for (to, agent) in products {
        populations[to.index()].admit(agent);
    }
}

/// Build the two children of a burst. The parent's private memory is dealt
/// out alternately, starting with the first child.
///
/// Each child's `decompositions` is `parent.decompositions + parent.compositions / 2`,
/// so lineage counters never decrease across a burst.
fn split(parent: &Agent, ctx: &mut StepContext<'_>) -> [Agent; 2] {
    let economy = ctx.config.energy();
    let (left_fraction, right_fraction) = ctx.config.split.fractions();
    let depth = parent.depth.saturating_sub(1);
    let lineage = parent.decompositions + parent.compositions / 2;

    let mut child = |fraction: f64, phase: f64| {
        let mut agent = Agent::new(
            ctx.ids.next_id(),
            parent.population,
            economy.clamp(parent.energy * fraction),
            wrap_phase(phase),
            ctx.tick,
        )
        .with_depth(depth);
        agent.compositions = parent.compositions;
        agent.decompositions = lineage;
        agent
    };
    let mut left = child(left_fraction, parent.phase);
    let mut right = child(right_fraction, parent.phase + PI);

    for (i, pattern) in parent.memory.iter().enumerate() {
        if i % 2 == 0 {
            left.memory.push(*pattern);
        } else {
            right.memory.push(*pattern);
        }
    }
    [left, right]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestBed;
    use nrm_core::config::{Placement, SplitPolicy};
    use nrm_core::similarity::PhaseSignature;
    use nrm_core::types::AgentId;

    fn config() -> SwarmConfig {
        SwarmConfig {
            burst_threshold: 40.0,
            ..SwarmConfig::single_population()
        }
    }

    fn population_of(agents: Vec<Agent>) -> Population {
        let mut pop = Population::new(PopulationId(0));
        for a in agents {
            pop.admit(a);
        }
        pop
    }

    #[test]
    fn burst_dissipates_energy() {
        let mut bed = TestBed::new(config());
        let parent = Agent::new(AgentId(0), PopulationId(0), 45.0, 0.5, 0).with_depth(1);
        let mut pops = vec![population_of(vec![parent])];
        decompose(&mut pops, &mut bed.ctx());

        assert_eq!(pops[0].len(), 2);
        let total: f64 = pops[0].agents().iter().map(|a| a.energy).sum();
        assert!(total < 45.0);
        assert!(pops[0].agents().iter().all(|a| a.depth == 0));
        assert_eq!(bed.counters.decompositions, 1);
        assert_eq!(bed.memory.entries()[0].magnitude, 45.0);
    }

    #[test]
    fn conserving_split_keeps_energy() {
        let mut bed = TestBed::new(SwarmConfig {
            split: SplitPolicy::Conserving,
            ..config()
        });
        let parent = Agent::new(AgentId(0), PopulationId(0), 60.0, 0.5, 0).with_depth(2);
        let mut pops = vec![population_of(vec![parent])];
        decompose(&mut pops, &mut bed.ctx());
        let total: f64 = pops[0].agents().iter().map(|a| a.energy).sum();
        assert!((total - 60.0).abs() < 1e-12);
        assert!(pops[0].agents().iter().all(|a| a.depth == 1));
    }

    #[test]
    fn depth_zero_never_bursts() {
        let mut bed = TestBed::new(config());
        let mut pops = vec![population_of(vec![Agent::new(
            AgentId(0),
            PopulationId(0),
            99.0,
            0.0,
            0,
        )])];
        decompose(&mut pops, &mut bed.ctx());
        assert_eq!(pops[0].len(), 1);
        assert_eq!(bed.counters.decompositions, 0);
    }

    #[test]
    fn threshold_is_strict() {
        let config = config();
        let at = Agent::new(AgentId(0), PopulationId(0), 40.0, 0.0, 0).with_depth(1);
        let above = Agent::new(AgentId(1), PopulationId(0), 40.5, 0.0, 0).with_depth(1);
        assert!(!is_eligible(&config, &at));
        assert!(is_eligible(&config, &above));
    }

    #[test]
    fn children_inherit_lineage_and_split_memory() {
        let mut bed = TestBed::new(config());
        let mut parent = Agent::new(AgentId(0), PopulationId(0), 50.0, 0.5, 0).with_depth(1);
        parent.compositions = 5;
        parent.decompositions = 1;
        for m in [1.0, 2.0, 3.0] {
            parent.memory.push(Pattern::new(
                m,
                PhaseSignature::new(0.0, 0.0, 1.0),
                PatternOrigin::Composition,
                0,
            ));
        }
        let mut pops = vec![population_of(vec![parent])];
        decompose(&mut pops, &mut bed.ctx());

        let children = pops[0].agents();
        assert!(children.iter().all(|c| c.compositions == 5));
        assert!(children.iter().all(|c| c.decompositions == 3));
        assert_eq!(children[0].memory.len(), 2);
        assert_eq!(children[1].memory.len(), 1);
        assert!((children[1].phase - (0.5 + PI)).abs() < 1e-12);
    }

    #[test]
    fn depth_level_placement_moves_children_down() {
        let mut bed = TestBed::new(SwarmConfig {
            num_populations: 3,
            placement: Placement::DepthLevel,
            ..config()
        });
        let mut deep = Population::new(PopulationId(2));
        deep.admit(Agent::new(AgentId(0), PopulationId(2), 70.0, 0.0, 0).with_depth(2));
        let mut pops = vec![
            Population::new(PopulationId(0)),
            Population::new(PopulationId(1)),
            deep,
        ];
        decompose(&mut pops, &mut bed.ctx());
        assert_eq!(pops[2].len(), 0);
        assert_eq!(pops[1].len(), 2);
    }
}
