//! Composition Engine: resonant pairs merge into one deeper agent.
//!
//! Pairing is greedy: agents are visited in a (usually shuffled) order and a
//! pair commits as soon as its resonance reaches the threshold. There is no
//! search for an optimal matching, so the outcome depends on visiting order.
//! The matching rule is a [`PairingPolicy`] so another policy can replace it
//! without touching the merge itself.

use crate::context::StepContext;
use crate::events::SwarmEvent;
use crate::population::Population;
use nrm_core::agent::Agent;
use nrm_core::config::{PairingStrategy, Placement};
use nrm_core::pattern::{Pattern, PatternOrigin};
use nrm_core::similarity::{
    circular_mean, cosine_similarity, normalized_phase_distance_similarity,
    phase_distance_similarity, SimilarityMeasure,
};
use nrm_core::types::PopulationId;
use rand::seq::SliceRandom;
use tracing::trace;

/// A committed pair, as indices into the population's agent list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pairing {
    pub first: usize,
    pub second: usize,
    pub similarity: f64,
}

/// A rule for choosing which agents merge.
///
/// `order` is the visiting sequence of agent indices. `resonance` scores a
/// pair of indices. Returned pairings must be disjoint.
pub trait PairingPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn pair(
        &self,
        order: &[usize],
        resonance: &mut dyn FnMut(usize, usize) -> f64,
        threshold: f64,
    ) -> Vec<Pairing>;
}

/// Compare each unpaired agent with the next one in visiting order.
///
/// A failed comparison advances by one, so the candidate gets its own turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjacentPairing;

impl PairingPolicy for AdjacentPairing {
    fn name(&self) -> &'static str {
        "adjacent"
    }

    fn pair(
        &self,
        order: &[usize],
        resonance: &mut dyn FnMut(usize, usize) -> f64,
        threshold: f64,
    ) -> Vec<Pairing> {
        let mut pairs = Vec::new();
        let mut i = 0;
        while i + 1 < order.len() {
            let (first, second) = (order[i], order[i + 1]);
            let similarity = resonance(first, second);
            if similarity >= threshold {
                pairs.push(Pairing {
                    first,
                    second,
                    similarity,
                });
                i += 2;
            } else {
                i += 1;
            }
        }
        pairs
    }
}

/// Each unpaired agent scans forward for the first unpaired resonant partner.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatchPairing;

impl PairingPolicy for FirstMatchPairing {
    fn name(&self) -> &'static str {
        "first_match"
    }

    fn pair(
        &self,
        order: &[usize],
        resonance: &mut dyn FnMut(usize, usize) -> f64,
        threshold: f64,
    ) -> Vec<Pairing> {
        let mut pairs = Vec::new();
        let mut used = vec![false; order.len()];
        for i in 0..order.len() {
            if used[i] {
                continue;
            }
            for j in (i + 1)..order.len() {
                if used[j] {
                    continue;
                }
                let similarity = resonance(order[i], order[j]);
                if similarity >= threshold {
                    used[i] = true;
                    used[j] = true;
                    pairs.push(Pairing {
                        first: order[i],
                        second: order[j],
                        similarity,
                    });
                    break;
                }
            }
        }
        pairs
    }
}

/// The built-in policy for a configured strategy.
pub fn pairing_policy(strategy: PairingStrategy) -> Box<dyn PairingPolicy> {
    match strategy {
        PairingStrategy::Adjacent => Box::new(AdjacentPairing),
        PairingStrategy::FirstMatch => Box::new(FirstMatchPairing),
    }
}

/// Resonance between two agents under the given measure.
pub fn resonance(measure: SimilarityMeasure, a: &Agent, b: &Agent) -> f64 {
    match measure {
        SimilarityMeasure::Cosine => cosine_similarity(&a.signature(), &b.signature()),
        SimilarityMeasure::PhaseDistance => phase_distance_similarity(a.phase, b.phase),
        SimilarityMeasure::NormalizedPhaseDistance => {
            normalized_phase_distance_similarity(a.phase, b.phase)
        }
    }
}

/// Where a transformation product of the given depth lands.
pub(crate) fn target_population(
    placement: Placement,
    source: PopulationId,
    depth: u32,
    populations: usize,
) -> PopulationId {
    match placement {
        Placement::SamePopulation => source,
        Placement::DepthLevel => {
            PopulationId((depth as usize).min(populations.saturating_sub(1)))
        }
    }
}

/// Run composition over every population.
///
/// Merged agents are placed only after all populations have been paired, so
/// a product never merges again in the cycle it was created.
pub fn compose(populations: &mut [Population], policy: &dyn PairingPolicy, ctx: &mut StepContext<'_>) {
    let n = populations.len();
    let mut products: Vec<(PopulationId, Agent)> = Vec::new();

    for population in populations.iter_mut() {
        if population.len() < 2 {
            continue;
        }

        let mut order: Vec<usize> = (0..population.len()).collect();
        if ctx.config.shuffle_pairing {
            order.shuffle(&mut *ctx.rng);
        }

        let measure = ctx.config.similarity;
        let pairs = {
            let agents = population.agents();
            let mut score = |a: usize, b: usize| resonance(measure, &agents[a], &agents[b]);
            policy.pair(&order, &mut score, ctx.config.resonance_threshold)
        };
        if pairs.is_empty() {
            continue;
        }

        let mut consumed = vec![false; population.len()];
        for pairing in &pairs {
            consumed[pairing.first] = true;
            consumed[pairing.second] = true;

            let merged = merge(population, pairing, ctx);
            let to = target_population(ctx.config.placement, population.id, merged.depth, n);

            ctx.memory.insert(Pattern::new(
                merged.energy * pairing.similarity.max(0.0),
                merged.signature(),
                PatternOrigin::Composition,
                ctx.tick,
            ));
            ctx.counters.compositions += 1;
            ctx.counters.patterns_emitted += 1;

            let (first, second) = (
                population.agents[pairing.first].id,
                population.agents[pairing.second].id,
            );
            trace!(%first, %second, into = %merged.id, depth = merged.depth, "composed");
            let from = population.id;
            let (into, depth, energy, similarity) =
                (merged.id, merged.depth, merged.energy, pairing.similarity);
            ctx.record(|| SwarmEvent::Merged {
                first,
                second,
                into,
                from,
                to,
                depth,
                energy,
                similarity,
            });

            products.push((to, merged));
        }

        population.remove_flagged(&consumed);
    }

    for (to, agent) in products {
        populations[to.index()].admit(agent);
    }
}

/// Build the product of one pairing. The parents' private memories move into it.
fn merge(population: &mut Population, pairing: &Pairing, ctx: &mut StepContext<'_>) -> Agent {
    let economy = ctx.config.energy();
    let (a, b) = (&population.agents[pairing.first], &population.agents[pairing.second]);

    let energy = economy.clamp((a.energy + b.energy) * ctx.config.merge_factor);
    let mut merged = Agent::new(
        ctx.ids.next_id(),
        population.id,
        energy,
        circular_mean(a.phase, b.phase),
        ctx.tick,
    )
    .with_depth(a.depth.max(b.depth) + 1);
    merged.compositions = a.compositions.max(b.compositions) + 1;
    merged.decompositions = a.decompositions.max(b.decompositions);

    let mut memory = std::mem::take(&mut population.agents[pairing.first].memory);
    memory.append(&mut population.agents[pairing.second].memory);
    merged.memory = memory;
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestBed;
    use nrm_core::config::SwarmConfig;
    use nrm_core::similarity::PhaseSignature;
    use nrm_core::types::AgentId;
    use std::f64::consts::PI;

    fn config() -> SwarmConfig {
        SwarmConfig {
            similarity: SimilarityMeasure::PhaseDistance,
            resonance_threshold: 0.95,
            merge_factor: 0.9,
            shuffle_pairing: false,
            ..SwarmConfig::single_population()
        }
    }

    fn agent(id: u64, energy: f64, phase: f64) -> Agent {
        Agent::new(AgentId(id), PopulationId(0), energy, phase, 0)
    }

    fn population_of(id: usize, agents: Vec<Agent>) -> Population {
        let mut pop = Population::new(PopulationId(id));
        for a in agents {
            pop.admit(a);
        }
        pop
    }

    #[test]
    fn adjacent_and_first_match_differ_on_order() {
        // only (0,2) and (1,3) resonate
        let mut table = |a: usize, b: usize| match (a, b) {
            (0, 2) | (1, 3) => 1.0,
            _ => 0.0,
        };
        let order = [0, 1, 2, 3];
        assert!(AdjacentPairing.pair(&order, &mut table, 0.5).is_empty());

        let pairs = FirstMatchPairing.pair(&order, &mut table, 0.5);
        let found: Vec<(usize, usize)> = pairs.iter().map(|p| (p.first, p.second)).collect();
        assert_eq!(found, vec![(0, 2), (1, 3)]);
    }

    #[test]
    fn adjacent_failure_gives_candidate_a_turn() {
        let mut table = |a: usize, b: usize| if a == 0 || b == 0 { 0.0 } else { 1.0 };
        let pairs = AdjacentPairing.pair(&[0, 1, 2, 3], &mut table, 0.5);
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].first, pairs[0].second), (1, 2));
    }

    #[test]
    fn resonant_pairs_merge() {
        let mut bed = TestBed::new(config());
        let mut pops = vec![population_of(
            0,
            vec![agent(0, 40.0, 1.0), agent(1, 40.0, 1.0), agent(2, 30.0, 1.0), agent(3, 30.0, 1.0)],
        )];
        compose(&mut pops, &AdjacentPairing, &mut bed.ctx());

        assert_eq!(pops[0].len(), 2);
        assert_eq!(bed.counters.compositions, 2);
        assert_eq!(bed.memory.len(), 2);
        let merged = &pops[0].agents()[0];
        assert_eq!(merged.depth, 1);
        assert_eq!(merged.compositions, 1);
        assert!((merged.energy - 72.0).abs() < 1e-9);
        assert!((bed.memory.entries()[0].magnitude - 72.0).abs() < 1e-9);
    }

    #[test]
    fn merged_energy_is_capped() {
        let mut bed = TestBed::new(config());
        let mut pops = vec![population_of(0, vec![agent(0, 90.0, 2.0), agent(1, 90.0, 2.0)])];
        compose(&mut pops, &AdjacentPairing, &mut bed.ctx());
        assert_eq!(pops[0].agents()[0].energy, 100.0);
    }

    #[test]
    fn dissonant_agents_stay_apart() {
        let mut bed = TestBed::new(config());
        let mut pops = vec![population_of(0, vec![agent(0, 40.0, 0.0), agent(1, 40.0, PI)])];
        compose(&mut pops, &FirstMatchPairing, &mut bed.ctx());
        assert_eq!(pops[0].len(), 2);
        assert_eq!(bed.counters.compositions, 0);
        assert!(bed.memory.is_empty());
    }

    #[test]
    fn small_phase_gap_misses_tight_threshold() {
        // 1 - 0.1 = 0.9 < 0.95
        let mut bed = TestBed::new(config());
        let mut pops = vec![population_of(0, vec![agent(0, 40.0, 0.0), agent(1, 40.0, 0.1)])];
        compose(&mut pops, &AdjacentPairing, &mut bed.ctx());
        assert_eq!(pops[0].len(), 2);
        assert_eq!(bed.counters.compositions, 0);
    }

    #[test]
    fn normalized_measure_accepts_wider_band() {
        // 1 - 0.1/π ≈ 0.968 >= 0.95
        let mut bed = TestBed::new(SwarmConfig {
            similarity: SimilarityMeasure::NormalizedPhaseDistance,
            ..config()
        });
        let mut pops = vec![population_of(0, vec![agent(0, 40.0, 0.0), agent(1, 40.0, 0.1)])];
        compose(&mut pops, &AdjacentPairing, &mut bed.ctx());
        assert_eq!(pops[0].len(), 1);
        assert_eq!(bed.counters.compositions, 1);
    }

    #[test]
    fn depth_level_placement_moves_product_up() {
        let mut bed = TestBed::new(SwarmConfig {
            num_populations: 3,
            placement: Placement::DepthLevel,
            ..config()
        });
        let mut pops = vec![
            population_of(0, vec![agent(0, 20.0, 0.5), agent(1, 20.0, 0.5)]),
            Population::new(PopulationId(1)),
            Population::new(PopulationId(2)),
        ];
        compose(&mut pops, &AdjacentPairing, &mut bed.ctx());

        // two consumed in the source, one produced in the target
        assert_eq!(pops[0].len(), 0);
        assert_eq!(pops[1].len(), 1);
        assert_eq!(pops[1].agents()[0].population, PopulationId(1));
        match &bed.events[0].1 {
            SwarmEvent::Merged { from, to, .. } => {
                assert_eq!(*from, PopulationId(0));
                assert_eq!(*to, PopulationId(1));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn merge_inherits_lineage_and_memory() {
        let mut bed = TestBed::new(config());
        let mut a = agent(0, 40.0, 1.0).with_depth(2);
        a.compositions = 3;
        a.decompositions = 1;
        a.memory.push(Pattern::new(
            5.0,
            PhaseSignature::new(1.0, 0.0, 0.0),
            PatternOrigin::Decomposition,
            0,
        ));
        let mut b = agent(1, 40.0, 1.0).with_depth(1);
        b.compositions = 1;
        b.decompositions = 4;
        let mut pops = vec![population_of(0, vec![a, b])];
        compose(&mut pops, &FirstMatchPairing, &mut bed.ctx());

        let merged = &pops[0].agents()[0];
        assert_eq!(merged.depth, 3);
        assert_eq!(merged.compositions, 4);
        assert_eq!(merged.decompositions, 4);
        assert_eq!(merged.memory.len(), 1);
    }

    #[test]
    fn target_population_clamps_to_last_level() {
        assert_eq!(
            target_population(Placement::DepthLevel, PopulationId(0), 7, 3),
            PopulationId(2)
        );
        assert_eq!(
            target_population(Placement::SamePopulation, PopulationId(1), 7, 3),
            PopulationId(1)
        );
    }
}
