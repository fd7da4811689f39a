//! Scenario 5: simplifying at two different intervals during the same
//! simulation, run with the same seed, must agree on pairwise ancestry at
//! the end, regardless of how often the ARG was compacted along the way.

use arg_recorder::tables::TableCollection;
use arg_recorder::tsdef::{IdType, Position};
use arg_recorder::{ArgRecorder, NodeFlags};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::Uniform;

const POPSIZE: i32 = 5;
const NGENERATIONS: i32 = 20;
const SEED: u64 = 1234;

fn run_wf(simplify_interval: i32) -> (ArgRecorder, Vec<IdType>) {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut recorder = ArgRecorder::new(1.0).unwrap();

    let mut next_id: IdType = 0;
    let mut alive: Vec<IdType> = Vec::with_capacity(2 * POPSIZE as usize);
    for _ in 0..(2 * POPSIZE) {
        recorder
            .add_individual(next_id, 0.0, NodeFlags::IS_SAMPLE, -1)
            .unwrap();
        alive.push(next_id);
        next_id += 1;
    }

    let parent_picker = Uniform::new(0, POPSIZE as usize);

    for gen in 1..=NGENERATIONS {
        let mut offspring: Vec<IdType> = Vec::with_capacity(alive.len());
        for _ in 0..POPSIZE {
            let mother = rng.sample(parent_picker) * 2;
            let father = rng.sample(parent_picker) * 2;
            for parent_chromosomes in [
                [alive[mother], alive[mother + 1]],
                [alive[father], alive[father + 1]],
            ] {
                let child = next_id;
                next_id += 1;
                recorder
                    .add_individual(child, gen as f64, NodeFlags::IS_SAMPLE, -1)
                    .unwrap();
                recorder
                    .add_record(0.0, 1.0, parent_chromosomes[0], &[child])
                    .unwrap();
                offspring.push(child);
            }
        }
        alive = offspring;

        if gen % simplify_interval == 0 {
            recorder.simplify(&alive).unwrap();
            alive = (0..alive.len() as IdType).collect();
        }
    }

    (recorder, alive)
}

/// Walk up from `node` via the single edge whose interval covers
/// `position`, returning the chain from `node` to the root (inclusive).
fn ancestor_chain(tables: &TableCollection, node: IdType, position: Position) -> Vec<IdType> {
    let mut chain = vec![node];
    let mut current = node;
    loop {
        let parent = tables.edges().iter().find_map(|e| {
            if e.child == current && e.left <= position && position < e.right {
                Some(e.parent)
            } else {
                None
            }
        });
        match parent {
            Some(p) => {
                chain.push(p);
                current = p;
            }
            None => break,
        }
    }
    chain
}

fn mrca_at(tables: &TableCollection, a: IdType, b: IdType, position: Position) -> Option<IdType> {
    let chain_a = ancestor_chain(tables, a, position);
    let chain_b = ancestor_chain(tables, b, position);
    chain_a.into_iter().find(|x| chain_b.contains(x))
}

#[test]
fn test_scenario_5_periodic_simplify_equivalence() {
    let (recorder_frequent, samples_frequent) = run_wf(2);
    let (recorder_infrequent, samples_infrequent) = run_wf(NGENERATIONS);

    assert_eq!(samples_frequent.len(), samples_infrequent.len());

    let npositions = 20;
    for i in 0..npositions {
        let position = (i as f64 + 0.5) / npositions as f64;
        for a in 0..samples_frequent.len() {
            for b in (a + 1)..samples_frequent.len() {
                let mrca_frequent = mrca_at(
                    recorder_frequent.tables(),
                    samples_frequent[a],
                    samples_frequent[b],
                    position,
                );
                let mrca_infrequent = mrca_at(
                    recorder_infrequent.tables(),
                    samples_infrequent[a],
                    samples_infrequent[b],
                    position,
                );
                // Node IDs are not comparable across the two runs: each was
                // independently simplified and rebound to its own dense
                // numbering. Time is stable under that rebinding, so compare
                // the resolved ancestor's time rather than its raw ID.
                let time_frequent =
                    mrca_frequent.map(|m| recorder_frequent.tables().node(m).time);
                let time_infrequent =
                    mrca_infrequent.map(|m| recorder_infrequent.tables().node(m).time);
                assert_eq!(
                    time_frequent,
                    time_infrequent,
                    "mismatch at position {} for pair ({}, {})",
                    position,
                    a,
                    b
                );
            }
        }
    }
}
