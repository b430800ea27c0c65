//! Process/resource plan generation for `dlab-cli`'s `simulate` subcommand.
//!
//! Ported from `fs_deadlock_sim/scenarios.py`: a deterministic
//! canonical demo scenario plus a seeded-random generator for arbitrary
//! process/resource counts. Seeded explicitly, rather than through any
//! shared global RNG, so a run is reproducible from its inputs alone.

use dlab_core::{Process, Resource};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn make_resources(count: usize) -> Vec<Resource> {
    (0..count).map(|i| Resource::new(format!("R{}", i + 1))).collect()
}

/// The canonical fixed scenario: `P1:[R1,R2]`, `P2:[R2,R1]`,
/// `P3:[R1]` over two resources. `naive` mode deadlocks on it; `ordered` doesn't.
pub fn demo_scenario() -> (Vec<Process>, Vec<Resource>) {
    let resources = make_resources(2);
    let processes = vec![
        Process::new("P1", vec!["R1".into(), "R2".into()]),
        Process::new("P2", vec!["R2".into(), "R1".into()]),
        Process::new("P3", vec!["R1".into()]),
    ];
    (processes, resources)
}

/// Builds `num_processes` processes over `num_resources` resources, each
/// process given a plan of `min(2, num_resources)` resources sampled without
/// replacement from a PRNG seeded on `seed`. Reproducible for a given
/// `(num_processes, num_resources, seed)` triple.
pub fn random_scenario(num_processes: usize, num_resources: usize, seed: u64) -> (Vec<Process>, Vec<Resource>) {
    let resources = make_resources(num_resources);
    let resource_ids: Vec<String> = resources.iter().map(|r| r.rid.clone()).collect();
    let mut rng = StdRng::seed_from_u64(seed);

    let need_count = if num_resources >= 2 { 2 } else { 1 };
    let processes = (0..num_processes)
        .map(|i| {
            let plan: Vec<String> = resource_ids
                .choose_multiple(&mut rng, need_count.min(resource_ids.len()))
                .cloned()
                .collect();
            Process::new(format!("P{}", i + 1), plan)
        })
        .collect();

    (processes, resources)
}
