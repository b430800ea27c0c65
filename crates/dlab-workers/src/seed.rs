//! Deterministic per-worker PRNG seeding.
//!
//! Every worker derives its own RNG from a stable hash of an identifier — its own
//! name, or the worker count for the Banker scenario's claim matrix — rather than
//! touching any process-wide mutable random state.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Builds a reproducible RNG from any hashable seed source.
pub fn rng_from(seed_source: impl Hash) -> StdRng {
    let mut hasher = DefaultHasher::new();
    seed_source.hash(&mut hasher);
    StdRng::seed_from_u64(hasher.finish())
}
