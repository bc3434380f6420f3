use rand::SeedableRng;
use rand_isaac::Isaac64Rng;

/// The pseudo-random generator threaded through every randomized step.
pub type SeededRng = Isaac64Rng;

/// Mixes `seed` with a sequence of stream identifiers (a tree path, an iteration
/// number…) into a new seed.
///
/// This is the splitmix64 finalizer applied once per component, so distinct
/// paths yield decorrelated sub-streams regardless of the order in which they are
/// requested.
pub fn derive_seed(seed: u64, path: &[u64]) -> u64 {
    let mut state = seed;

    for component in path {
        state ^= component.wrapping_add(0x9e37_79b9_7f4a_7c15);
        state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        state = z ^ (z >> 31);
    }

    state
}

/// Creates the generator of the sub-stream identified by `path`.
pub fn seeded_rng(seed: u64, path: &[u64]) -> SeededRng {
    SeededRng::seed_from_u64(derive_seed(seed, path))
}
