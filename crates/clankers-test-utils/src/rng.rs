//! Deterministic joint sampling for reproducible tests.

use clankers_kinematics::KinematicChain;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Create a deterministic `ChaCha8Rng` from a seed.
///
/// All test randomization should go through this to ensure reproducibility.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// A joint vector drawn uniformly within the chain's limits, shrunk by
/// `margin` on each side so finite-difference steps stay in range.
pub fn random_configuration(chain: &KinematicChain, rng: &mut impl Rng, margin: f64) -> Vec<f64> {
    chain
        .joints()
        .iter()
        .map(|joint| rng.gen_range(joint.lower_limit + margin..joint.upper_limit - margin))
        .collect()
}

/// `count` joint vectors from [`random_configuration`], seeded by `seed`.
pub fn random_configurations(chain: &KinematicChain, count: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = seeded_rng(seed);
    (0..count)
        .map(|_| random_configuration(chain, &mut rng, 0.05))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robots::six_dof_arm;

    #[test]
    fn seeded_rng_is_deterministic() {
        let mut rng1 = seeded_rng(42);
        let mut rng2 = seeded_rng(42);
        let v1: f64 = rng1.gen();
        let v2: f64 = rng2.gen();
        assert!((v1 - v2).abs() < f64::EPSILON);
    }

    #[test]
    fn configurations_respect_limits() {
        let chain = six_dof_arm();
        for q in random_configurations(&chain, 20, 7) {
            assert_eq!(q.len(), chain.dof());
            for (value, joint) in q.iter().zip(chain.joints()) {
                assert!(*value > joint.lower_limit && *value < joint.upper_limit);
            }
        }
    }

    #[test]
    fn configurations_are_reproducible() {
        let chain = six_dof_arm();
        assert_eq!(
            random_configurations(&chain, 3, 99),
            random_configurations(&chain, 3, 99)
        );
        assert_ne!(
            random_configurations(&chain, 3, 1),
            random_configurations(&chain, 3, 2)
        );
    }
}
