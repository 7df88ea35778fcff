//! Resolution of configured labels into the exercise actually performed

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::state::Exercise;

/// Picks the exercise for a round as it starts.
pub trait LabelResolver: Send {
    /// Return the exercise to perform for `label`. Implementations must
    /// return `label` unchanged unless it is `Exercise::Random`, and must
    /// never return `Exercise::Random`.
    fn resolve(&mut self, label: Exercise) -> Exercise;
}

/// Uniform random choice over the concrete exercises
#[derive(Debug)]
pub struct RandomResolver {
    rng: StdRng,
}

impl RandomResolver {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic resolver for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelResolver for RandomResolver {
    fn resolve(&mut self, label: Exercise) -> Exercise {
        if !label.is_random() {
            return label;
        }
        Exercise::concrete()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Exercise::Plank)
    }
}

/// Always resolves `Random` to the same exercise
#[derive(Debug, Clone, Copy)]
pub struct FixedResolver(pub Exercise);

impl LabelResolver for FixedResolver {
    fn resolve(&mut self, label: Exercise) -> Exercise {
        match (label, self.0) {
            (Exercise::Random, Exercise::Random) => Exercise::Plank,
            (Exercise::Random, fixed) => fixed,
            (concrete, _) => concrete,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn concrete_labels_pass_through() {
        let mut resolver = RandomResolver::seeded(7);
        for label in Exercise::concrete() {
            assert_eq!(resolver.resolve(*label), *label);
        }
    }

    #[test]
    fn random_never_resolves_to_random_and_covers_the_set() {
        let mut resolver = RandomResolver::seeded(42);
        let seen: HashSet<_> = (0..1_000).map(|_| resolver.resolve(Exercise::Random)).collect();

        assert!(!seen.contains(&Exercise::Random));
        assert_eq!(seen.len(), Exercise::concrete().len());
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RandomResolver::seeded(3);
        let mut b = RandomResolver::seeded(3);
        for _ in 0..20 {
            assert_eq!(a.resolve(Exercise::Random), b.resolve(Exercise::Random));
        }
    }

    #[test]
    fn fixed_resolver_substitutes_only_random() {
        let mut resolver = FixedResolver(Exercise::Lunges);
        assert_eq!(resolver.resolve(Exercise::Random), Exercise::Lunges);
        assert_eq!(resolver.resolve(Exercise::Squats), Exercise::Squats);
        assert_eq!(FixedResolver(Exercise::Random).resolve(Exercise::Random), Exercise::Plank);
    }
}
