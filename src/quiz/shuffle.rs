use rand::Rng;
use rand::seq::SliceRandom;

/// Returns a uniformly random permutation of `items`, leaving the input as is.
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_result_is_permutation() {
        let mut rng = StdRng::seed_from_u64(42);
        let items: Vec<u32> = (0..20).collect();

        let mut out = shuffled(&items, &mut rng);
        assert_eq!(out.len(), items.len());
        assert_eq!(items, (0..20).collect::<Vec<_>>());

        out.sort();
        assert_eq!(out, items);
    }

    #[test]
    fn test_trivial_inputs() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(shuffled::<u8, _>(&[], &mut rng).is_empty());
        assert_eq!(shuffled(&["only"], &mut rng), vec!["only"]);
    }

    #[test]
    fn test_every_ordering_reachable() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..600 {
            seen.insert(shuffled(&[1, 2, 3], &mut rng));
        }
        assert_eq!(seen.len(), 6);
    }
}
