//! Random draws backing the two random ranking queries.
//!
//! Both sample without replacement. The RNG is injected so callers can seed.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::idea::Idea;

/// Up to `count` ideas, each equally likely.
pub fn sample_uniform(candidates: &[Idea], count: usize, rng: &mut impl Rng) -> Vec<Idea> {
    candidates.choose_multiple(rng, count).cloned().collect()
}

/// Up to `count` ideas drawn with probability proportional to score.
/// Unvoted ideas carry no weight and are never drawn.
pub fn sample_weighted(candidates: &[Idea], count: usize, rng: &mut impl Rng) -> Vec<Idea> {
    let voted: Vec<&Idea> = candidates.iter().filter(|i| i.score > 0).collect();
    let count = count.min(voted.len());
    match voted.choose_multiple_weighted(rng, count, |i| f64::from(i.score)) {
        Ok(picked) => picked.map(|i| (*i).clone()).collect(),
        // Weights are positive and finite, so this only trips on an empty pool.
        Err(_) => Vec::new(),
    }
}
