//! Weighted and uniform selection primitives.

use super::random::RandomSource;

/// Picks an index with probability proportional to its weight.
///
/// A zero (or empty) weight table always yields `0`. If floating-point rounding
/// walks past the end of the table, the last index is returned.
pub fn weighted_choice(weights: &[u32], random: &dyn RandomSource) -> usize {
    let total: u64 = weights.iter().map(|w| u64::from(*w)).sum();

    if total == 0 {
        return 0;
    }

    let mut threshold = random.next_fraction() * total as f64;

    for (index, weight) in weights.iter().enumerate() {
        threshold -= f64::from(*weight);
        if threshold < 0.0 {
            return index;
        }
    }

    weights.len() - 1
}

/// Draws `count` items by distinct position, without replacement.
///
/// When `count` covers the whole slice, every item is returned in its original order.
pub fn pick_unique<'a, T>(items: &'a [T], count: usize, random: &dyn RandomSource) -> Vec<&'a T> {
    if count >= items.len() {
        return items.iter().collect();
    }

    let mut pool: Vec<usize> = (0..items.len()).collect();
    let mut picked = Vec::with_capacity(count);

    for _ in 0..count {
        let last = pool.len() - 1;
        let slot = random.range_inclusive(0, last).min(last);
        picked.push(&items[pool.remove(slot)]);
    }

    picked
}

/// Uniformly picks one string, or `None` if there is nothing to pick from.
pub fn random_from<'a>(items: &'a [String], random: &dyn RandomSource) -> Option<&'a str> {
    if items.is_empty() {
        return None;
    }

    items.get(random.range_inclusive(0, items.len() - 1)).map(String::as_str)
}
