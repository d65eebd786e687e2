// ============================================================
// Layer 4 — Validation Splitter
// ============================================================
// Draws an unweighted random sample of the files as the
// validation subset; the remainder stays in training. The draw
// is intentionally unseeded: each repeat run of the blend
// pipeline measures a fresh split, and the distribution of
// best epochs across runs is part of the experiment's output.
//
// Validation size: floor(fraction × total), matching the sizing
// of the data this harness is compared against.

use rand::seq::SliceRandom;

/// Randomly partition `samples` into (train, validation).
///
/// `val_fraction` is the share held out, e.g. 0.2 = 20%.
/// The two returned sets are disjoint and together contain every
/// input sample exactly once.
pub fn split_validation<T>(mut samples: Vec<T>, val_fraction: f64) -> (Vec<T>, Vec<T>) {
    let mut rng = rand::thread_rng();

    // Fisher-Yates shuffle, then slice off the tail as validation.
    samples.shuffle(&mut rng);

    let total     = samples.len();
    let val_count = ((total as f64) * val_fraction) as usize;
    let val_count = val_count.min(total);

    let validation = samples.split_off(total - val_count);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        samples.len(),
        validation.len(),
    );

    (samples, validation)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_validation_size_is_floor_of_fraction() {
        let items: Vec<usize> = (0..103).collect();
        let (train, val) = split_validation(items, 0.2);
        // floor(103 * 0.2) = 20
        assert_eq!(val.len(), 20);
        assert_eq!(train.len(), 83);
    }

    #[test]
    fn test_split_is_a_partition() {
        let items: Vec<usize> = (0..50).collect();
        let (train, val) = split_validation(items, 0.2);

        let mut seen: HashSet<usize> = train.iter().copied().collect();
        for item in &val {
            // Disjoint: nothing from validation may already be in train.
            assert!(seen.insert(*item), "sample {item} appears in both subsets");
        }
        // Union covers the full set.
        assert_eq!(seen.len(), 50);
    }

    #[test]
    fn test_empty_input() {
        let (train, val) = split_validation(Vec::<usize>::new(), 0.2);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_zero_fraction_keeps_everything_in_train() {
        let items: Vec<usize> = (0..10).collect();
        let (train, val) = split_validation(items, 0.0);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }
}
