//! Stratified Train/Test Split

use crate::TrainingError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of each side, ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Hold out `round(n_class * test_size)` rows of each class
pub fn stratified_split(labels: &[bool], test_size: f64, seed: u64) -> Result<Split, TrainingError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TrainingError::InvalidConfig(format!(
            "test_size must lie in (0, 1), got {test_size}"
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for class in [false, true] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == class)
            .map(|(i, _)| i)
            .collect();
        members.shuffle(&mut rng);

        let n_test = (members.len() as f64 * test_size).round() as usize;
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(Split { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn labels(n: usize, every: usize) -> Vec<bool> {
        (0..n).map(|i| i % every == 0).collect()
    }

    #[test]
    fn test_class_proportions_preserved() {
        let y = labels(1000, 10);
        let split = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 200);
        assert_eq!(split.test.iter().filter(|&&i| y[i]).count(), 20);
        assert_eq!(split.train.iter().filter(|&&i| y[i]).count(), 80);
    }

    #[test]
    fn test_seeded_and_sorted() {
        let y = labels(300, 7);
        let a = stratified_split(&y, 0.25, 3).unwrap();
        let b = stratified_split(&y, 0.25, 3).unwrap();
        assert_eq!(a, b);
        assert!(a.test.windows(2).all(|w| w[0] < w[1]));
        assert_ne!(a, stratified_split(&y, 0.25, 4).unwrap());
    }

    #[test]
    fn test_rejects_degenerate_fraction() {
        assert!(stratified_split(&[true, false], 0.0, 1).is_err());
        assert!(stratified_split(&[true, false], 1.0, 1).is_err());
    }

    proptest! {
        #[test]
        fn split_is_a_partition(
            y in prop::collection::vec(any::<bool>(), 0..200),
            test_size in 0.05f64..0.95,
            seed in any::<u64>(),
        ) {
            let split = stratified_split(&y, test_size, seed).unwrap();
            let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
            all.sort_unstable();
            prop_assert_eq!(all, (0..y.len()).collect::<Vec<_>>());
        }
    }
}
