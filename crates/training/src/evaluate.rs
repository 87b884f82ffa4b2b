//! Holdout Evaluation

use crate::settings::CostWeights;
use inference_engine::ModelMetrics;

/// Confusion matrix counts at a decision threshold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionCounts {
    pub fn at_threshold(labels: &[bool], probabilities: &[f64], threshold: f64) -> Self {
        let mut counts = Self::default();
        for (&label, &p) in labels.iter().zip(probabilities) {
            match (label, p >= threshold) {
                (true, true) => counts.true_positive += 1,
                (false, true) => counts.false_positive += 1,
                (false, false) => counts.true_negative += 1,
                (true, false) => counts.false_negative += 1,
            }
        }
        counts
    }
}

/// Indices of rows with a usable score
fn scored_rows(scores: &[f64]) -> Vec<usize> {
    (0..scores.len()).filter(|&i| !scores[i].is_nan()).collect()
}

/// Area under the ROC curve from the Mann-Whitney rank statistic
///
/// Tied scores share their average rank and NaN scores are ignored. A sample
/// lacking either class scores 0.5.
pub fn roc_auc(labels: &[bool], scores: &[f64]) -> f64 {
    let mut order = scored_rows(scores);
    let n_pos = order.iter().filter(|&&i| labels[i]).count();
    let n_neg = order.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // ranks are 1-based; the group spans ranks start+1 ..= end
        let average_rank = (start + 1 + end) as f64 / 2.0;
        let positives = order[start..end].iter().filter(|&&i| labels[i]).count();
        positive_rank_sum += average_rank * positives as f64;
        start = end;
    }

    let (p, n) = (n_pos as f64, n_neg as f64);
    (positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n)
}

/// Average precision: recall-weighted precision over distinct thresholds
///
/// NaN scores are ignored.
pub fn average_precision(labels: &[bool], scores: &[f64]) -> f64 {
    let mut order = scored_rows(scores);
    let n_pos = order.iter().filter(|&&i| labels[i]).count();
    if n_pos == 0 {
        return 0.0;
    }

    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let (mut tp, mut fp) = (0usize, 0usize);
    let mut previous_recall = 0.0;
    let mut ap = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        for &i in &order[start..end] {
            if labels[i] {
                tp += 1;
            } else {
                fp += 1;
            }
        }
        let recall = tp as f64 / n_pos as f64;
        let precision = tp as f64 / (tp + fp) as f64;
        ap += (recall - previous_recall) * precision;
        previous_recall = recall;
        start = end;
    }
    ap
}

/// F1 of hard predictions; 0 when precision and recall are both undefined
pub fn f1_score(counts: &ConfusionCounts) -> f64 {
    let denominator = 2 * counts.true_positive + counts.false_positive + counts.false_negative;
    if denominator == 0 {
        return 0.0;
    }
    2.0 * counts.true_positive as f64 / denominator as f64
}

/// Holdout metrics at a decision threshold
pub fn evaluate_binary(
    labels: &[bool],
    probabilities: &[f64],
    threshold: f64,
    cost: &CostWeights,
) -> ModelMetrics {
    let counts = ConfusionCounts::at_threshold(labels, probabilities, threshold);
    ModelMetrics {
        roc_auc: roc_auc(labels, probabilities),
        pr_auc: average_precision(labels, probabilities),
        f1: f1_score(&counts),
        expected_cost: cost.false_negative * counts.false_negative as f64
            + cost.false_positive * counts.false_positive as f64,
    }
}
