//! Boosting with `linfa-trees`
//!
//! Each round fits a weighted `linfa-trees` decision tree that separates rows
//! whose gradient pushes the margin up from rows that push it down, weighted
//! by gradient magnitude. The tree's splits are copied into a
//! [`RegressionTree`] and every leaf gets a Newton step computed from the
//! rows that reach it, so the stored covers are the hessian sums TreeSHAP
//! expects.

use crate::classifier::{check_training_inputs, class_weights, sigmoid};
use crate::gbdt::{GradientBoostedTrees, GradientBoostingParams, RegressionTree, TreeNode};
use crate::InferenceError;
use linfa::traits::Fit;
use linfa::DatasetBase;
use linfa_trees::{DecisionTree, SplitQuality, TreeNode as LinfaNode};
use ndarray::{Array1, Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

impl GradientBoostedTrees {
    /// Fit on a row-major matrix and boolean failure labels
    pub fn fit(
        x: ArrayView2<'_, f64>,
        y: &[bool],
        params: &GradientBoostingParams,
    ) -> Result<Self, InferenceError> {
        params.validate()?;
        check_training_inputs(x, y)?;
        let (n_rows, n_features) = x.dim();

        let weights = class_weights(y, params.scale_pos_weight);
        let total_weight: f64 = weights.iter().sum();
        let positive_weight: f64 = y
            .iter()
            .zip(&weights)
            .filter(|(&label, _)| label)
            .map(|(_, w)| w)
            .sum();
        let prior = (positive_weight / total_weight).clamp(1e-6, 1.0 - 1e-6);
        let base_margin = (prior / (1.0 - prior)).ln();

        let row_count = ((n_rows as f64 * params.subsample).ceil() as usize).clamp(1, n_rows);
        let col_count =
            ((n_features as f64 * params.colsample_bytree).ceil() as usize).clamp(1, n_features);

        let mut rng = StdRng::seed_from_u64(params.random_state);
        let mut all_rows: Vec<usize> = (0..n_rows).collect();
        let mut all_features: Vec<usize> = (0..n_features).collect();
        let mut margins = vec![base_margin; n_rows];
        let mut grad = vec![0.0; n_rows];
        let mut hess = vec![0.0; n_rows];
        let mut trees = Vec::with_capacity(params.n_estimators);

        for round in 0..params.n_estimators {
            for i in 0..n_rows {
                let p = sigmoid(margins[i]);
                let target = if y[i] { 1.0 } else { 0.0 };
                grad[i] = weights[i] * (p - target);
                hess[i] = (weights[i] * p * (1.0 - p)).max(1e-16);
            }

            let rows = sample(&mut all_rows, row_count, &mut rng);
            let features = sample(&mut all_features, col_count, &mut rng);

            let round_data = Round {
                x,
                grad: &grad,
                hess: &hess,
                rows: &rows,
                features: &features,
                params,
            };
            let tree = round_data.fit_tree()?;

            for (i, margin) in margins.iter_mut().enumerate() {
                *margin += tree.predict(x.row(i));
            }
            if round % 50 == 0 {
                debug!("Boosting round {}: {} nodes", round, tree.nodes().len());
            }
            trees.push(tree);
        }

        info!(
            "Fitted {} trees on {} rows x {} features (base margin {:.4})",
            trees.len(),
            n_rows,
            n_features,
            base_margin
        );

        Ok(Self::from_trees(base_margin, trees, n_features, params.clone()))
    }
}

/// Sorted random subset of `pool`, or all of it
fn sample(pool: &mut [usize], count: usize, rng: &mut StdRng) -> Vec<usize> {
    if count < pool.len() {
        pool.shuffle(rng);
    }
    let mut picked = pool[..count].to_vec();
    picked.sort_unstable();
    picked
}

struct Round<'x, 'a> {
    x: ArrayView2<'x, f64>,
    grad: &'a [f64],
    hess: &'a [f64],
    rows: &'a [usize],
    features: &'a [usize],
    params: &'a GradientBoostingParams,
}

impl Round<'_, '_> {
    fn fit_tree(&self) -> Result<RegressionTree, InferenceError> {
        let records = Array2::from_shape_fn((self.rows.len(), self.features.len()), |(i, j)| {
            self.x[[self.rows[i], self.features[j]]]
        });
        let targets: Array1<usize> = self
            .rows
            .iter()
            .map(|&r| usize::from(self.grad[r] < 0.0))
            .collect();

        // Normalized so the mean weight is one and min_child_weight reads as a row count
        let magnitude: f64 = self.rows.iter().map(|&r| self.grad[r].abs()).sum();
        let scale = if magnitude > 0.0 {
            self.rows.len() as f64 / magnitude
        } else {
            1.0
        };
        let sample_weights: Array1<f32> = self
            .rows
            .iter()
            .map(|&r| (self.grad[r].abs() * scale) as f32)
            .collect();

        let dataset = DatasetBase::from(records)
            .with_targets(targets)
            .with_weights(sample_weights);
        let min_leaf = self.params.min_child_weight.max(1e-3) as f32;
        let fitted = DecisionTree::params()
            .split_quality(SplitQuality::Gini)
            .max_depth(Some(self.params.max_depth))
            .min_weight_leaf(min_leaf)
            .min_weight_split(2.0 * min_leaf)
            .fit(&dataset)
            .map_err(|err| InferenceError::FitFailed(err.to_string()))?;

        let mut nodes = Vec::new();
        self.convert(fitted.root_node(), &mut nodes);
        let mut tree = RegressionTree::from_nodes(nodes);
        self.assign_leaves(&mut tree);
        Ok(tree)
    }

    /// Copy the split structure; leaf values are filled in by `assign_leaves`
    fn convert(&self, node: &LinfaNode<f64, usize>, nodes: &mut Vec<TreeNode>) -> usize {
        let idx = nodes.len();
        nodes.push(TreeNode::Leaf {
            value: 0.0,
            cover: 0.0,
        });

        let children = node.children();
        let (Some(left), Some(right)) = (children[0], children[1]) else {
            return idx;
        };
        if node.is_leaf() {
            return idx;
        }

        let (column, threshold, _) = node.split();
        let left = self.convert(left, nodes);
        let right = self.convert(right, nodes);
        nodes[idx] = TreeNode::Split {
            feature: self.features[column],
            threshold,
            left,
            right,
            cover: 0.0,
        };
        idx
    }

    /// Newton step per leaf and hessian covers on every node
    fn assign_leaves(&self, tree: &mut RegressionTree) {
        let n_nodes = tree.nodes().len();
        let mut grad_sum = vec![0.0; n_nodes];
        let mut hess_sum = vec![0.0; n_nodes];

        for &r in self.rows {
            let row = self.x.row(r);
            let mut idx = 0;
            loop {
                grad_sum[idx] += self.grad[r];
                hess_sum[idx] += self.hess[r];
                match &tree.nodes()[idx] {
                    TreeNode::Leaf { .. } => break,
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                        ..
                    } => {
                        idx = if row[*feature] < *threshold { *left } else { *right };
                    }
                }
            }
        }

        let lambda = self.params.reg_lambda;
        let learning_rate = self.params.learning_rate;
        for (idx, node) in tree.nodes_mut().iter_mut().enumerate() {
            match node {
                TreeNode::Leaf { value, cover } => {
                    *value = -grad_sum[idx] / (hess_sum[idx] + lambda) * learning_rate;
                    *cover = hess_sum[idx];
                }
                TreeNode::Split { cover, .. } => *cover = hess_sum[idx],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Classifier;

    /// Deterministic grid over [0, 1)^3; failure when the first two features are both high
    fn dataset(n: usize) -> (Array2<f64>, Vec<bool>) {
        let mut flat = Vec::with_capacity(n * 3);
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let a = (i % 10) as f64 / 10.0;
            let b = ((i / 10) % 10) as f64 / 10.0;
            let c = ((i * 7) % 13) as f64 / 13.0;
            flat.extend_from_slice(&[a, b, c]);
            y.push(a >= 0.5 && b >= 0.3);
        }
        (Array2::from_shape_vec((n, 3), flat).unwrap(), y)
    }

    fn small_params() -> GradientBoostingParams {
        GradientBoostingParams {
            n_estimators: 40,
            max_depth: 3,
            learning_rate: 0.3,
            subsample: 0.8,
            colsample_bytree: 1.0,
            min_child_weight: 0.1,
            ..Default::default()
        }
    }

    #[test]
    fn test_learns_separable_rule() {
        let (x, y) = dataset(200);
        let model = GradientBoostedTrees::fit(x.view(), &y, &small_params()).unwrap();
        let proba = model.predict_proba(x.view()).unwrap();

        let correct = proba
            .iter()
            .zip(&y)
            .filter(|(p, &label)| (**p > 0.5) == label)
            .count();
        assert!(correct >= 190, "only {correct} of 200 rows classified correctly");
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = dataset(120);
        let a = GradientBoostedTrees::fit(x.view(), &y, &small_params()).unwrap();
        let b = GradientBoostedTrees::fit(x.view(), &y, &small_params()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_covers_are_consistent() {
        let (x, y) = dataset(150);
        let model = GradientBoostedTrees::fit(x.view(), &y, &small_params()).unwrap();

        for tree in model.trees() {
            for node in tree.nodes() {
                if let TreeNode::Split { left, right, cover, .. } = node {
                    let children = tree.nodes()[*left].cover() + tree.nodes()[*right].cover();
                    assert!((cover - children).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_attribution_sums_to_margin() {
        let (x, y) = dataset(150);
        let model = GradientBoostedTrees::fit(x.view(), &y, &small_params()).unwrap();

        for i in [0, 17, 55, 99, 149] {
            let row = x.row(i);
            let attribution = model.attribute(row).unwrap();
            assert!((attribution.margin() - model.margin(row)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_irrelevant_feature_gets_small_attribution() {
        let (x, y) = dataset(200);
        let model = GradientBoostedTrees::fit(x.view(), &y, &small_params()).unwrap();
        let contributions = model.attribute(x.row(95)).unwrap().contributions;
        assert!(contributions[0].abs() > contributions[2].abs());
    }

    #[test]
    fn test_column_sampling_maps_back_to_full_width() {
        let (x, y) = dataset(120);
        let params = GradientBoostingParams {
            colsample_bytree: 0.5,
            ..small_params()
        };
        let model = GradientBoostedTrees::fit(x.view(), &y, &params).unwrap();
        assert!(model.trees().iter().flat_map(|t| t.nodes()).all(|node| match node {
            TreeNode::Split { feature, .. } => *feature < 3,
            TreeNode::Leaf { .. } => true,
        }));
        assert_eq!(model.predict_proba(x.view()).unwrap().len(), 120);
    }

    #[test]
    fn test_rejects_single_class() {
        let (x, _) = dataset(20);
        let y = vec![false; 20];
        let err = GradientBoostedTrees::fit(x.view(), &y, &small_params()).unwrap_err();
        assert_eq!(err, InferenceError::SingleClass);
    }

    #[test]
    fn test_rejects_bad_params() {
        let (x, y) = dataset(20);
        let params = GradientBoostingParams {
            subsample: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            GradientBoostedTrees::fit(x.view(), &y, &params),
            Err(InferenceError::InvalidParams(_))
        ));
    }
}
