//! Gradient-Boosted Trees
//!
//! The fitted ensemble: regression trees whose nodes record their cover (sum
//! of training hessians) so a prediction can be attributed exactly with
//! path-dependent TreeSHAP. Fitting lives in the `boosting` module behind the
//! `gradient-boosting` feature; scoring and attribution are always available.

use crate::classifier::{check_width, sigmoid, Attribution, Classifier, ModelBackend};
use crate::InferenceError;
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Boosting hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientBoostingParams {
    /// Number of boosting rounds
    pub n_estimators: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Shrinkage applied to every leaf value
    pub learning_rate: f64,
    /// Fraction of rows sampled per tree
    pub subsample: f64,
    /// Fraction of features sampled per tree
    pub colsample_bytree: f64,
    /// L2 regularisation on leaf values
    pub reg_lambda: f64,
    /// Minimum (normalized) sample weight in each child
    pub min_child_weight: f64,
    /// Weight of positive samples relative to negatives
    pub scale_pos_weight: f64,
    /// Seed for row and column sampling
    pub random_state: u64,
}

impl Default for GradientBoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 300,
            max_depth: 5,
            learning_rate: 0.05,
            subsample: 0.9,
            colsample_bytree: 0.9,
            reg_lambda: 1.0,
            min_child_weight: 1.0,
            scale_pos_weight: 1.0,
            random_state: 42,
        }
    }
}

impl GradientBoostingParams {
    #[cfg_attr(not(feature = "gradient-boosting"), allow(dead_code))]
    pub(crate) fn validate(&self) -> Result<(), InferenceError> {
        let fraction = |v: f64| v > 0.0 && v <= 1.0;
        let problem = if self.n_estimators == 0 {
            Some("n_estimators must be positive")
        } else if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            Some("learning_rate must be positive")
        } else if !fraction(self.subsample) {
            Some("subsample must lie in (0, 1]")
        } else if !fraction(self.colsample_bytree) {
            Some("colsample_bytree must lie in (0, 1]")
        } else if !(self.reg_lambda >= 0.0) {
            Some("reg_lambda must be non-negative")
        } else if !(self.min_child_weight >= 0.0) {
            Some("min_child_weight must be non-negative")
        } else if !(self.scale_pos_weight > 0.0 && self.scale_pos_weight.is_finite()) {
            Some("scale_pos_weight must be positive")
        } else {
            None
        };
        match problem {
            Some(msg) => Err(InferenceError::InvalidParams(msg.to_string())),
            None => Ok(()),
        }
    }
}

/// Tree node; rows with `value < threshold` go left
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        cover: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        cover: f64,
    },
}

impl TreeNode {
    /// Sum of training hessians that reached this node
    pub fn cover(&self) -> f64 {
        match self {
            TreeNode::Leaf { cover, .. } | TreeNode::Split { cover, .. } => *cover,
        }
    }
}

/// A single regression tree; `nodes[0]` is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    #[cfg_attr(not(any(test, feature = "gradient-boosting")), allow(dead_code))]
    pub(crate) fn from_nodes(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    #[cfg_attr(not(feature = "gradient-boosting"), allow(dead_code))]
    pub(crate) fn nodes_mut(&mut self) -> &mut [TreeNode] {
        &mut self.nodes
    }

    /// Leaf value reached by a row
    pub fn predict(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value, .. } => return *value,
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

    /// Cover-weighted mean leaf value
    pub fn expected_value(&self) -> f64 {
        self.node_expectation(0)
    }

    fn node_expectation(&self, idx: usize) -> f64 {
        match &self.nodes[idx] {
            TreeNode::Leaf { value, .. } => *value,
            TreeNode::Split { left, right, .. } => {
                let (cl, cr) = (self.nodes[*left].cover(), self.nodes[*right].cover());
                let (el, er) = (self.node_expectation(*left), self.node_expectation(*right));
                if cl + cr > 0.0 {
                    (cl * el + cr * er) / (cl + cr)
                } else {
                    0.5 * (el + er)
                }
            }
        }
    }

    /// Add this tree's SHAP values for `row` into `phi`
    fn shap_into(&self, row: ArrayView1<'_, f64>, phi: &mut [f64]) {
        self.shap_recurse(0, row, phi, Vec::new(), 1.0, 1.0, ROOT_FEATURE);
    }

    #[allow(clippy::too_many_arguments)]
    fn shap_recurse(
        &self,
        idx: usize,
        row: ArrayView1<'_, f64>,
        phi: &mut [f64],
        mut path: Vec<PathElement>,
        zero_fraction: f64,
        one_fraction: f64,
        feature: usize,
    ) {
        extend_path(&mut path, zero_fraction, one_fraction, feature);

        match &self.nodes[idx] {
            TreeNode::Leaf { value, .. } => {
                for i in 1..path.len() {
                    let weight = unwound_sum(&path, i);
                    let el = path[i];
                    phi[el.feature] += weight * (el.one_fraction - el.zero_fraction) * value;
                }
            }
            TreeNode::Split {
                feature: split_feature,
                threshold,
                left,
                right,
                ..
            } => {
                let (hot, cold) = if row[*split_feature] < *threshold {
                    (*left, *right)
                } else {
                    (*right, *left)
                };

                let mut incoming_zero = 1.0;
                let mut incoming_one = 1.0;
                if let Some(k) = path
                    .iter()
                    .skip(1)
                    .position(|el| el.feature == *split_feature)
                    .map(|k| k + 1)
                {
                    incoming_zero = path[k].zero_fraction;
                    incoming_one = path[k].one_fraction;
                    unwind_path(&mut path, k);
                }

                let hot_cover = self.nodes[hot].cover();
                let cold_cover = self.nodes[cold].cover();
                let total = hot_cover + cold_cover;
                let (hot_share, cold_share) = if total > 0.0 {
                    (hot_cover / total, cold_cover / total)
                } else {
                    (0.5, 0.5)
                };

                self.shap_recurse(
                    hot,
                    row,
                    phi,
                    path.clone(),
                    incoming_zero * hot_share,
                    incoming_one,
                    *split_feature,
                );
                self.shap_recurse(
                    cold,
                    row,
                    phi,
                    path,
                    incoming_zero * cold_share,
                    0.0,
                    *split_feature,
                );
            }
        }
    }
}

/// Placeholder feature index for the root of a TreeSHAP path
const ROOT_FEATURE: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
struct PathElement {
    feature: usize,
    zero_fraction: f64,
    one_fraction: f64,
    weight: f64,
}

fn extend_path(path: &mut Vec<PathElement>, zero_fraction: f64, one_fraction: f64, feature: usize) {
    let l = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        weight: if l == 0 { 1.0 } else { 0.0 },
    });
    for i in (0..l).rev() {
        path[i + 1].weight += one_fraction * path[i].weight * (i + 1) as f64 / (l + 1) as f64;
        path[i].weight = zero_fraction * path[i].weight * (l - i) as f64 / (l + 1) as f64;
    }
}

fn unwind_path(path: &mut Vec<PathElement>, index: usize) {
    let l = path.len();
    let one = path[index].one_fraction;
    let zero = path[index].zero_fraction;
    let mut next = path[l - 1].weight;

    for j in (0..l - 1).rev() {
        if one != 0.0 {
            let tmp = path[j].weight;
            path[j].weight = next * l as f64 / ((j + 1) as f64 * one);
            next = tmp - path[j].weight * zero * (l - 1 - j) as f64 / l as f64;
        } else {
            path[j].weight = path[j].weight * l as f64 / (zero * (l - 1 - j) as f64);
        }
    }
    for j in index..l - 1 {
        path[j].feature = path[j + 1].feature;
        path[j].zero_fraction = path[j + 1].zero_fraction;
        path[j].one_fraction = path[j + 1].one_fraction;
    }
    path.truncate(l - 1);
}

fn unwound_sum(path: &[PathElement], index: usize) -> f64 {
    let mut unwound = path.to_vec();
    unwind_path(&mut unwound, index);
    unwound.iter().map(|el| el.weight).sum()
}

/// Fitted boosted ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    base_margin: f64,
    trees: Vec<RegressionTree>,
    n_features: usize,
    params: GradientBoostingParams,
}

impl GradientBoostedTrees {
    #[cfg_attr(not(any(test, feature = "gradient-boosting")), allow(dead_code))]
    pub(crate) fn from_trees(
        base_margin: f64,
        trees: Vec<RegressionTree>,
        n_features: usize,
        params: GradientBoostingParams,
    ) -> Self {
        Self {
            base_margin,
            trees,
            n_features,
            params,
        }
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn base_margin(&self) -> f64 {
        self.base_margin
    }

    pub fn params(&self) -> &GradientBoostingParams {
        &self.params
    }

    /// Raw log-odds for one row
    pub fn margin(&self, row: ArrayView1<'_, f64>) -> f64 {
        self.base_margin + self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
    }

    /// Expected margin under the training cover distribution
    pub fn expected_margin(&self) -> f64 {
        self.base_margin + self.trees.iter().map(RegressionTree::expected_value).sum::<f64>()
    }
}

impl Classifier for GradientBoostedTrees {
    fn backend(&self) -> ModelBackend {
        ModelBackend::GradientBoosting
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError> {
        check_width(self.n_features, rows.ncols())?;
        Ok(rows
            .rows()
            .into_iter()
            .map(|row| sigmoid(self.margin(row)))
            .collect())
    }

    fn supports_attribution(&self) -> bool {
        true
    }

    fn attribute(&self, row: ArrayView1<'_, f64>) -> Result<Attribution, InferenceError> {
        check_width(self.n_features, row.len())?;
        let mut phi = vec![0.0; self.n_features];
        for tree in &self.trees {
            tree.shap_into(row, &mut phi);
        }
        if phi.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::AttributionFailed(
                "non-finite tree contribution".into(),
            ));
        }
        Ok(Attribution {
            baseline: self.expected_margin(),
            contributions: phi,
        })
    }
}
