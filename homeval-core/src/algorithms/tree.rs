//! Decision-tree regressor with variance-reduction splits.

use crate::algorithms::Regressor;
use crate::data::matrix::Matrix;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// A fitted regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    pub max_depth: usize,
    pub min_samples_split: usize,
    root: TreeNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl DecisionTreeRegressor {
    pub fn fit(
        x: &Matrix,
        y: &[f64],
        max_depth: usize,
        min_samples_split: usize,
    ) -> Result<Self, PipelineError> {
        if x.n_rows() == 0 || x.n_rows() != y.len() {
            return Err(PipelineError::training(format!(
                "feature matrix has {} rows for {} targets",
                x.n_rows(),
                y.len()
            )));
        }
        let indices: Vec<usize> = (0..x.n_rows()).collect();
        let root = build_node(x, y, &indices, 0, max_depth, min_samples_split.max(2));
        Ok(Self {
            max_depth,
            min_samples_split,
            root,
        })
    }
}

impl Regressor for DecisionTreeRegressor {
    fn predict_row(&self, features: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features.get(*feature).copied().unwrap_or(0.0) <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn build_node(
    x: &Matrix,
    y: &[f64],
    indices: &[usize],
    depth: usize,
    max_depth: usize,
    min_samples_split: usize,
) -> TreeNode {
    let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;
    if depth >= max_depth || indices.len() < min_samples_split {
        return TreeNode::Leaf { value: mean };
    }
    let Some((feature, threshold)) = best_split(x, y, indices) else {
        return TreeNode::Leaf { value: mean };
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| x.get(i, feature) <= threshold);
    if left_idx.is_empty() || right_idx.is_empty() {
        return TreeNode::Leaf { value: mean };
    }

    TreeNode::Split {
        feature,
        threshold,
        left: Box::new(build_node(
            x,
            y,
            &left_idx,
            depth + 1,
            max_depth,
            min_samples_split,
        )),
        right: Box::new(build_node(
            x,
            y,
            &right_idx,
            depth + 1,
            max_depth,
            min_samples_split,
        )),
    }
}

/// Exhaustive scan for the split minimizing total squared error. Candidate
/// thresholds are midpoints between consecutive distinct feature values.
fn best_split(x: &Matrix, y: &[f64], indices: &[usize]) -> Option<(usize, f64)> {
    let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let n = indices.len() as f64;
    let parent_sse = total_sq - total_sum * total_sum / n;

    let mut best: Option<(usize, f64, f64)> = None;
    for feature in 0..x.n_cols() {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| {
            x.get(a, feature)
                .partial_cmp(&x.get(b, feature))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for (k, &i) in order.iter().enumerate().take(order.len() - 1) {
            left_sum += y[i];
            left_sq += y[i] * y[i];
            let here = x.get(i, feature);
            let next = x.get(order[k + 1], feature);
            if here == next {
                continue;
            }
            let left_n = (k + 1) as f64;
            let right_n = n - left_n;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);
            let gain = parent_sse - sse;
            let threshold = (here + next) / 2.0;
            let improves = match best {
                Some((_, _, best_gain)) => gain > best_gain,
                None => gain > 1e-12,
            };
            if improves {
                best = Some((feature, threshold, gain));
            }
        }
    }
    best.map(|(feature, threshold, _)| (feature, threshold))
}
