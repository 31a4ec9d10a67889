//! Random-forest regressor: seeded bootstrap bagging over regression trees.

use crate::algorithms::Regressor;
use crate::algorithms::tree::DecisionTreeRegressor;
use crate::data::matrix::Matrix;
use crate::error::PipelineError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A fitted bagged ensemble of regression trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    trees: Vec<DecisionTreeRegressor>,
}

impl RandomForestRegressor {
    /// Fit `n_trees` trees, each on a bootstrap resample drawn from a
    /// deterministic per-tree seed, so identical seeds give identical
    /// forests.
    pub fn fit(
        x: &Matrix,
        y: &[f64],
        n_trees: usize,
        max_depth: usize,
        min_samples_split: usize,
        seed: u64,
    ) -> Result<Self, PipelineError> {
        if n_trees == 0 {
            return Err(PipelineError::training("forest needs at least one tree"));
        }
        let n = x.n_rows();
        if n == 0 || n != y.len() {
            return Err(PipelineError::training(format!(
                "feature matrix has {n} rows for {} targets",
                y.len()
            )));
        }

        let mut trees = Vec::with_capacity(n_trees);
        for t in 0..n_trees {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
            let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let sample_x = x.take_rows(&indices);
            let sample_y: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
            trees.push(DecisionTreeRegressor::fit(
                &sample_x,
                &sample_y,
                max_depth,
                min_samples_split,
            )?);
        }
        Ok(Self {
            n_trees,
            max_depth,
            min_samples_split,
            trees,
        })
    }
}

impl Regressor for RandomForestRegressor {
    fn predict_row(&self, features: &[f64]) -> f64 {
        self.trees
            .iter()
            .map(|t| t.predict_row(features))
            .sum::<f64>()
            / self.trees.len() as f64
    }
}
