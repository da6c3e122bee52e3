//! Isolation Forest
//!
//! Anomalies are isolated by fewer random axis-aligned splits than normal
//! points. Each tree is grown on a random sub-sample; the expected isolation
//! depth across trees, normalised by `c(max_samples)`, gives the score.

use crate::ScorerError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees
    pub n_estimators: usize,
    /// Rows drawn per tree; `None` means `min(256, n_rows)`
    pub max_samples: Option<usize>,
    /// Expected share of outliers in the training data
    pub contamination: f64,
    /// Draw each tree's sample with replacement
    pub bootstrap: bool,
    /// RNG seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: None,
            contamination: 0.03,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<(), ScorerError> {
        if self.n_estimators == 0 {
            return Err(ScorerError::InvalidConfig(
                "n_estimators must be positive".to_string(),
            ));
        }
        if self.max_samples == Some(0) {
            return Err(ScorerError::InvalidConfig(
                "max_samples must be positive".to_string(),
            ));
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(ScorerError::InvalidConfig(format!(
                "contamination must be within (0, 0.5], got {}",
                self.contamination
            )));
        }
        Ok(())
    }
}

/// Average path length of an unsuccessful BST search over `n` points
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn grow(rows: &[Vec<f64>], sample: Vec<usize>, height_limit: usize, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow_node(rows, sample, 0, height_limit, rng);
        tree
    }

    fn grow_node(
        &mut self,
        rows: &[Vec<f64>],
        sample: Vec<usize>,
        depth: usize,
        height_limit: usize,
        rng: &mut StdRng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: sample.len() });

        if depth >= height_limit || sample.len() <= 1 {
            return id;
        }

        let dim = rows[sample[0]].len();
        let mut features: Vec<usize> = (0..dim).collect();
        features.shuffle(rng);

        for feature in features {
            let (min, max) = sample.iter().fold((f64::MAX, f64::MIN), |(lo, hi), &i| {
                let v = rows[i][feature];
                (lo.min(v), hi.max(v))
            });
            if min >= max {
                continue;
            }

            let threshold = rng.random_range(min..max);
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
                sample.iter().partition(|&&i| rows[i][feature] < threshold);

            let left = self.grow_node(rows, left_rows, depth + 1, height_limit, rng);
            let right = self.grow_node(rows, right_rows, depth + 1, height_limit, rng);
            self.nodes[id] = Node::Split {
                feature,
                threshold,
                left,
                right,
            };
            return id;
        }

        // Every feature is constant over this sample
        id
    }

    fn path_length(&self, row: &[f64]) -> f64 {
        let mut node = 0;
        let mut depth = 0.0;
        loop {
            match &self.nodes[node] {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] < *threshold { *left } else { *right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Fitted isolation forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForest {
    config: ForestConfig,
    trees: Vec<IsolationTree>,
    dimension: usize,
    max_samples: usize,
    offset: f64,
}

impl IsolationForest {
    /// Fit a forest on equal-length rows
    pub fn fit(config: ForestConfig, rows: &[Vec<f64>]) -> Result<Self, ScorerError> {
        config.validate()?;

        let n = rows.len();
        if n == 0 {
            return Err(ScorerError::InsufficientData(
                "cannot fit on zero rows".to_string(),
            ));
        }
        let dimension = rows[0].len();
        if let Some(bad) = rows.iter().find(|r| r.len() != dimension) {
            return Err(ScorerError::InvalidInputShape {
                expected: dimension,
                actual: bad.len(),
            });
        }

        let max_samples = config.max_samples.map_or(n.min(256), |m| m.min(n));
        let height_limit = (max_samples as f64).log2().ceil() as usize;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut trees = Vec::with_capacity(config.n_estimators);
        for _ in 0..config.n_estimators {
            let sample: Vec<usize> = if config.bootstrap {
                (0..max_samples).map(|_| rng.random_range(0..n)).collect()
            } else {
                rand::seq::index::sample(&mut rng, n, max_samples).into_vec()
            };
            trees.push(IsolationTree::grow(rows, sample, height_limit, &mut rng));
        }

        let mut forest = Self {
            config,
            trees,
            dimension,
            max_samples,
            offset: 0.0,
        };

        let scores: Vec<f64> = rows.iter().map(|r| forest.raw_score(r)).collect();
        forest.offset = percentile(&scores, 100.0 * forest.config.contamination);
        Ok(forest)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Threshold on `score_sample` separating inliers from outliers
    pub fn offset(&self) -> f64 {
        self.offset
    }

    fn raw_score(&self, row: &[f64]) -> f64 {
        let mean_depth = self.trees.iter().map(|t| t.path_length(row)).sum::<f64>()
            / self.trees.len() as f64;
        let norm = average_path_length(self.max_samples).max(f64::EPSILON);
        -(2f64.powf(-mean_depth / norm))
    }

    fn check_shape(&self, row: &[f64]) -> Result<(), ScorerError> {
        if row.len() != self.dimension {
            return Err(ScorerError::InvalidInputShape {
                expected: self.dimension,
                actual: row.len(),
            });
        }
        Ok(())
    }

    /// Opposite of the anomaly score: lower is more abnormal, in `[-1, 0)`
    pub fn score_sample(&self, row: &[f64]) -> Result<f64, ScorerError> {
        self.check_shape(row)?;
        Ok(self.raw_score(row))
    }

    /// Score shifted by the contamination offset; negative means outlier
    pub fn decision_function(&self, row: &[f64]) -> Result<f64, ScorerError> {
        Ok(self.score_sample(row)? - self.offset)
    }

    /// Native prediction: `-1` for outliers, `1` for inliers
    pub fn predict(&self, row: &[f64]) -> Result<i8, ScorerError> {
        Ok(if self.decision_function(row)? < 0.0 { -1 } else { 1 })
    }
}

/// Linear-interpolated percentile, `q` in `[0, 100]`
fn percentile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
