//! K-means clustering implementation
//!
//! Lloyd iterations with a fixed budget, repeated over several seeded
//! restarts; the restart with the lowest objective is kept.

use crate::distance::{batch_nearest, l2_squared, nearest};
use crate::error::{Error, Result};
use crate::vectors::VectorSet;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// How the first set of centroids is chosen for each restart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitMethod {
    /// `k` distinct training vectors sampled uniformly
    #[serde(rename = "random")]
    Random,
    /// k-means++ seeding: sample proportional to squared distance
    #[serde(rename = "kmeans++")]
    PlusPlus,
}

/// Training parameters
#[derive(Debug, Clone)]
pub struct KMeansParams {
    pub k: usize,
    pub iterations: usize,
    pub restarts: usize,
    pub seed: Option<u64>,
    pub init: InitMethod,
    pub max_points_per_centroid: Option<usize>,
}

/// K-means clustering result
#[derive(Debug, Clone, PartialEq)]
pub struct KMeans {
    /// Cluster centroids, row-major `k x dimension`
    pub centroids: Vec<f32>,
    /// Number of clusters
    pub k: usize,
    /// Dimensionality
    pub dimension: usize,
    /// Sum of squared distances from training vectors to their nearest centroid
    pub objective: f64,
}

/// Assignment of vectors to clusters
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    /// Which cluster each vector belongs to (index)
    pub assignments: Vec<usize>,
    /// Squared distance from each vector to its assigned centroid
    pub distances: Vec<f32>,
}

impl ClusterAssignment {
    pub fn objective(&self) -> f64 {
        self.distances.iter().map(|&d| d as f64).sum()
    }
}

impl KMeans {
    /// Train on `vectors`, returning the best of `params.restarts` runs
    pub fn train(vectors: &VectorSet, params: &KMeansParams) -> Result<Self> {
        if params.k == 0 {
            return Err(Error::InvalidParameter("k must be positive".into()));
        }
        if params.restarts == 0 {
            return Err(Error::InvalidParameter("restarts must be at least 1".into()));
        }
        if params.k > vectors.len() {
            return Err(Error::InvalidParameter(format!(
                "cannot build {} clusters from {} vectors",
                params.k,
                vectors.len()
            )));
        }

        let mut master = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let subsample;
        let training = match params.max_points_per_centroid {
            Some(cap) if vectors.len() > params.k.saturating_mul(cap) => {
                let m = params.k * cap;
                warn!(
                    "clustering {} points to {} centroids: sampling {} points",
                    vectors.len(),
                    params.k,
                    m
                );
                let mut picked = index::sample(&mut master, vectors.len(), m).into_vec();
                picked.sort_unstable();
                subsample = vectors.select(&picked);
                &subsample
            }
            _ => vectors,
        };

        if training.len() < params.k * 39 {
            warn!(
                "clustering {} points to {} centroids: please provide at least {} training points",
                training.len(),
                params.k,
                params.k * 39
            );
        }

        let mut best: Option<Self> = None;
        for restart in 0..params.restarts {
            let mut rng = StdRng::seed_from_u64(master.gen());
            let run = Self::fit_once(training, params, &mut rng);
            info!(
                restart,
                objective = run.objective,
                "k-means restart finished"
            );
            if best.as_ref().map_or(true, |b| run.objective < b.objective) {
                best = Some(run);
            }
        }

        // restarts >= 1 was checked above
        best.ok_or_else(|| Error::InvalidParameter("no restart produced centroids".into()))
    }

    /// One restart: initialize, then run exactly `params.iterations` Lloyd steps
    fn fit_once(vectors: &VectorSet, params: &KMeansParams, rng: &mut StdRng) -> Self {
        let mut kmeans = match params.init {
            InitMethod::Random => Self::init_random(vectors, params.k, rng),
            InitMethod::PlusPlus => Self::init_plusplus(vectors, params.k, rng),
        };

        for iteration in 0..params.iterations {
            let assignment = kmeans.search(vectors);
            debug!(
                iteration,
                objective = assignment.objective(),
                "lloyd iteration"
            );
            kmeans.centroids = kmeans.update_centroids(vectors, &assignment, rng);
        }

        kmeans.objective = kmeans.search(vectors).objective();
        kmeans
    }

    /// Pick `k` distinct vectors uniformly at random
    pub fn init_random(vectors: &VectorSet, k: usize, rng: &mut StdRng) -> Self {
        let picked = index::sample(rng, vectors.len(), k).into_vec();
        Self {
            centroids: vectors.select(&picked).into_inner(),
            k,
            dimension: vectors.dimension(),
            objective: f64::INFINITY,
        }
    }

    /// Initialize k-means with k-means++ algorithm
    ///
    /// Selects initial centroids that are far apart from each other
    pub fn init_plusplus(vectors: &VectorSet, k: usize, rng: &mut StdRng) -> Self {
        let dimension = vectors.dimension();
        let mut centroids = Vec::with_capacity(k * dimension);

        // 1. Choose first centroid randomly
        let first = rng.gen_range(0..vectors.len());
        centroids.extend_from_slice(vectors.get(first));

        // Squared distance from each vector to its nearest chosen centroid
        let mut min_dist: Vec<f32> = vectors
            .as_slice()
            .par_chunks_exact(dimension)
            .map(|v| l2_squared(v, &centroids))
            .collect();

        // 2. Each further centroid is sampled proportional to squared distance
        for _ in 1..k {
            let total: f64 = min_dist.iter().map(|&d| d as f64).sum();
            let chosen = if total > 0.0 {
                let mut target = rng.gen::<f64>() * total;
                let mut chosen = min_dist.len() - 1;
                for (i, &d) in min_dist.iter().enumerate() {
                    target -= d as f64;
                    if target <= 0.0 && d > 0.0 {
                        chosen = i;
                        break;
                    }
                }
                chosen
            } else {
                // Every vector coincides with a centroid already
                rng.gen_range(0..vectors.len())
            };

            let added = vectors.get(chosen);
            centroids.extend_from_slice(added);
            min_dist
                .par_iter_mut()
                .zip(vectors.as_slice().par_chunks_exact(dimension))
                .for_each(|(best, v)| {
                    let d = l2_squared(v, added);
                    if d < *best {
                        *best = d;
                    }
                });
        }

        Self {
            centroids,
            k,
            dimension,
            objective: f64::INFINITY,
        }
    }

    /// Assign vectors to nearest centroids
    pub fn search(&self, vectors: &VectorSet) -> ClusterAssignment {
        let (assignments, distances) =
            batch_nearest(vectors.as_slice(), &self.centroids, self.dimension);
        ClusterAssignment {
            assignments,
            distances,
        }
    }

    /// Recompute centroids as cluster means.
    ///
    /// Sums are accumulated sequentially in f64 so the result does not
    /// depend on the thread pool.
    fn update_centroids(
        &self,
        vectors: &VectorSet,
        assignment: &ClusterAssignment,
        rng: &mut StdRng,
    ) -> Vec<f32> {
        let mut sums = vec![0.0f64; self.k * self.dimension];
        let mut counts = vec![0usize; self.k];

        for (vector, &cluster_id) in vectors.iter().zip(assignment.assignments.iter()) {
            let row = &mut sums[cluster_id * self.dimension..(cluster_id + 1) * self.dimension];
            for (acc, &val) in row.iter_mut().zip(vector) {
                *acc += val as f64;
            }
            counts[cluster_id] += 1;
        }

        let mut new_centroids = vec![0.0f32; self.k * self.dimension];
        for (cluster_id, &count) in counts.iter().enumerate() {
            let out = &mut new_centroids[cluster_id * self.dimension..(cluster_id + 1) * self.dimension];
            if count > 0 {
                let row = &sums[cluster_id * self.dimension..(cluster_id + 1) * self.dimension];
                for (o, &s) in out.iter_mut().zip(row) {
                    *o = (s / count as f64) as f32;
                }
            } else {
                // Empty cluster: reseed with a random vector
                let random_idx = rng.gen_range(0..vectors.len());
                out.copy_from_slice(vectors.get(random_idx));
            }
        }

        new_centroids
    }

    /// Find the nearest centroid for a query vector
    pub fn nearest_centroid(&self, query: &[f32]) -> (usize, f32) {
        nearest(query, &self.centroids, self.dimension)
    }

    /// Centroid `idx` as a slice
    pub fn centroid(&self, idx: usize) -> &[f32] {
        &self.centroids[idx * self.dimension..(idx + 1) * self.dimension]
    }
}
