//! Vector clustering stage
//!
//! `.bvecs` dataset -> k-means -> centroid and assignment `.npy` arrays.

use crate::clustering::{ClusterAssignment, KMeans, KMeansParams};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::storage::{npy, BvecsFile};
use ndarray::Array2;
use std::time::Instant;
use tracing::info;

/// What a clustering run produced
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary {
    /// Vectors read from the dataset and assigned
    pub vectors: usize,
    pub dimension: usize,
    pub clusters: usize,
    /// Objective of the kept restart on its training set
    pub objective: f64,
}

pub fn run(config: &PipelineConfig) -> Result<ClusterSummary> {
    config.validate()?;
    let paths = &config.paths;
    let params = &config.clustering;

    info!("reading dataset {}", paths.dataset.display());
    let start = Instant::now();
    let file = BvecsFile::open(&paths.dataset, Some(params.dimension))?;
    info!(
        records = file.len(),
        dimension = file.dimension(),
        limit = ?params.max_vectors,
        "dataset mapped"
    );
    let vectors = file.to_vector_set(params.max_vectors)?;
    drop(file);
    info!("loaded {} vectors in {:?}", vectors.len(), start.elapsed());

    let kmeans_params = KMeansParams {
        k: params.num_clusters,
        iterations: params.iterations,
        restarts: params.restarts,
        seed: params.seed,
        init: params.init,
        max_points_per_centroid: params.max_points_per_centroid,
    };

    info!(
        k = kmeans_params.k,
        iterations = kmeans_params.iterations,
        restarts = kmeans_params.restarts,
        seed = ?kmeans_params.seed,
        "running k-means"
    );
    let start = Instant::now();
    let kmeans = KMeans::train(&vectors, &kmeans_params)?;
    info!(objective = kmeans.objective, "k-means done in {:?}", start.elapsed());

    info!("assigning all vectors to a cluster");
    let assignment = kmeans.search(&vectors);

    npy::save_centroids(&paths.centroids_npy, &centroids_array(&kmeans)?)?;
    info!("saved centroids to {}", paths.centroids_npy.display());
    npy::save_assignments(&paths.assignments_npy, &assignments_array(&assignment)?)?;
    info!("saved assignments to {}", paths.assignments_npy.display());

    Ok(ClusterSummary {
        vectors: vectors.len(),
        dimension: vectors.dimension(),
        clusters: kmeans.k,
        objective: kmeans.objective,
    })
}

/// Centroids as a `(k, dimension)` array
pub fn centroids_array(kmeans: &KMeans) -> Result<Array2<f32>> {
    Array2::from_shape_vec((kmeans.k, kmeans.dimension), kmeans.centroids.clone())
        .map_err(|e| Error::InvalidParameter(format!("centroid buffer: {}", e)))
}

/// Assignments as an `(n, 1)` array
pub fn assignments_array(assignment: &ClusterAssignment) -> Result<Array2<i64>> {
    let ids: Vec<i64> = assignment.assignments.iter().map(|&c| c as i64).collect();
    Array2::from_shape_vec((ids.len(), 1), ids)
        .map_err(|e| Error::InvalidParameter(format!("assignment buffer: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_shapes() {
        let kmeans = KMeans {
            centroids: vec![0.0, 0.5, 10.0, 0.5],
            k: 2,
            dimension: 2,
            objective: 1.0,
        };
        let centroids = centroids_array(&kmeans).unwrap();
        assert_eq!(centroids.shape(), &[2, 2]);
        assert_eq!(centroids[[1, 0]], 10.0);

        let assignment = ClusterAssignment {
            assignments: vec![1, 1, 0],
            distances: vec![0.0; 3],
        };
        let ids = assignments_array(&assignment).unwrap();
        assert_eq!(ids.shape(), &[3, 1]);
        assert_eq!(ids[[2, 0]], 0);
    }

    #[test]
    fn test_missing_dataset() {
        let mut config = PipelineConfig::default();
        config.paths.dataset = "/nonexistent/base.bvecs".into();
        assert!(matches!(run(&config), Err(Error::Io(_))));
    }
}
