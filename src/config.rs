//! Pipeline configuration
//!
//! Every stage takes a `PipelineConfig`. Defaults reproduce the SIFT-10M
//! job: 10K centroids over the first 100,000,010 128-d vectors, 50
//! iterations, 3 restarts, seed 354.

use crate::clustering::InitMethod;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Input and output locations shared by the three stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Raw `.bvecs` dataset
    pub dataset: PathBuf,
    /// Centroid array written by the clustering stage
    pub centroids_npy: PathBuf,
    /// Assignment array written by the clustering stage
    pub assignments_npy: PathBuf,
    /// Centroids as `.fvecs`
    pub centroids_vecs: PathBuf,
    /// Assignments as `.ivecs`
    pub assignments_vecs: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("./data/sift10m_base.bvecs"),
            centroids_npy: PathBuf::from("./data/centroids_10k_sift10m.npy"),
            assignments_npy: PathBuf::from("./data/clusters_10k_sift10m.npy"),
            centroids_vecs: PathBuf::from("./data/centroids_10k_sift10m.fvecs"),
            assignments_vecs: PathBuf::from("./data/clusters_10k_sift10m.ivecs"),
        }
    }
}

/// K-means hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClusteringConfig {
    /// Expected element count of every dataset record
    pub dimension: usize,
    /// Number of centroids (C)
    pub num_clusters: usize,
    /// Use only the first N records of the dataset
    #[serde(default)]
    pub max_vectors: Option<usize>,
    /// Lloyd iterations per restart
    pub iterations: usize,
    /// Independent restarts; the lowest objective wins
    pub restarts: usize,
    /// RNG seed. `None` seeds from entropy and runs are not reproducible.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Centroid initialization
    pub init: InitMethod,
    /// Cap on training points per centroid; larger datasets are subsampled
    #[serde(default)]
    pub max_points_per_centroid: Option<usize>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            dimension: 128,
            num_clusters: 10_000,
            max_vectors: Some(100_000_010),
            iterations: 50,
            restarts: 3,
            seed: Some(354),
            init: InitMethod::Random,
            max_points_per_centroid: Some(256),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub clustering: ClusteringConfig,
}

impl PipelineConfig {
    /// Load a TOML config file.
    ///
    /// Missing keys take their default, except the optional `max_vectors`,
    /// `seed` and `max_points_per_centroid`, which are off when omitted.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.clustering;
        if c.dimension == 0 {
            return Err(Error::Config("dimension must be positive".into()));
        }
        if c.num_clusters == 0 {
            return Err(Error::Config("num_clusters must be positive".into()));
        }
        if c.restarts == 0 {
            return Err(Error::Config("restarts must be at least 1".into()));
        }
        if c.max_vectors == Some(0) {
            return Err(Error::Config("max_vectors must be positive".into()));
        }
        if c.max_points_per_centroid == Some(0) {
            return Err(Error::Config(
                "max_points_per_centroid must be positive".into(),
            ));
        }
        Ok(())
    }
}
