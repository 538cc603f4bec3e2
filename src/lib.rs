//! vecclust - k-means centroids and assignments for large vector datasets
//!
//! Clusters a `.bvecs` byte-vector dataset with k-means and exports the
//! centroids (`.fvecs`) and per-vector cluster ids (`.ivecs`) for
//! approximate-nearest-neighbor tooling.

pub mod clustering;
pub mod config;
pub mod distance;
pub mod error;
pub mod pipeline;
pub mod storage;
pub mod vectors;

// Re-export commonly used types
pub use clustering::{ClusterAssignment, InitMethod, KMeans, KMeansParams};
pub use config::{ClusteringConfig, PathsConfig, PipelineConfig};
pub use error::{Error, Result};
pub use storage::{BvecsFile, VecsKind, VecsReader, VecsSummary, VecsWriter};
pub use vectors::VectorSet;
