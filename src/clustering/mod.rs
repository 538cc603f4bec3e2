//! Clustering algorithms
//!
//! Provides implementations of:
//! - K-means clustering with random or k-means++ initialization and
//!   best-of-N restarts

pub mod kmeans;

pub use kmeans::{ClusterAssignment, InitMethod, KMeans, KMeansParams};
