//! The batch stages
//!
//! Each stage is a one-shot transformation from files to files, driven by a
//! `PipelineConfig`. Stages share nothing but the files they leave on disk.

pub mod assignments;
pub mod centroids;
pub mod cluster;
pub mod inspect;
pub mod prefix;

pub use cluster::ClusterSummary;
