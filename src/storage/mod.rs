//! On-disk formats
//!
//! - `vecs`: the length-prefixed `.bvecs` / `.fvecs` / `.ivecs` records
//! - `mmap`: memory-mapped `.bvecs` dataset reader
//! - `npy`: intermediate centroid and assignment arrays

pub mod mmap;
pub mod npy;
pub mod vecs;

pub use mmap::BvecsFile;
pub use vecs::{
    read_vecs, summarize, write_vecs, VecElement, VecsKind, VecsReader, VecsSummary, VecsWriter,
};
